//! Network-origin restriction for login.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid CIDR '{cidr}': {reason}")]
    Invalid { cidr: String, reason: String },
}

/// Allow-list of networks a login may originate from.
///
/// An empty list means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundCidrs(Vec<IpNet>);

impl BoundCidrs {
    /// Parse CIDR strings. A bare address is bound as a single-host network.
    pub fn parse<I, S>(cidrs: I) -> Result<Self, CidrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut nets = Vec::new();
        for raw in cidrs {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let net = match raw.parse::<IpNet>() {
                Ok(net) => net,
                Err(e) => match raw.parse::<IpAddr>() {
                    Ok(addr) => IpNet::from(addr),
                    Err(_) => {
                        return Err(CidrError::Invalid {
                            cidr: raw.to_string(),
                            reason: e.to_string(),
                        });
                    }
                },
            };
            nets.push(net);
        }
        Ok(Self(nets))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn networks(&self) -> &[IpNet] {
        &self.0
    }

    /// Whether a login from `origin` may proceed.
    ///
    /// With a non-empty list, an unknown origin is refused.
    pub fn permits(&self, origin: Option<IpAddr>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let Some(addr) = origin else {
            return false;
        };
        let addr = addr.to_canonical();
        self.0.iter().any(|net| net.contains(&addr))
    }
}
