//! `runauth-auth`: pure login/renewal building blocks (claims, grants, leases).
//!
//! This crate is intentionally decoupled from HTTP, storage and the oracle.

pub mod cidr;
pub mod claims;
pub mod grant;
pub mod grant_token;
pub mod lease;
pub mod policies;

pub use cidr::{BoundCidrs, CidrError};
pub use claims::IdentityClaim;
pub use grant::{Alias, GrantError, GrantState, RenewalData, SessionGrant};
pub use grant_token::{GrantClaims, GrantSigner, GrantTokenError, MIN_SIGNING_KEY_LEN};
pub use lease::{GRANT_MAX_TTL, GRANT_TTL, LeaseError, LeaseOptions};
pub use policies::{Policy, merge_policies, normalize_policies, parse_policies};
