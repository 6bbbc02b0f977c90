//! `runauth-core`: shared building blocks for the CI run authentication backend.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{RepositoryRef, RunId};
pub use value_object::ValueObject;
