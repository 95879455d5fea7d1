//! Domain Layer
//!
//! Core entities for the group tree and the common error type.
//! This layer has NO external dependencies (except serde for serialization).

mod error;
mod group;

pub use error::{DomainError, DomainResult};
pub use group::{Children, FlattenedGroupNode, GroupTreeNode};
