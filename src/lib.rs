//! Group Tree Manager
//!
//! Client-held, partially loaded tree of nested groups: expand/collapse
//! with lazy child fetching, drag-to-reparent and drag-to-reorder with
//! optimistic local mutation, and reload-based reconciliation when the
//! directory service rejects a move.
//!
//! The forest lives in a [`store::TreeStore`] behind a narrow mutation
//! API; [`flatten`] derives the linear row view; [`loader`] and [`dnd`]
//! are the only mutators, both reaching the network exclusively through
//! [`api::GroupDirectory`].

pub mod api;
pub mod dnd;
pub mod domain;
pub mod flatten;
pub mod loader;
pub mod store;
pub mod tree;

#[cfg(test)]
mod tests;

pub use row_dnd::{DragState, DropBand, Rect, Release};
