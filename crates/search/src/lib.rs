//! Locating the extracted components of a thumbnail cache.
//!
//! A cache is never read from a live filesystem: its bitmap store, its
//! database tables and the property lists its rows point at have all been
//! exported by upstream tooling, and are found again by query. This crate
//! defines those queries and the [`ArtifactSearcher`] seam that answers them.

pub mod backend;
pub mod error;
mod models;
mod path;
mod query;

pub use crate::backend::{ArtifactSearcher, BoxReadSeek, LocalSearcher};
#[cfg(feature = "mock")]
pub use crate::backend::MockSearcher;
pub use crate::models::{Artifact, FileType, MAGIC_BYTES_LENGTH};
pub use crate::path::validate as validate_path;
pub use crate::query::Query;
