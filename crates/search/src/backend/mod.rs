//! Artifact searcher trait and implementations.
//!
//! This module defines the [`ArtifactSearcher`] trait, the boundary between
//! the reconstruction pipeline and wherever the extracted cache artifacts
//! actually live (a directory of exported files, a forensic platform's search
//! index, an in-memory fixture, etc.).

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalSearcher;
#[cfg(feature = "mock")]
pub use self::mock::MockSearcher;
use crate::error::{ErrorKind, Result};
use crate::models::Artifact;
use crate::query::Query;
use std::io::{Read, Seek};

/// Random access reader over an artifact's data.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

pub type BoxReadSeek = Box<dyn ReadSeek + 'static>;

/// Unified interface for locating and reading artifacts.
///
/// All operations are synchronous: a reconstruction run processes one record
/// at a time and each record depends on the lookup before it. Callers that
/// want parallelism should run separate caches on separate threads, which is
/// why implementations must be `Send + Sync`.
///
/// # Examples
///
/// ```
/// use quicklook_search::{ArtifactSearcher, FileType, Query, error::Result};
///
/// fn plist_bytes(searcher: &dyn ArtifactSearcher, name: &str) -> Result<Vec<u8>> {
///     let artifact = searcher.find_one(&Query::named(name, FileType::BinaryPlist))?;
///     searcher.read(&artifact)
/// }
/// ```
pub trait ArtifactSearcher: Send + Sync {
    /// Name of the searcher, for logging only.
    fn name(&self) -> &str;

    /// Returns at most `limit` artifacts matching `query`, in a stable order.
    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Artifact>>;

    /// Read an artifact's complete data.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the data has disappeared
    /// since the artifact was found.
    fn read(&self, artifact: &Artifact) -> Result<Vec<u8>>;

    /// Open an artifact for random access (seek + bounded reads).
    fn reader(&self, artifact: &Artifact) -> Result<BoxReadSeek>;

    /// Find the one artifact matching `query`.
    ///
    /// Zero matches is [`NoMatch`](ErrorKind::NoMatch); more than one is
    /// [`Ambiguous`](ErrorKind::Ambiguous). Never silently picks one of
    /// several candidates.
    fn find_one(&self, query: &Query) -> Result<Artifact> {
        let mut found = self.search(query, 2)?;
        match found.len() {
            0 => exn::bail!(ErrorKind::NoMatch(query.to_string())),
            1 => Ok(found.remove(0)),
            _ => exn::bail!(ErrorKind::Ambiguous(query.to_string())),
        }
    }
}
