//! Driver Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// The artifact root can't be opened or indexed.
    #[display("could not open artifact root: {}", _0.display())]
    Root(#[error(not(source))] PathBuf),
    #[display("could not discover thumbnail caches")]
    Discovery,
    /// A cache's tables or bitmap store can't be opened.
    #[display("could not open thumbnail cache: {}", _0.display())]
    Cache(#[error(not(source))] PathBuf),
    /// A record could not be persisted.
    #[display("could not write {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
    #[display("could not serialize trace document")]
    Serialize,
    /// A record error occurred under the halt-on-first-error policy.
    #[display("halted after a record error")]
    Halted,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Output(_))
    }
}
