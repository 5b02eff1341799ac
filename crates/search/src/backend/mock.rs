//! In-memory artifact searcher for testing.

use super::{ArtifactSearcher, BoxReadSeek};
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, FileType};
use crate::path::validate as validate_path;
use crate::query::Query;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory artifact searcher for testing.
///
/// Artifacts are fixed at construction and kept sorted by path, so search
/// results come back in the same order a [`LocalSearcher`](super::LocalSearcher)
/// would return them.
///
/// # Examples
///
/// ```
/// use quicklook_search::{ArtifactSearcher, FileType, MockSearcher, Query};
///
/// let searcher = MockSearcher::with_artifacts([
///     ("cache/index.sqlite/files.csv", FileType::CommaSeparatedValues, b"folder,file_name\n".to_vec()),
///     ("plists/6A3F", FileType::BinaryPlist, b"bplist00".to_vec()),
/// ]);
/// let artifact = searcher.find_one(&Query::table("cache/index.sqlite/files")).unwrap();
/// assert_eq!(searcher.read(&artifact).unwrap(), b"folder,file_name\n");
/// ```
#[derive(Debug, Clone)]
pub struct MockSearcher {
    name: String,
    artifacts: Vec<(Artifact, Option<Arc<[u8]>>)>,
}

impl MockSearcher {
    /// Create a mock searcher pre-populated with artifacts.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_artifacts(
        artifacts: impl IntoIterator<Item = (impl Into<PathBuf>, FileType, impl Into<Vec<u8>>)>,
    ) -> Self {
        let mut searcher = Self::default();
        for (path, file_type, data) in artifacts {
            let data: Vec<u8> = data.into();
            let artifact = Artifact::new(Self::validated(path.into()), data.len() as u64, file_type);
            searcher.artifacts.push((artifact, Some(Arc::from(data))));
        }
        searcher.artifacts.sort_by(|(a, _), (b, _)| a.path.cmp(&b.path));
        searcher
    }

    /// Add an artifact that searches find but whose data can't be read.
    pub fn with_missing(mut self, path: impl Into<PathBuf>, file_type: FileType) -> Self {
        let artifact = Artifact::new(Self::validated(path.into()), 0, file_type);
        self.artifacts.push((artifact, None));
        self.artifacts.sort_by(|(a, _), (b, _)| a.path.cmp(&b.path));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn validated(path: PathBuf) -> PathBuf {
        let Ok(validated) = validate_path(&path) else {
            panic!("MockSearcher: invalid path {}", path.display());
        };
        validated
    }

    fn data(&self, artifact: &Artifact) -> Result<Arc<[u8]>> {
        self.artifacts
            .iter()
            .find(|(candidate, _)| candidate.path == artifact.path)
            .and_then(|(_, data)| data.clone())
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(artifact.path.clone())))
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            artifacts: Vec::new(),
        }
    }
}

impl ArtifactSearcher for MockSearcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Artifact>> {
        Ok(self
            .artifacts
            .iter()
            .map(|(artifact, _)| artifact)
            .filter(|artifact| query.matches(artifact))
            .take(limit)
            .cloned()
            .collect())
    }

    fn read(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        Ok(self.data(artifact)?.to_vec())
    }

    fn reader(&self, artifact: &Artifact) -> Result<BoxReadSeek> {
        Ok(Box::new(Cursor::new(self.data(artifact)?)))
    }
}
