//! Local filesystem artifact searcher.
//!
//! Searches a directory tree of artifacts that upstream tooling has already
//! exported from an evidence image, e.g.
//!
//! ```text
//! <root>/…/com.apple.QuickLook.thumbnailcache/thumbnails.data
//! <root>/…/com.apple.QuickLook.thumbnailcache/index.sqlite/files.csv
//! <root>/…/com.apple.QuickLook.thumbnailcache/index.sqlite/thumbnails.csv
//! <root>/plists/<name>.plist
//! ```
//!
//! Extensions are optional: files without one are classified by content
//! (see [`FileType::from_magic_bytes`]), so a dump exported as
//!
//! ```text
//! <root>/…/com.apple.QuickLook.thumbnailcache/index.sqlite/files
//! ```
//!
//! is still found by [`Query::table`].

use super::{ArtifactSearcher, BoxReadSeek};
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, FileType, MAGIC_BYTES_LENGTH};
use crate::path::validate as validate_path;
use crate::query::Query;
use exn::ResultExt;
use std::fs::{self, DirEntry, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::instrument;

enum WalkEntry {
    File(Artifact),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem artifact searcher.
///
/// The tree is walked and classified once, on [`open`](Self::open); searches
/// run against that index. File types come from the extension where it is
/// conclusive (`.csv`, `.tsv`, `.plist`) and from magic bytes otherwise.
///
/// # Examples
///
/// ```no_run
/// use quicklook_search::{ArtifactSearcher, LocalSearcher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let searcher = LocalSearcher::open("evidence", "/cases/1234/export")?;
/// println!("{} artifacts indexed", searcher.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearcher {
    name: String,
    root: PathBuf,
    index: Vec<Artifact>,
}
impl LocalSearcher {
    /// Index every file below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is not an
    /// absolute path to an existing directory, or an I/O error if the walk
    /// fails.
    #[instrument(skip_all, fields(name, root = %root.as_ref().display(), artifacts))]
    pub fn open(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        let mut searcher = Self {
            name: name.into(),
            root,
            index: Vec::new(),
        };
        tracing::Span::current().record("name", searcher.name.as_str());
        searcher.index = searcher.walk()?;
        tracing::Span::current().record("artifacts", searcher.index.len());
        Ok(searcher)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed artifacts.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn walk(&self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(current) = stack.pop() {
            let entries = fs::read_dir(&current).map_err(|e| Self::map_io_error(e, &current))?;
            for entry in entries {
                let entry = entry.map_err(|e| Self::map_io_error(e, &current))?;
                match self.process_entry(entry)? {
                    WalkEntry::File(artifact) => artifacts.push(artifact),
                    WalkEntry::Descend(directory) => stack.push(directory),
                    WalkEntry::Skip => {},
                }
            }
        }
        // Directory iteration order is filesystem-dependent.
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(artifacts)
    }

    fn process_entry(&self, entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| Self::map_io_error(e, &path))?;
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if !metadata.is_file() {
            // Most likely a broken symlink.
            return Ok(WalkEntry::Skip);
        }
        let relative = self.relative_path(&path)?;
        let file_type = match FileType::from_extension(&relative) {
            Some(file_type) => file_type,
            None => FileType::from_magic_bytes(&Self::read_head(&path)?).unwrap_or(FileType::Raw),
        };
        Ok(WalkEntry::File(Artifact::new(relative, metadata.len(), file_type)))
    }

    fn read_head(path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path).map_err(|e| Self::map_io_error(e, path))?;
        let mut head = Vec::with_capacity(MAGIC_BYTES_LENGTH);
        file.take(MAGIC_BYTES_LENGTH as u64).read_to_end(&mut head).map_err(ErrorKind::Io)?;
        Ok(head)
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path.as_ref())?))
    }

    fn relative_path(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute
            .strip_prefix(&self.root)
            .or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        validate_path(relative)
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

impl ArtifactSearcher for LocalSearcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(level = "debug", skip(self), fields(searcher = %self.name, query = %query))]
    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Artifact>> {
        Ok(self.index.iter().filter(|artifact| query.matches(artifact)).take(limit).cloned().collect())
    }

    fn read(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let path = self.absolute_path(&artifact.path)?;
        Ok(fs::read(&path).map_err(|e| Self::map_io_error(e, &artifact.path))?)
    }

    fn reader(&self, artifact: &Artifact) -> Result<BoxReadSeek> {
        let path = self.absolute_path(&artifact.path)?;
        let file = File::open(&path).map_err(|e| Self::map_io_error(e, &artifact.path))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    const XML_PLIST: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\"><dict/></plist>";

    fn fixture() -> (tempfile::TempDir, LocalSearcher) {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = temp_dir.path().join("Users/x/com.apple.QuickLook.thumbnailcache");
        fs::create_dir_all(cache.join("index.sqlite")).unwrap();
        fs::create_dir_all(temp_dir.path().join("plists")).unwrap();
        fs::write(cache.join("thumbnails.data"), b"0123456789").unwrap();
        fs::write(cache.join("index.sqlite/files.csv"), b"folder,file_name\n").unwrap();
        fs::write(cache.join("index.sqlite/thumbnails.csv"), b"file_id\n").unwrap();
        fs::write(temp_dir.path().join("plists/6A3F"), XML_PLIST).unwrap();
        fs::write(temp_dir.path().join("plists/7B40.plist"), XML_PLIST).unwrap();
        let searcher = LocalSearcher::open("local", temp_dir.path()).unwrap();
        (temp_dir, searcher)
    }

    #[test]
    fn test_open_requires_absolute_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalSearcher::open("name", temp_dir.path()).is_ok());
        assert!(LocalSearcher::open("name", "relative/path").is_err());
        let file = temp_dir.path().join("file");
        fs::write(&file, b"data").unwrap();
        let err = LocalSearcher::open("name", &file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_index_classifies_artifacts() {
        let (_dir, searcher) = fixture();
        assert_eq!(searcher.len(), 5);
        let types: Vec<_> = searcher.index.iter().map(|a| (a.path.to_str().unwrap(), a.file_type)).collect();
        assert!(types.contains(&("plists/6A3F", FileType::BinaryPlist)));
        assert!(types.contains(&("plists/7B40.plist", FileType::BinaryPlist)));
        assert!(types.contains(&(
            "Users/x/com.apple.QuickLook.thumbnailcache/thumbnails.data",
            FileType::Raw
        )));
        assert!(types.contains(&(
            "Users/x/com.apple.QuickLook.thumbnailcache/index.sqlite/files.csv",
            FileType::CommaSeparatedValues
        )));
    }

    #[test]
    fn test_find_table_by_path() {
        let (_dir, searcher) = fixture();
        let query = Query::table("/Users/x/com.apple.QuickLook.thumbnailcache/index.sqlite/files");
        let artifact = searcher.find_one(&query).unwrap();
        assert_eq!(searcher.read(&artifact).unwrap(), b"folder,file_name\n");
    }

    #[test]
    fn test_find_table_without_extension() {
        let (dir, _) = fixture();
        let cache = dir.path().join("C/com.apple.QuickLook.thumbnailcache");
        fs::create_dir_all(cache.join("index.sqlite")).unwrap();
        fs::write(cache.join("thumbnails.data"), [0x00, 0x7f, 0xff, 0x10]).unwrap();
        fs::write(cache.join("index.sqlite/files"), b"folder,file_name,version\n/a,1.png,<binary 6A3F>\n").unwrap();
        fs::write(cache.join("index.sqlite/thumbnails"), b"file_id\tsize\n1\t4\n").unwrap();
        let searcher = LocalSearcher::open("local", dir.path()).unwrap();

        let files = searcher
            .find_one(&Query::table("/C/com.apple.QuickLook.thumbnailcache/index.sqlite/files"))
            .unwrap();
        assert_eq!(files.path, Path::new("C/com.apple.QuickLook.thumbnailcache/index.sqlite/files"));
        assert_eq!(files.file_type, FileType::CommaSeparatedValues);
        let thumbnails = searcher
            .find_one(&Query::table("C/com.apple.QuickLook.thumbnailcache/index.sqlite/thumbnails"))
            .unwrap();
        assert_eq!(thumbnails.file_type, FileType::TabSeparatedValues);
        // Binary bitmap stores stay raw.
        let bitmaps = searcher.search(&Query::named("thumbnails.data", FileType::Raw), usize::MAX).unwrap();
        assert_eq!(bitmaps.len(), 2);
    }

    #[test]
    fn test_find_plist_by_name() {
        let (_dir, searcher) = fixture();
        for name in ["6A3F", "7B40"] {
            let artifact = searcher.find_one(&Query::named(name, FileType::BinaryPlist)).unwrap();
            assert_eq!(searcher.read(&artifact).unwrap(), XML_PLIST);
        }
        let err = searcher.find_one(&Query::named("FFFF", FileType::BinaryPlist)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NoMatch(_)));
    }

    #[test]
    fn test_find_one_ambiguous() {
        let (dir, _) = fixture();
        fs::create_dir_all(dir.path().join("more")).unwrap();
        fs::write(dir.path().join("more/6A3F.plist"), XML_PLIST).unwrap();
        let searcher = LocalSearcher::open("local", dir.path()).unwrap();
        let err = searcher.find_one(&Query::named("6A3F", FileType::BinaryPlist)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Ambiguous(_)));
        assert_eq!(searcher.search(&Query::named("6A3F", FileType::BinaryPlist), 10).unwrap().len(), 2);
        assert_eq!(searcher.search(&Query::named("6A3F", FileType::BinaryPlist), 1).unwrap().len(), 1);
    }

    #[test]
    fn test_reader_random_access() {
        let (_dir, searcher) = fixture();
        let artifact = searcher.find_one(&Query::named("thumbnails.data", FileType::Raw)).unwrap();
        let mut reader = searcher.reader(&artifact).unwrap();
        reader.seek(SeekFrom::Start(4)).unwrap();
        let mut buffer = [0u8; 3];
        reader.read_exact(&mut buffer).unwrap();
        assert_eq!(&buffer, b"456");
    }

    #[test]
    fn test_read_deleted_artifact() {
        let (dir, searcher) = fixture();
        let artifact = searcher.find_one(&Query::named("6A3F", FileType::BinaryPlist)).unwrap();
        fs::remove_file(dir.path().join("plists/6A3F")).unwrap();
        let err = searcher.read(&artifact).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
