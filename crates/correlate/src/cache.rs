use crate::correlation::{Correlation, correlate};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use quicklook_search::{Artifact, ArtifactSearcher, BoxReadSeek, FileType, Query};
use quicklook_table::{Table, TableParser};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const BITMAP_NAME: &str = "thumbnails.data";
pub const DATABASE_NAME: &str = "index.sqlite";
pub const FILES_TABLE: &str = "files";
pub const THUMBNAILS_TABLE: &str = "thumbnails";

/// Names of the artifacts that make up one thumbnail cache.
///
/// The tables are exported next to the bitmap store, under a directory named
/// after the database: `<cache>/thumbnails.data` has its tables at
/// `<cache>/index.sqlite/files` and `<cache>/index.sqlite/thumbnails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    pub bitmap_name: String,
    pub database_name: String,
    pub files_table: String,
    pub thumbnails_table: String,
}
impl Default for CacheLayout {
    fn default() -> Self {
        Self {
            bitmap_name: BITMAP_NAME.to_string(),
            database_name: DATABASE_NAME.to_string(),
            files_table: FILES_TABLE.to_string(),
            thumbnails_table: THUMBNAILS_TABLE.to_string(),
        }
    }
}
impl CacheLayout {
    /// Path of `table`, for the bitmap store at `bitmap`.
    pub fn table_path(&self, bitmap: impl AsRef<Path>, table: &str) -> PathBuf {
        let cache = bitmap.as_ref().parent().unwrap_or_else(|| Path::new(""));
        cache.join(&self.database_name).join(table)
    }
}

/// Every bitmap store the searcher knows of, in search order.
#[instrument(skip_all, fields(searcher = searcher.name(), caches))]
pub fn discover(searcher: &dyn ArtifactSearcher, layout: &CacheLayout) -> Result<Vec<Artifact>> {
    let caches = searcher
        .search(&Query::named(&layout.bitmap_name, FileType::Raw), usize::MAX)
        .or_raise(|| ErrorKind::Discovery)?;
    tracing::Span::current().record("caches", caches.len());
    Ok(caches)
}

/// One thumbnail cache, with both tables parsed and the bitmap store open.
pub struct ThumbnailCache {
    bitmap: Artifact,
    thumbnails: Table,
    files: Table,
    reader: BoxReadSeek,
}
impl ThumbnailCache {
    /// Locate, read and parse the tables belonging to the bitmap store
    /// `bitmap`, and open the store for random access.
    ///
    /// Each table must be found exactly once. A table that fails to parse
    /// fails the whole cache: its row identifiers can't be trusted.
    #[instrument(skip_all, fields(bitmap = %bitmap.path.display(), thumbnails, files))]
    pub fn open(
        searcher: &dyn ArtifactSearcher,
        bitmap: Artifact,
        layout: &CacheLayout,
        parser: &TableParser,
    ) -> Result<Self> {
        let thumbnails = Self::table(searcher, layout.table_path(&bitmap.path, &layout.thumbnails_table), parser)?;
        let files = Self::table(searcher, layout.table_path(&bitmap.path, &layout.files_table), parser)?;
        let reader = searcher.reader(&bitmap).or_raise(|| ErrorKind::Bitmap(bitmap.path.clone()))?;
        tracing::Span::current().record("thumbnails", thumbnails.len());
        tracing::Span::current().record("files", files.len());
        Ok(Self {
            bitmap,
            thumbnails,
            files,
            reader,
        })
    }

    fn table(searcher: &dyn ArtifactSearcher, path: PathBuf, parser: &TableParser) -> Result<Table> {
        let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        let artifact = searcher.find_one(&Query::table(&path)).or_raise(|| ErrorKind::TableLookup {
            table: name.clone(),
            path: path.clone(),
        })?;
        let bytes = searcher.read(&artifact).or_raise(|| ErrorKind::Table(name.clone()))?;
        parser.parse(bytes).or_raise(|| ErrorKind::Table(name))
    }

    /// The bitmap store this cache was opened from.
    pub fn bitmap(&self) -> &Artifact {
        &self.bitmap
    }

    pub fn thumbnails(&self) -> &Table {
        &self.thumbnails
    }

    pub fn files(&self) -> &Table {
        &self.files
    }

    /// Correlate the cache's tables; see [`correlate`].
    pub fn correlate<'a>(&'a mut self, searcher: &'a dyn ArtifactSearcher) -> Correlation<'a, &'a mut BoxReadSeek> {
        let Self {
            thumbnails,
            files,
            reader,
            ..
        } = self;
        correlate(thumbnails, files, reader, searcher)
    }
}
