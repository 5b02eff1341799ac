use crate::error::{ErrorKind, Result};
use crate::property_list::{FileMetadata, parse_plist, plist_name};
use exn::{OptionExt, ResultExt};
use quicklook_search::error::ErrorKind as SearchErrorKind;
use quicklook_search::{ArtifactSearcher, FileType, Query};
use quicklook_table::TableRecord;
use tracing::instrument;

pub const VERSION: &str = "version";

/// Resolves files records to their property list metadata.
pub struct Resolver<'a> {
    searcher: &'a dyn ArtifactSearcher,
}
impl<'a> Resolver<'a> {
    pub fn new(searcher: &'a dyn ArtifactSearcher) -> Self {
        Self { searcher }
    }

    /// Find, read and parse the property list named after the record's
    /// `version` field.
    ///
    /// Exactly one property list may carry that name: none is
    /// [`NotFound`](ErrorKind::NotFound), several is
    /// [`AmbiguousResult`](ErrorKind::AmbiguousResult).
    #[instrument(level = "debug", skip_all, fields(searcher = self.searcher.name(), plist))]
    pub fn resolve(&self, record: &TableRecord) -> Result<FileMetadata> {
        let version = record.get(VERSION).ok_or_raise(|| ErrorKind::MissingField(VERSION))?;
        let name = plist_name(version);
        tracing::Span::current().record("plist", name.as_str());

        let artifact = match self.searcher.find_one(&Query::named(&name, FileType::BinaryPlist)) {
            Ok(artifact) => artifact,
            Err(err) => {
                let kind = match &*err {
                    SearchErrorKind::NoMatch(_) => ErrorKind::NotFound(name),
                    SearchErrorKind::Ambiguous(_) => ErrorKind::AmbiguousResult(name),
                    _ => ErrorKind::Unreadable(name),
                };
                return Err(err.raise(kind));
            },
        };
        let bytes = self.searcher.read(&artifact).or_raise(|| ErrorKind::Unreadable(name.clone()))?;
        parse_plist(&bytes)
    }
}
