use crate::error::{ErrorKind, Result};
use crate::record::{EmittedRecord, Link, RecordError, Subject};
use exn::{OptionExt, ResultExt};
use quicklook_bitmap::{PixelRegion, REGION_FIELDS, Thumbnail, decode};
use quicklook_metadata::{Resolver, VERSION, format_utc, mac_absolute_time};
use quicklook_search::ArtifactSearcher;
use quicklook_table::{RowId, Table, TableRecord};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::vec::IntoIter;
use tracing::instrument;

pub const FILE_ID: &str = "file_id";
pub const FOLDER: &str = "folder";
pub const FILE_NAME: &str = "file_name";
pub const FS_ID: &str = "fs_id";
pub const LAST_HIT_DATE: &str = "last_hit_date";

/// Which thumbnail claims which file, and which files nobody claims.
///
/// Computed once, before any record is produced. Every file id ends up either
/// claimed by exactly one thumbnail or in `orphans`, never both.
#[derive(Debug)]
pub(crate) struct Plan<'a> {
    pub(crate) thumbnails: Vec<Planned<'a>>,
    pub(crate) orphans: Vec<RowId>,
}
pub(crate) type Planned<'a> = (RowId, &'a TableRecord, Result<RowId>);

impl<'a> Plan<'a> {
    pub(crate) fn new(thumbnails: &'a Table, files: &Table) -> Self {
        let mut claimed: HashMap<RowId, RowId> = HashMap::new();
        let planned = thumbnails
            .iter()
            .map(|(thumbnail, record)| {
                let claim = Self::file_id(record, files).and_then(|file| match claimed.get(&file) {
                    Some(&claimed_by) => exn::bail!(ErrorKind::DuplicateForeignKey { file, claimed_by }),
                    None => {
                        claimed.insert(file, thumbnail);
                        Ok(file)
                    },
                });
                (thumbnail, record, claim)
            })
            .collect();
        let orphans = files.ids().filter(|id| !claimed.contains_key(id)).collect();
        Self {
            thumbnails: planned,
            orphans,
        }
    }

    fn file_id(record: &TableRecord, files: &Table) -> Result<RowId> {
        let value = record.get(FILE_ID).ok_or_raise(|| ErrorKind::MissingField(FILE_ID))?;
        let key: i64 = value.trim().parse::<i64>().or_raise(|| ErrorKind::NotAnInteger {
            field: FILE_ID,
            value: value.to_string(),
        })?;
        match RowId::from_key(key) {
            Some(id) if files.contains(id) => Ok(id),
            _ => exn::bail!(ErrorKind::DanglingForeignKey(key)),
        }
    }
}

/// Correlate a cache's two tables into one record per file.
///
/// Thumbnail records come first, in thumbnails-table order, followed by one
/// metadata-only record for each file no thumbnail refers to, in files-table
/// order. Records that can't be built are yielded as [`RecordError`]s; the
/// iterator itself never stops early, so whether to carry on after an error
/// is up to the caller.
///
/// The iterator is lazy: pixels are decoded and property lists resolved one
/// record at a time.
pub fn correlate<'a, R: Read + Seek>(
    thumbnails: &'a Table,
    files: &'a Table,
    bitmap: R,
    searcher: &'a dyn ArtifactSearcher,
) -> Correlation<'a, R> {
    let plan = Plan::new(thumbnails, files);
    tracing::debug!(
        thumbnails = plan.thumbnails.len(),
        orphans = plan.orphans.len(),
        searcher = searcher.name(),
        "correlation planned"
    );
    Correlation {
        files,
        bitmap,
        resolver: Resolver::new(searcher),
        planned: plan.thumbnails.into_iter(),
        orphans: plan.orphans.into_iter(),
        ordinal: 0,
    }
}

/// Iterator over the records of one cache; see [`correlate`].
pub struct Correlation<'a, R> {
    files: &'a Table,
    bitmap: R,
    resolver: Resolver<'a>,
    planned: IntoIter<Planned<'a>>,
    orphans: IntoIter<RowId>,
    ordinal: usize,
}
impl<R: Read + Seek> Correlation<'_, R> {
    #[instrument(level = "debug", skip(self, record))]
    fn thumbnail_record(&mut self, thumbnail: RowId, record: &TableRecord, file: RowId) -> Result<EmittedRecord> {
        let image = self.decode(thumbnail, record);
        let link = self.link(file)?;
        Ok(EmittedRecord {
            ordinal: self.ordinal,
            file_id: file,
            link,
            thumbnail: image,
            properties: Some(properties(record)),
        })
    }

    #[instrument(level = "debug", skip(self))]
    fn orphan_record(&mut self, file: RowId) -> Result<EmittedRecord> {
        Ok(EmittedRecord {
            ordinal: self.ordinal,
            file_id: file,
            link: self.link(file)?,
            thumbnail: None,
            properties: None,
        })
    }

    /// Missing or unusable pixels only mean the record has no image.
    fn decode(&mut self, thumbnail: RowId, record: &TableRecord) -> Option<Thumbnail> {
        if !REGION_FIELDS.iter().any(|field| record.contains(field)) {
            tracing::debug!(%thumbnail, "thumbnail has no pixel region");
            return None;
        }
        match PixelRegion::from_record(record).and_then(|region| decode(&mut self.bitmap, &region)) {
            Ok(image) => Some(image),
            Err(err) => {
                tracing::warn!(%thumbnail, error = ?err, "thumbnail pixels unusable, emitting without image");
                None
            },
        }
    }

    fn link(&self, file: RowId) -> Result<Link> {
        let record = self.files.get(file).ok_or_raise(|| ErrorKind::DanglingForeignKey(i64::from(file.get())))?;
        let field = |name: &'static str| {
            record.get(name).map(str::to_string).ok_or_raise(|| ErrorKind::MissingField(name))
        };
        let target = format!("{}/{}", field(FOLDER)?, field(FILE_NAME)?);
        let plist_version = field(VERSION)?;
        let fs_id = field(FS_ID)?;
        let metadata = self.resolver.resolve(record).map_err(|err| {
            let cause = (*err).clone();
            err.raise(ErrorKind::Metadata { file, cause })
        })?;
        Ok(Link {
            target,
            target_file_length: metadata.size,
            target_modified_on: metadata.modified,
            plist_version,
            generator: metadata.generator,
            fs_id,
        })
    }

    fn finish(
        &mut self,
        subject: Subject,
        result: Result<EmittedRecord>,
    ) -> std::result::Result<EmittedRecord, RecordError> {
        match result {
            Ok(record) => {
                self.ordinal += 1;
                tracing::debug!(name = %record.name(), %subject, image = record.thumbnail.is_some(), "record emitted");
                Ok(record)
            },
            Err(err) => {
                let error = RecordError::new(subject, err);
                if error.is_integrity_defect() {
                    tracing::error!(%subject, error = ?error.error(), "cache tables are inconsistent");
                } else {
                    tracing::warn!(%subject, error = ?error.error(), "record could not be reconstructed");
                }
                Err(error)
            },
        }
    }
}
impl<R: Read + Seek> Iterator for Correlation<'_, R> {
    type Item = std::result::Result<EmittedRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((thumbnail, record, claim)) = self.planned.next() {
            let result = claim.and_then(|file| self.thumbnail_record(thumbnail, record, file));
            return Some(self.finish(Subject::Thumbnail(thumbnail), result));
        }
        let file = self.orphans.next()?;
        let result = self.orphan_record(file);
        Some(self.finish(Subject::File(file), result))
    }
}

/// Thumbnail fields not consumed by correlation or pixel extraction, with
/// `last_hit_date` converted from Mac absolute time.
fn properties(record: &TableRecord) -> Vec<(String, String)> {
    record
        .iter()
        .filter(|(key, _)| *key != FILE_ID && !REGION_FIELDS.contains(key))
        .map(|(key, value)| {
            let value = match key {
                LAST_HIT_DATE => match mac_absolute_time(value).and_then(format_utc) {
                    Ok(formatted) => formatted,
                    Err(err) => {
                        tracing::warn!(error = ?err, value, "unreadable last hit date, keeping raw value");
                        value.to_string()
                    },
                },
                _ => value.to_string(),
            };
            (key.to_string(), value)
        })
        .collect()
}
