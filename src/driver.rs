use crate::error::{ErrorKind, Result};
use crate::output::Sink;
use exn::ResultExt;
use quicklook_config::{Config, FailurePolicy};
use quicklook_correlate::{ThumbnailCache, discover};
use quicklook_search::ArtifactSearcher;
use std::path::Path;
use tracing::instrument;

/// Counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub caches: usize,
    pub records: usize,
    /// Caches that failed to open plus records that failed to correlate
    pub errors: usize,
}

/// Correlate every cache the searcher knows of, handing records to `sink`.
///
/// Record errors and unopenable caches are logged and counted; under
/// [`FailurePolicy::HaltOnFirstError`] the first of them ends the run with
/// [`ErrorKind::Halted`]. Failing to persist a record always ends the run.
#[instrument(skip_all, fields(searcher = searcher.name()))]
pub fn run(searcher: &dyn ArtifactSearcher, config: &Config, sink: &mut dyn Sink) -> Result<Summary> {
    let layout = config.cache.layout();
    let parser = config.table.parser();
    let halt = config.policy == FailurePolicy::HaltOnFirstError;
    let mut summary = Summary::default();

    for bitmap in discover(searcher, &layout).or_raise(|| ErrorKind::Discovery)? {
        summary.caches += 1;
        let location = bitmap.path.parent().unwrap_or(Path::new("")).to_path_buf();
        let mut cache = match ThumbnailCache::open(searcher, bitmap, &layout, &parser) {
            Ok(cache) => cache,
            Err(err) => {
                summary.errors += 1;
                let err = err.raise(ErrorKind::Cache(location));
                if halt {
                    return Err(err.raise(ErrorKind::Halted));
                }
                tracing::error!(error = ?err, "skipping cache");
                continue;
            },
        };
        tracing::info!(cache = %location.display(), "correlating");
        for result in cache.correlate(searcher) {
            match result {
                Ok(record) => {
                    sink.write(&location, &record)?;
                    summary.records += 1;
                },
                Err(record_error) => {
                    summary.errors += 1;
                    if halt {
                        tracing::error!(cache = %location.display(), subject = %record_error.subject(), "halting");
                        return Err(record_error.into_error().raise(ErrorKind::Halted));
                    }
                },
            }
        }
    }
    tracing::info!(caches = summary.caches, records = summary.records, errors = summary.errors, "done");
    Ok(summary)
}
