//! Reconstruct QuickLook thumbnail cache entries from extracted artifacts.
//!
//! Usage:
//!     quicklook --output ./report /cases/1234/extracted

mod driver;
mod error;
mod output;

use crate::error::{ErrorKind, Result};
use crate::output::{DirectorySink, LinesSink, Sink};
use clap::Parser;
use exn::ResultExt;
use quicklook_config::{Config, FailurePolicy};
use quicklook_search::LocalSearcher;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "quicklook", version, about = "Reconstruct thumbnails and file metadata from QuickLook caches")]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Stop at the first record that can't be reconstructed
    #[arg(long)]
    halt_on_error: bool,

    /// Write records under this directory instead of standard output
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Don't write thumbnail images, only trace documents
    #[arg(long)]
    no_images: bool,

    /// Directory holding the extracted artifacts
    #[arg(value_name = "ROOT")]
    root: PathBuf,
}
impl Args {
    fn apply(&self, config: &mut Config) {
        if self.halt_on_error {
            config.policy = FailurePolicy::HaltOnFirstError;
        }
        if let Some(output) = &self.output {
            config.output.directory = Some(output.clone());
        }
        if self.no_images {
            config.output.write_images = false;
        }
    }
}

/// `RUST_LOG` wins, then `-v`, then the configured filter.
fn filter(verbose: u8, configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = match (verbose, configured) {
        (0, Some(configured)) => configured,
        (0, None) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn execute(args: &Args, config: &Config) -> Result<driver::Summary> {
    let root = std::fs::canonicalize(&args.root).or_raise(|| ErrorKind::Root(args.root.clone()))?;
    let name = root.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let searcher = LocalSearcher::open(name, &root).or_raise(|| ErrorKind::Root(root.clone()))?;
    tracing::info!(root = %root.display(), artifacts = searcher.len(), "indexed artifacts");

    let mut sink: Box<dyn Sink> = match &config.output.directory {
        Some(directory) => Box::new(DirectorySink::new(directory, config.output.write_images)),
        None => Box::new(LinesSink::new(io::stdout().lock())),
    };
    driver::run(&searcher, config, sink.as_mut())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:?}", err.raise(ErrorKind::Config));
            return ExitCode::from(2);
        },
    };
    args.apply(&mut config);

    tracing_subscriber::registry()
        .with(filter(args.verbose, config.log.filter.as_deref()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    match execute(&args, &config) {
        Ok(summary) if summary.errors == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            tracing::warn!(errors = summary.errors, "some records could not be reconstructed");
            ExitCode::FAILURE
        },
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ffi::OsString;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["quicklook", "-vv", "--halt-on-error", "--output", "out", "/cases/1"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.root, PathBuf::from("/cases/1"));

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.policy, FailurePolicy::HaltOnFirstError);
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));
        assert!(config.output.write_images);
    }

    #[test]
    fn test_args_leave_config_alone() {
        let args = Args::try_parse_from(["quicklook", "/cases/1"]).unwrap();
        let mut config = Config::default();
        config.output.directory = Some(PathBuf::from("configured"));
        args.apply(&mut config);
        assert_eq!(config.policy, FailurePolicy::Continue);
        assert_eq!(config.output.directory, Some(PathBuf::from("configured")));
    }

    #[test]
    fn test_args_require_root() {
        assert!(Args::try_parse_from(["quicklook", "-v"]).is_err());
    }

    #[rstest]
    #[case(0, None, "warn")]
    #[case(0, Some("quicklook_correlate=debug"), "quicklook_correlate=debug")]
    #[case(1, Some("quicklook_correlate=debug"), "info")]
    #[case(2, None, "debug")]
    #[case(5, None, "trace")]
    fn test_filter(#[case] verbose: u8, #[case] configured: Option<&str>, #[case] expected: &str) {
        // Only meaningful when RUST_LOG isn't set for the test run.
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        assert_eq!(filter(verbose, configured).to_string(), expected);
    }

    #[test]
    fn test_execute() {
        let root = tempfile::tempdir().unwrap();
        let cache = root.path().join("C/com.apple.QuickLook.thumbnailcache");
        std::fs::create_dir_all(cache.join("index.sqlite")).unwrap();
        std::fs::write(cache.join("thumbnails.data"), [0u8; 8]).unwrap();
        std::fs::write(
            cache.join("index.sqlite/thumbnails.csv"),
            "file_id,bitmapdata_location,bitmapdata_length,bitsperpixel,bytesperrow,height\n1,0,8,32,8,1\n",
        )
        .unwrap();
        std::fs::write(cache.join("index.sqlite/files.csv"), "folder,file_name,version,fs_id\n/x,y.png,<binary P>,3\n").unwrap();
        std::fs::create_dir_all(root.path().join("plists")).unwrap();
        std::fs::write(
            root.path().join("plists/P.plist"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\"><dict>\
             <key>date</key><real>0</real><key>gen</key><string>g</string><key>size</key><integer>9</integer>\
             </dict></plist>",
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            OsString::from("quicklook"),
            OsString::from("--output"),
            OsString::from(out.path()),
            OsString::from(root.path()),
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        let summary = execute(&args, &config).unwrap();
        assert_eq!(summary, driver::Summary { caches: 1, records: 1, errors: 0 });
        let written = out.path().join("C/com.apple.QuickLook.thumbnailcache");
        assert!(written.join("thumb-0.json").is_file());
        assert!(written.join("thumb-0.png").is_file());
    }

    #[test]
    fn test_execute_missing_root() {
        let args = Args::try_parse_from(["quicklook", "/definitely/not/here"]).unwrap();
        let err = execute(&args, &Config::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Root(_)));
    }
}
