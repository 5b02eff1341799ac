use crate::error::{ErrorKind, Result};
use quicklook_correlate::{BITMAP_NAME, CacheLayout, DATABASE_NAME, FILES_TABLE, THUMBNAILS_TABLE};
use quicklook_table::{DEFAULT_DELIMITER, DEFAULT_QUOTE, TableParser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub table: TableConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
    pub policy: FailurePolicy,
}
impl Config {
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.cache.validate()
    }
}

/// How the exported table dumps are delimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub delimiter: char,
    pub quote: char,
}
impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: char::from(DEFAULT_DELIMITER),
            quote: char::from(DEFAULT_QUOTE),
        }
    }
}
impl TableConfig {
    fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            exn::bail!(ErrorKind::InvalidValue {
                field: "table.delimiter",
                reason: "must be a single ASCII character",
            });
        }
        if !self.quote.is_ascii() {
            exn::bail!(ErrorKind::InvalidValue {
                field: "table.quote",
                reason: "must be a single ASCII character",
            });
        }
        if self.delimiter == self.quote || matches!(self.delimiter, '\n' | '\r') {
            exn::bail!(ErrorKind::InvalidValue {
                field: "table.delimiter",
                reason: "must differ from the quote and line break characters",
            });
        }
        Ok(())
    }

    /// Parser for this configuration. Only meaningful once validated.
    pub fn parser(&self) -> TableParser {
        TableParser::new(self.delimiter as u8, self.quote as u8)
    }
}

/// Artifact names making up one cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub bitmap_name: String,
    pub database_name: String,
    pub files_table: String,
    pub thumbnails_table: String,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            bitmap_name: BITMAP_NAME.to_string(),
            database_name: DATABASE_NAME.to_string(),
            files_table: FILES_TABLE.to_string(),
            thumbnails_table: THUMBNAILS_TABLE.to_string(),
        }
    }
}
impl CacheConfig {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("cache.bitmap_name", &self.bitmap_name),
            ("cache.database_name", &self.database_name),
            ("cache.files_table", &self.files_table),
            ("cache.thumbnails_table", &self.thumbnails_table),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) {
                exn::bail!(ErrorKind::InvalidValue {
                    field,
                    reason: "must be a single non-empty path component",
                });
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> CacheLayout {
        CacheLayout {
            bitmap_name: self.bitmap_name.clone(),
            database_name: self.database_name.clone(),
            files_table: self.files_table.clone(),
            thumbnails_table: self.thumbnails_table.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write records; standard output when unset
    pub directory: Option<PathBuf>,
    /// Write decoded thumbnails next to their records
    pub write_images: bool,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            write_images: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directives; `RUST_LOG` takes precedence
    pub filter: Option<String>,
}

/// What to do when a record can't be reconstructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Report the error and carry on with the next record.
    #[default]
    Continue,
    /// Stop at the first record error.
    HaltOnFirstError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.table.parser(), TableParser::default());
        assert_eq!(config.cache.layout(), CacheLayout::default());
        assert_eq!(config.policy, FailurePolicy::Continue);
        assert!(config.output.write_images);
    }

    #[rstest]
    #[case(',', ',', "table.delimiter")]
    #[case('→', '"', "table.delimiter")]
    #[case(',', '“', "table.quote")]
    #[case('\n', '"', "table.delimiter")]
    fn test_invalid_table(#[case] delimiter: char, #[case] quote: char, #[case] expected: &str) {
        let config = Config {
            table: TableConfig { delimiter, quote },
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidValue { field, .. } if *field == expected));
    }

    #[rstest]
    #[case("")]
    #[case("index/sqlite")]
    fn test_invalid_cache_names(#[case] name: &str) {
        let config = Config {
            cache: CacheConfig {
                database_name: name.to_string(),
                ..CacheConfig::default()
            },
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidValue { field: "cache.database_name", .. }));
    }

    #[test]
    fn test_tab_delimited_parser() {
        let table = TableConfig {
            delimiter: '\t',
            quote: '\'',
        };
        assert!(table.validate().is_ok());
        assert_eq!(table.parser(), TableParser::new(b'\t', b'\''));
    }
}
