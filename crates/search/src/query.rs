use crate::models::{Artifact, FileType};
use crate::path::validate as validate_path;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// What to look for.
///
/// Queries render (via [`Display`]) in the query language of the forensic
/// platform the cache artifacts are usually exported from, which keeps log
/// lines and error messages recognisable to analysts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A delimited table dump at an exact path. Matches comma- and
    /// tab-separated artifacts whose path equals `path`, with or without the
    /// artifact's own file extension.
    Table { path: PathBuf },
    /// An artifact of a given type, by file name (or file name minus
    /// extension).
    Named { name: String, file_type: FileType },
}
impl Query {
    /// Paths are normalized with [`validate_path`]; a path that doesn't
    /// survive validation is kept as-is and simply never matches.
    pub fn table(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::Table {
            path: validate_path(path).unwrap_or_else(|_| path.to_path_buf()),
        }
    }

    pub fn named(name: impl Into<String>, file_type: FileType) -> Self {
        Self::Named {
            name: name.into(),
            file_type,
        }
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        match self {
            Self::Table { path } => {
                artifact.file_type.is_table() && (artifact.path == *path || artifact.path.with_extension("") == *path)
            },
            Self::Named { name, file_type } => {
                artifact.file_type == *file_type
                    && (artifact.name() == Some(name.as_str()) || artifact.stem() == Some(name.as_str()))
            },
        }
    }
}
impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Table { path } => write!(
                f,
                "(data.raw.fileType='{}' OR data.raw.fileType='{}') AND path='/{}'",
                FileType::TabSeparatedValues,
                FileType::CommaSeparatedValues,
                path.display()
            ),
            Self::Named { name, file_type } => write!(f, "data.raw.fileType='{}' AND name='{}'", file_type, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn artifact(path: &str, file_type: FileType) -> Artifact {
        Artifact::new(path, 0, file_type)
    }

    #[rstest]
    #[case("cache/index.sqlite/files.csv", FileType::CommaSeparatedValues, true)]
    #[case("cache/index.sqlite/files.tsv", FileType::TabSeparatedValues, true)]
    #[case("cache/index.sqlite/files", FileType::CommaSeparatedValues, true)]
    #[case("cache/index.sqlite/files.csv", FileType::Raw, false)]
    #[case("cache/index.sqlite/thumbnails.csv", FileType::CommaSeparatedValues, false)]
    #[case("other/index.sqlite/files.csv", FileType::CommaSeparatedValues, false)]
    fn test_table_matches(#[case] path: &str, #[case] file_type: FileType, #[case] expected: bool) {
        let query = Query::table("/cache/./index.sqlite/files");
        assert_eq!(query.matches(&artifact(path, file_type)), expected);
    }

    #[rstest]
    #[case("plists/6A3F.plist", FileType::BinaryPlist, true)]
    #[case("6A3F", FileType::BinaryPlist, true)]
    #[case("deep/dir/6A3F", FileType::BinaryPlist, true)]
    #[case("6A3F", FileType::Raw, false)]
    #[case("6A3F0", FileType::BinaryPlist, false)]
    fn test_named_matches(#[case] path: &str, #[case] file_type: FileType, #[case] expected: bool) {
        let query = Query::named("6A3F", FileType::BinaryPlist);
        assert_eq!(query.matches(&artifact(path, file_type)), expected);
    }

    #[test]
    fn query_display() {
        assert_eq!(
            Query::named("6A3F", FileType::BinaryPlist).to_string(),
            "data.raw.fileType='Binary Plist' AND name='6A3F'"
        );
        assert_eq!(
            Query::table("cache/index.sqlite/files").to_string(),
            "(data.raw.fileType='Tab Separated Values' OR data.raw.fileType='Comma Separated Values') \
             AND path='/cache/index.sqlite/files'"
        );
    }
}
