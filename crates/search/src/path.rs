//! Path validation for artifact locations.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Validates and normalizes an artifact path relative to the search root.
///
/// Root and current-directory components are dropped, `..` is resolved, and
/// the result may never climb above the root. Null bytes are rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use quicklook_search::validate_path;
/// assert_eq!(
///     validate_path("/case/Users/x/thumbnailcache/index.sqlite/files").unwrap(),
///     Path::new("case/Users/x/thumbnailcache/index.sqlite/files")
/// );
/// assert_eq!(validate_path("a/./b/../c//").unwrap(), Path::new("a/c"));
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a\0b").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => components.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(invalid());
    }
    Ok(components.into_iter().collect())
}
