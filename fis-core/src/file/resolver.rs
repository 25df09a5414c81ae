use std::path::{Component, Path, PathBuf};

use crate::error::FisError;

/// Resolves a record path against `root`.
///
/// Record paths come from documents that may have been written by a language
/// model, so they are validated lexically: no absolute paths, no drive
/// prefixes, and no `..` that climbs above the root. `\` is accepted as a
/// separator for documents produced on Windows.
pub fn resolve(root: &Path, record_path: &str) -> Result<PathBuf, FisError> {
    let relative = normalize(record_path)?;
    Ok(root.join(relative))
}

/// Lexically normalized relative form of a record path.
pub fn normalize(record_path: &str) -> Result<PathBuf, FisError> {
    let unsafe_path = |reason| FisError::UnsafePath {
        path: record_path.to_string(),
        reason,
    };

    let cleaned = record_path.trim().replace('\\', "/");
    if cleaned.is_empty() {
        return Err(FisError::MissingPath);
    }
    if cleaned.contains('\0') {
        return Err(unsafe_path("path contains a NUL byte"));
    }

    let mut out: Vec<&str> = Vec::new();
    for component in Path::new(&cleaned).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(unsafe_path("absolute paths are not allowed"));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if out.pop().is_none() {
                    return Err(unsafe_path("path escapes the project root"));
                }
            }
            Component::Normal(name) => {
                let Some(name) = name.to_str() else {
                    return Err(unsafe_path("path is not valid UTF-8"));
                };
                // `C:foo` style prefixes are plain names on unix.
                if out.is_empty() && name.len() >= 2 && name.as_bytes()[1] == b':' {
                    return Err(unsafe_path("absolute paths are not allowed"));
                }
                out.push(name);
            }
        }
    }

    if out.is_empty() {
        return Err(FisError::MissingPath);
    }
    Ok(out.iter().collect())
}

/// `/`-separated form of a path relative to the project root, as written into
/// record headers.
pub fn record_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
