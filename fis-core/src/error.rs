use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FisError {
    #[error("Refusing to touch '{path}': {reason}")]
    UnsafePath { path: String, reason: &'static str },

    #[error("Record has no file path")]
    MissingPath,

    #[error("Unknown directive [{0}]")]
    UnknownDirective(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read rule file {}: {source}", path.display())]
    RuleFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule file {}: {source}", path.display())]
    RuleFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to load ignore file: {0}")]
    Gitignore(#[from] ignore::Error),
}

impl FisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
