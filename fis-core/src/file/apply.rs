use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing::{info, warn};

use crate::error::FisError;
use crate::file::resolver;
use crate::format::decode::decode;
use crate::format::{Directive, Record};

/// How records are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Mutate an existing project. Binary records are skipped and records
    /// without content change nothing.
    Changes,
    /// Build a project snapshot. Binary records become empty placeholder files
    /// and empty content produces empty files.
    Materialize,
}

#[derive(Debug)]
pub enum Outcome {
    Created,
    Modified,
    Deleted,
    Skipped { reason: &'static str },
    Failed { error: FisError },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Modified => f.write_str("modified"),
            Self::Deleted => f.write_str("deleted"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

#[derive(Debug)]
pub struct AppliedRecord {
    pub path: String,
    pub directive: Directive,
    pub outcome: Outcome,
}

/// Per-record results of one apply pass, in document order.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub records: Vec<AppliedRecord>,
}

impl ApplyReport {
    pub fn failures(&self) -> impl Iterator<Item = &AppliedRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Outcome for `path`, if the document mentioned it.
    pub fn outcome(&self, path: &str) -> Option<&Outcome> {
        self.records
            .iter()
            .find(|r| r.path == path)
            .map(|r| &r.outcome)
    }

    /// One-line tally, e.g. `2 created, 1 deleted, 1 failed`.
    pub fn summary(&self) -> String {
        let mut counts = [0usize; 5];
        for record in &self.records {
            let slot = match record.outcome {
                Outcome::Created => 0,
                Outcome::Modified => 1,
                Outcome::Deleted => 2,
                Outcome::Skipped { .. } => 3,
                Outcome::Failed { .. } => 4,
            };
            counts[slot] += 1;
        }
        let labels = ["created", "modified", "deleted", "skipped", "failed"];
        let parts: Vec<String> = counts
            .iter()
            .zip(labels)
            .filter(|(count, _)| **count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect();
        if parts.is_empty() {
            "no records".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Applies change records to an existing project root.
pub fn apply(project_root: &Path, records: &[Record]) -> Result<ApplyReport, FisError> {
    if !project_root.is_dir() {
        return Err(FisError::io(
            project_root,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "project root does not exist or is not a directory",
            ),
        ));
    }
    Ok(run(project_root, records, ApplyMode::Changes))
}

/// Decodes `raw` and applies it to an existing project root.
pub fn apply_document(project_root: &Path, raw: &str) -> Result<ApplyReport, FisError> {
    apply(project_root, &decode(raw))
}

/// Creates `project_root` if needed and writes every record into it.
pub fn materialize(project_root: &Path, records: &[Record]) -> Result<ApplyReport, FisError> {
    fs::create_dir_all(project_root).map_err(|e| FisError::io(project_root, e))?;
    Ok(run(project_root, records, ApplyMode::Materialize))
}

/// Decodes `raw` and materializes it under `project_root`.
pub fn materialize_document(project_root: &Path, raw: &str) -> Result<ApplyReport, FisError> {
    materialize(project_root, &decode(raw))
}

fn run(project_root: &Path, records: &[Record], mode: ApplyMode) -> ApplyReport {
    let mut report = ApplyReport::default();
    for record in records {
        let outcome = match apply_record(project_root, record, mode) {
            Ok(outcome) => outcome,
            Err(error) => Outcome::Failed { error },
        };
        match &outcome {
            Outcome::Failed { .. } => warn!("{} {}: {}", record.path, record.directive, outcome),
            _ => info!("{} {}: {}", record.path, record.directive, outcome),
        }
        report.records.push(AppliedRecord {
            path: record.path.clone(),
            directive: record.directive.clone(),
            outcome,
        });
    }
    report
}

fn apply_record(root: &Path, record: &Record, mode: ApplyMode) -> Result<Outcome, FisError> {
    let full_path = resolver::resolve(root, &record.path)?;

    match &record.directive {
        Directive::Unknown(tag) => Err(FisError::UnknownDirective(tag.clone())),
        Directive::Binary => match mode {
            ApplyMode::Changes => Ok(Outcome::Skipped {
                reason: "binary file",
            }),
            ApplyMode::Materialize => {
                if full_path.exists() {
                    return Ok(Outcome::Skipped {
                        reason: "binary placeholder already exists",
                    });
                }
                create_parents(&full_path)?;
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&full_path)
                    .map_err(|e| FisError::io(&full_path, e))?;
                Ok(Outcome::Created)
            }
        },
        Directive::Delete => {
            // A symlink is removed itself, never the directory it points to.
            let metadata =
                fs::symlink_metadata(&full_path).map_err(|e| FisError::io(&full_path, e))?;
            if metadata.file_type().is_dir() {
                fs::remove_dir(&full_path).map_err(|e| FisError::io(&full_path, e))?;
            } else {
                fs::remove_file(&full_path).map_err(|e| FisError::io(&full_path, e))?;
            }
            Ok(Outcome::Deleted)
        }
        Directive::Default | Directive::New | Directive::Replace => {
            let content = match mode {
                ApplyMode::Changes => record.provided_content(),
                ApplyMode::Materialize => record.content.as_deref(),
            };
            let Some(content) = content else {
                return Ok(Outcome::Skipped {
                    reason: "no content provided",
                });
            };

            create_parents(&full_path)?;
            let existed = full_path.exists();
            fs::write(&full_path, content).map_err(|e| FisError::io(&full_path, e))?;
            Ok(if existed {
                Outcome::Modified
            } else {
                Outcome::Created
            })
        }
    }
}

fn create_parents(path: &Path) -> Result<(), FisError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FisError::io(parent, e))?;
    }
    Ok(())
}
