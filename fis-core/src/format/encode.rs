use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::preamble::PreambleLanguage;
use super::{Directive, Record, CLOSE_FENCE, OPEN_FENCE};
use crate::error::FisError;
use crate::file::ignore::{IgnoreOptions, IgnoreRules};
use crate::file::{resolver, text};
use crate::settings::RuleFile;

/// Everything that shapes an encoded document apart from the project root.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Prepend the instruction preamble and wrap the records in a fence.
    pub preamble: Option<PreambleLanguage>,
    /// Honor `.gitignore` and skip version control directories.
    pub use_ignore_rules: bool,
    /// Skip `.fis` files.
    pub suppress_own_format_files: bool,
    /// Custom rule file to load. A missing or malformed file is reported as an
    /// [`EncodeIssue::RuleFile`] and encoding continues without custom rules.
    pub custom_rules: Option<PathBuf>,
}

/// A problem that did not stop encoding but left something out.
#[derive(Debug)]
pub enum EncodeIssue {
    /// The custom rule file could not be used.
    RuleFile { error: FisError },
    /// A directory (or entry) could not be read during traversal.
    Traversal { path: PathBuf, error: String },
    /// A file could not be read.
    Read { path: PathBuf, error: String },
}

impl fmt::Display for EncodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleFile { error } => write!(f, "custom rules not applied: {error}"),
            Self::Traversal { path, error } => {
                write!(f, "skipped {}: {error}", path.display())
            }
            Self::Read { path, error } => {
                write!(f, "could not read {}: {error}", path.display())
            }
        }
    }
}

/// Result of an encode pass.
#[derive(Debug, Default)]
pub struct Encoded {
    pub document: String,
    /// Record paths in document order.
    pub text_files: Vec<String>,
    pub binary_files: Vec<String>,
    pub issues: Vec<EncodeIssue>,
}

impl Encoded {
    pub fn file_count(&self) -> usize {
        self.text_files.len() + self.binary_files.len()
    }
}

/// Encodes `project_root` and writes the document to `output`.
///
/// The output file itself is never embedded, even when it lives inside the
/// project and already exists from an earlier run.
pub fn encode(project_root: &Path, output: &Path, options: &EncodeOptions) -> Result<Encoded> {
    let root = project_root
        .canonicalize()
        .with_context(|| format!("Project path not found: {}", project_root.display()))?;
    let exclude = real_output_path(output);

    let encoded = encode_root(&root, options, exclude.as_deref())?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output, &encoded.document)
        .with_context(|| format!("Failed to write document: {}", output.display()))?;

    info!(
        "Encoded {} files ({} binary) from {:?} into {:?}",
        encoded.file_count(),
        encoded.binary_files.len(),
        root,
        output
    );
    Ok(encoded)
}

/// Encodes `project_root` without writing anything.
pub fn encode_to_string(project_root: &Path, options: &EncodeOptions) -> Result<Encoded> {
    let root = project_root
        .canonicalize()
        .with_context(|| format!("Project path not found: {}", project_root.display()))?;
    encode_root(&root, options, None)
}

fn encode_root(root: &Path, options: &EncodeOptions, exclude: Option<&Path>) -> Result<Encoded> {
    let mut encoded = Encoded::default();
    let rules = build_rules(root, options, &mut encoded.issues)?;

    let mut document = String::new();
    if let Some(lang) = options.preamble {
        document.push_str(lang.text());
        document.push('\n');
        document.push_str(OPEN_FENCE);
    }

    // Ignored directories are pruned here so large trees such as
    // `node_modules` are never descended into.
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let ignored = rules.is_ignored(relative, true);
            if ignored {
                debug!("Pruning ignored directory {:?}", relative);
            }
            !ignored
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                warn!("Traversal error at {:?}: {}", path, err);
                encoded.issues.push(EncodeIssue::Traversal {
                    path,
                    error: err.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            if entry.file_type().is_symlink() {
                debug!("Skipping symlink {:?}", entry.path());
            }
            continue;
        }

        let path = entry.path();
        if exclude == Some(path) {
            debug!("Skipping output document {:?}", path);
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if rules.is_ignored(relative, false) {
            debug!("Ignoring {:?}", relative);
            continue;
        }
        let record_path = resolver::record_path(relative);

        match read_entry(path) {
            Ok(Some(content)) => {
                Record::new(record_path.clone(), Directive::Default, Some(content))
                    .write_to(&mut document);
                encoded.text_files.push(record_path);
            }
            Ok(None) => {
                Record::new(record_path.clone(), Directive::Binary, None).write_to(&mut document);
                encoded.binary_files.push(record_path);
            }
            Err(err) => {
                warn!("Failed to read {:?}: {}", path, err);
                encoded.issues.push(EncodeIssue::Read {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    if options.preamble.is_some() {
        document.push_str(CLOSE_FENCE);
    }

    encoded.document = document;
    Ok(encoded)
}

/// Reads a file as text, or `None` when it should be marked binary.
fn read_entry(path: &Path) -> std::io::Result<Option<String>> {
    if !text::is_text(path)? {
        return Ok(None);
    }
    match String::from_utf8(fs::read(path)?) {
        Ok(content) => Ok(Some(content)),
        Err(_) => {
            debug!("{:?} has a text prefix but invalid UTF-8 later on", path);
            Ok(None)
        }
    }
}

fn build_rules(
    root: &Path,
    options: &EncodeOptions,
    issues: &mut Vec<EncodeIssue>,
) -> Result<IgnoreRules> {
    let custom_patterns = match &options.custom_rules {
        Some(path) => match RuleFile::load_patterns(path) {
            Ok(patterns) => {
                debug!("Loaded {} custom ignore patterns", patterns.len());
                patterns
            }
            Err(error) => {
                warn!("Falling back to no custom rules: {}", error);
                issues.push(EncodeIssue::RuleFile { error });
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let ignore_options = IgnoreOptions {
        custom_patterns,
        gitignore: options.use_ignore_rules,
        vcs_dirs: options.use_ignore_rules,
        own_format_files: options.suppress_own_format_files,
    };
    IgnoreRules::new(root, ignore_options).context("Failed to build ignore rules")
}

/// Canonical location of `output` if its directory exists.
fn real_output_path(output: &Path) -> Option<PathBuf> {
    let file_name = output.file_name()?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::decode::decode;
    use crate::format::preamble::INSTRUCTION_EN;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        temp
    }

    #[test]
    fn test_plain_document_layout() {
        let temp = tree(&[("b.txt", "bee\n"), ("a.txt", "ay"), ("src/lib.rs", "pub fn x() {}\n")]);
        let encoded = encode_to_string(temp.path(), &EncodeOptions::default()).unwrap();
        assert_eq!(
            encoded.document,
            "$$$ a.txt\nay$$$ b.txt\nbee\n$$$ src/lib.rs\npub fn x() {}\n"
        );
        assert_eq!(encoded.text_files, vec!["a.txt", "b.txt", "src/lib.rs"]);
        assert!(encoded.issues.is_empty());
    }

    #[test]
    fn test_binary_marked_without_content() {
        let temp = tree(&[("a.txt", "a\n")]);
        fs::write(temp.path().join("logo.png"), [0x89u8, 0x50, 0xff, 0xfe, 0x00]).unwrap();
        let encoded = encode_to_string(temp.path(), &EncodeOptions::default()).unwrap();
        assert_eq!(encoded.document, "$$$ a.txt\na\n$$$ logo.png [BINARY]\n");
        assert_eq!(encoded.binary_files, vec!["logo.png"]);
    }

    #[test]
    fn test_preamble_and_fence() {
        let temp = tree(&[("a.txt", "X")]);
        let options = EncodeOptions {
            preamble: Some(PreambleLanguage::English),
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(
            encoded.document,
            format!("{INSTRUCTION_EN}\n```fis\n$$$ a.txt\nX\n```")
        );
        let records = decode(&encoded.document);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content.as_deref(), Some("X"));
    }

    #[test]
    fn test_ignore_rules_prune_vcs_and_gitignore() {
        let temp = tree(&[
            (".git/HEAD", "ref: refs/heads/main\n"),
            (".gitignore", "node_modules/\n*.log\n"),
            ("node_modules/pkg/index.js", "module.exports = 1;\n"),
            ("debug.log", "noise\n"),
            ("src/main.rs", "fn main() {}\n"),
        ]);
        let options = EncodeOptions {
            use_ignore_rules: true,
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec![".gitignore", "src/main.rs"]);
    }

    #[test]
    fn test_custom_rules_file() {
        let temp = tree(&[
            ("fis.yaml", "ignore_regex:\n  - build/\n  - /?fis\\.yaml\n"),
            ("build/out.txt", "artifact\n"),
            ("src/build/keep.txt", "keep\n"),
        ]);
        let options = EncodeOptions {
            custom_rules: Some(temp.path().join("fis.yaml")),
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec!["src/build/keep.txt"]);
        assert!(encoded.issues.is_empty());
    }

    #[test]
    fn test_ignored_directory_is_not_descended() {
        // `build/$` only matches the directory itself, never `build/out.txt`,
        // so the file stays out only if the walk prunes the directory.
        let temp = tree(&[
            ("fis.yaml", "ignore_regex:\n  - build/$\n  - fis\\.yaml\n"),
            ("build/out.txt", "artifact\n"),
            ("build/nested/deep.txt", "deep\n"),
            ("src/main.rs", "fn main() {}\n"),
        ]);
        let options = EncodeOptions {
            custom_rules: Some(temp.path().join("fis.yaml")),
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec!["src/main.rs"]);
        assert!(!encoded.document.contains("artifact"));
    }

    #[cfg(unix)]
    #[test]
    fn test_pruned_directory_reports_no_traversal_issues() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tree(&[
            (".gitignore", "node_modules/\n"),
            ("node_modules/locked/index.js", "x"),
            ("src/main.rs", "fn main() {}\n"),
        ]);
        let locked = temp.path().join("node_modules/locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let options = EncodeOptions {
            use_ignore_rules: true,
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(encoded.text_files, vec![".gitignore", "src/main.rs"]);
        assert!(encoded.issues.is_empty(), "{:?}", encoded.issues);
    }

    #[test]
    fn test_malformed_rules_fall_back() {
        let temp = tree(&[("fis.yaml", "ignore_regex: [\"(bad\"]\n"), ("a.txt", "a")]);
        let options = EncodeOptions {
            custom_rules: Some(temp.path().join("fis.yaml")),
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec!["a.txt", "fis.yaml"]);
        assert!(matches!(
            encoded.issues.as_slice(),
            [EncodeIssue::RuleFile {
                error: FisError::InvalidPattern { .. }
            }]
        ));
    }

    #[test]
    fn test_missing_rules_fall_back() {
        let temp = tree(&[("a.txt", "a")]);
        let options = EncodeOptions {
            custom_rules: Some(temp.path().join("fis.yaml")),
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec!["a.txt"]);
        assert_eq!(encoded.issues.len(), 1);
    }

    #[test]
    fn test_suppress_own_format_files() {
        let temp = tree(&[("old.fis", "$$$ x\n"), ("a.txt", "a")]);
        let options = EncodeOptions {
            suppress_own_format_files: true,
            ..Default::default()
        };
        let encoded = encode_to_string(temp.path(), &options).unwrap();
        assert_eq!(encoded.text_files, vec!["a.txt"]);
    }

    #[test]
    fn test_encode_writes_output_and_skips_it() {
        let temp = tree(&[("a.txt", "a")]);
        let output = temp.path().join("snapshot.fis");

        let first = encode(temp.path(), &output, &EncodeOptions::default()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), first.document);

        let second = encode(temp.path(), &output, &EncodeOptions::default()).unwrap();
        assert_eq!(first.document, second.document);
        assert_eq!(second.text_files, vec!["a.txt"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let err = encode_to_string(&temp.path().join("nope"), &EncodeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Project path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tree(&[("locked/secret.txt", "s"), ("open.txt", "o")]);
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to observe in that case.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let encoded = encode_to_string(temp.path(), &EncodeOptions::default()).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(encoded.text_files, vec!["open.txt"]);
        assert!(encoded
            .issues
            .iter()
            .any(|issue| matches!(issue, EncodeIssue::Traversal { .. })));
    }
}
