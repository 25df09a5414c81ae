use std::path::{Component, Path};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::FisError;
use crate::format::FILE_EXTENSION;

/// Version control metadata directories that are never encoded when ignore
/// rules are on.
const VCS_DIRS: [&str; 3] = [".git", ".svn", ".hg"];

/// Which exclusion rules are active. Every rule is independent; a path is
/// excluded when any enabled rule fires.
#[derive(Debug, Clone, Default)]
pub struct IgnoreOptions {
    /// Anchored regexes from the project's rule file.
    pub custom_patterns: Vec<Regex>,
    /// Honor `<root>/.gitignore`.
    pub gitignore: bool,
    /// Exclude anything inside `.git`, `.svn` or `.hg`.
    pub vcs_dirs: bool,
    /// Exclude files ending in `.fis`.
    pub own_format_files: bool,
}

#[derive(Clone)]
pub struct IgnoreRules {
    options: IgnoreOptions,
    gitignore: Option<Gitignore>,
}

impl IgnoreRules {
    pub fn new(root: &Path, options: IgnoreOptions) -> Result<Self, FisError> {
        let gitignore = if options.gitignore {
            let mut builder = GitignoreBuilder::new(root);
            let gitignore_path = root.join(".gitignore");
            if gitignore_path.is_file() {
                debug!("Loading ignore file {:?}", gitignore_path);
                // Bad lines are reported but the remaining globs still apply.
                if let Some(err) = builder.add(&gitignore_path) {
                    warn!("Partially invalid ignore file {:?}: {}", gitignore_path, err);
                }
            }
            Some(builder.build()?)
        } else {
            None
        };

        Ok(Self { options, gitignore })
    }

    /// Rules that exclude nothing.
    pub fn none() -> Self {
        Self {
            options: IgnoreOptions::default(),
            gitignore: None,
        }
    }

    /// Whether `relative_path` (relative to the project root) is excluded.
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() {
            return false;
        }

        if self.options.vcs_dirs && in_vcs_dir(relative_path, is_dir) {
            return true;
        }

        if self.options.own_format_files
            && !is_dir
            && relative_path
                .extension()
                .is_some_and(|ext| ext == FILE_EXTENSION)
        {
            return true;
        }

        if let Some(gitignore) = &self.gitignore {
            if gitignore
                .matched_path_or_any_parents(relative_path, is_dir)
                .is_ignore()
            {
                return true;
            }
        }

        if !self.options.custom_patterns.is_empty() {
            let subject = match_subject(relative_path, is_dir);
            if self
                .options
                .custom_patterns
                .iter()
                .any(|re| re.is_match(&subject))
            {
                return true;
            }
        }

        false
    }
}

fn in_vcs_dir(relative_path: &Path, is_dir: bool) -> bool {
    let mut components = relative_path.components().peekable();
    while let Some(component) = components.next() {
        let Component::Normal(name) = component else {
            continue;
        };
        // A plain file named `.git` (worktrees, submodules) is metadata too.
        let is_last = components.peek().is_none();
        let is_vcs = VCS_DIRS.iter().any(|vcs| name == *vcs);
        if is_vcs && (!is_last || is_dir || name == ".git") {
            return true;
        }
    }
    false
}

/// String the custom regexes run against: `/`-separated, with a trailing `/`
/// for directories so `build/` style patterns prune the directory itself.
fn match_subject(relative_path: &Path, is_dir: bool) -> String {
    let mut subject = crate::file::resolver::record_path(relative_path);
    if is_dir {
        subject.push('/');
    }
    subject
}
