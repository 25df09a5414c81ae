use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FisError;

/// Custom ignore rules loaded from `fis.yaml` at the project root.
///
/// ```yaml
/// ignore_regex:
///   - \.git/
///   - /?build/
/// ```
///
/// Each entry is a regular expression matched from the start of the
/// `/`-separated relative path (directories carry a trailing `/`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub ignore_regex: Vec<String>,
}

impl RuleFile {
    pub const FILE_NAME: &'static str = "fis.yaml";

    /// Location of the rule file for a project.
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(Self::FILE_NAME)
    }

    pub fn load(path: &Path) -> Result<Self, FisError> {
        let contents = fs::read_to_string(path).map_err(|source| FisError::RuleFileRead {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            debug!("Rule file {:?} is empty", path);
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| FisError::RuleFileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads and compiles in one step. Any invalid pattern rejects the whole
    /// file.
    pub fn load_patterns(path: &Path) -> Result<Vec<Regex>, FisError> {
        Self::load(path)?.compile()
    }

    /// Compiles every pattern anchored at the start of the path.
    pub fn compile(&self) -> Result<Vec<Regex>, FisError> {
        self.ignore_regex
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
                    FisError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Sane defaults: the rule file itself, VCS and editor directories, build
    /// outputs, lock files, bytecode caches and FIS documents.
    pub fn default_template() -> Self {
        let own_file = format!("/?{}", regex::escape(Self::FILE_NAME));
        let patterns = [
            own_file.as_str(),
            r"\.git/",
            r"\.svn/",
            r"\.hg/",
            r"\.idea/",
            r"\.vscode/",
            r"(.*/)?\.DS_Store$",
            r"(.*/)?__pycache__/",
            r".*\.py[co]$",
            r".*\.lock$",
            r"(.*/)?node_modules/",
            r"/?target/",
            r"/?build/",
            r"/?dist/",
            r"/?output/",
            r"/?temp/",
            r".*\.fis$",
        ];
        Self {
            ignore_regex: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Writes the default template to `path` and returns it.
    pub fn create_template(path: &Path) -> Result<Self, FisError> {
        let template = Self::default_template();
        template.save(path)?;
        info!("Created rule file template at {:?}", path);
        Ok(template)
    }

    pub fn save(&self, path: &Path) -> Result<(), FisError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FisError::io(parent, e))?;
        }
        let contents = serde_yaml::to_string(self).map_err(|source| FisError::RuleFileParse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(|e| FisError::io(path, e))
    }
}
