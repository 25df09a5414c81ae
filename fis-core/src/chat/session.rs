use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::{question_prompt, ChatProvider};
use crate::file::apply::{apply_document, ApplyReport};
use crate::format::encode::{encode, EncodeOptions, Encoded};
use crate::format::preamble::PreambleLanguage;
use crate::format::FILE_EXTENSION;

/// Where a project document comes from and goes to. Front ends keep one of
/// these between commands instead of remembering "last used" paths globally.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub project_path: PathBuf,
    pub fis_file: PathBuf,
    pub options: EncodeOptions,
}

impl GenerateSettings {
    /// Settings with the default document location and no options.
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        let project_path = project_path.into();
        let fis_file = default_fis_file(&project_path);
        Self {
            project_path,
            fis_file,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_fis_file(mut self, fis_file: impl Into<PathBuf>) -> Self {
        self.fis_file = with_default_extension(fis_file.into());
        self
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate(&self) -> Result<Encoded> {
        encode(&self.project_path, &self.fis_file, &self.options)
    }
}

/// Name of the project directory, or `local` when it has none (e.g. `/`).
pub fn project_name(project_path: &Path) -> String {
    let resolved = project_path
        .canonicalize()
        .unwrap_or_else(|_| project_path.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

/// `<project>/<name>_prj_desc.fis`
pub fn default_fis_file(project_path: &Path) -> PathBuf {
    project_path.join(format!(
        "{}_prj_desc.{FILE_EXTENSION}",
        project_name(project_path)
    ))
}

/// Appends `.fis` to a file name that has no extension at all.
pub fn with_default_extension(path: PathBuf) -> PathBuf {
    let has_dot = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains('.'));
    if has_dot {
        path
    } else {
        path.with_extension(FILE_EXTENSION)
    }
}

/// A conversation about one project: the generated document, the last
/// question and the last (possibly partial) reply.
pub struct ProjectSession {
    settings: GenerateSettings,
    document: String,
    last_question: Option<String>,
    last_response: String,
}

impl ProjectSession {
    /// Generates the project document and starts a session around it.
    pub fn start(settings: GenerateSettings) -> Result<(Self, Encoded)> {
        let encoded = settings
            .generate()
            .context("Failed to generate project document")?;
        let session = Self {
            settings,
            document: encoded.document.clone(),
            last_question: None,
            last_response: String::new(),
        };
        Ok((session, encoded))
    }

    pub fn settings(&self) -> &GenerateSettings {
        &self.settings
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// Re-encodes the project, e.g. after applying a reply.
    pub fn regenerate(&mut self) -> Result<Encoded> {
        let encoded = self
            .settings
            .generate()
            .context("Failed to regenerate project document")?;
        self.document = encoded.document.clone();
        info!("Regenerated {:?}", self.settings.fis_file);
        Ok(encoded)
    }

    /// Asks `question` about the project, streaming chunks to `on_chunk` as
    /// they arrive. A failure mid-stream keeps the partial reply.
    pub fn ask<P, F>(&mut self, provider: &mut P, question: &str, mut on_chunk: F) -> Result<&str>
    where
        P: ChatProvider + ?Sized,
        F: FnMut(&str),
    {
        let language = self
            .settings
            .options
            .preamble
            .unwrap_or(PreambleLanguage::English);
        let prompt = question_prompt(&self.document, question, language);

        self.last_question = Some(question.to_string());
        self.last_response.clear();

        let provider_name = provider.name().to_string();
        let stream = provider
            .ask(&prompt)
            .with_context(|| format!("{provider_name} rejected the request"))?;
        for chunk in stream {
            match chunk {
                Ok(chunk) => {
                    on_chunk(&chunk);
                    self.last_response.push_str(&chunk);
                }
                Err(err) => {
                    warn!("Generation interrupted: {err:?}");
                    return Err(err.context("Generation failed"));
                }
            }
        }

        Ok(&self.last_response)
    }

    /// Asks the previous question again.
    pub fn retry<P, F>(&mut self, provider: &mut P, on_chunk: F) -> Result<&str>
    where
        P: ChatProvider + ?Sized,
        F: FnMut(&str),
    {
        let Some(question) = self.last_question.clone() else {
            bail!("No previous question to retry");
        };
        self.ask(provider, &question, on_chunk)
    }

    /// Applies the last reply to the project as a change document.
    pub fn apply_last_response(&self) -> Result<ApplyReport> {
        if self.last_response.trim().is_empty() {
            bail!("No response to apply");
        }
        apply_document(&self.settings.project_path, &self.last_response)
            .context("Failed to apply response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_default_extension() {
        assert_eq!(
            with_default_extension(PathBuf::from("out/snapshot")),
            PathBuf::from("out/snapshot.fis")
        );
        assert_eq!(
            with_default_extension(PathBuf::from("snapshot.txt")),
            PathBuf::from("snapshot.txt")
        );
    }

    #[test]
    fn test_default_fis_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let project = temp.path().join("demo");
        std::fs::create_dir(&project).unwrap();
        assert_eq!(default_fis_file(&project), project.join("demo_prj_desc.fis"));
    }

    #[test]
    fn test_project_name_of_root() {
        assert_eq!(project_name(Path::new("/")), "local");
    }
}
