use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use fis_core::chat::session::with_default_extension;
use fis_core::format::encode::EncodeIssue;
use fis_core::{
    apply_document, materialize_document, ApplyReport, EncodeOptions, Encoded, GenerateSettings,
    PreambleLanguage, RuleFile,
};
use tracing::{info, warn};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a project document from a directory
    Generate(GenerateArgs),
    /// Create a project from a project document
    Create(CreateArgs),
    /// Apply a change document to an existing project
    Apply(ApplyArgs),
    /// Write a rule file template into a project
    InitRules(InitRulesArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Project root directory
    pub project_path: PathBuf,

    /// Output document path (defaults to `<project>/<name>_prj_desc.fis`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prepend the format instructions in this language
    #[arg(short = 'e', long, value_enum)]
    pub explanation: Option<Explanation>,

    /// Honor .gitignore and skip version control directories
    #[arg(short, long)]
    pub gitignore: bool,

    /// Skip existing .fis documents
    #[arg(long)]
    pub ignore_fis: bool,

    /// Apply the project's fis.yaml rules
    #[arg(short, long)]
    pub custom_rules: bool,

    /// Rule file to use instead of `<project>/fis.yaml`
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project document to materialize
    pub description_file: PathBuf,

    /// Directory to create the project in
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Project root directory
    pub project_path: PathBuf,

    /// Change document to apply
    pub changes_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct InitRulesArgs {
    /// Project root directory
    pub project_path: PathBuf,

    /// Overwrite an existing rule file
    #[arg(long)]
    pub force: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Explanation {
    Zh,
    En,
}

impl From<Explanation> for PreambleLanguage {
    fn from(value: Explanation) -> Self {
        match value {
            Explanation::Zh => PreambleLanguage::Chinese,
            Explanation::En => PreambleLanguage::English,
        }
    }
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate(&args).map(|_| ()),
        Command::Create(args) => create(&args).map(|_| ()),
        Command::Apply(args) => {
            let report = apply(&args)?;
            if !report.is_success() {
                bail!("{} record(s) failed", report.failures().count());
            }
            Ok(())
        }
        Command::InitRules(args) => init_rules(&args).map(|_| ()),
    }
}

impl GenerateArgs {
    fn settings(&self) -> GenerateSettings {
        let custom_rules = match (&self.rules, self.custom_rules) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(RuleFile::path_in(&self.project_path)),
            (None, false) => None,
        };
        let options = EncodeOptions {
            preamble: self.explanation.map(PreambleLanguage::from),
            use_ignore_rules: self.gitignore,
            suppress_own_format_files: self.ignore_fis,
            custom_rules,
        };

        let settings = GenerateSettings::new(&self.project_path).with_options(options);
        match &self.output {
            Some(output) => settings.with_fis_file(output),
            None => settings,
        }
    }
}

pub fn generate(args: &GenerateArgs) -> Result<Encoded> {
    let settings = args.settings();
    let encoded = settings.generate()?;

    for issue in &encoded.issues {
        println!("warning: {issue}");
    }
    if encoded
        .issues
        .iter()
        .any(|issue| matches!(issue, EncodeIssue::RuleFile { .. }))
    {
        println!(
            "hint: run `fis init-rules {}` to write a rule file template",
            args.project_path.display()
        );
    }

    println!(
        "Generated {} ({} text, {} binary)",
        settings.fis_file.display(),
        encoded.text_files.len(),
        encoded.binary_files.len()
    );
    Ok(encoded)
}

pub fn create(args: &CreateArgs) -> Result<ApplyReport> {
    let document = read_document(&args.description_file)?;
    let report = materialize_document(&args.output, &document)
        .with_context(|| format!("Failed to create project in {}", args.output.display()))?;
    print_report(&args.output, &report);
    Ok(report)
}

pub fn apply(args: &ApplyArgs) -> Result<ApplyReport> {
    let document = read_document(&args.changes_file)?;
    let report = apply_document(&args.project_path, &document).with_context(|| {
        format!("Failed to apply changes to {}", args.project_path.display())
    })?;
    print_report(&args.project_path, &report);
    Ok(report)
}

pub fn init_rules(args: &InitRulesArgs) -> Result<PathBuf> {
    let path = RuleFile::path_in(&args.project_path);
    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    RuleFile::create_template(&path)?;
    info!("Wrote rule file template {:?}", path);
    println!("Created {}", path.display());
    Ok(path)
}

fn read_document(path: &Path) -> Result<String> {
    let path = if path.exists() {
        path.to_path_buf()
    } else {
        with_default_extension(path.to_path_buf())
    };
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_report(root: &Path, report: &ApplyReport) {
    for record in &report.records {
        println!(
            "{} {}: {}",
            record.directive,
            root.join(&record.path).display(),
            record.outcome
        );
        if record.outcome.is_failure() {
            warn!("{}: {}", record.path, record.outcome);
        }
    }
    println!("{}", report.summary());
}
