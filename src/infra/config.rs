use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs, SourceArgs};

/// Config files looked up in the working directory, first match wins.
pub const CONFIG_FILES: [&str; 4] = [
    "skyjournal.toml",
    "skyjournal.yaml",
    "skyjournal.json",
    ".skyjournal.toml",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Root folder for raw reports and every generated document (~ and $VAR expanded)
    pub files_location: String,

    /// Folder with the raw .tsv/.csv reports, relative to files_location
    pub raw_reports_folder: String,

    /// Folder with LaTeX header/footer templates, relative to files_location
    pub latex_header_footer_folder: String,

    /// LaTeX journal ordered by observation date
    pub by_date: JournalConfig,

    /// LaTeX journal grouped by target
    pub by_target: JournalConfig,

    /// LaTeX journal grouped by constellation
    pub by_constellation: JournalConfig,

    /// Plain-text journal ordered by date
    pub text_by_date: TextJournalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig
{
    pub reports_folder: String,
    pub journal_filename: String,
    pub header_filename: String,
    pub footer_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextJournalConfig
{
    pub reports_folder: String,
    pub journal_filename: String,
}

impl JournalConfig
{
    fn named(suffix: &str) -> Self
    {
        Self {
            reports_folder: format!("latex_reports_by_{suffix}"),
            journal_filename: format!("astrojournal_by_{suffix}.tex"),
            header_filename: format!("header_by_{suffix}.tex"),
            footer_filename: format!("footer_by_{suffix}.tex"),
        }
    }
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            files_location: "skyjournal_files".to_string(),
            raw_reports_folder: "raw_reports".to_string(),
            latex_header_footer_folder: "latex_header_footer".to_string(),
            by_date: JournalConfig::named("date"),
            by_target: JournalConfig::named("target"),
            by_constellation: JournalConfig::named("constellation"),
            text_by_date: TextJournalConfig {
                reports_folder: "txt_reports_by_date".to_string(),
                journal_filename: "astrojournal_by_date.txt".to_string(),
            },
        }
    }
}

impl Config
{
    /// `files_location` with `~` and environment variables expanded.
    pub fn files_root(&self) -> Result<PathBuf>
    {
        let expanded = shellexpand::full(&self.files_location)
            .with_context(|| format!("Failed to expand files_location '{}'", self.files_location))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Folder holding the raw reports.
    pub fn raw_reports_dir(&self) -> Result<PathBuf>
    {
        Ok(self
            .files_root()?
            .join(&self.raw_reports_folder))
    }

    /// Folder holding the LaTeX header/footer templates.
    pub fn header_footer_dir(&self) -> Result<PathBuf>
    {
        Ok(self
            .files_root()?
            .join(&self.latex_header_footer_folder))
    }
}

/// Load the first config file found in the working directory (or `explicit`),
/// layered under `SKYJOURNAL__*` environment variables. Missing keys keep
/// their defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config>
{
    let mut builder = config::Config::builder();

    match explicit
    {
        Some(path) =>
        {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None =>
        {
            if let Some(path) = CONFIG_FILES
                .iter()
                .find(|p| Path::new(p).exists())
            {
                builder = builder.add_source(config::File::with_name(path));
            }
        }
    }

    // Double underscore keeps single underscores inside key names
    builder = builder.add_source(
        config::Environment::with_prefix("SKYJOURNAL")
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

/// Config for a command: file/env layers, then command-line overrides.
pub fn resolve(source: &SourceArgs) -> Result<Config>
{
    let mut cfg = load_config(source.config.as_deref())?;

    if let Some(location) = &source.files_location
    {
        cfg.files_location = location.clone();
    }

    Ok(cfg)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("Would write {}:\n{}", config_path.display(), toml_string);
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
