//! Journal exporters.
//!
//! Every exporter writes one unit file per date, target or constellation
//! into its own folder, then assembles a master journal that includes the
//! units. A failing unit is logged and counted; the others are still written.

pub mod by_constellation;
pub mod by_date;
pub mod by_target;
pub mod latex;
pub mod text_by_date;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cli::{AppContext, ExportArgs, JournalKind};
use crate::core::import::import_folder;
use crate::core::report::Report;
use crate::infra::config::{self, Config, JournalConfig, TextJournalConfig};

pub use by_constellation::ConstellationExporter;
pub use by_date::DateExporter;
pub use by_target::TargetExporter;
pub use text_by_date::TextDateExporter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of one export pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Unit files written.
    pub units: usize,
    /// Entries (reports or targets) rendered into units.
    pub entries: usize,
    /// Units that could not be written.
    pub failures: usize,
}

impl ExportSummary {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }

    pub fn absorb(&mut self, other: &ExportSummary) {
        self.units += other.units;
        self.entries += other.entries;
        self.failures += other.failures;
    }

    /// Log and count a unit failure.
    pub(crate) fn fail(&mut self, err: ExportError) {
        error!("{err}");
        self.failures += 1;
    }
}

/// Resolved locations for one journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalPaths {
    pub files_root: PathBuf,
    /// Unit folder name, relative to `files_root`; also used in `\input`.
    pub reports_folder: String,
    pub journal: PathBuf,
    pub header: PathBuf,
    pub footer: PathBuf,
}

impl JournalPaths {
    pub fn latex(cfg: &Config, journal: &JournalConfig) -> Result<Self> {
        let root = cfg.files_root()?;
        let templates = cfg.header_footer_dir()?;
        Ok(Self {
            reports_folder: journal.reports_folder.clone(),
            journal: root.join(&journal.journal_filename),
            header: templates.join(&journal.header_filename),
            footer: templates.join(&journal.footer_filename),
            files_root: root,
        })
    }

    /// Plain-text journals have no header or footer templates.
    pub fn text(cfg: &Config, journal: &TextJournalConfig) -> Result<Self> {
        let root = cfg.files_root()?;
        Ok(Self {
            reports_folder: journal.reports_folder.clone(),
            journal: root.join(&journal.journal_filename),
            header: PathBuf::new(),
            footer: PathBuf::new(),
            files_root: root,
        })
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.files_root.join(&self.reports_folder)
    }

    pub fn unit(&self, file_name: &str) -> PathBuf {
        self.reports_dir().join(file_name)
    }

    /// Create the unit folder if needed.
    pub fn ensure_reports_dir(&self) -> Result<(), ExportError> {
        let dir = self.reports_dir();
        fs::create_dir_all(&dir).map_err(|e| ExportError::io(dir, e))
    }
}

/// A journal writer. Implementations own their per-run state, so a fresh
/// instance is needed for every run.
pub trait Exporter {
    fn name(&self) -> &'static str;

    /// Unit file names `export_reports` would write for `reports`.
    fn planned_units(&self, reports: &[Report]) -> Vec<String>;

    /// Write one unit per date/target/constellation.
    fn export_reports(&mut self, reports: &[Report]) -> ExportSummary;

    /// Write the master journal over the units produced so far.
    fn generate_journal(&self) -> Result<PathBuf, ExportError>;
}

/// Exporters for the selected journal kinds (all when `only` is empty).
pub fn build_exporters(cfg: &Config, only: &[JournalKind]) -> Result<Vec<Box<dyn Exporter>>> {
    let kinds: &[JournalKind] = if only.is_empty() { &JournalKind::ALL } else { only };

    let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();
    for kind in JournalKind::ALL {
        if !kinds.contains(&kind) {
            continue;
        }
        let exporter: Box<dyn Exporter> = match kind {
            JournalKind::Date => Box::new(DateExporter::new(JournalPaths::latex(cfg, &cfg.by_date)?)),
            JournalKind::Target => {
                Box::new(TargetExporter::new(JournalPaths::latex(cfg, &cfg.by_target)?))
            }
            JournalKind::Constellation => Box::new(ConstellationExporter::new(
                JournalPaths::latex(cfg, &cfg.by_constellation)?,
            )),
            JournalKind::Text => {
                Box::new(TextDateExporter::new(JournalPaths::text(cfg, &cfg.text_by_date)?))
            }
        };
        exporters.push(exporter);
    }
    Ok(exporters)
}

/// File stem for a report date: `dd/mm/yyyy[x]` becomes `yyyymmdd[x]`.
/// Dates in any other shape keep only their alphanumeric characters.
pub fn date_unit_name(date: &str) -> String {
    match NaiveDate::parse_and_remainder(date, "%d/%m/%Y") {
        Ok((day, rest)) => {
            let suffix: String = rest.chars().filter(|c| c.is_alphanumeric()).collect();
            format!("{}{suffix}", day.format("%Y%m%d"))
        }
        Err(e) => {
            let name: String = date.chars().filter(|c| c.is_alphanumeric()).collect();
            warn!("date '{date}' is not dd/mm/yyyy ({e}); using unit name '{name}'");
            name
        }
    }
}

/// Write a whole file, mapping failures to the unit path.
pub(crate) fn write_document(path: &Path, text: &str) -> Result<(), ExportError> {
    crate::infra::io::write_atomic(path, text.as_bytes()).map_err(|e| ExportError::io(path, e))
}

pub fn run(args: ExportArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::resolve(&args.source)?;
    let raw = cfg.raw_reports_dir()?;
    let collection = import_folder(&raw, args.source.recursive)?;
    let reports = collection.reports;

    let mut exporters = build_exporters(&cfg, &args.only)?;

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: Would write:".yellow());
            for exporter in &exporters {
                let units = exporter.planned_units(&reports);
                println!("  {}: {} units", exporter.name(), units.len());
                for unit in units {
                    println!("    {unit}");
                }
            }
        }
        return Ok(());
    }

    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(exporters.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let mut total = ExportSummary::default();
    let mut journals = Vec::new();
    for exporter in exporters.iter_mut() {
        progress.set_message(format!("Exporting {}", exporter.name()));

        let summary = exporter.export_reports(&reports);
        info!(
            exporter = exporter.name(),
            units = summary.units,
            failures = summary.failures,
            "units written"
        );
        total.absorb(&summary);

        match exporter.generate_journal() {
            Ok(path) => journals.push(path),
            Err(e) => {
                error!("{e}");
                total.failures += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("Export complete");

    if !ctx.quiet {
        for path in &journals {
            if ctx.no_color {
                println!("Wrote {}", path.display());
            } else {
                println!("{} Wrote {}", "✓".green(), path.display());
            }
        }
        println!(
            "{} reports, {} units, {} failures",
            reports.len(),
            total.units,
            total.failures
        );
    }

    if !total.is_success() {
        anyhow::bail!("{} unit(s) could not be written", total.failures);
    }
    Ok(())
}
