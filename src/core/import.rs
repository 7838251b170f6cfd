//! Report collection: every raw report file in a folder, parsed in file-name
//! order and concatenated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use serde::Serialize;
use tabled::{Table, Tabled};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::cli::{AppContext, ImportArgs};
use crate::core::parser::{ParseWarning, parse_reports};
use crate::core::report::Report;
use crate::infra::config;
use crate::infra::io::read_file_smart;
use crate::infra::walk::{ReportWalker, sort_by_file_name};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("raw report folder {} does not exist", .0.display())]
    MissingFolder(PathBuf),

    #[error("cannot read {}: {reason:#}", path.display())]
    Unreadable { path: PathBuf, reason: anyhow::Error },
}

/// A parse warning tagged with the file it came from.
#[derive(Debug, Clone, Serialize)]
pub struct FileWarning {
    pub file: PathBuf,
    #[serde(flatten)]
    pub warning: ParseWarning,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub files: usize,
    pub reports: usize,
    pub targets: usize,
    pub warnings: usize,
    pub failed_files: usize,
}

/// Reports in import order plus everything noticed on the way.
#[derive(Debug, Default)]
pub struct ReportCollection {
    pub reports: Vec<Report>,
    pub warnings: Vec<FileWarning>,
    pub errors: Vec<ImportError>,
    pub summary: ImportSummary,
}

/// Import every raw report in `folder`, and in its sub-folders when
/// `recursive` is set. A missing folder is logged and yields an empty
/// collection.
#[instrument(skip_all, fields(folder = %folder.display(), recursive))]
pub fn import_folder(folder: &Path, recursive: bool) -> Result<ReportCollection> {
    if !folder.is_dir() {
        let err = ImportError::MissingFolder(folder.to_path_buf());
        error!("{err}");
        return Ok(ReportCollection {
            errors: vec![err],
            ..Default::default()
        });
    }

    let files = ReportWalker::new()?.with_recursive(recursive).walk_files(folder);
    info!(files = files.len(), "importing raw reports");
    Ok(import_files(files))
}

/// Import an explicit list of files, in file-name order.
pub fn import_files(mut files: Vec<PathBuf>) -> ReportCollection {
    sort_by_file_name(&mut files);

    // Parsed in parallel, collected in file order
    let parsed: Vec<(PathBuf, Result<(Vec<Report>, Vec<ParseWarning>)>)> = files
        .into_par_iter()
        .map(|path| {
            let result = import_file(&path);
            (path, result)
        })
        .collect();

    let mut collection = ReportCollection::default();
    for (path, result) in parsed {
        collection.summary.files += 1;
        match result {
            Ok((reports, warnings)) => {
                collection
                    .warnings
                    .extend(warnings.into_iter().map(|warning| FileWarning {
                        file: path.clone(),
                        warning,
                    }));
                collection.reports.extend(reports);
            }
            Err(reason) => {
                let err = ImportError::Unreadable { path, reason };
                error!("{err}");
                collection.summary.failed_files += 1;
                collection.errors.push(err);
            }
        }
    }

    collection.summary.reports = collection.reports.len();
    collection.summary.targets = collection.reports.iter().map(|r| r.entries.len()).sum();
    collection.summary.warnings = collection.warnings.len();
    collection
}

/// Parse one file.
pub fn import_file(path: &Path) -> Result<(Vec<Report>, Vec<ParseWarning>)> {
    let content = read_file_smart(path)?;
    let text = content
        .as_str()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(parse_reports(text))
}

#[derive(Tabled)]
struct ReportRow {
    date: String,
    time: String,
    location: String,
    targets: usize,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    summary: &'a ImportSummary,
    reports: &'a [Report],
    warnings: &'a [FileWarning],
}

pub fn run(args: ImportArgs, ctx: &AppContext) -> Result<()> {
    let collection = if args.files.is_empty() {
        let cfg = config::resolve(&args.source)?;
        import_folder(&cfg.raw_reports_dir()?, args.source.recursive)?
    } else {
        import_files(args.files)
    };

    if args.json {
        let output = ImportOutput {
            summary: &collection.summary,
            reports: &collection.reports,
            warnings: &collection.warnings,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize import result")?
        );
        return Ok(());
    }

    if ctx.quiet {
        return Ok(());
    }

    let rows: Vec<ReportRow> = collection
        .reports
        .iter()
        .map(|r| ReportRow {
            date: r.header.date.clone(),
            time: r.header.time.clone(),
            location: r.header.location.clone(),
            targets: r.entries.len(),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    for w in &collection.warnings {
        let line = format!("{}: {}", w.file.display(), w.warning);
        if ctx.no_color {
            eprintln!("warning: {line}");
        } else {
            eprintln!("{} {line}", "warning:".yellow());
        }
    }

    let s = &collection.summary;
    let status = format!(
        "{} reports, {} targets from {} files ({} warnings, {} unreadable)",
        s.reports, s.targets, s.files, s.warnings, s.failed_files
    );
    if ctx.no_color {
        println!("{status}");
    } else {
        println!("{} {status}", "✓".green());
    }

    Ok(())
}
