//! Plain-text journal by date, in a layout that pastes cleanly into forum
//! posts.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use tracing::instrument;

use super::{ExportError, ExportSummary, Exporter, JournalPaths, date_unit_name, write_document};
use crate::core::report::{HeaderField, Report};

const JOURNAL_SEPARATOR: &str = "\n\n\n\n";

pub struct TextDateExporter {
    paths: JournalPaths,
    /// Unit file name to rendered text, for units written this run.
    units: BTreeMap<String, String>,
}

impl TextDateExporter {
    pub fn new(paths: JournalPaths) -> Self {
        Self {
            paths,
            units: BTreeMap::new(),
        }
    }

    fn unit_name(report: &Report) -> String {
        format!("obs{}.txt", date_unit_name(report.date()))
    }
}

/// Text body for one session. Darkness is only listed when measured.
pub fn render_unit(report: &Report) -> String {
    let mut out = String::new();
    for field in HeaderField::ALL {
        let value = report.header.get(field);
        if field == HeaderField::Darkness && value.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} {value}", field.label());
    }
    out.push('\n');
    for e in &report.entries {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            e.target,
            e.constellation,
            e.kind,
            e.power,
            e.notes.replace("\\%", "%")
        );
    }
    out
}

impl Exporter for TextDateExporter {
    fn name(&self) -> &'static str {
        "text by date"
    }

    fn planned_units(&self, reports: &[Report]) -> Vec<String> {
        reports.iter().map(Self::unit_name).collect()
    }

    #[instrument(skip_all, fields(reports = reports.len()))]
    fn export_reports(&mut self, reports: &[Report]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        self.units.clear();
        if let Err(e) = self.paths.ensure_reports_dir() {
            summary.fail(e);
            return summary;
        }

        for report in reports {
            let name = Self::unit_name(report);
            let text = render_unit(report);
            match write_document(&self.paths.unit(&name), &text) {
                Ok(()) => {
                    summary.entries += 1;
                    self.units.insert(name, text);
                }
                Err(e) => summary.fail(e),
            }
        }

        summary.units = self.units.len();
        summary
    }

    fn generate_journal(&self) -> Result<PathBuf, ExportError> {
        let mut doc = String::new();
        for text in self.units.values().rev() {
            doc.push_str(text);
            doc.push_str(JOURNAL_SEPARATOR);
        }
        write_document(&self.paths.journal, &doc)?;
        Ok(self.paths.journal.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::core::export::test_support::{entry, paths, report};

    #[test]
    fn unit_unescapes_percent_and_skips_missing_darkness() {
        let mut e = entry("M42", "Ori", "Neb");
        e.notes = "50\\% cloud".into();
        let r = report("01/01/2016", vec![e]);

        let text = render_unit(&r);
        assert!(text.starts_with("Date 01/01/2016\nTime 21:00\nLocation Cambridge\nAltitude \n"));
        assert!(!text.contains("Darkness"));
        assert!(text.contains("Filters \n\nM42 Ori Neb 50x 50% cloud\n"));
    }

    #[test]
    fn journal_concatenates_newest_first() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let reports = vec![report("01/01/2016", vec![]), report("02/01/2016", vec![])];

        let mut exporter = TextDateExporter::new(paths(tmp.path(), "txt"));
        exporter.export_reports(&reports);
        assert!(tmp.path().join("txt/obs20160101.txt").is_file());

        let journal = fs::read_to_string(exporter.generate_journal()?)?;
        let newer = journal.find("Date 02/01/2016").expect("newer");
        let older = journal.find("Date 01/01/2016").expect("older");
        assert!(newer < older);
        assert_eq!(journal.matches(JOURNAL_SEPARATOR).count(), 2);
        Ok(())
    }
}
