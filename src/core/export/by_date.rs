//! By-date journal: one LaTeX unit per session, newest first.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;

use tracing::instrument;

use super::latex::{HeaderFooter, input_line};
use super::{ExportError, ExportSummary, Exporter, JournalPaths, date_unit_name, write_document};
use crate::core::report::{HeaderField, Report, TargetColumn};

/// Fields in the session table; the rest go in the equipment table.
const SESSION_FIELDS: [HeaderField; 8] = [
    HeaderField::Date,
    HeaderField::Time,
    HeaderField::Location,
    HeaderField::Altitude,
    HeaderField::Temperature,
    HeaderField::Seeing,
    HeaderField::Transparency,
    HeaderField::Darkness,
];

const EQUIPMENT_FIELDS: [HeaderField; 3] = [
    HeaderField::Telescopes,
    HeaderField::Eyepieces,
    HeaderField::Filters,
];

pub struct DateExporter {
    paths: JournalPaths,
    units: BTreeSet<String>,
}

impl DateExporter {
    pub fn new(paths: JournalPaths) -> Self {
        Self {
            paths,
            units: BTreeSet::new(),
        }
    }

    fn unit_name(report: &Report) -> String {
        format!("{}.tex", date_unit_name(report.date()))
    }
}

fn header_table(out: &mut String, report: &Report, fields: &[HeaderField]) {
    let rows: Vec<_> = fields
        .iter()
        .map(|f| (f.label(), report.header.get(*f)))
        .filter(|(_, v)| !v.is_empty())
        .collect();
    if rows.is_empty() {
        return;
    }
    out.push_str("\\begin{tabular}{ p{1.2in} p{7.5in} }\n");
    for (label, value) in rows {
        let _ = writeln!(out, "{{\\bf {label}:}} & {value} \\\\");
    }
    out.push_str("\\end{tabular}\n");
}

/// LaTeX body for one session.
pub fn render_unit(report: &Report) -> String {
    let mut out = String::from("% General observation data\n");
    header_table(&mut out, report, &SESSION_FIELDS);
    header_table(&mut out, report, &EQUIPMENT_FIELDS);

    out.push_str("% Detailed observation data\n");
    out.push_str("\\begin{longtable}{ p{0.7in}  p{0.3in}  p{0.6in}  p{0.9in}  p{5.8in} }\n");
    out.push_str("\\hline \n");
    let heading: Vec<String> = TargetColumn::ALL
        .iter()
        .map(|c| format!("{{\\bf {}}}", c.label()))
        .collect();
    let _ = writeln!(out, "{} \\\\ ", heading.join(" & "));
    out.push_str("\\hline \n");
    for e in &report.entries {
        let _ = writeln!(
            out,
            "{} & {} & {} & {} & {} \\\\ ",
            e.target, e.constellation, e.kind, e.power, e.notes
        );
    }
    out.push_str("\\hline \n");
    out.push_str("\\end{longtable} \n");
    out
}

impl Exporter for DateExporter {
    fn name(&self) -> &'static str {
        "by date"
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
            match write_document(&self.paths.unit(&name), &render_unit(report)) {
                Ok(()) => {
                    summary.entries += 1;
                    self.units.insert(name);
                }
                Err(e) => summary.fail(e),
            }
        }

        summary.units = self.units.len();
        summary
    }

    fn generate_journal(&self) -> Result<PathBuf, ExportError> {
        let frame = HeaderFooter::load(&self.paths);
        let folder = &self.paths.reports_folder;

        let mut doc = frame.header;
        doc.push_str("\\section{Observation reports}\n");

        let mut year = None;
        for name in self.units.iter().rev() {
            let prefix = name.get(..4).unwrap_or(name);
            if year != Some(prefix) {
                let _ = writeln!(doc, "\\subsection{{{prefix}}}");
                year = Some(prefix);
            }
            doc.push_str(&input_line(folder, name));
            doc.push_str("\\clearpage \n");
        }

        doc.push_str(&frame.footer);
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
    fn unit_skips_empty_header_fields() {
        let r = report("01/01/2016", vec![entry("M42", "Ori", "Neb")]);
        let body = render_unit(&r);
        assert!(body.contains("{\\bf Location:} & Cambridge \\\\\n"));
        assert!(body.contains("{\\bf Telescopes:} & Tal100RS \\\\\n"));
        assert!(!body.contains("Altitude"));
        assert!(!body.contains("Eyepieces"));
        assert!(body.contains("M42 & Ori & Neb & 50x & seen \\\\ \n"));
    }

    #[test]
    fn journal_lists_newest_first_with_year_headings() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let reports = vec![
            report("20/12/2015", vec![]),
            report("05/01/2016", vec![]),
            report("05/01/2016a", vec![]),
        ];

        let mut exporter = DateExporter::new(paths(tmp.path(), "dates"));
        let summary = exporter.export_reports(&reports);
        assert_eq!(summary.units, 3);
        assert!(tmp.path().join("dates/20160105a.tex").is_file());

        let journal = fs::read_to_string(exporter.generate_journal()?)?;
        let order: Vec<usize> = [
            "\\subsection{2016}",
            "dates/20160105a}",
            "dates/20160105}",
            "\\subsection{2015}",
            "dates/20151220}",
        ]
        .iter()
        .map(|needle| journal.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        Ok(())
    }
}
