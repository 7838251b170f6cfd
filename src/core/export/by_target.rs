//! By-target journal: one unit per observed object, accumulating every
//! session in which it was seen.
//!
//! Units are built in two passes over the same reports. The first pass
//! creates each unit on its first sighting (section header and list opener)
//! and appends one item per sighting. The second pass appends the list
//! closer exactly once per unit. Each pass tracks its own set of seen keys.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use indexmap::IndexSet;
use tracing::{debug, instrument};

use super::latex::{HeaderFooter, input_line, section};
use super::{ExportError, ExportSummary, Exporter, JournalPaths, write_document};
use crate::core::catalog::sort_identifiers;
use crate::core::report::{Report, TargetEntry};
use crate::core::stats::TargetStatistics;
use crate::infra::io::{append_unit, create_unit};

const LIST_OPEN: &str = "\\begin{itemize}\n";
const LIST_CLOSE: &str = "\\end{itemize}\n";
const STATISTICS_UNIT: &str = "BasicStatistics.tex";

/// Unit key for an entry. Solar bodies and Milky Way by name, asteroids
/// and comets by type, stars prefixed by constellation, everything else
/// suffixed by it.
pub fn target_key(entry: &TargetEntry) -> String {
    let target = normalize(&entry.target);
    if entry.is_solar_body() || entry.is_milky_way() {
        target
    } else if entry.is_minor_body() {
        normalize(&entry.kind)
    } else if entry.is_star() {
        format!("{}_{target}", entry.constellation)
    } else {
        format!("{target}_{}", entry.constellation)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' { '-' } else { c })
        .collect()
}

/// `\subsection` title for a unit, with the type always last.
pub fn section_title(entry: &TargetEntry) -> String {
    let name = if entry.is_solar_body() || entry.is_minor_body() || entry.is_milky_way() {
        entry.target.clone()
    } else if entry.is_star() {
        format!("{}, {}", entry.constellation, entry.target)
    } else {
        format!("{}, {}", entry.target, entry.constellation)
    };
    format!("{name}, {}", entry.kind)
}

/// One `\item` line describing a sighting.
fn item_line(report: &Report, entry: &TargetEntry) -> String {
    let h = &report.header;
    let mut line = format!("\\item {} {}, {}", h.date, h.time, h.location);
    let _ = write!(line, ". Seeing: {}, Transparency: {}", h.seeing, h.transparency);
    if !h.darkness.is_empty() {
        let _ = write!(line, ", Darkness: {}", h.darkness);
    }
    let _ = writeln!(line, ". {}, {}. {}", h.telescopes, entry.power, entry.notes);
    line
}

pub struct TargetExporter {
    paths: JournalPaths,
    /// Keys whose unit was created in the first pass, in encounter order.
    opened: IndexSet<String>,
    /// Keys whose unit was closed in the second pass.
    closed: HashSet<String>,
    stats: TargetStatistics,
}

impl TargetExporter {
    pub fn new(paths: JournalPaths) -> Self {
        Self {
            paths,
            opened: IndexSet::new(),
            closed: HashSet::new(),
            stats: TargetStatistics::default(),
        }
    }

    /// Unit keys produced so far, in first-sighting order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.opened.iter().map(String::as_str)
    }

    pub fn statistics(&self) -> &TargetStatistics {
        &self.stats
    }

    fn unit_path(&self, key: &str) -> PathBuf {
        self.paths.unit(&format!("{key}.tex"))
    }

    /// First pass: create units on first sighting and append one item per
    /// sighting.
    pub fn write_entries(&mut self, reports: &[Report]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        self.opened.clear();

        for report in reports {
            for entry in &report.entries {
                self.stats.record(entry);
                match self.write_entry(report, entry) {
                    Ok(()) => summary.entries += 1,
                    Err(e) => summary.fail(e),
                }
            }
        }

        summary.units = self.opened.len();
        summary
    }

    fn write_entry(&mut self, report: &Report, entry: &TargetEntry) -> Result<(), ExportError> {
        let key = target_key(entry);
        let path = self.unit_path(&key);
        let first = !self.opened.contains(&key);

        let result = (|| {
            let mut w = if first {
                let mut w = create_unit(&path)?;
                writeln!(w, "\\subsection{{{}}}", section_title(entry))?;
                w.write_all(LIST_OPEN.as_bytes())?;
                w
            } else {
                append_unit(&path)?
            };
            w.write_all(item_line(report, entry).as_bytes())?;
            w.flush()
        })();
        result.map_err(|e| ExportError::io(&path, e))?;

        if first {
            debug!(unit = %key, "created target unit");
            self.opened.insert(key);
        }
        Ok(())
    }

    /// Second pass: append the list closer once to every unit the first
    /// pass created.
    pub fn close_units(&mut self, reports: &[Report]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        self.closed.clear();

        for entry in reports.iter().flat_map(|r| &r.entries) {
            let key = target_key(entry);
            if !self.opened.contains(&key) || self.closed.contains(&key) {
                continue;
            }
            let path = self.unit_path(&key);
            let result = append_unit(&path).and_then(|mut w| {
                w.write_all(LIST_CLOSE.as_bytes())?;
                w.flush()
            });
            match result {
                Ok(()) => {
                    self.closed.insert(key);
                }
                Err(e) => summary.fail(ExportError::io(path, e)),
            }
        }

        summary
    }

    fn statistics_document(&self) -> String {
        let mut doc = String::from("\\section{Basic statistics}\n");
        doc.push_str("\\begin{tabular}{ l r }\n\\hline\n");
        doc.push_str("{\\bf Type} & {\\bf Count} \\\\\n\\hline\n");
        for (kind, count) in self.stats.rows() {
            let _ = writeln!(doc, "{kind} & {count} \\\\");
        }
        doc.push_str("\\hline\n\\end{tabular}\n");
        doc
    }
}

impl Exporter for TargetExporter {
    fn name(&self) -> &'static str {
        "by target"
    }

    fn planned_units(&self, reports: &[Report]) -> Vec<String> {
        let keys: IndexSet<String> = reports
            .iter()
            .flat_map(|r| &r.entries)
            .map(target_key)
            .collect();
        keys.into_iter().map(|k| format!("{k}.tex")).collect()
    }

    #[instrument(skip_all, fields(reports = reports.len()))]
    fn export_reports(&mut self, reports: &[Report]) -> ExportSummary {
        self.stats = TargetStatistics::default();
        if let Err(e) = self.paths.ensure_reports_dir() {
            let mut summary = ExportSummary::default();
            summary.fail(e);
            return summary;
        }

        let mut summary = self.write_entries(reports);
        summary.absorb(&self.close_units(reports));

        let stats_path = self.paths.unit(STATISTICS_UNIT);
        match write_document(&stats_path, &self.statistics_document()) {
            Ok(()) => summary.units += 1,
            Err(e) => summary.fail(e),
        }
        summary
    }

    fn generate_journal(&self) -> Result<PathBuf, ExportError> {
        let frame = HeaderFooter::load(&self.paths);
        let folder = &self.paths.reports_folder;

        let mut doc = frame.header;
        doc.push_str(&input_line(folder, STATISTICS_UNIT));

        let mut current = None;
        for (category, key) in sort_identifiers(self.keys()) {
            if current != Some(category) {
                doc.push_str(&section(category.title()));
                current = Some(category);
            }
            doc.push_str(&input_line(folder, &key));
            doc.push_str("\\vspace{4 mm}\n");
        }

        doc.push_str(&frame.footer);
        write_document(&self.paths.journal, &doc)?;
        Ok(self.paths.journal.clone())
    }
}
