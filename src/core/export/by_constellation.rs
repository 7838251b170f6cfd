//! By-constellation journal: the list of targets seen in each constellation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexSet;
use itertools::Itertools;
use tracing::{debug, instrument};

use super::latex::{HeaderFooter, input_line};
use super::{ExportError, ExportSummary, Exporter, JournalPaths, write_document};
use crate::core::report::{Report, TargetEntry};

/// Numeric when both labels are all digits, lexical otherwise.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        // Leading zeros aside, a longer digit string is the larger number.
        let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

fn label(entry: &TargetEntry) -> String {
    format!("{} ({})", entry.target, entry.kind)
}

fn unit_name(constellation: &str) -> String {
    let cons: String = constellation.chars().filter(|c| !c.is_whitespace()).collect();
    format!("const_{cons}.tex")
}

/// Labels grouped by constellation, deduplicated and sorted.
pub fn group_by_constellation(reports: &[Report]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, IndexSet<String>> = BTreeMap::new();
    for entry in reports.iter().flat_map(|r| &r.entries) {
        if entry.is_solar_body() || entry.is_milky_way() {
            continue;
        }
        if entry.constellation.is_empty() {
            debug!(name = %entry.target, "no constellation, skipped");
            continue;
        }
        groups
            .entry(entry.constellation.clone())
            .or_default()
            .insert(label(entry));
    }

    groups
        .into_iter()
        .map(|(cons, labels)| {
            let mut labels: Vec<String> = labels.into_iter().collect();
            labels.sort_by(|a, b| compare_labels(a, b));
            (cons, labels)
        })
        .collect()
}

pub struct ConstellationExporter {
    paths: JournalPaths,
    /// Constellation name to unit file name, for units written this run.
    units: BTreeMap<String, String>,
}

impl ConstellationExporter {
    pub fn new(paths: JournalPaths) -> Self {
        Self {
            paths,
            units: BTreeMap::new(),
        }
    }
}

impl Exporter for ConstellationExporter {
    fn name(&self) -> &'static str {
        "by constellation"
    }

    fn planned_units(&self, reports: &[Report]) -> Vec<String> {
        group_by_constellation(reports)
            .keys()
            .map(|c| unit_name(c))
            .collect()
    }

    #[instrument(skip_all, fields(reports = reports.len()))]
    fn export_reports(&mut self, reports: &[Report]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        self.units.clear();
        if let Err(e) = self.paths.ensure_reports_dir() {
            summary.fail(e);
            return summary;
        }

        for (cons, labels) in group_by_constellation(reports) {
            let name = unit_name(&cons);
            let body = format!("{}\n\n", labels.iter().join(", "));
            match write_document(&self.paths.unit(&name), &body) {
                Ok(()) => {
                    summary.entries += labels.len();
                    self.units.insert(cons, name);
                }
                Err(e) => summary.fail(e),
            }
        }

        summary.units = self.units.len();
        summary
    }

    fn generate_journal(&self) -> Result<PathBuf, ExportError> {
        let frame = HeaderFooter::load(&self.paths);
        let mut doc = frame.header;
        for (cons, name) in &self.units {
            doc.push_str(&format!("\\section{{{cons}}}\n"));
            doc.push_str(&input_line(&self.paths.reports_folder, name));
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
    fn digit_labels_compare_numerically() {
        assert_eq!(compare_labels("7", "70"), Ordering::Less);
        assert_eq!(compare_labels("100", "20"), Ordering::Greater);
        assert_eq!(compare_labels("007", "7"), Ordering::Equal);
        assert_eq!(compare_labels("M42 (Neb)", "M31 (Galaxy)"), Ordering::Greater);
    }

    #[test]
    fn groups_skip_solar_bodies_and_duplicates() {
        let reports = vec![
            report("01/01/2016", vec![entry("M42", "Ori", "Neb"), entry("Jupiter", "Ori", "Planet")]),
            report(
                "02/01/2016",
                vec![entry("M42", "Ori", "Neb"), entry("Betelgeuse", "Ori", "Star"), entry("Milky Way", "Sgr", "Galaxy")],
            ),
        ];
        let groups = group_by_constellation(&reports);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["Ori"], ["Betelgeuse (Star)", "M42 (Neb)"]);
    }

    #[test]
    fn units_and_journal() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let reports = vec![report(
            "01/01/2016",
            vec![entry("M42", "Ori", "Neb"), entry("M31", "And", "Galaxy"), entry("M43", "Ori", "Neb")],
        )];

        let mut exporter = ConstellationExporter::new(paths(tmp.path(), "cons"));
        let summary = exporter.export_reports(&reports);
        assert_eq!((summary.units, summary.entries), (2, 3));
        assert_eq!(
            fs::read_to_string(tmp.path().join("cons/const_Ori.tex"))?,
            "M42 (Neb), M43 (Neb)\n\n"
        );

        let journal = fs::read_to_string(exporter.generate_journal()?)?;
        let and = journal.find("\\section{And}\n\\input{cons/const_And}").expect("And section");
        let ori = journal.find("\\section{Ori}\n\\input{cons/const_Ori}").expect("Ori section");
        assert!(and < ori);
        Ok(())
    }
}
