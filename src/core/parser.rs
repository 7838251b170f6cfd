//! Tolerant report parser.
//!
//! A raw report file holds any number of report blocks:
//!
//! ```text
//! Date        23/02/2015
//! Time        21:00-23:30
//! Location    Cambridge, UK
//! Target      Cons    Type    Power   Notes
//! M42         Ori     Neb     50x     Bright nebula
//! ```
//!
//! Blocks are separated by blank lines. Malformed pieces are skipped with a
//! warning instead of failing the file, so one bad row never costs the rest
//! of the session.

use std::fmt;
use std::str::Lines;

use serde::Serialize;
use tracing::warn;

use crate::core::report::{HeaderField, Report, TargetColumn, TargetEntry};
use crate::core::tokenize::{is_comment, split_fields};

/// What went wrong on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseWarningKind {
    /// Content outside a report block that is not a date line.
    ExpectedDate,
    /// Header key not in the known set.
    UnknownHeaderKey,
    /// Neither a header pair nor the target-table marker row.
    UnknownProperty,
    /// Table row with fewer than five fields.
    MalformedTarget,
    /// Report block without a date value; the block is dropped.
    MissingDate,
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    pub kind: ParseWarningKind,
    pub text: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ParseWarningKind::ExpectedDate => "expected 'Date', report discarded",
            ParseWarningKind::UnknownHeaderKey => "unknown property, property discarded",
            ParseWarningKind::UnknownProperty => "unknown property, target table skipped",
            ParseWarningKind::MalformedTarget => "malformed target, target discarded",
            ParseWarningKind::MissingDate => "report without date, report discarded",
        };
        write!(f, "line {}: {} [{}]", self.line, what, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Seeking,
    Header,
    TargetRows,
}

/// Lazy iterator over the reports of one file.
pub struct ReportParser<'a> {
    lines: std::iter::Enumerate<Lines<'a>>,
    state: State,
    current: Option<Report>,
    /// Suppresses repeated "expected date" warnings for a run of stray lines.
    rejecting: bool,
    warnings: Vec<ParseWarning>,
}

impl<'a> ReportParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            state: State::Seeking,
            current: None,
            rejecting: false,
            warnings: Vec::new(),
        }
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }

    fn warn(&mut self, line: usize, kind: ParseWarningKind, text: impl Into<String>) {
        let warning = ParseWarning { line, kind, text: text.into() };
        let date = self.current.as_ref().map(|r| r.date()).unwrap_or("-");
        warn!(report = date, "{warning}");
        self.warnings.push(warning);
    }

    fn begin(&mut self, fields: &[String]) {
        let mut report = Report::default();
        if let [_, date] = fields {
            report.header.set(HeaderField::Date, date.as_str());
        }
        self.current = Some(report);
        self.state = State::Header;
        self.rejecting = false;
    }

    /// Close the block in progress. Reports without a date are dropped.
    fn finish(&mut self, line: usize) -> Option<Report> {
        self.state = State::Seeking;
        let report = self.current.take()?;
        if report.date().is_empty() {
            let warning = ParseWarning {
                line,
                kind: ParseWarningKind::MissingDate,
                text: format!("{} target(s)", report.entries.len()),
            };
            warn!("{warning}");
            self.warnings.push(warning);
            return None;
        }
        Some(report)
    }

    fn set_header(&mut self, line: usize, key: &str, value: &str) {
        match HeaderField::from_key(key) {
            Some(field) => {
                if let Some(report) = self.current.as_mut() {
                    report.header.set(field, value);
                }
            }
            None => self.warn(line, ParseWarningKind::UnknownHeaderKey, format!("{key}:{value}")),
        }
    }
}

fn is_date_key(field: &str) -> bool {
    field.eq_ignore_ascii_case(HeaderField::Date.label())
}

impl Iterator for ReportParser<'_> {
    type Item = Report;

    fn next(&mut self) -> Option<Report> {
        let mut last_line = 0;

        while let Some((idx, raw)) = self.lines.next() {
            let line_no = idx + 1;
            last_line = line_no;
            let line = raw.trim();

            if is_comment(line) {
                continue;
            }

            match self.state {
                State::Seeking => {
                    if line.is_empty() {
                        continue;
                    }
                    let fields = split_fields(line);
                    if is_date_key(&fields[0]) {
                        self.begin(&fields);
                    } else if !self.rejecting {
                        self.rejecting = true;
                        self.warn(line_no, ParseWarningKind::ExpectedDate, line);
                    }
                }
                State::Header => {
                    if line.is_empty() {
                        if let Some(report) = self.finish(line_no) {
                            return Some(report);
                        }
                        continue;
                    }

                    let mut fields = split_fields(line);
                    // Naked-eye sessions may omit values entirely.
                    if fields.len() == 1 {
                        fields.push(String::new());
                    }

                    if let [key, value] = fields.as_slice() {
                        if is_date_key(key) {
                            let done = self.finish(line_no);
                            self.begin(&fields);
                            if done.is_some() {
                                return done;
                            }
                        } else {
                            self.set_header(line_no, key, value);
                        }
                        continue;
                    }

                    if TargetColumn::is_marker_row(&fields) {
                        self.state = State::TargetRows;
                        continue;
                    }

                    self.warn(line_no, ParseWarningKind::UnknownProperty, fields.join(" "));
                    if let Some(report) = self.finish(line_no) {
                        return Some(report);
                    }
                }
                State::TargetRows => {
                    if line.is_empty() {
                        if let Some(report) = self.finish(line_no) {
                            return Some(report);
                        }
                        continue;
                    }

                    let fields = split_fields(line);
                    match TargetEntry::from_row(&fields) {
                        Some(entry) => {
                            if let Some(report) = self.current.as_mut() {
                                report.entries.push(entry);
                            }
                        }
                        None => {
                            self.warn(line_no, ParseWarningKind::MalformedTarget, line);
                            if let Some(report) = self.finish(line_no) {
                                return Some(report);
                            }
                        }
                    }
                }
            }
        }

        self.finish(last_line)
    }
}

/// Parse a whole file body, returning reports and warnings.
pub fn parse_reports(text: &str) -> (Vec<Report>, Vec<ParseWarning>) {
    let mut parser = ReportParser::new(text);
    let reports: Vec<Report> = parser.by_ref().collect();
    (reports, parser.into_warnings())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(warnings: &[ParseWarning]) -> Vec<ParseWarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn single_report_with_one_target() {
        let text = "Date\t23/02/2015\nTarget\tCons\tType\tPower\tNotes\nM42\tOri\tGalaxy\t50x\tnice\n\n";
        let (reports, warnings) = parse_reports(text);

        assert_eq!(reports.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(reports[0].header.date, "23/02/2015");
        assert_eq!(reports[0].entries.len(), 1);
        assert_eq!(reports[0].entries[0].target, "M42");
        assert_eq!(reports[0].entries[0].power, "50x");
    }

    #[test]
    fn header_fields_are_matched_case_insensitively() {
        let text = "\
Date\t01/03/2016
time\t20:00
LOCATION\tBurwell
Seeing\t'2'
Telescopes\t\"Tal-1\"
";
        let (reports, warnings) = parse_reports(text);
        assert!(warnings.is_empty());
        let header = &reports[0].header;
        assert_eq!(header.time, "20:00");
        assert_eq!(header.location, "Burwell");
        assert_eq!(header.seeing, "2");
        assert_eq!(header.telescopes, "Tal-1");
        assert_eq!(header.filters, "");
    }

    #[test]
    fn report_count_ignores_blank_lines_and_comments() {
        let text = "\
# my observations

Date\t01/01/2016
Target\tCons\tType\tPower\tNotes
M1\tTau\tSn Rem\t40x\tfaint

# second night
Date\t02/01/2016

Date\t03/01/2016
Location\tHome
";
        let (reports, _) = parse_reports(text);
        let dates: Vec<_> = reports.iter().map(|r| r.date().to_string()).collect();
        assert_eq!(dates, vec!["01/01/2016", "02/01/2016", "03/01/2016"]);
    }

    #[test]
    fn unknown_header_key_warns_but_keeps_report() {
        let text = "Date\t01/01/2016\nMoon phase\t50%\nTime\t22:00\n";
        let (reports, warnings) = parse_reports(text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].header.time, "22:00");
        assert_eq!(kinds(&warnings), vec![ParseWarningKind::UnknownHeaderKey]);
        assert_eq!(warnings[0].line, 2);
    }

    #[test]
    fn single_field_header_line_gets_empty_value() {
        let text = "Date\t01/01/2016\nTelescopes\nTime\t22:00\n";
        let (reports, warnings) = parse_reports(text);
        assert!(warnings.is_empty());
        assert_eq!(reports[0].header.telescopes, "");
        assert_eq!(reports[0].header.time, "22:00");
    }

    #[test]
    fn mismatched_marker_row_keeps_partial_report() {
        let text = "\
Date\t01/01/2016
Location\tHome
Object\tCons\tType\tPower\tNotes
M42\tOri\tNeb\t50x\tnice
";
        let (reports, warnings) = parse_reports(text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].header.location, "Home");
        assert!(reports[0].entries.is_empty());
        // The stray row after the failed marker is outside any block.
        assert_eq!(
            kinds(&warnings),
            vec![ParseWarningKind::UnknownProperty, ParseWarningKind::ExpectedDate]
        );
    }

    #[test]
    fn short_row_after_marker_yields_empty_report() {
        let text = "Date\t01/01/2016\nTarget\tCons\tType\tPower\tNotes\nFoo\n";
        let (reports, warnings) = parse_reports(text);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].entries.is_empty());
        assert_eq!(kinds(&warnings), vec![ParseWarningKind::MalformedTarget]);
    }

    #[test]
    fn malformed_row_ends_the_table() {
        let text = "\
Date\t01/01/2016
Target\tCons\tType\tPower\tNotes
M42\tOri\tNeb\t50x\tnice
M43\tOri
M44\tCnc\tOpn Cl\t20x\tbees
";
        let (reports, warnings) = parse_reports(text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].entries.len(), 1);
        assert_eq!(
            kinds(&warnings),
            vec![ParseWarningKind::MalformedTarget, ParseWarningKind::ExpectedDate]
        );
    }

    #[test]
    fn stray_lines_warn_once_per_run() {
        let text = "garbage\nmore garbage\nDate\t01/01/2016\n\nstill garbage\n";
        let (reports, warnings) = parse_reports(text);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            kinds(&warnings),
            vec![ParseWarningKind::ExpectedDate, ParseWarningKind::ExpectedDate]
        );
        assert_eq!(warnings[0].line, 1);
        assert_eq!(warnings[1].line, 5);
    }

    #[test]
    fn report_without_date_value_is_dropped_with_warning() {
        let text = "Date\nTime\t21:00\nTarget\tCons\tType\tPower\tNotes\nM42\tOri\tNeb\t50x\tnice\n";
        let (reports, warnings) = parse_reports(text);
        assert!(reports.is_empty());
        assert_eq!(kinds(&warnings), vec![ParseWarningKind::MissingDate]);
    }

    #[test]
    fn date_line_inside_header_starts_next_report() {
        let text = "Date\t01/01/2016\nTime\t20:00\nDate\t02/01/2016\nTime\t21:00\n";
        let (reports, _) = parse_reports(text);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].header.time, "20:00");
        assert_eq!(reports[1].header.date, "02/01/2016");
        assert_eq!(reports[1].header.time, "21:00");
    }

    #[test]
    fn parser_is_lazy() {
        let text = "Date\t01/01/2016\n\nDate\t02/01/2016\n\nbad line\n";
        let mut parser = ReportParser::new(text);
        let first = parser.next().expect("first report");
        assert_eq!(first.date(), "01/01/2016");
        // Nothing past the first block has been read yet.
        assert!(parser.warnings().is_empty());
        assert_eq!(parser.next().map(|r| r.header.date), Some("02/01/2016".to_string()));
        assert!(parser.next().is_none());
        assert_eq!(parser.warnings().len(), 1);
        assert!(parser.next().is_none());
    }

    #[test]
    fn extra_columns_are_ignored_and_notes_escaped() {
        let text = "Date\t01/01/2016\nTarget\tCons\tType\tPower\tNotes\tExtra\nM31 & M32\tAnd\tGalaxy\t30x\t100% & more\tzzz\n";
        let (reports, warnings) = parse_reports(text);
        assert!(warnings.is_empty());
        let entry = &reports[0].entries[0];
        assert_eq!(entry.target, "M31 & M32");
        assert_eq!(entry.notes, "100\\%  and  more");
    }
}
