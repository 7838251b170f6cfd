//! LaTeX document framing shared by the journals.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::JournalPaths;

const DEFAULT_HEADER: &str = "\
\\documentclass[a4paper,10pt]{article}
\\usepackage[utf8]{inputenc}
\\usepackage[landscape,margin=1.5cm]{geometry}
\\usepackage{longtable}
\\begin{document}
\\tableofcontents
";

const DEFAULT_FOOTER: &str = "\\end{document}\n";

/// Header and footer wrapped around a journal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFooter {
    pub header: String,
    pub footer: String,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl HeaderFooter {
    /// Read the configured template files, falling back to the built-in
    /// preamble for any that are missing.
    pub fn load(paths: &JournalPaths) -> Self {
        Self {
            header: read_or(&paths.header, DEFAULT_HEADER),
            footer: read_or(&paths.footer, DEFAULT_FOOTER),
        }
    }
}

fn read_or(path: &Path, fallback: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!("using built-in template instead of {}: {e}", path.display());
            fallback.to_string()
        }
    }
}

/// `\input{folder/name}` for a unit. Only a literal `.tex` suffix is
/// dropped; unit keys such as `PK64+5.1_Cyg` contain dots of their own.
pub fn input_line(folder: &str, unit: &str) -> String {
    let stem = unit.strip_suffix(".tex").unwrap_or(unit);
    format!("\\input{{{folder}/{stem}}}\n")
}

/// Start a new page and section.
pub fn section(title: &str) -> String {
    format!("\\clearpage\n\\section{{{title}}}\n")
}
