//! Record tokenizer: TAB-delimited fields with optional quoting.

/// Field delimiter for both `.tsv` and `.csv` reports.
pub const DELIMITER: char = '\t';

/// Lines starting with this marker are comments.
pub const COMMENT_MARKER: char = '#';

/// Split a raw line into cleaned fields.
///
/// The line is trimmed first, so leading/trailing delimiters do not produce
/// empty columns. An empty line yields no fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    line.split(DELIMITER).map(clean_field).collect()
}

/// Strip one leading and one trailing quote (single or double), then trim.
pub fn clean_field(field: &str) -> String {
    let field = field
        .strip_prefix(['"', '\''])
        .unwrap_or(field);
    let field = field
        .strip_suffix(['"', '\''])
        .unwrap_or(field);
    field.trim().to_string()
}

/// Comment lines are ignored wherever they appear, even inside a block.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}
