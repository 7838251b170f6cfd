//! Filepath: src/infra/walk.rs
//! Raw report discovery.
//! - Lists the regular files directly inside a report folder, or the whole
//!   tree below it when asked to recurse
//! - Accepts `.tsv` and `.csv` (any case); both are TAB-delimited
//! - Skips hidden files (editor swap files, `.DS_Store`)
//! - Sorted by file name, which fixes the order reports are imported in
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

/// Extensions accepted as raw reports.
pub const RAW_REPORT_GLOBS: [&str; 2] = ["*.tsv", "*.csv"];

/// Walker over a raw report folder; non-recursive unless configured.
pub struct ReportWalker
{
    /// Compiled set of accepted file name patterns
    accept: GlobSet,

    /// Descend into sub-folders; default false
    recursive: bool,
}

impl ReportWalker
{
    /// Walker accepting the default raw report extensions.
    pub fn new() -> Result<Self>
    {
        Self::with_patterns(&RAW_REPORT_GLOBS)
    }

    /// Walker accepting custom file name globs (matched case-insensitively
    /// against the file name only).
    pub fn with_patterns(patterns: &[&str]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns
        {
            builder.add(
                GlobBuilder::new(pattern)
                    .case_insensitive(true)
                    .literal_separator(true)
                    .build()?,
            );
        }

        Ok(Self {
            accept: builder.build()?,
            recursive: false,
        })
    }

    /// (Optional) Also pick up reports in sub-folders.
    pub fn with_recursive(
        mut self,
        recursive: bool,
    ) -> Self
    {
        self.recursive = recursive;
        self
    }

    /// True when `path` names an accepted raw report file.
    pub fn accepts(
        &self,
        path: &Path,
    ) -> bool
    {
        path.file_name()
            .is_some_and(|name| self.accept.is_match(name))
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        //   WalkBuilder::hidden(true)  => *skip* dotfiles
        b.hidden(true);

        // A report folder is data, not a source tree: ignore files do not apply.
        b.ignore(false);
        b.parents(false);
        b.git_ignore(false);
        b.git_global(false);
        b.git_exclude(false);

        // Depth 1 means the root's direct children.
        b.max_depth(if self.recursive { None } else { Some(1) });

        b
    }

    /// Accepted report files under `root`, sorted by file name.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<PathBuf>
    {
        let root_path = root.as_ref();

        let mut out: Vec<PathBuf> = self
            .build_walk(root_path)
            .build()
            // Unreadable entries are skipped; the folder itself is checked by the caller
            .filter_map(|res| res.ok())
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .map(|entry| entry.into_path())
            .filter(|p| self.accepts(p))
            .collect();

        sort_by_file_name(&mut out);

        out
    }
}

/// Lexical, ascending order on the file name; full path breaks ties.
pub fn sort_by_file_name(paths: &mut [PathBuf])
{
    paths.sort_by(|a, b| {
        a.file_name()
            .cmp(&b.file_name())
            .then_with(|| a.cmp(b))
    });
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn names(files: &[PathBuf]) -> Vec<String>
    {
        files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_accepts_tsv_and_csv_in_any_case() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "2016.tsv", "")?;
        write_file(root, "2015.CSV", "")?;
        write_file(root, "notes.txt", "")?;
        write_file(root, "journal.tex", "")?;

        let files = ReportWalker::new()?.walk_files(root);

        assert_eq!(names(&files), vec!["2015.CSV", "2016.tsv"]);
        Ok(())
    }

    #[test]
    fn test_sorted_by_name_not_by_creation() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "c.tsv", "")?;
        write_file(root, "a.tsv", "")?;
        write_file(root, "b.csv", "")?;

        let files = ReportWalker::new()?.walk_files(root);

        assert_eq!(names(&files), vec!["a.tsv", "b.csv", "c.tsv"]);
        Ok(())
    }

    #[test]
    fn test_not_recursive_by_default() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "top.tsv", "")?;
        write_file(root, "old/nested.tsv", "")?;

        let files = ReportWalker::new()?.walk_files(root);
        assert_eq!(names(&files), vec!["top.tsv"]);

        let files = ReportWalker::new()?
            .with_recursive(true)
            .walk_files(root);
        assert_eq!(names(&files), vec!["nested.tsv", "top.tsv"]);
        Ok(())
    }

    #[test]
    fn test_hidden_and_gitignored_files() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".gitignore", "*.tsv")?;
        write_file(root, ".scratch.tsv", "")?;
        write_file(root, "visible.tsv", "")?;

        // Ignore files do not hide reports; dotfiles are skipped.
        let files = ReportWalker::new()?.walk_files(root);
        assert_eq!(names(&files), vec!["visible.tsv"]);
        Ok(())
    }

    #[test]
    fn test_missing_folder_yields_nothing() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let files = ReportWalker::new()?.walk_files(temp_dir.path().join("absent"));
        assert!(files.is_empty());
        Ok(())
    }
}
