use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl FileContent {
    /// Borrow the content as text. Mapped files are validated here since
    /// they skip the UTF-8 check `read_to_string` performs.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            FileContent::Mapped(mmap) => {
                std::str::from_utf8(mmap).context("report file is not valid UTF-8")
            }
            FileContent::Buffered(s) => Ok(s.as_str()),
        }
    }
}

pub fn read_file_smart<P: AsRef<Path>>(path: P) -> Result<FileContent> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        // Use memory mapping for large files
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // Safety: We're only reading the file, not modifying it
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        Ok(FileContent::Mapped(mmap))
    } else {
        // Read small files into memory
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        Ok(FileContent::Buffered(content))
    }
}

/// Open an output unit for writing, truncating any previous run's content.
pub fn create_unit(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Reopen an output unit to add to its end.
pub fn append_unit(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Write a whole document through a same-directory temp file, so a failed
/// run never leaves a half-written journal behind.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;

    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_truncates_and_append_extends() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("unit.tex");
        fs::write(&path, "stale")?;

        {
            let mut w = create_unit(&path)?;
            w.write_all(b"head\n")?;
            w.flush()?;
        }
        {
            let mut w = append_unit(&path)?;
            w.write_all(b"tail\n")?;
            w.flush()?;
        }

        assert_eq!(fs::read_to_string(&path)?, "head\ntail\n");
        Ok(())
    }

    #[test]
    fn atomic_write_replaces_content() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("journal.tex");
        fs::write(&path, "old")?;
        write_atomic(&path, b"new")?;
        assert_eq!(fs::read_to_string(&path)?, "new");
        Ok(())
    }

    #[test]
    fn small_files_are_buffered() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("obs.tsv");
        fs::write(&path, "Date\t01/01/2016\n")?;
        let content = read_file_smart(&path)?;
        assert!(matches!(content, FileContent::Buffered(_)));
        assert_eq!(content.as_str()?, "Date\t01/01/2016\n");
        Ok(())
    }
}
