//! Artifact names derived from a canonical session path.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Splits `dir/base.ext` and builds every revision artifact path from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionNaming {
    dir: PathBuf,
    base: String,
    /// Extension including its dot, or empty.
    suffix: String,
}

impl RevisionNaming {
    pub fn new(canonical: &Path) -> Self {
        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base = canonical
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = canonical
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self { dir, base, suffix }
    }

    pub fn canonical(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.base, self.suffix))
    }

    /// `dir/.base.ext.tmp`, where a write is staged before it replaces the
    /// canonical file. The leading dot keeps it out of [`scan`](Self::scan).
    pub fn staging(&self) -> PathBuf {
        self.dir.join(format!(".{}{}.tmp", self.base, self.suffix))
    }

    /// `dir/base.{rev}.ext`
    pub fn backup(&self, rev: u32) -> PathBuf {
        self.dir.join(format!("{}.{}{}", self.base, rev, self.suffix))
    }

    /// `dir/base.{rev}.cog.json`
    pub fn context(&self, rev: u32) -> PathBuf {
        self.dir.join(format!("{}.{}.cog.json", self.base, rev))
    }

    /// `dir/base.{rev}.ctx`
    pub fn transcript(&self, rev: u32) -> PathBuf {
        self.dir.join(format!("{}.{}.ctx", self.base, rev))
    }

    /// `dir/base.{rev}.{subrev}.subrev`
    pub fn subrevision(&self, rev: u32, subrev: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}.subrev", self.base, rev, subrev))
    }

    /// The revision a sibling file name belongs to: `base.{N}` followed by
    /// `.` or the end of the name.
    pub fn revision_of(&self, file_name: &str) -> Option<u32> {
        let rest = file_name.strip_prefix(&self.base)?.strip_prefix('.')?;
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        let (number, tail) = rest.split_at(digits);
        if !tail.is_empty() && !tail.starts_with('.') {
            return None;
        }
        number.parse().ok()
    }

    /// Highest revision present in the directory, 0 if none.
    pub fn scan(&self) -> u32 {
        let dir = if self.dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.dir.as_path()
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan {:?} for revisions: {}", dir, e);
                return 0;
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| self.revision_of(&entry.file_name().to_string_lossy()))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> RevisionNaming {
        RevisionNaming::new(Path::new("/work/quickai.txt"))
    }

    #[test]
    fn test_artifact_paths() {
        let naming = naming();
        assert_eq!(naming.canonical(), Path::new("/work/quickai.txt"));
        assert_eq!(naming.backup(3), Path::new("/work/quickai.3.txt"));
        assert_eq!(naming.context(3), Path::new("/work/quickai.3.cog.json"));
        assert_eq!(naming.transcript(3), Path::new("/work/quickai.3.ctx"));
        assert_eq!(naming.subrevision(3, 2), Path::new("/work/quickai.3.2.subrev"));
        assert_eq!(naming.staging(), Path::new("/work/.quickai.txt.tmp"));
        assert_eq!(naming.revision_of(".quickai.txt.tmp"), None);
    }

    #[test]
    fn test_extensionless_path() {
        let naming = RevisionNaming::new(Path::new("notes"));
        assert_eq!(naming.canonical(), Path::new("notes"));
        assert_eq!(naming.backup(1), Path::new("notes.1"));
    }

    #[test]
    fn test_revision_of() {
        let naming = naming();
        assert_eq!(naming.revision_of("quickai.12.txt"), Some(12));
        assert_eq!(naming.revision_of("quickai.4.ctx"), Some(4));
        assert_eq!(naming.revision_of("quickai.7"), Some(7));
        assert_eq!(naming.revision_of("quickai.3.1.subrev"), Some(3));
        assert_eq!(naming.revision_of("quickai.txt"), None);
        assert_eq!(naming.revision_of("quickai.12b.txt"), None);
        assert_eq!(naming.revision_of("quickaix.2.txt"), None);
        assert_eq!(naming.revision_of("other.2.txt"), None);
    }
}
