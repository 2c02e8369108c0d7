use std::path::{Path, PathBuf};

/// Snapshot of a matched source file taken at scan time.
///
/// The record is never refreshed: once the file on disk changes, the
/// snapshot is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path of the file as discovered during the walk
    pub path: PathBuf,

    /// Full text content at scan time
    pub content: String,

    /// Content length in UTF-16 code units, the unit cost estimates are
    /// calibrated against
    pub size: usize,
}

impl FileRecord {
    /// Creates a record, computing the size from `content`.
    ///
    /// Characters outside the Basic Multilingual Plane count twice.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: String) -> Self {
        let size = content.encode_utf16().count();
        Self {
            path: path.into(),
            content,
            size,
        }
    }

    /// Returns the final path component, or the whole path if it has none.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.to_string_lossy().into_owned(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Returns the path relative to `root`, falling back to the full path.
    #[must_use]
    pub fn display_path(&self, root: &Path) -> String {
        pathdiff::diff_paths(&self.path, root)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| self.path.clone())
            .to_string_lossy()
            .into_owned()
    }

    /// Returns the first `max_chars` characters with newlines escaped.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        self.content
            .chars()
            .take(max_chars)
            .collect::<String>()
            .replace('\n', "\\n")
    }

    /// Returns the number of lines in the snapshot.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Sums the sizes of all records.
#[must_use]
pub fn total_chars(files: &[FileRecord]) -> u64 {
    files.iter().map(|f| f.size as u64).sum()
}

/// Checks whether the file extension is in `accepted` (case-sensitive).
#[must_use]
pub(crate) fn has_accepted_extension(path: &Path, accepted: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| accepted.iter().any(|a| a == ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_counts_utf16_units_not_bytes() {
        let record = FileRecord::new("a.dto.ts", "héllo".to_string());
        assert_eq!(record.size, 5);
        assert_eq!(record.content.len(), 6);

        let emoji = FileRecord::new("b.dto.ts", "id 🔑".to_string());
        assert_eq!(emoji.size, 5);
        assert_eq!(emoji.content.chars().count(), 4);
    }

    #[test]
    fn test_file_name() {
        let record = FileRecord::new("src/users/user.dto.ts", String::new());
        assert_eq!(record.file_name(), "user.dto.ts");
    }

    #[test]
    fn test_display_path_relative_to_root() {
        let record = FileRecord::new("/repo/src/user.dto.ts", String::new());
        assert_eq!(
            record.display_path(Path::new("/repo")),
            Path::new("src").join("user.dto.ts").to_string_lossy()
        );
    }

    #[test]
    fn test_preview_escapes_newlines() {
        let record = FileRecord::new("x.ts", "import a;\nexport class UserDto {}".to_string());
        assert_eq!(record.preview(12), "import a;\\nex");
    }

    #[test]
    fn test_total_chars() {
        let files = vec![
            FileRecord::new("a.ts", "abcd".to_string()),
            FileRecord::new("b.ts", "ef".to_string()),
        ];
        assert_eq!(total_chars(&files), 6);
        assert_eq!(total_chars(&[]), 0);
    }

    #[test]
    fn test_has_accepted_extension() {
        let accepted = vec!["ts".to_string(), "js".to_string()];
        assert!(has_accepted_extension(Path::new("user.dto.ts"), &accepted));
        assert!(has_accepted_extension(Path::new("user.dto.js"), &accepted));
        assert!(!has_accepted_extension(Path::new("user.dto.tsx"), &accepted));
        assert!(!has_accepted_extension(Path::new("Makefile"), &accepted));
    }

    #[test]
    fn test_line_count() {
        let record = FileRecord::new("x.ts", "line1\nline2\nline3".to_string());
        assert_eq!(record.line_count(), 3);
    }
}
