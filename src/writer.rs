use crate::error::{Error, Result};
use std::{fs::OpenOptions, io::Write, path::Path};
use tracing::debug;

/// Replaces a file's content in place.
///
/// The existing file is truncated and rewritten through the same inode, so
/// hard links, ownership and permissions are untouched. No backup is kept
/// and no other file is created. A missing or read-only target fails.
///
/// # Errors
///
/// Returns an error if the target cannot be opened for writing or the
/// write fails.
pub(crate) fn overwrite(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    // Ensure data is flushed to disk
    file.sync_all().map_err(|e| Error::io(path, e))?;

    debug!("Overwrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::fs;

    #[test]
    fn test_overwrite_replaces_content() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.dto.ts");
        file.write_str("old content that is longer").unwrap();

        overwrite(file.path(), "new content").unwrap();

        file.assert("new content");
    }

    #[test]
    fn test_overwrite_leaves_no_extra_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.dto.ts");
        file.write_str("old").unwrap();

        overwrite(file.path(), "new").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["user.dto.ts".to_string()]);
    }

    #[test]
    fn test_overwrite_missing_file_fails() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = overwrite(&temp.path().join("missing.dto.ts"), "x").unwrap_err();
        assert!(err.is_io());
        assert!(!temp.child("missing.dto.ts").exists());
    }

    #[test]
    fn test_overwrite_is_visible_through_hard_link() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.dto.ts");
        file.write_str("old").unwrap();
        let alias = temp.child("alias.dto.ts");
        fs::hard_link(file.path(), alias.path()).unwrap();

        overwrite(file.path(), "new").unwrap();

        file.assert("new");
        alias.assert("new");
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.dto.ts");
        file.write_str("old").unwrap();
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o640)).unwrap();

        overwrite(file.path(), "new").unwrap();

        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_read_only_file_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("user.dto.ts");
        file.write_str("old").unwrap();
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o444)).unwrap();

        // Privileged users can write read-only files; nothing to check then.
        if OpenOptions::new().write(true).open(file.path()).is_ok() {
            return;
        }

        let err = overwrite(file.path(), "new").unwrap_err();

        assert!(err.is_io());
        file.assert("old");
    }
}
