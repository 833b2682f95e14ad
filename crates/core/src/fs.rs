//! File staging helpers used when populating layers.

use crate::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Copy a stream into `dest`, creating parent directories as needed.
///
/// An existing file at `dest` is truncated.
///
/// # Errors
///
/// Returns `Error::Copy` if the destination cannot be created or written.
pub fn copy_file(source: &mut impl Read, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::copy(e, dest))?;
    }

    let mut file = std::fs::File::create(dest).map_err(|e| Error::copy(e, dest))?;
    let written = std::io::copy(source, &mut file).map_err(|e| Error::copy(e, dest))?;
    file.sync_all().map_err(|e| Error::copy(e, dest))?;

    debug!(?dest, bytes = written, "Copied file");
    Ok(written)
}

/// Recursively create `path`. Succeeds if it already exists.
///
/// # Errors
///
/// Returns `Error::DirectoryCreate` if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::directory_create(e, path))
}

/// Create a symlink at `link` pointing at `original`.
///
/// An existing symlink at `link` is replaced. Any other existing entry is
/// left untouched and reported as an `AlreadyExists` symlink error.
///
/// # Errors
///
/// Returns `Error::Symlink` if the link cannot be created.
pub fn replace_symlink(original: &Path, link: &Path) -> Result<()> {
    match std::fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            debug!(?link, "Replacing existing symlink");
            std::fs::remove_file(link).map_err(|e| Error::symlink(e, original, link))?;
        }
        Ok(_) => {
            return Err(Error::symlink(
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "a file that is not a symlink already exists at the link path",
                ),
                original,
                link,
            ));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::symlink(e, original, link)),
    }

    symlink(original, link).map_err(|e| Error::symlink(e, original, link))
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("a/b/artifact.jar");

        let written = copy_file(&mut &b"jar bytes"[..], &dest).unwrap();

        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"jar bytes");
    }

    #[test]
    fn test_copy_file_truncates_existing() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("artifact.jar");
        std::fs::write(&dest, b"a much longer previous content").unwrap();

        copy_file(&mut &b"new"[..], &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_copy_file_into_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&mut &b"x"[..], tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("BOOT-INF/lib");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_dir_over_file_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        std::fs::write(&file, b"").unwrap();

        let err = ensure_dir(&file.join("child")).unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink_creates_and_replaces() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first.jar");
        let second = tmp.path().join("second.jar");
        std::fs::write(&first, b"1").unwrap();
        std::fs::write(&second, b"2").unwrap();
        let link = tmp.path().join("link.jar");

        replace_symlink(&first, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), first);

        replace_symlink(&second, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), second);
        assert_eq!(std::fs::read(&link).unwrap(), b"2");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink_refuses_regular_file() {
        let tmp = TempDir::new().unwrap();
        let original = tmp.path().join("artifact.jar");
        let link = tmp.path().join("link.jar");
        std::fs::write(&original, b"artifact").unwrap();
        std::fs::write(&link, b"user file").unwrap();

        let err = replace_symlink(&original, &link).unwrap_err();

        match err {
            Error::Symlink { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read(&link).unwrap(), b"user file");
    }
}
