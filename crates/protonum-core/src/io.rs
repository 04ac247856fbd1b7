//! Reading and writing schema documents.
//!
//! The renumbering itself never touches the file system; these helpers give
//! callers consistent [`Error`] values for the I/O around it.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::trace;

/// Reads a UTF-8 schema document from `path`
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
    trace!("Read {} bytes from {}", bytes.len(), path.display());
    String::from_utf8(bytes).map_err(|_| Error::invalid_utf8(path))
}

/// Writes `text` to `path`, replacing any existing content
pub fn write_document(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, text).map_err(|e| Error::file_write(path, e))?;
    trace!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.proto");
        write_document(&path, "message A {}\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), "message A {}\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_document(dir.path().join("missing.proto")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.proto");
        std::fs::write(&path, [0xff, 0xfe, b'{']).unwrap();
        assert!(matches!(
            read_document(&path),
            Err(Error::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = write_document(dir.path().join("nope/a.proto"), "").unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
    }
}
