//! Content fingerprints for cache-busting query strings.

use std::fs::File;
use std::io;
use std::path::Path;

/// Length of a full hex-encoded BLAKE3 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hex BLAKE3 digest of a file's contents, streamed from disk.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn content_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// The first `len` hex characters of [`content_digest`], capped at the full
/// digest length.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn short_fingerprint(path: &Path, len: usize) -> io::Result<String> {
    let mut digest = content_digest(path)?;
    digest.truncate(len.min(DIGEST_HEX_LEN));
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_fingerprint_of_known_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.js");
        fs::write(&path, b"hello world").unwrap();

        assert_eq!(short_fingerprint(&path, 12).unwrap(), "d74981efa70a");
        assert_eq!(
            content_digest(&path).unwrap(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_fingerprint_follows_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.css");
        fs::write(&path, "body{}").unwrap();
        let before = short_fingerprint(&path, 12).unwrap();
        assert_eq!(short_fingerprint(&path, 12).unwrap(), before);

        fs::write(&path, "body{color:red}").unwrap();
        assert_ne!(short_fingerprint(&path, 12).unwrap(), before);
    }

    #[test]
    fn test_fingerprint_length_is_capped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logo.svg");
        fs::write(&path, "<svg/>").unwrap();

        assert_eq!(short_fingerprint(&path, 500).unwrap().len(), DIGEST_HEX_LEN);
        assert!(short_fingerprint(&path, 0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(content_digest(Path::new("/nonexistent/file")).is_err());
    }
}
