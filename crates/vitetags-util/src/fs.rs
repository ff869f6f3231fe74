use std::fs;
use std::io;
use std::path::{Component, Path};
use std::time::UNIX_EPOCH;

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// Build manifests are plain JSON; a stray invalid byte should surface as a
/// parse error on the affected value rather than as an unreadable file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Modification time of a file in whole seconds since the Unix epoch.
///
/// Returns `None` if the file does not exist or the platform cannot report
/// a modification time.
#[must_use]
pub fn modified_unix_secs(path: &Path) -> Option<u64> {
    path.metadata()
        .ok()?
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Whether a relative resource path stays inside the directory it is joined to.
///
/// Rejects absolute paths, drive prefixes and any `..` component. `.` is allowed.
#[must_use]
pub fn is_contained_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_to_string_lossy_valid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"app.js":{"file":"assets/app.js"}}"#).unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert_eq!(content, r#"{"app.js":{"file":"assets/app.js"}}"#);
    }

    #[test]
    fn test_read_to_string_lossy_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x7b, 0x7d, 0x80, 0x81]).unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert!(content.starts_with("{}"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_to_string_lossy_missing() {
        assert!(read_to_string_lossy(Path::new("/nonexistent/manifest.json")).is_err());
    }

    #[test]
    fn test_modified_unix_secs() {
        let file = NamedTempFile::new().unwrap();
        let secs = modified_unix_secs(file.path()).unwrap();
        assert!(secs > 0);
        assert!(modified_unix_secs(Path::new("/nonexistent/file")).is_none());
    }

    #[test]
    fn test_is_contained_relative() {
        assert!(is_contained_relative(Path::new("dist/assets/app.js")));
        assert!(is_contained_relative(Path::new("./dist/app.css")));
        assert!(!is_contained_relative(Path::new("../secrets.env")));
        assert!(!is_contained_relative(Path::new("dist/../../etc/passwd")));
        assert!(!is_contained_relative(Path::new("/etc/passwd")));
    }
}
