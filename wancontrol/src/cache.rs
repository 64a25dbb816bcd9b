use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Single-value file remembering the last reported address.
///
/// The file holds the raw address bytes, no trailing newline.
#[derive(Debug, Clone)]
pub struct ChangeCache {
    path: PathBuf,
}

impl ChangeCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved address, if the file is readable.
    pub fn last_value(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    /// True unless the file exists and holds exactly `candidate`.
    pub fn has_changed(&self, candidate: &str) -> bool {
        has_changed(candidate, &self.path)
    }

    pub fn save(&self, value: &str) -> io::Result<()> {
        save(value, &self.path)
    }
}

/// A missing or unreadable cache counts as a change.
pub fn has_changed(candidate: &str, path: &Path) -> bool {
    match fs::read(path) {
        Ok(contents) => contents != candidate.as_bytes(),
        Err(e) => {
            debug!("Cache {} unreadable ({}), treating as changed", path.display(), e);
            true
        }
    }
}

/// Replaces the cache contents with `value`, owner read/write only.
pub fn save(value: &str, path: &Path) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(value.as_bytes())?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_changed() {
        let dir = TempDir::new().unwrap();
        let cache = ChangeCache::new(dir.path().join("absent.cache"));

        assert!(cache.has_changed("203.0.113.7"));
        assert_eq!(cache.last_value(), None);
    }

    #[test]
    fn test_save_then_compare() {
        let dir = TempDir::new().unwrap();
        let cache = ChangeCache::new(dir.path().join("wan.cache"));

        cache.save("203.0.113.7").unwrap();

        assert!(!cache.has_changed("203.0.113.7"));
        assert!(cache.has_changed("203.0.113.8"));
        assert_eq!(fs::read(cache.path()).unwrap(), b"203.0.113.7");
    }

    #[test]
    fn test_comparison_is_byte_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wan.cache");
        fs::write(&path, "203.0.113.7\n").unwrap();

        assert!(has_changed("203.0.113.7", &path));
    }

    #[test]
    fn test_save_truncates_longer_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wan.cache");

        save("198.51.100.222", &path).unwrap();
        save("10.0.0.1", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_directory_path_is_unreadable() {
        let dir = TempDir::new().unwrap();

        assert!(has_changed("10.0.0.1", dir.path()));
        assert!(save("10.0.0.1", dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wan.cache");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save("10.0.0.1", &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
