//! Console log directory layout
//!
//! The server writes to `vhserver-console.log` and rotates older output into
//! `vhserver-console-<date>.log` files next to it.

use std::path::{Path, PathBuf};

use crate::infrastructure::log_source::SourceError;

/// Name of the live console log
pub const LIVE_LOG_FILE: &str = "vhserver-console.log";

const ARCHIVE_PREFIX: &str = "vhserver-console-";
const ARCHIVE_SUFFIX: &str = ".log";

/// Path of the live console log inside `dir`
pub fn live_log_path(dir: &Path) -> PathBuf {
    dir.join(LIVE_LOG_FILE)
}

/// Whether a file name is a rotated console log archive
pub fn is_archive_name(name: &str) -> bool {
    name.len() > ARCHIVE_PREFIX.len() + ARCHIVE_SUFFIX.len()
        && name.starts_with(ARCHIVE_PREFIX)
        && name.ends_with(ARCHIVE_SUFFIX)
}

/// List archived console logs in `dir`, sorted by file name (oldest first)
pub async fn discover_history(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let list_error = |source| SourceError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_error)?;
    let mut archives = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        let matches = entry.file_name().to_str().is_some_and(is_archive_name);
        if is_file && matches {
            archives.push(entry.path());
        }
    }

    archives.sort();
    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_names() {
        assert!(is_archive_name("vhserver-console-2021-03-14-09:26:50.log"));
        assert!(!is_archive_name(LIVE_LOG_FILE));
        assert!(!is_archive_name("vhserver-console-.log"));
        assert!(!is_archive_name("vhserver-console-2021.txt"));
        assert!(!is_archive_name("other-console-2021.log"));
    }

    #[tokio::test]
    async fn test_discover_history_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "vhserver-console-2021-03-15.log",
            "vhserver-console.log",
            "vhserver-console-2021-03-13.log",
            "notes.txt",
            "vhserver-console-2021-03-14.log",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("vhserver-console-2021-03-16.log")).unwrap();

        let history = discover_history(dir.path()).await.unwrap();
        let names: Vec<String> = history
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "vhserver-console-2021-03-13.log",
                "vhserver-console-2021-03-14.log",
                "vhserver-console-2021-03-15.log",
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_history_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = discover_history(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, SourceError::ListDirectory { .. }));
    }

    #[test]
    fn test_live_log_path() {
        assert_eq!(
            live_log_path(Path::new("/var/log/vh")),
            PathBuf::from("/var/log/vh/vhserver-console.log")
        );
    }
}
