//! SQLite connection configuration

use std::path::{Path, PathBuf};

/// Path marker SQLite uses for a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Settings applied when a [`crate::SqlitePool`] opens its connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    /// Enable write-ahead logging (ignored by SQLite for in-memory databases)
    pub wal_mode: bool,
    pub foreign_keys: bool,
    /// How long a locked database is retried before SQLITE_BUSY
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values are pages
    pub cache_size: i64,
    /// Bytes of the file to memory-map; 0 disables mmap
    pub mmap_size: u64,
}

impl SqliteConfig {
    /// On-disk database at `path` with the default pragmas
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Private in-memory database, mostly useful in tests
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            wal_mode: false,
            mmap_size: 0,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("edgestore.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
            cache_size: -64_000,
            mmap_size: 256 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config() {
        let config = SqliteConfig::memory();
        assert!(config.is_memory());
        assert!(!config.wal_mode);
        assert_eq!(config.mmap_size, 0);
    }

    #[test]
    fn test_file_config_keeps_defaults() {
        let config = SqliteConfig {
            busy_timeout_ms: 100,
            ..SqliteConfig::new("/tmp/graph.db")
        };
        assert!(!config.is_memory());
        assert!(config.wal_mode);
        assert_eq!(config.busy_timeout_ms, 100);
        assert_eq!(config.path, PathBuf::from("/tmp/graph.db"));
    }
}
