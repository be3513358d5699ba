//! Backend fixtures for the contract suite
//!
//! Every fixture owns a fresh, empty backend and the schema registry it reports to.

use std::sync::Arc;

use edgestore_core::{GraphService, MemoryGraphService, SchemaRegistry, Visibility};

/// An empty backend under test
pub struct Fixture {
    pub name: &'static str,
    pub service: Arc<dyn GraphService>,
    pub registry: Arc<SchemaRegistry>,
    // Keeps on-disk databases alive for the fixture's lifetime
    _dir: Option<tempfile::TempDir>,
}

impl Fixture {
    /// Immediately consistent in-memory backend
    pub fn memory() -> Self {
        let registry = Arc::new(SchemaRegistry::new());
        Self {
            name: "memory",
            service: Arc::new(MemoryGraphService::with_registry(
                Arc::clone(&registry),
                Visibility::Immediate,
            )),
            registry,
            _dir: None,
        }
    }

    /// In-memory backend whose writes only land on `sync`
    pub fn buffered_memory() -> Self {
        let registry = Arc::new(SchemaRegistry::new());
        Self {
            name: "buffered-memory",
            service: Arc::new(MemoryGraphService::with_registry(
                Arc::clone(&registry),
                Visibility::OnSync,
            )),
            registry,
            _dir: None,
        }
    }

    /// SQLite on a private in-memory database
    #[cfg(feature = "sqlite")]
    pub fn sqlite_memory() -> Self {
        use edgestore_sqlite::{SqliteGraphService, SqlitePool};

        let registry = Arc::new(SchemaRegistry::new());
        let pool = SqlitePool::memory().expect("Failed to open in-memory SQLite");
        let service = SqliteGraphService::new(pool, Arc::clone(&registry))
            .expect("Failed to create SQLite graph service");
        Self {
            name: "sqlite-memory",
            service: Arc::new(service),
            registry,
            _dir: None,
        }
    }

    /// SQLite on a WAL-mode database file in a temporary directory
    #[cfg(feature = "sqlite")]
    pub fn sqlite_file() -> Self {
        use edgestore_sqlite::{SqliteConfig, SqliteGraphService, SqlitePool};

        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let registry = Arc::new(SchemaRegistry::new());
        let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("contract.db")))
            .expect("Failed to open SQLite file");
        let service = SqliteGraphService::new(pool, Arc::clone(&registry))
            .expect("Failed to create SQLite graph service");
        Self {
            name: "sqlite-file",
            service: Arc::new(service),
            registry,
            _dir: Some(dir),
        }
    }

    /// The backend as a trait object
    pub fn service(&self) -> &dyn GraphService {
        &*self.service
    }
}
