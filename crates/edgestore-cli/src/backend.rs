//! Backend selection from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use edgestore_config::{BackendKind, EdgestoreConfig, SqliteSettings};
use edgestore_core::{GraphService, MemoryGraphService, SchemaRegistry, Visibility};
use edgestore_sqlite::{SqliteConfig, SqliteGraphService, SqlitePool};
use tracing::info;

/// Map file settings onto the connection config of the SQLite crate
pub fn sqlite_config(settings: &SqliteSettings) -> SqliteConfig {
    SqliteConfig {
        path: settings.path.clone(),
        wal_mode: settings.wal_mode,
        foreign_keys: settings.foreign_keys,
        busy_timeout_ms: settings.busy_timeout_ms,
        cache_size: settings.cache_size,
        mmap_size: settings.mmap_size,
    }
}

/// Open the configured backend against the process-wide schema registry
pub fn open_service(config: &EdgestoreConfig) -> Result<Arc<dyn GraphService>> {
    let registry = SchemaRegistry::shared();

    match config.storage.backend {
        BackendKind::Memory => {
            info!("Using in-memory backend; nothing is persisted");
            Ok(Arc::new(MemoryGraphService::with_registry(
                registry,
                Visibility::Immediate,
            )))
        }
        BackendKind::Sqlite => {
            let sqlite = sqlite_config(&config.storage.sqlite);
            let path = sqlite.path.clone();
            let pool = SqlitePool::new(sqlite)
                .with_context(|| format!("Failed to open database {}", path.display()))?;
            let service = SqliteGraphService::new(pool, registry)
                .context("Failed to load stored edges")?;
            Ok(Arc::new(service))
        }
    }
}
