//! SQLite storage backend for edgestore
//!
//! Implements [`edgestore_core::GraphService`] on a single SQLite database.
//!
//! ## Features
//!
//! - **Upserting edges**: one row per (source, destination, relationship type)
//! - **Rendered queries**: direction readings and filters compile to parameterised SQL
//! - **WAL Mode**: concurrent readers with write-ahead logging; `sync` checkpoints
//! - **Thread Safety**: Arc<Mutex<Connection>> pattern for concurrent access
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edgestore_core::{Edge, GraphService, SchemaRegistry};
//! use edgestore_sqlite::{SqliteConfig, SqliteGraphService, SqlitePool};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePool::new(SqliteConfig::new("./edgestore.db"))?;
//! let service = SqliteGraphService::new(pool, SchemaRegistry::shared())?;
//!
//! service
//!     .add_edge(Edge::new("urn:li:dataset:b".parse()?, "urn:li:dataset:a".parse()?, "DownstreamOf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod graph_service;
pub mod render;
pub mod schema;

// Re-exports
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use graph_service::SqliteGraphService;
