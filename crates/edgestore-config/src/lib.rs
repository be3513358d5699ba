//! # Edgestore Configuration
//!
//! Typed configuration for the edgestore binary: which storage backend to open, its
//! SQLite settings, and log output.
//!
//! ## Features
//!
//! - TOML, YAML and JSON sources, chosen by file extension
//! - `EDGESTORE_*` environment overrides
//! - Defaults for every field, so partial files are valid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgestore_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("edgestore.toml").await?;
//!     println!("backend: {}", config.storage.backend);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod loader;

pub use config::*;
pub use loader::*;
