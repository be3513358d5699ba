//! Core types and contracts for edgestore.
//!
//! Edgestore records typed, directed edges between URN-identified entities and answers
//! directional, filtered traversal queries with the same semantics on every backend.
//! This crate owns the data model, the [`GraphService`] contract, the reference
//! in-memory backend and the process-wide [`SchemaRegistry`].
//!
//! ```rust
//! use edgestore_core::{Edge, GraphService, MemoryGraphService, RelatedUrnsQuery, RelationshipFilter, Urn};
//!
//! # async fn example() -> edgestore_core::GraphResult<()> {
//! let store = MemoryGraphService::new();
//! let a: Urn = "urn:li:dataset:a".parse()?;
//! let b: Urn = "urn:li:dataset:b".parse()?;
//! store.add_edge(Edge::new(b, a, "DownstreamOf")).await?;
//! store.sync().await?;
//!
//! let query = RelatedUrnsQuery::new(["DownstreamOf"])
//!     .source_type("dataset")
//!     .relationship_filter(RelationshipFilter::outgoing());
//! assert_eq!(store.find_related_urns(&query).await?, vec!["urn:li:dataset:a"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod schema;
pub mod urn;

pub use error::{GraphError, GraphResult};
pub use graph::{
    ConjunctiveCriterion, Criterion, Direction, Edge, EdgeKey, EntityField, Filter, GraphService,
    MemoryGraphService, Page, RelatedUrnsQuery, RelationshipFilter, Visibility,
};
pub use schema::{SchemaRegistry, SchemaSnapshot};
pub use urn::Urn;
