//! GraphService Trait
//!
//! The backend-agnostic contract of the relationship store. Every backend
//! (in-memory, SQLite, ...) implements this trait and is checked by the same
//! behavioural suite in `edgestore-storage-tests`.
//!
//! # Consistency
//!
//! A write is only guaranteed visible to reads after [`GraphService::sync`] returns.
//! Strongly consistent backends implement `sync` as a no-op.
//!
//! # Not-found handling
//!
//! Operations against nodes that do not exist succeed with an empty result or as a
//! no-op; they never return an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GraphResult;
use crate::graph::edge::Edge;
use crate::graph::filter::RelationshipFilter;
use crate::graph::query::RelatedUrnsQuery;
use crate::urn::Urn;

/// Typed directed graph relationship store
///
/// Implementations must be `Send + Sync` so one instance can serve many concurrent
/// callers.
#[async_trait]
pub trait GraphService: Send + Sync {
    /// Insert an edge, or replace the properties of an existing edge with the same
    /// (source, destination, relationship type) triple.
    async fn add_edge(&self, edge: Edge) -> GraphResult<()>;

    /// Remove edges incident to `node` whose type is in `relationship_types` and whose
    /// direction relative to `node` matches `relationship_filter`.
    ///
    /// The filter's criteria restrict which entities at the other end qualify.
    /// Edges of other types or incident only to other nodes are left untouched.
    async fn remove_edges_from_node(
        &self,
        node: &Urn,
        relationship_types: &[String],
        relationship_filter: &RelationshipFilter,
    ) -> GraphResult<()>;

    /// Remove every edge where `node` is the source or the destination
    async fn remove_node(&self, node: &Urn) -> GraphResult<()>;

    /// Remove all edges and reset the schema registry
    async fn clear(&self) -> GraphResult<()>;

    /// Run a directional, filtered traversal and return the related URN strings
    async fn find_related_urns(&self, query: &RelatedUrnsQuery) -> GraphResult<Vec<String>>;

    /// Distinct relationship types currently in use, sorted
    async fn relationship_types(&self) -> GraphResult<Vec<String>>;

    /// Make all prior writes visible to subsequent reads
    async fn sync(&self) -> GraphResult<()> {
        Ok(())
    }
}

/// Blanket implementation of GraphService for Arc<T>
#[async_trait]
impl<T: GraphService + ?Sized> GraphService for Arc<T> {
    async fn add_edge(&self, edge: Edge) -> GraphResult<()> {
        (**self).add_edge(edge).await
    }

    async fn remove_edges_from_node(
        &self,
        node: &Urn,
        relationship_types: &[String],
        relationship_filter: &RelationshipFilter,
    ) -> GraphResult<()> {
        (**self)
            .remove_edges_from_node(node, relationship_types, relationship_filter)
            .await
    }

    async fn remove_node(&self, node: &Urn) -> GraphResult<()> {
        (**self).remove_node(node).await
    }

    async fn clear(&self) -> GraphResult<()> {
        (**self).clear().await
    }

    async fn find_related_urns(&self, query: &RelatedUrnsQuery) -> GraphResult<Vec<String>> {
        (**self).find_related_urns(query).await
    }

    async fn relationship_types(&self) -> GraphResult<Vec<String>> {
        (**self).relationship_types().await
    }

    async fn sync(&self) -> GraphResult<()> {
        (**self).sync().await
    }
}
