//! In-memory GraphService
//!
//! A `BTreeMap` keyed by [`EdgeKey`] behind a `parking_lot::RwLock`. Two visibility
//! modes are supported:
//!
//! - [`Visibility::Immediate`]: writes are readable as soon as they return.
//! - [`Visibility::OnSync`]: writes are staged and only applied by
//!   [`GraphService::sync`], which models an eventually consistent engine (e.g. a
//!   search index that needs a refresh).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::GraphResult;
use crate::graph::edge::{Edge, EdgeKey};
use crate::graph::filter::RelationshipFilter;
use crate::graph::query::{validate_relationship_types, RelatedUrnsQuery};
use crate::graph::service::GraphService;
use crate::schema::SchemaRegistry;
use crate::urn::Urn;

/// When writes become visible to reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Immediate,
    OnSync,
}

/// A write waiting for the next sync
#[derive(Debug, Clone)]
enum StagedWrite {
    Add(Edge),
    RemoveEdges {
        node: Urn,
        relationship_types: Vec<String>,
        filter: RelationshipFilter,
    },
    RemoveNode(Urn),
    Clear,
}

type EdgeMap = BTreeMap<EdgeKey, Edge>;

/// GraphService backed by process memory
#[derive(Debug)]
pub struct MemoryGraphService {
    edges: RwLock<EdgeMap>,
    staged: Mutex<Vec<StagedWrite>>,
    visibility: Visibility,
    registry: Arc<SchemaRegistry>,
}

impl MemoryGraphService {
    /// Create an immediately consistent store with its own schema registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(SchemaRegistry::new()), Visibility::Immediate)
    }

    /// Create a store whose writes only show up after `sync`
    pub fn buffered() -> Self {
        Self::with_registry(Arc::new(SchemaRegistry::new()), Visibility::OnSync)
    }

    pub fn with_registry(registry: Arc<SchemaRegistry>, visibility: Visibility) -> Self {
        Self {
            edges: RwLock::new(BTreeMap::new()),
            staged: Mutex::new(Vec::new()),
            visibility,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Number of visible edges
    pub fn edge_count(&self) -> usize {
        self.edges.read().len()
    }

    /// Number of writes waiting for `sync`
    pub fn pending_writes(&self) -> usize {
        self.staged.lock().len()
    }

    /// Snapshot of every visible edge, in key order
    pub fn edges(&self) -> Vec<Edge> {
        self.edges.read().values().cloned().collect()
    }

    fn submit(&self, write: StagedWrite) {
        match self.visibility {
            Visibility::Immediate => self.apply(write),
            Visibility::OnSync => self.staged.lock().push(write),
        }
    }

    fn apply(&self, write: StagedWrite) {
        match write {
            StagedWrite::Add(edge) => {
                // Registered under the edge lock, so a concurrent clear cannot drop it
                let mut edges = self.edges.write();
                self.registry.register_edge(&edge);
                trace!(
                    source = %edge.source,
                    destination = %edge.destination,
                    relationship_type = %edge.relationship_type,
                    "Storing edge"
                );
                edges.insert(edge.key(), edge);
            }
            StagedWrite::RemoveEdges {
                node,
                relationship_types,
                filter,
            } => {
                let mut edges = self.edges.write();
                let before = edges.len();
                edges.retain(|_, edge| {
                    !(relationship_types.contains(&edge.relationship_type)
                        && filter.selects(edge, &node))
                });
                debug!(
                    node = %node,
                    direction = %filter.direction,
                    removed = before - edges.len(),
                    "Removed edges from node"
                );
            }
            StagedWrite::RemoveNode(node) => {
                let mut edges = self.edges.write();
                let before = edges.len();
                edges.retain(|_, edge| !edge.touches(&node));
                debug!(node = %node, removed = before - edges.len(), "Removed node");
            }
            StagedWrite::Clear => {
                let mut edges = self.edges.write();
                edges.clear();
                self.registry.clear();
                debug!("Cleared in-memory graph");
            }
        }
    }
}

impl Default for MemoryGraphService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphService for MemoryGraphService {
    async fn add_edge(&self, edge: Edge) -> GraphResult<()> {
        self.submit(StagedWrite::Add(edge));
        Ok(())
    }

    async fn remove_edges_from_node(
        &self,
        node: &Urn,
        relationship_types: &[String],
        relationship_filter: &RelationshipFilter,
    ) -> GraphResult<()> {
        validate_relationship_types(relationship_types)?;
        self.submit(StagedWrite::RemoveEdges {
            node: node.clone(),
            relationship_types: relationship_types.to_vec(),
            filter: relationship_filter.clone(),
        });
        Ok(())
    }

    async fn remove_node(&self, node: &Urn) -> GraphResult<()> {
        self.submit(StagedWrite::RemoveNode(node.clone()));
        Ok(())
    }

    async fn clear(&self) -> GraphResult<()> {
        self.submit(StagedWrite::Clear);
        Ok(())
    }

    async fn find_related_urns(&self, query: &RelatedUrnsQuery) -> GraphResult<Vec<String>> {
        let edges = self.edges.read();
        query.evaluate(edges.values())
    }

    async fn relationship_types(&self) -> GraphResult<Vec<String>> {
        let types: BTreeSet<String> = self
            .edges
            .read()
            .keys()
            .map(|key| key.relationship_type.clone())
            .collect();
        Ok(types.into_iter().collect())
    }

    async fn sync(&self) -> GraphResult<()> {
        let staged = std::mem::take(&mut *self.staged.lock());
        if !staged.is_empty() {
            debug!(writes = staged.len(), "Applying staged writes");
        }
        for write in staged {
            self.apply(write);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn urn(s: &str) -> Urn {
        s.parse().unwrap()
    }

    fn downstream(src: &str, dst: &str) -> Edge {
        Edge::new(urn(src), urn(dst), "DownstreamOf")
    }

    #[tokio::test]
    async fn test_duplicate_add_is_idempotent() {
        let store = MemoryGraphService::new();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();

        assert_eq!(store.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_readd_replaces_properties() {
        let store = MemoryGraphService::new();
        let edge = downstream("urn:li:dataset:b", "urn:li:dataset:a");
        store
            .add_edge(edge.clone().with_property("job", json!("nightly")))
            .await
            .unwrap();
        store
            .add_edge(edge.with_property("job", json!("hourly")))
            .await
            .unwrap();

        let edges = store.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].properties["job"], json!("hourly"));
    }

    #[tokio::test]
    async fn test_add_registers_schema_fields() {
        let store = MemoryGraphService::new();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();

        assert!(store.registry().has_type_field("dataset", "DownstreamOf"));
    }

    #[tokio::test]
    async fn test_buffered_writes_wait_for_sync() {
        let store = MemoryGraphService::buffered();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();

        let query = RelatedUrnsQuery::new(["DownstreamOf"]);
        assert!(store.find_related_urns(&query).await.unwrap().is_empty());
        assert_eq!(store.pending_writes(), 1);

        store.sync().await.unwrap();

        assert_eq!(
            store.find_related_urns(&query).await.unwrap(),
            vec!["urn:li:dataset:a"]
        );
        assert_eq!(store.pending_writes(), 0);
    }

    #[tokio::test]
    async fn test_buffered_writes_apply_in_order() {
        let store = MemoryGraphService::buffered();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();
        store.remove_node(&urn("urn:li:dataset:b")).await.unwrap();
        store
            .add_edge(downstream("urn:li:dataset:c", "urn:li:dataset:a"))
            .await
            .unwrap();
        store.sync().await.unwrap();

        let edges = store.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, urn("urn:li:dataset:c"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_clear_keep_registry_complete() {
        let store = Arc::new(MemoryGraphService::new());

        let mut handles = Vec::new();
        for writer in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    store
                        .add_edge(Edge::new(
                            urn(&format!("urn:li:dataset:w{}x{}", writer, i)),
                            urn("urn:li:corpuser:u"),
                            format!("Type{}", i % 5),
                        ))
                        .await
                        .unwrap();
                }
            }));
        }
        let clearer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..20 {
                    store.clear().await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        for handle in handles.into_iter().chain(std::iter::once(clearer)) {
            handle.await.unwrap();
        }

        for edge in store.edges() {
            assert!(store.registry().has_field(&edge.relationship_type));
            assert!(store
                .registry()
                .has_type_field(edge.source.entity_type(), &edge.relationship_type));
        }
    }

    #[tokio::test]
    async fn test_remove_edges_rejects_empty_types() {
        let store = MemoryGraphService::new();
        let err = store
            .remove_edges_from_node(
                &urn("urn:li:dataset:a"),
                &[],
                &RelationshipFilter::undirected(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::GraphError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_relationship_types_are_derived() {
        let store = MemoryGraphService::new();
        store
            .add_edge(downstream("urn:li:dataset:b", "urn:li:dataset:a"))
            .await
            .unwrap();
        store
            .add_edge(Edge::new(
                urn("urn:li:dataset:b"),
                urn("urn:li:corpuser:u"),
                "HasOwner",
            ))
            .await
            .unwrap();

        assert_eq!(
            store.relationship_types().await.unwrap(),
            vec!["DownstreamOf", "HasOwner"]
        );

        store.remove_node(&urn("urn:li:corpuser:u")).await.unwrap();
        assert_eq!(
            store.relationship_types().await.unwrap(),
            vec!["DownstreamOf"]
        );
    }
}
