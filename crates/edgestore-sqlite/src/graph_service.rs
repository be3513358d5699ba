//! GraphService implementation for SQLite
//!
//! Edges live in the `edges` table keyed by their identity triple. All work runs on
//! the blocking pool; each mutation is one transaction. The schema registry is
//! hydrated from the table when the service opens and on every `sync`, and updated
//! under the connection lock on every write. Queries always run against the table;
//! the registry is never used to skip one.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgestore_core::graph::{validate_relationship_types, EdgeKey, EntityField};
use edgestore_core::{
    Edge, GraphResult, GraphService, RelatedUrnsQuery, RelationshipFilter, SchemaRegistry, Urn,
};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::config::SqliteConfig;
use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};
use crate::render::{render_related_urns, render_remove_edges};

/// SQLite-backed GraphService
#[derive(Clone)]
pub struct SqliteGraphService {
    pool: SqlitePool,
    registry: Arc<SchemaRegistry>,
}

impl SqliteGraphService {
    /// Wrap an open pool, registering every stored edge in `registry`
    pub fn new(pool: SqlitePool, registry: Arc<SchemaRegistry>) -> SqliteResult<Self> {
        let shapes = pool.with_connection(|conn| hydrate(conn, &registry))?;
        info!(shapes, "SQLite graph service ready");
        Ok(Self { pool, registry })
    }

    /// Open the database at `config` with a registry private to this service
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        Self::new(SqlitePool::new(config)?, Arc::new(SchemaRegistry::new()))
    }

    /// In-memory database with a private registry
    pub fn memory() -> SqliteResult<Self> {
        Self::open(SqliteConfig::memory())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Every stored edge, in key order
    pub fn edges(&self) -> SqliteResult<Vec<Edge>> {
        self.pool.with_connection(load_edges)
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<F, T>(&self, f: F) -> GraphResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || pool.with_connection_mut(f)).await?;
        result.map_err(Into::into)
    }
}

fn load_edges(conn: &Connection) -> SqliteResult<Vec<Edge>> {
    let mut stmt = conn.prepare(
        "SELECT source_urn, destination_urn, relationship_type, properties
         FROM edges
         ORDER BY source_urn, destination_urn, relationship_type",
    )?;
    let rows = stmt.query_map([], raw_edge)?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(decode_edge(row?)?);
    }
    Ok(edges)
}

/// Register the fields of every stored edge in `registry`.
///
/// Returns the number of distinct (source type, destination type, relationship type)
/// shapes found.
fn hydrate(conn: &Connection, registry: &SchemaRegistry) -> SqliteResult<usize> {
    let builtin = EntityField::all().map(|f| f.as_str());

    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT source_type, destination_type, relationship_type FROM edges",
    )?;
    let shapes = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    let mut count = 0;
    for shape in shapes {
        let (source_type, destination_type, relationship_type) = shape?;
        for entity_type in [&source_type, &destination_type] {
            let fields = builtin
                .iter()
                .copied()
                .chain(std::iter::once(relationship_type.as_str()));
            registry.register_fields(entity_type, fields);
        }
        count += 1;
    }

    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT e.source_type, p.key FROM edges e, json_each(e.properties) p",
    )?;
    let properties = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for property in properties {
        let (source_type, key) = property?;
        registry.register_field(&source_type, &key);
    }

    Ok(count)
}

type RawEdge = (String, String, String, String);

fn raw_edge(row: &Row<'_>) -> rusqlite::Result<RawEdge> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_edge((source, destination, relationship_type, properties): RawEdge) -> SqliteResult<Edge> {
    let parse = |s: &str| {
        s.parse::<Urn>()
            .map_err(|e| SqliteError::CorruptRow(format!("stored urn '{}': {}", s, e)))
    };
    let key = EdgeKey {
        source: parse(&source)?,
        destination: parse(&destination)?,
        relationship_type,
    };
    let properties: BTreeMap<String, Value> = serde_json::from_str(&properties)?;
    Ok(key.into_edge(properties))
}

#[async_trait]
impl GraphService for SqliteGraphService {
    async fn add_edge(&self, edge: Edge) -> GraphResult<()> {
        let properties = serde_json::to_string(&edge.properties)?;
        let registry = Arc::clone(&self.registry);

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO edges (source_urn, source_type, destination_urn, destination_type, relationship_type, properties)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(source_urn, destination_urn, relationship_type) DO UPDATE SET
                     properties = excluded.properties",
                params![
                    edge.source.to_string(),
                    edge.source.entity_type(),
                    edge.destination.to_string(),
                    edge.destination.entity_type(),
                    edge.relationship_type,
                    properties,
                ],
            )?;
            // Under the connection lock, so a concurrent clear cannot drop it
            registry.register_edge(&edge);
            trace!(
                source = %edge.source,
                destination = %edge.destination,
                relationship_type = %edge.relationship_type,
                "Stored edge"
            );
            Ok(())
        })
        .await
    }

    async fn remove_edges_from_node(
        &self,
        node: &Urn,
        relationship_types: &[String],
        relationship_filter: &RelationshipFilter,
    ) -> GraphResult<()> {
        validate_relationship_types(relationship_types)?;

        let rendered = render_remove_edges(
            node,
            relationship_types,
            relationship_filter.direction,
            &relationship_filter.criteria,
        );
        let node = node.clone();
        let direction = relationship_filter.direction;

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(&rendered.sql, params_from_iter(rendered.params.iter()))?;
            tx.commit()?;
            debug!(node = %node, direction = %direction, removed, "Removed edges from node");
            Ok(())
        })
        .await
    }

    async fn remove_node(&self, node: &Urn) -> GraphResult<()> {
        let node = node.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM edges WHERE source_urn = ?1 OR destination_urn = ?1",
                [&node],
            )?;
            tx.commit()?;
            debug!(node = %node, removed, "Removed node");
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> GraphResult<()> {
        let registry = Arc::clone(&self.registry);
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM edges", [])?;
            tx.commit()?;
            registry.clear();
            debug!(removed, "Cleared edges table");
            Ok(())
        })
        .await
    }

    async fn find_related_urns(&self, query: &RelatedUrnsQuery) -> GraphResult<Vec<String>> {
        query.validate()?;

        if !query
            .relationship_types
            .iter()
            .any(|t| self.registry.has_field(t))
        {
            trace!(
                relationship_types = ?query.relationship_types,
                "Relationship types not in schema registry"
            );
        }

        let rendered = render_related_urns(query);
        self.run(move |conn| {
            let mut stmt = conn.prepare_cached(&rendered.sql)?;
            let rows = stmt.query_map(params_from_iter(rendered.params.iter()), |row| {
                row.get::<_, String>(0)
            })?;
            let urns = rows.collect::<Result<Vec<_>, _>>()?;
            trace!(results = urns.len(), "Related URN query");
            Ok(urns)
        })
        .await
    }

    async fn relationship_types(&self) -> GraphResult<Vec<String>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT relationship_type FROM edges ORDER BY relationship_type",
            )?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    /// Checkpoint the WAL and pick up fields written by other handles on the same
    /// database, or dropped by another store sharing the registry
    async fn sync(&self) -> GraphResult<()> {
        let pool = self.pool.clone();
        let registry = Arc::clone(&self.registry);
        let shapes = tokio::task::spawn_blocking(move || {
            pool.checkpoint()?;
            pool.with_connection(|conn| hydrate(conn, &registry))
        })
        .await??;
        trace!(shapes, "Schema registry rehydrated");
        Ok(())
    }
}
