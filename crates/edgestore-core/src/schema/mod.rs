//! Schema Registry
//!
//! Process-wide record of which field names have been written, globally and per
//! entity type. Backends consult it to build queries that only reference known
//! fields, and feed it whenever they persist a field name for the first time.
//!
//! ## Concurrency
//!
//! The registry holds an immutable [`SchemaSnapshot`] behind an `Arc`. Writers take the
//! write lock and swap in an updated copy (copy-on-write via `Arc::make_mut`); readers
//! clone the current `Arc` under the read lock. A reader therefore always sees a state
//! produced by some prefix of the serialized writes, never a per-type addition without
//! its global addition.
//!
//! Growth is append-only. Only [`SchemaRegistry::clear`] removes fields.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::edge::Edge;
use crate::graph::filter::EntityField;

static SHARED: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| Arc::new(SchemaRegistry::new()));

/// Immutable view of the registry at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    fields: BTreeSet<String>,
    types: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaSnapshot {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every field name known for any type
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    /// Field names per entity type
    pub fn types(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.types
    }

    pub fn fields_of(&self, entity_type: &str) -> Option<&BTreeSet<String>> {
        self.types.get(entity_type)
    }

    pub fn has_type(&self, entity_type: &str) -> bool {
        self.types.contains_key(entity_type)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn has_type_field(&self, entity_type: &str, field: &str) -> bool {
        self.types
            .get(entity_type)
            .is_some_and(|fields| fields.contains(field))
    }

    /// Check that every per-type field is also registered globally
    pub fn validate(&self) -> GraphResult<()> {
        for (entity_type, fields) in &self.types {
            if let Some(orphan) = fields.iter().find(|f| !self.fields.contains(*f)) {
                return Err(GraphError::SchemaCorruption(format!(
                    "field '{}' of type '{}' is missing from the global field set",
                    orphan, entity_type
                )));
            }
        }
        Ok(())
    }

    fn insert(&mut self, entity_type: &str, field: &str) -> bool {
        let per_type = self.types.entry(entity_type.to_string()).or_default();
        let added = per_type.insert(field.to_string());
        self.fields.insert(field.to_string());
        added
    }
}

/// Concurrently mutated cache of known field names
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    current: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every backend instance
    pub fn shared() -> Arc<Self> {
        Arc::clone(&*SHARED)
    }

    /// Current state as an immutable snapshot
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Register `field` for `entity_type` and globally, as one atomic update.
    ///
    /// Returns `true` if the registry changed.
    pub fn register_field(&self, entity_type: &str, field: &str) -> bool {
        self.register_fields(entity_type, [field])
    }

    /// Register several fields for one type under a single write.
    ///
    /// Returns `true` if the registry changed.
    pub fn register_fields<I, S>(&self, entity_type: &str, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<S> = fields.into_iter().collect();

        // Skip the write lock when everything is already known
        {
            let current = self.current.read();
            if fields
                .iter()
                .all(|f| current.has_type_field(entity_type, f.as_ref()))
            {
                return false;
            }
        }

        let mut guard = self.current.write();
        let next = Arc::make_mut(&mut *guard);
        let mut changed = false;
        for field in &fields {
            if next.insert(entity_type, field.as_ref()) {
                debug!(entity_type, field = field.as_ref(), "Registered schema field");
                changed = true;
            }
        }
        changed
    }

    /// Register every field name an edge writes.
    ///
    /// The relationship type is recorded on both endpoint types, edge properties on
    /// the source type, and the built-in entity fields on both.
    pub fn register_edge(&self, edge: &Edge) -> bool {
        let builtin = EntityField::all().map(|f| f.as_str());

        let source_fields = builtin
            .iter()
            .copied()
            .chain(std::iter::once(edge.relationship_type.as_str()))
            .chain(edge.properties.keys().map(String::as_str));
        let destination_fields = builtin
            .iter()
            .copied()
            .chain(std::iter::once(edge.relationship_type.as_str()));

        let source_changed = self.register_fields(edge.source.entity_type(), source_fields);
        let destination_changed =
            self.register_fields(edge.destination.entity_type(), destination_fields);
        source_changed || destination_changed
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    pub fn has_type(&self, entity_type: &str) -> bool {
        self.current.read().has_type(entity_type)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.current.read().has_field(field)
    }

    pub fn has_type_field(&self, entity_type: &str, field: &str) -> bool {
        self.current.read().has_type_field(entity_type, field)
    }

    /// Copy of the fields known for `entity_type` (empty if the type is unknown)
    pub fn fields_of(&self, entity_type: &str) -> BTreeSet<String> {
        self.current
            .read()
            .fields_of(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of the global field set
    pub fn all_fields(&self) -> BTreeSet<String> {
        self.current.read().fields().clone()
    }

    /// Copy of the per-type field map
    pub fn all_types(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.current.read().types().clone()
    }

    /// Check the subset invariant on the current snapshot
    pub fn validate(&self) -> GraphResult<()> {
        self.snapshot().validate()
    }

    /// Forget every registered field
    pub fn clear(&self) {
        *self.current.write() = Arc::new(SchemaSnapshot::default());
        debug!("Schema registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SchemaRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.all_fields().is_empty());
        assert!(registry.all_types().is_empty());
        assert!(registry.fields_of("dataset").is_empty());
    }

    #[test]
    fn test_register_field_updates_type_and_global() {
        let registry = SchemaRegistry::new();

        assert!(registry.register_field("dataset", "DownstreamOf"));
        assert!(!registry.register_field("dataset", "DownstreamOf"));

        assert!(registry.has_type("dataset"));
        assert!(registry.has_field("DownstreamOf"));
        assert!(registry.has_type_field("dataset", "DownstreamOf"));
        assert!(!registry.has_type_field("corpuser", "DownstreamOf"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_same_field_on_two_types() {
        let registry = SchemaRegistry::new();
        registry.register_field("dataset", "urn");
        assert!(registry.register_field("corpuser", "urn"));

        assert_eq!(registry.all_fields().len(), 1);
        assert_eq!(registry.all_types().len(), 2);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let registry = SchemaRegistry::new();
        registry.register_field("dataset", "HasOwner");

        let before = registry.snapshot();
        registry.register_field("dataset", "DownstreamOf");

        assert!(!before.has_field("DownstreamOf"));
        assert!(registry.snapshot().has_field("DownstreamOf"));
    }

    #[test]
    fn test_returned_sets_are_copies() {
        let registry = SchemaRegistry::new();
        registry.register_field("dataset", "HasOwner");

        let mut fields = registry.fields_of("dataset");
        fields.insert("Injected".to_string());
        let mut all = registry.all_fields();
        all.clear();

        assert!(!registry.has_field("Injected"));
        assert!(registry.has_field("HasOwner"));
    }

    #[test]
    fn test_register_edge() {
        let registry = SchemaRegistry::new();
        let edge = Edge::new(
            "urn:li:dataset:a".parse().unwrap(),
            "urn:li:corpuser:u".parse().unwrap(),
            "HasOwner",
        )
        .with_property("since", serde_json::json!("2021"));

        assert!(registry.register_edge(&edge));
        assert!(!registry.register_edge(&edge));

        assert!(registry.has_type_field("dataset", "HasOwner"));
        assert!(registry.has_type_field("dataset", "since"));
        assert!(registry.has_type_field("corpuser", "HasOwner"));
        assert!(!registry.has_type_field("corpuser", "since"));
        assert!(registry.has_type_field("corpuser", "urn"));
        assert!(registry.has_type_field("dataset", "entityType"));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_clear_resets_everything() {
        let registry = SchemaRegistry::new();
        registry.register_fields("dataset", ["urn", "entityType", "DownstreamOf"]);
        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.has_type("dataset"));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_orphan_field() {
        let mut snapshot = SchemaSnapshot::default();
        snapshot
            .types
            .entry("dataset".to_string())
            .or_default()
            .insert("orphan".to_string());

        let err = snapshot.validate().unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_concurrent_writers_and_readers_never_tear() {
        let registry = Arc::new(SchemaRegistry::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..200 {
                        registry.register_field(&format!("type{}", w), &format!("field{}", i));
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..500 {
                        registry.validate().unwrap();
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(registry.all_fields().len(), 200);
        assert_eq!(registry.all_types().len(), 4);
        assert_eq!(registry.fields_of("type3").len(), 200);
    }

    #[test]
    fn test_shared_registry_is_one_instance() {
        assert!(Arc::ptr_eq(&SchemaRegistry::shared(), &SchemaRegistry::shared()));
    }
}
