//! Directed, typed edges between URNs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::urn::Urn;

/// A directed relationship instance between two entities
///
/// Identity is the `(source, destination, relationship_type)` triple; see [`EdgeKey`].
/// Properties ride along with the edge and are replaced when the same triple is
/// written again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: Urn,
    pub destination: Urn,
    pub relationship_type: String,

    /// Optional edge attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Edge {
    /// Create an edge with no properties
    pub fn new(source: Urn, destination: Urn, relationship_type: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            relationship_type: relationship_type.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style: attach one property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// The identity triple of this edge
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source: self.source.clone(),
            destination: self.destination.clone(),
            relationship_type: self.relationship_type.clone(),
        }
    }

    /// Check whether `node` is either endpoint
    pub fn touches(&self, node: &Urn) -> bool {
        &self.source == node || &self.destination == node
    }
}

/// Identity of an edge: two edges with the same key are the same edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: Urn,
    pub destination: Urn,
    pub relationship_type: String,
}

impl EdgeKey {
    /// Rebuild a full edge from this key and its stored properties
    pub fn into_edge(self, properties: BTreeMap<String, Value>) -> Edge {
        Edge {
            source: self.source,
            destination: self.destination,
            relationship_type: self.relationship_type,
            properties,
        }
    }
}
