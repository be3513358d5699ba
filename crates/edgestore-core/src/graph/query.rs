//! Related-URN traversal queries
//!
//! [`RelatedUrnsQuery`] carries every input of `find_related_urns`. The anchor side is
//! constrained by `source_type`/`source_filter`; the reported side by
//! `destination_type`/`destination_filter` and the relationship filter's criteria.
//! [`RelatedUrnsQuery::evaluate`] is the reference evaluation shared by in-process
//! backends.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::edge::Edge;
use crate::graph::filter::{Filter, RelationshipFilter};
use crate::urn::Urn;

/// Default page size used by the builder
pub const DEFAULT_COUNT: usize = 10;

/// Offset/count window over a candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: usize,
    pub count: usize,
}

impl Page {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    /// Build a page from untyped input, rejecting negative values
    pub fn from_signed(offset: i64, count: i64) -> GraphResult<Self> {
        let offset = usize::try_from(offset).map_err(|_| {
            GraphError::invalid_argument(format!("offset must be non-negative, got {}", offset))
        })?;
        let count = usize::try_from(count).map_err(|_| {
            GraphError::invalid_argument(format!("count must be non-negative, got {}", count))
        })?;
        Ok(Self { offset, count })
    }

    /// Slice `[offset, offset + count)` out of `items`, clipped to its length
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.count)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_COUNT)
    }
}

/// A directional, filtered traversal query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedUrnsQuery {
    /// Required anchor entity type; `None` matches any type
    pub source_type: Option<String>,
    pub source_filter: Filter,
    /// Required result entity type; `None` matches any type
    pub destination_type: Option<String>,
    pub destination_filter: Filter,
    pub relationship_types: Vec<String>,
    pub relationship_filter: RelationshipFilter,
    pub page: Page,
}

impl RelatedUrnsQuery {
    /// Start a query over the given relationship types
    pub fn new<I, S>(relationship_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_type: None,
            source_filter: Filter::empty(),
            destination_type: None,
            destination_filter: Filter::empty(),
            relationship_types: relationship_types.into_iter().map(Into::into).collect(),
            relationship_filter: RelationshipFilter::default(),
            page: Page::default(),
        }
    }

    /// Builder-style: restrict the anchor entity type. An empty string means any type.
    #[must_use]
    pub fn source_type(mut self, entity_type: impl Into<String>) -> Self {
        self.source_type = non_empty(entity_type.into());
        self
    }

    #[must_use]
    pub fn source_filter(mut self, filter: Filter) -> Self {
        self.source_filter = filter;
        self
    }

    /// Builder-style: restrict the result entity type. An empty string means any type.
    #[must_use]
    pub fn destination_type(mut self, entity_type: impl Into<String>) -> Self {
        self.destination_type = non_empty(entity_type.into());
        self
    }

    #[must_use]
    pub fn destination_filter(mut self, filter: Filter) -> Self {
        self.destination_filter = filter;
        self
    }

    #[must_use]
    pub fn relationship_filter(mut self, filter: RelationshipFilter) -> Self {
        self.relationship_filter = filter;
        self
    }

    #[must_use]
    pub fn page(mut self, offset: usize, count: usize) -> Self {
        self.page = Page::new(offset, count);
        self
    }

    /// Reject structurally invalid queries
    pub fn validate(&self) -> GraphResult<()> {
        validate_relationship_types(&self.relationship_types)
    }

    /// Check an endpoint in the anchor role
    pub fn anchor_matches(&self, urn: &Urn) -> bool {
        type_matches(self.source_type.as_deref(), urn) && self.source_filter.matches(urn)
    }

    /// Check an endpoint in the result role
    pub fn result_matches(&self, urn: &Urn) -> bool {
        type_matches(self.destination_type.as_deref(), urn)
            && self.destination_filter.matches(urn)
            && self.relationship_filter.criteria.matches(urn)
    }

    /// Evaluate against an in-memory edge set.
    ///
    /// Results are deduplicated and ordered by canonical URN string, so repeated calls
    /// over unchanged data page through the same sequence.
    pub fn evaluate<'a, I>(&self, edges: I) -> GraphResult<Vec<String>>
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        self.validate()?;

        let direction = self.relationship_filter.direction;
        let mut related = BTreeSet::new();
        for edge in edges {
            if !self.relationship_types.contains(&edge.relationship_type) {
                continue;
            }
            for result in direction.related_endpoints(edge, |anchor| self.anchor_matches(anchor)) {
                if self.result_matches(result) {
                    related.insert(result.to_string());
                }
            }
        }

        Ok(self.page.apply(related.into_iter().collect()))
    }
}

/// Require at least one non-empty relationship type name
pub fn validate_relationship_types(relationship_types: &[String]) -> GraphResult<()> {
    if relationship_types.is_empty() {
        return Err(GraphError::invalid_argument(
            "at least one relationship type is required",
        ));
    }
    if relationship_types.iter().any(String::is_empty) {
        return Err(GraphError::invalid_argument(
            "relationship type names must not be empty",
        ));
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn type_matches(expected: Option<&str>, urn: &Urn) -> bool {
    expected.map_or(true, |t| t == urn.entity_type())
}
