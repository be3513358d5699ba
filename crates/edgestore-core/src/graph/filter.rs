//! Attribute and relationship filters
//!
//! An attribute [`Filter`] is a disjunction of conjunctions of equality criteria,
//! evaluated against the attributes an entity exposes (see [`EntityField`]). The empty
//! filter matches every entity.

use serde::{Deserialize, Serialize};

use crate::graph::direction::Direction;
use crate::graph::edge::Edge;
use crate::urn::Urn;

/// Attributes every graph endpoint exposes to filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityField {
    /// Canonical URN string
    Urn,
    /// Entity type segment of the URN
    EntityType,
}

impl EntityField {
    pub const URN: &'static str = "urn";
    pub const ENTITY_TYPE: &'static str = "entityType";

    /// Resolve a criterion field name; unknown names resolve to `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::URN => Some(Self::Urn),
            Self::ENTITY_TYPE => Some(Self::EntityType),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urn => Self::URN,
            Self::EntityType => Self::ENTITY_TYPE,
        }
    }

    /// Built-in field names, registered in the schema for every entity type
    pub fn all() -> [Self; 2] {
        [Self::Urn, Self::EntityType]
    }
}

/// A single `field == value` predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,
    pub value: String,
}

impl Criterion {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluate against an entity.
    ///
    /// Unknown fields and values that cannot describe any entity (e.g. a `urn`
    /// criterion holding a malformed URN) never match.
    pub fn matches(&self, entity: &Urn) -> bool {
        match EntityField::from_name(&self.field) {
            Some(EntityField::Urn) => self
                .value
                .parse::<Urn>()
                .map(|expected| &expected == entity)
                .unwrap_or(false),
            Some(EntityField::EntityType) => self.value == entity.entity_type(),
            None => false,
        }
    }
}

/// Criteria that must all hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjunctiveCriterion {
    #[serde(default)]
    pub and: Vec<Criterion>,
}

impl ConjunctiveCriterion {
    pub fn new(and: Vec<Criterion>) -> Self {
        Self { and }
    }

    pub fn matches(&self, entity: &Urn) -> bool {
        self.and.iter().all(|c| c.matches(entity))
    }
}

/// Disjunction of conjunctions of equality criteria
///
/// `criteria` is one conjunction; `or` lists alternative conjunctions. An entity
/// passes when it satisfies any alternative. With no criteria at all, everything
/// passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub or: Vec<ConjunctiveCriterion>,
}

impl Filter {
    /// The match-all filter
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single conjunction
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            criteria,
            or: Vec::new(),
        }
    }

    /// A filter with one equality criterion
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(vec![Criterion::new(field, value)])
    }

    /// Match exactly one entity
    pub fn urn(urn: &Urn) -> Self {
        Self::equals(EntityField::URN, urn.to_string())
    }

    /// Builder-style: add an alternative conjunction
    #[must_use]
    pub fn or(mut self, alternative: Vec<Criterion>) -> Self {
        self.or.push(ConjunctiveCriterion::new(alternative));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty() && self.or.is_empty()
    }

    /// The alternatives this filter accepts, in evaluation order
    pub fn alternatives(&self) -> Vec<&[Criterion]> {
        let mut alternatives = Vec::with_capacity(self.or.len() + 1);
        if !self.criteria.is_empty() {
            alternatives.push(self.criteria.as_slice());
        }
        alternatives.extend(self.or.iter().map(|c| c.and.as_slice()));
        alternatives
    }

    pub fn matches(&self, entity: &Urn) -> bool {
        if self.is_empty() {
            return true;
        }
        self.alternatives()
            .into_iter()
            .any(|conjunction| conjunction.iter().all(|c| c.matches(entity)))
    }
}

/// Direction selector plus a filter on the entity at the other end of the edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipFilter {
    pub direction: Direction,
    #[serde(default)]
    pub criteria: Filter,
}

impl RelationshipFilter {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            criteria: Filter::empty(),
        }
    }

    pub fn outgoing() -> Self {
        Self::new(Direction::Outgoing)
    }

    pub fn incoming() -> Self {
        Self::new(Direction::Incoming)
    }

    pub fn undirected() -> Self {
        Self::new(Direction::Undirected)
    }

    /// Builder-style: restrict which entities on the other side qualify
    #[must_use]
    pub fn with_criteria(mut self, criteria: Filter) -> Self {
        self.criteria = criteria;
        self
    }

    /// Check whether `edge`, seen from `node`, runs in this filter's direction and ends
    /// at a qualifying entity
    pub fn selects(&self, edge: &Edge, node: &Urn) -> bool {
        self.direction
            .related_endpoints(edge, |anchor| anchor == node)
            .any(|other| self.criteria.matches(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urn(s: &str) -> Urn {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::empty().matches(&urn("urn:li:dataset:a")));
        assert!(Filter::empty().alternatives().is_empty());
    }

    #[test]
    fn test_urn_criterion() {
        let filter = Filter::urn(&urn("urn:li:dataset:a"));

        assert!(filter.matches(&urn("urn:li:dataset:a")));
        assert!(!filter.matches(&urn("urn:li:dataset:b")));
    }

    #[test]
    fn test_malformed_urn_value_never_matches() {
        let filter = Filter::equals("urn", "dataset-a");
        assert!(!filter.matches(&urn("urn:li:dataset:a")));
    }

    #[test]
    fn test_unknown_field_never_matches() {
        let filter = Filter::equals("platform", "hive");
        assert!(!filter.matches(&urn("urn:li:dataset:a")));
    }

    #[test]
    fn test_conjunction_requires_all() {
        let filter = Filter::new(vec![
            Criterion::new("entityType", "dataset"),
            Criterion::new("urn", "urn:li:dataset:a"),
        ]);

        assert!(filter.matches(&urn("urn:li:dataset:a")));
        assert!(!filter.matches(&urn("urn:li:dataset:b")));
    }

    #[test]
    fn test_disjunction_accepts_any_alternative() {
        let filter = Filter::urn(&urn("urn:li:dataset:a"))
            .or(vec![Criterion::new("entityType", "corpuser")]);

        assert_eq!(filter.alternatives().len(), 2);
        assert!(filter.matches(&urn("urn:li:dataset:a")));
        assert!(filter.matches(&urn("urn:li:corpuser:u")));
        assert!(!filter.matches(&urn("urn:li:dataset:b")));
    }

    #[test]
    fn test_or_only_filter() {
        let filter = Filter::empty().or(vec![Criterion::new("entityType", "chart")]);

        assert!(!filter.is_empty());
        assert!(filter.matches(&urn("urn:li:chart:c")));
        assert!(!filter.matches(&urn("urn:li:dataset:c")));
    }

    #[test]
    fn test_relationship_filter_constructors() {
        assert_eq!(RelationshipFilter::outgoing().direction, Direction::Outgoing);
        assert_eq!(RelationshipFilter::incoming().direction, Direction::Incoming);
        assert_eq!(
            RelationshipFilter::undirected().direction,
            Direction::Undirected
        );
        assert!(RelationshipFilter::default().criteria.is_empty());
    }

    #[test]
    fn test_selects_by_direction_and_other_side() {
        let edge = Edge::new(urn("urn:li:dataset:a"), urn("urn:li:corpuser:u"), "HasOwner");
        let a = urn("urn:li:dataset:a");
        let u = urn("urn:li:corpuser:u");

        assert!(RelationshipFilter::outgoing().selects(&edge, &a));
        assert!(!RelationshipFilter::outgoing().selects(&edge, &u));
        assert!(RelationshipFilter::incoming().selects(&edge, &u));
        assert!(RelationshipFilter::undirected().selects(&edge, &u));

        let only_datasets = RelationshipFilter::undirected()
            .with_criteria(Filter::equals("entityType", "dataset"));
        assert!(only_datasets.selects(&edge, &u));
        assert!(!only_datasets.selects(&edge, &a));
    }

    #[test]
    fn test_filter_deserializes_from_partial_json() {
        let filter: Filter =
            serde_json::from_str(r#"{"or":[{"and":[{"field":"entityType","value":"dataset"}]}]}"#)
                .unwrap();

        assert!(filter.criteria.is_empty());
        assert!(filter.matches(&urn("urn:li:dataset:a")));
    }
}
