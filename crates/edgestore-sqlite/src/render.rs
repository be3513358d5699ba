//! SQL rendering for graph queries and removals
//!
//! Queries are rendered from the same [`Direction::readings`] and [`Filter`] model the
//! in-memory backend evaluates, so both backends share one definition of direction.
//! Every value is bound as a positional parameter.

use edgestore_core::graph::{Criterion, Direction, EntityField, Filter, Role};
use edgestore_core::{RelatedUrnsQuery, Urn};
use rusqlite::types::Value;

/// A rendered statement plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates positional parameters while fragments are rendered
#[derive(Debug, Default)]
struct Binder {
    params: Vec<Value>,
}

impl Binder {
    fn text(&mut self, value: impl Into<String>) -> &'static str {
        self.params.push(Value::Text(value.into()));
        "?"
    }

    fn integer(&mut self, value: i64) -> &'static str {
        self.params.push(Value::Integer(value));
        "?"
    }

    fn text_list(&mut self, values: &[String]) -> String {
        let placeholders: Vec<&str> = values.iter().map(|v| self.text(v.as_str())).collect();
        placeholders.join(", ")
    }
}

fn prefix(role: Role) -> &'static str {
    match role {
        Role::Source => "source",
        Role::Destination => "destination",
    }
}

/// Predicate for one criterion against the endpoint in `role`
fn render_criterion(criterion: &Criterion, role: Role, binder: &mut Binder) -> String {
    match EntityField::from_name(&criterion.field) {
        Some(EntityField::Urn) => match criterion.value.parse::<Urn>() {
            Ok(urn) => format!("{}_urn = {}", prefix(role), binder.text(urn.to_string())),
            Err(_) => "0".to_string(),
        },
        Some(EntityField::EntityType) => format!(
            "{}_type = {}",
            prefix(role),
            binder.text(criterion.value.as_str())
        ),
        None => "0".to_string(),
    }
}

/// Predicate for a whole filter, or `None` when the filter matches everything
fn render_filter(filter: &Filter, role: Role, binder: &mut Binder) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = filter
        .alternatives()
        .into_iter()
        .map(|conjunction| {
            let terms: Vec<String> = conjunction
                .iter()
                .map(|c| render_criterion(c, role, binder))
                .collect();
            if terms.is_empty() {
                "1".to_string()
            } else {
                format!("({})", terms.join(" AND "))
            }
        })
        .collect();
    Some(format!("({})", alternatives.join(" OR ")))
}

fn render_type(entity_type: Option<&str>, role: Role, binder: &mut Binder) -> Option<String> {
    entity_type.map(|t| format!("{}_type = {}", prefix(role), binder.text(t)))
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Render `find_related_urns`.
///
/// One `SELECT` per direction reading, combined with `UNION` (which deduplicates),
/// ordered by the canonical URN string and windowed with `LIMIT`/`OFFSET`.
pub fn render_related_urns(query: &RelatedUrnsQuery) -> RenderedSql {
    let mut binder = Binder::default();

    let selects: Vec<String> = query
        .relationship_filter
        .direction
        .readings()
        .iter()
        .map(|reading| {
            let mut conditions = vec![format!(
                "relationship_type IN ({})",
                binder.text_list(&query.relationship_types)
            )];
            conditions.extend(render_type(
                query.source_type.as_deref(),
                reading.anchor,
                &mut binder,
            ));
            conditions.extend(render_filter(
                &query.source_filter,
                reading.anchor,
                &mut binder,
            ));
            conditions.extend(render_type(
                query.destination_type.as_deref(),
                reading.result,
                &mut binder,
            ));
            conditions.extend(render_filter(
                &query.destination_filter,
                reading.result,
                &mut binder,
            ));
            conditions.extend(render_filter(
                &query.relationship_filter.criteria,
                reading.result,
                &mut binder,
            ));

            format!(
                "SELECT {}_urn AS urn FROM edges WHERE {}",
                prefix(reading.result),
                conditions.join(" AND ")
            )
        })
        .collect();

    let limit = binder.integer(saturating_i64(query.page.count));
    let offset = binder.integer(saturating_i64(query.page.offset));
    let sql = format!(
        "{} ORDER BY urn LIMIT {} OFFSET {}",
        selects.join(" UNION "),
        limit,
        offset
    );

    RenderedSql {
        sql,
        params: binder.params,
    }
}

/// Render `remove_edges_from_node` as a single `DELETE`
pub fn render_remove_edges(
    node: &Urn,
    relationship_types: &[String],
    direction: Direction,
    criteria: &Filter,
) -> RenderedSql {
    let mut binder = Binder::default();
    let types = binder.text_list(relationship_types);

    let readings: Vec<String> = direction
        .readings()
        .iter()
        .map(|reading| {
            let mut conditions = vec![format!(
                "{}_urn = {}",
                prefix(reading.anchor),
                binder.text(node.to_string())
            )];
            conditions.extend(render_filter(criteria, reading.result, &mut binder));
            format!("({})", conditions.join(" AND "))
        })
        .collect();

    let sql = format!(
        "DELETE FROM edges WHERE relationship_type IN ({}) AND ({})",
        types,
        readings.join(" OR ")
    );

    RenderedSql {
        sql,
        params: binder.params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgestore_core::graph::RelationshipFilter;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_outgoing_query_binds_anchor_on_source() {
        let query = RelatedUrnsQuery::new(["DownstreamOf"])
            .source_type("dataset")
            .page(0, 5);
        let rendered = render_related_urns(&query);

        assert_eq!(
            rendered.sql,
            "SELECT destination_urn AS urn FROM edges WHERE relationship_type IN (?) \
             AND source_type = ? ORDER BY urn LIMIT ? OFFSET ?"
        );
        assert_eq!(
            rendered.params,
            vec![
                text("DownstreamOf"),
                text("dataset"),
                Value::Integer(5),
                Value::Integer(0)
            ]
        );
    }

    #[test]
    fn test_undirected_query_unions_both_readings() {
        let query = RelatedUrnsQuery::new(["HasOwner"])
            .relationship_filter(RelationshipFilter::undirected());
        let rendered = render_related_urns(&query);

        assert!(rendered.sql.contains("SELECT destination_urn AS urn"));
        assert!(rendered.sql.contains(" UNION SELECT source_urn AS urn"));
        assert_eq!(rendered.params.len(), 4);
    }

    #[test]
    fn test_unknown_field_renders_false() {
        let query = RelatedUrnsQuery::new(["HasOwner"])
            .destination_filter(Filter::equals("platform", "hive"));
        let rendered = render_related_urns(&query);

        assert!(rendered.sql.contains("AND ((0))"));
    }

    #[test]
    fn test_malformed_urn_renders_false() {
        let query = RelatedUrnsQuery::new(["HasOwner"])
            .source_filter(Filter::equals("urn", "not-a-urn"));
        let rendered = render_related_urns(&query);

        assert!(rendered.sql.contains("AND ((0))"));
        assert_eq!(rendered.params.len(), 3);
    }

    #[test]
    fn test_disjunction_renders_or() {
        let filter = Filter::equals("entityType", "dataset").or(vec![Criterion::new(
            "urn",
            "urn:li:corpuser:u",
        )]);
        let query = RelatedUrnsQuery::new(["HasOwner"]).destination_filter(filter);
        let rendered = render_related_urns(&query);

        assert!(rendered
            .sql
            .contains("((destination_type = ?) OR (destination_urn = ?))"));
    }

    #[test]
    fn test_unbounded_count_saturates() {
        let query = RelatedUrnsQuery::new(["HasOwner"]).page(0, usize::MAX);
        let rendered = render_related_urns(&query);

        assert_eq!(rendered.params[1], Value::Integer(i64::MAX));
    }

    #[test]
    fn test_remove_edges_incoming() {
        let node: Urn = "urn:li:corpuser:u".parse().unwrap();
        let rendered = render_remove_edges(
            &node,
            &["HasOwner".to_string()],
            Direction::Incoming,
            &Filter::empty(),
        );

        assert_eq!(
            rendered.sql,
            "DELETE FROM edges WHERE relationship_type IN (?) AND ((destination_urn = ?))"
        );
        assert_eq!(
            rendered.params,
            vec![text("HasOwner"), text("urn:li:corpuser:u")]
        );
    }

    #[test]
    fn test_remove_edges_undirected_with_criteria() {
        let node: Urn = "urn:li:dataset:b".parse().unwrap();
        let rendered = render_remove_edges(
            &node,
            &["DownstreamOf".to_string()],
            Direction::Undirected,
            &Filter::equals("entityType", "dataset"),
        );

        assert_eq!(
            rendered.sql,
            "DELETE FROM edges WHERE relationship_type IN (?) AND \
             ((source_urn = ? AND ((destination_type = ?))) OR \
             (destination_urn = ? AND ((source_type = ?))))"
        );
    }
}
