use anyhow::{bail, Result};
use edgestore_core::{Edge, Filter, GraphService, RelationshipFilter};
use serde_json::Value;
use tracing::info;

use super::parse_urn;
use crate::cli::DirectionArg;

/// Split `key=value`; the value is JSON if it parses, otherwise a plain string
pub fn parse_property(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("property '{}' must look like key=value", raw);
    };
    if key.is_empty() {
        bail!("property '{}' has an empty key", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub async fn add_edge(
    service: &dyn GraphService,
    source: &str,
    destination: &str,
    relationship_type: String,
    properties: &[String],
) -> Result<Vec<String>> {
    let mut edge = Edge::new(parse_urn(source)?, parse_urn(destination)?, relationship_type);
    for raw in properties {
        let (key, value) = parse_property(raw)?;
        edge = edge.with_property(key, value);
    }

    info!(source = %edge.source, destination = %edge.destination, "Adding edge");
    service.add_edge(edge).await?;
    Ok(Vec::new())
}

pub async fn remove_edges(
    service: &dyn GraphService,
    node: &str,
    relationship_types: Vec<String>,
    direction: DirectionArg,
    other_type: Option<String>,
) -> Result<Vec<String>> {
    let node = parse_urn(node)?;
    let mut filter = RelationshipFilter::new(direction.into());
    if let Some(entity_type) = other_type {
        filter = filter.with_criteria(Filter::equals("entityType", entity_type));
    }

    service
        .remove_edges_from_node(&node, &relationship_types, &filter)
        .await?;
    Ok(Vec::new())
}

pub async fn remove_node(service: &dyn GraphService, node: &str) -> Result<Vec<String>> {
    service.remove_node(&parse_urn(node)?).await?;
    Ok(Vec::new())
}

pub async fn clear(service: &dyn GraphService) -> Result<Vec<String>> {
    service.clear().await?;
    Ok(Vec::new())
}
