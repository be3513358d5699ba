//! Subcommand implementations
//!
//! Each command returns the lines it wants printed so `main` owns stdout.

pub mod mutate;
pub mod query;

use anyhow::Result;
use edgestore_core::{GraphService, Urn};

use crate::cli::Commands;

/// Run one command against `service`
pub async fn execute(command: Commands, service: &dyn GraphService) -> Result<Vec<String>> {
    let lines = match command {
        Commands::AddEdge {
            source,
            destination,
            relationship_type,
            properties,
        } => {
            mutate::add_edge(service, &source, &destination, relationship_type, &properties)
                .await?
        }
        Commands::Related(args) => query::related(service, args).await?,
        Commands::RemoveEdges {
            node,
            relationship_types,
            direction,
            other_type,
        } => {
            mutate::remove_edges(service, &node, relationship_types, direction, other_type)
                .await?
        }
        Commands::RemoveNode { node } => mutate::remove_node(service, &node).await?,
        Commands::Clear => mutate::clear(service).await?,
        Commands::Types => query::types(service).await?,
    };
    service.sync().await?;
    Ok(lines)
}

pub(crate) fn parse_urn(value: &str) -> Result<Urn> {
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("'{}' is not a valid URN: {}", value, e))
}
