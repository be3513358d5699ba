//! Direction-aware edge matching
//!
//! Every direction is expanded into one or two [`Reading`]s of an edge. A reading says
//! which endpoint plays the anchor and which one is reported as the result. Query and
//! removal paths in every backend go through [`Direction::readings`] so OUTGOING,
//! INCOMING and UNDIRECTED are defined in exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::edge::Edge;
use crate::urn::Urn;

/// Direction of traversal relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// The anchor is the edge source
    #[default]
    Outgoing,
    /// The anchor is the edge destination
    Incoming,
    /// The anchor may play either role
    Undirected,
}

/// Endpoint role within a stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Source,
    Destination,
}

impl Role {
    pub fn endpoint<'a>(&self, edge: &'a Edge) -> &'a Urn {
        match self {
            Role::Source => &edge.source,
            Role::Destination => &edge.destination,
        }
    }
}

/// One way of reading an edge relative to an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reading {
    pub anchor: Role,
    pub result: Role,
}

const OUTGOING: Reading = Reading {
    anchor: Role::Source,
    result: Role::Destination,
};

const INCOMING: Reading = Reading {
    anchor: Role::Destination,
    result: Role::Source,
};

impl Reading {
    /// Split an edge into its (anchor, result) endpoints under this reading
    pub fn orient<'a>(&self, edge: &'a Edge) -> (&'a Urn, &'a Urn) {
        (self.anchor.endpoint(edge), self.result.endpoint(edge))
    }
}

impl Direction {
    pub fn readings(&self) -> &'static [Reading] {
        match self {
            Direction::Outgoing => &[OUTGOING],
            Direction::Incoming => &[INCOMING],
            Direction::Undirected => &[OUTGOING, INCOMING],
        }
    }

    /// Result-side endpoints of `edge` for every reading whose anchor passes
    /// `anchor_matches`.
    ///
    /// A self-loop read undirected yields the same endpoint twice; callers dedup.
    pub fn related_endpoints<'a, F>(
        &self,
        edge: &'a Edge,
        anchor_matches: F,
    ) -> impl Iterator<Item = &'a Urn> + 'a
    where
        F: Fn(&Urn) -> bool + 'a,
    {
        self.readings().iter().filter_map(move |reading| {
            let (anchor, result) = reading.orient(edge);
            anchor_matches(anchor).then_some(result)
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outgoing => "OUTGOING",
            Direction::Incoming => "INCOMING",
            Direction::Undirected => "UNDIRECTED",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OUTGOING" | "OUT" => Ok(Direction::Outgoing),
            "INCOMING" | "IN" => Ok(Direction::Incoming),
            "UNDIRECTED" | "BOTH" => Ok(Direction::Undirected),
            other => Err(GraphError::invalid_argument(format!(
                "unknown direction '{}'",
                other
            ))),
        }
    }
}
