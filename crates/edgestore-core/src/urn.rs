//! Typed entity identifiers
//!
//! Every entity in the graph is referenced by a URN of the form
//! `urn:<namespace>:<entityType>:<key>`, for example
//! `urn:li:dataset:(urn:li:dataPlatform:hive,SampleTable,PROD)`.
//!
//! The key is opaque to the store. Tuple keys (`(a,b,c)`) can be split into their
//! top-level components with [`Urn::key_parts`]; nested tuples and embedded URNs stay
//! intact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GraphError, GraphResult};

/// Namespace used when none is given explicitly
pub const DEFAULT_NAMESPACE: &str = "li";

const URN_PREFIX: &str = "urn:";

/// Typed, canonical reference to a graph entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Urn {
    namespace: String,
    entity_type: String,
    key: String,
}

impl Urn {
    /// Create a URN in the default namespace
    pub fn new(entity_type: impl Into<String>, key: impl Into<String>) -> GraphResult<Self> {
        Self::with_namespace(DEFAULT_NAMESPACE, entity_type, key)
    }

    /// Create a URN in an explicit namespace
    pub fn with_namespace(
        namespace: impl Into<String>,
        entity_type: impl Into<String>,
        key: impl Into<String>,
    ) -> GraphResult<Self> {
        let urn = Self {
            namespace: namespace.into(),
            entity_type: entity_type.into(),
            key: key.into(),
        };
        urn.validate()?;
        Ok(urn)
    }

    /// Build a tuple-keyed URN, e.g. `urn:li:dataset:(platform,name,PROD)`
    pub fn from_tuple<I, S>(entity_type: impl Into<String>, parts: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(entity_type, format!("({})", joined))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The entity type segment (`dataset`, `corpuser`, ...)
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The raw key segment, including surrounding parentheses for tuple keys
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Top-level components of the key.
    ///
    /// A tuple key `(a,(b,c),d)` yields `["a", "(b,c)", "d"]`; any other key yields itself.
    pub fn key_parts(&self) -> Vec<&str> {
        let inner = match self
            .key
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => inner,
            None => return vec![self.key.as_str()],
        };

        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (idx, ch) in inner.char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&inner[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        parts.push(&inner[start..]);
        parts
    }

    fn validate(&self) -> GraphResult<()> {
        if self.namespace.is_empty() || self.namespace.contains(':') {
            return Err(GraphError::invalid_argument(format!(
                "invalid URN namespace '{}'",
                self.namespace
            )));
        }
        if self.entity_type.is_empty() || self.entity_type.contains(':') {
            return Err(GraphError::invalid_argument(format!(
                "invalid URN entity type '{}'",
                self.entity_type
            )));
        }
        if self.key.is_empty() {
            return Err(GraphError::invalid_argument("URN key must not be empty"));
        }
        if !parens_balanced(&self.key) {
            return Err(GraphError::invalid_argument(format!(
                "unbalanced parentheses in URN key '{}'",
                self.key
            )));
        }
        Ok(())
    }
}

fn parens_balanced(key: &str) -> bool {
    let mut depth = 0i64;
    for ch in key.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}:{}",
            URN_PREFIX, self.namespace, self.entity_type, self.key
        )
    }
}

impl FromStr for Urn {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(URN_PREFIX)
            .ok_or_else(|| GraphError::invalid_argument(format!("'{}' is not a URN", s)))?;

        let mut segments = rest.splitn(3, ':');
        let namespace = segments.next().unwrap_or_default();
        let entity_type = segments.next().unwrap_or_default();
        let key = segments.next().ok_or_else(|| {
            GraphError::invalid_argument(format!("URN '{}' is missing its key", s))
        })?;

        Self::with_namespace(namespace, entity_type, key)
    }
}

impl TryFrom<&str> for Urn {
    type Error = GraphError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
