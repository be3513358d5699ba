//! Typed directed graph relationship store
//!
//! ## Key Components
//!
//! - **Edge / EdgeKey**: directed, typed relationship instances
//! - **Filter / RelationshipFilter**: attribute and direction selection
//! - **Direction**: the single place OUTGOING/INCOMING/UNDIRECTED are interpreted
//! - **RelatedUrnsQuery**: traversal query with deterministic paging
//! - **GraphService**: the backend contract
//! - **MemoryGraphService**: in-process backend

pub mod direction;
pub mod edge;
pub mod filter;
pub mod memory;
pub mod query;
pub mod service;

pub use direction::{Direction, Reading, Role};
pub use edge::{Edge, EdgeKey};
pub use filter::{ConjunctiveCriterion, Criterion, EntityField, Filter, RelationshipFilter};
pub use memory::{MemoryGraphService, Visibility};
pub use query::{validate_relationship_types, Page, RelatedUrnsQuery, DEFAULT_COUNT};
pub use service::GraphService;
