//! The shared lineage/ownership graph every contract test starts from
//!
//! ```text
//! dataset two   --DownstreamOf--> dataset one
//! dataset three --DownstreamOf--> dataset two
//! dataset four  --DownstreamOf--> dataset two
//! dataset one   --hasOwner-->     user one
//! dataset two   --hasOwner-->     user one
//! dataset three --hasOwner-->     user two
//! dataset four  --hasOwner-->     user two
//! ```

use edgestore_core::{
    Edge, Filter, GraphService, RelatedUrnsQuery, RelationshipFilter, Urn,
};

pub const DATASET_TYPE: &str = "dataset";
pub const USER_TYPE: &str = "user";
/// Empty type string: any entity type
pub const ANY_TYPE: &str = "";

pub const DATASET_ONE: &str = "urn:li:dataset:(urn:li:dataPlatform:type,SampleDatasetOne,PROD)";
pub const DATASET_TWO: &str = "urn:li:dataset:(urn:li:dataPlatform:type,SampleDatasetTwo,PROD)";
pub const DATASET_THREE: &str =
    "urn:li:dataset:(urn:li:dataPlatform:type,SampleDatasetThree,PROD)";
pub const DATASET_FOUR: &str = "urn:li:dataset:(urn:li:dataPlatform:type,SampleDatasetFour,PROD)";

pub const USER_ONE: &str = "urn:li:user:(urn:li:user:system,Ingress,PROD)";
pub const USER_TWO: &str = "urn:li:user:(urn:li:user:individual,UserA,DEV)";

pub const DOWNSTREAM_OF: &str = "DownstreamOf";
pub const HAS_OWNER: &str = "hasOwner";

pub const ALL_RELATIONSHIP_TYPES: [&str; 2] = [DOWNSTREAM_OF, HAS_OWNER];

/// Parse a URN constant
pub fn urn(s: &str) -> Urn {
    s.parse()
        .unwrap_or_else(|e| panic!("scenario urn {} does not parse: {}", s, e))
}

/// The seven seed edges
pub fn seed_edges() -> Vec<Edge> {
    vec![
        Edge::new(urn(DATASET_TWO), urn(DATASET_ONE), DOWNSTREAM_OF),
        Edge::new(urn(DATASET_THREE), urn(DATASET_TWO), DOWNSTREAM_OF),
        Edge::new(urn(DATASET_FOUR), urn(DATASET_TWO), DOWNSTREAM_OF),
        Edge::new(urn(DATASET_ONE), urn(USER_ONE), HAS_OWNER),
        Edge::new(urn(DATASET_TWO), urn(USER_ONE), HAS_OWNER),
        Edge::new(urn(DATASET_THREE), urn(USER_TWO), HAS_OWNER),
        Edge::new(urn(DATASET_FOUR), urn(USER_TWO), HAS_OWNER),
    ]
}

/// Write the seed edges and wait for them to become visible
pub async fn populate(service: &dyn GraphService) {
    for edge in seed_edges() {
        service.add_edge(edge).await.expect("add_edge failed");
    }
    service.sync().await.expect("sync failed");
}

/// Filter matching exactly `urn`
pub fn urn_filter(urn: &str) -> Filter {
    Filter::equals("urn", urn)
}

/// Owned, sorted copy of expected URN strings (results are ordered by URN)
pub fn sorted(expected: &[&str]) -> Vec<String> {
    let mut owned: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    owned.sort();
    owned.dedup();
    owned
}

/// Query builder over the seed types
pub fn query(relationship_types: &[&str], relationship_filter: RelationshipFilter) -> RelatedUrnsQuery {
    RelatedUrnsQuery::new(relationship_types.iter().copied()).relationship_filter(relationship_filter)
}

/// Run a query, panicking on error
pub async fn related(service: &dyn GraphService, query: &RelatedUrnsQuery) -> Vec<String> {
    service
        .find_related_urns(query)
        .await
        .unwrap_or_else(|e| panic!("find_related_urns({:?}) failed: {}", query, e))
}
