//! Property tests over randomly generated graphs
//!
//! Every backend is compared against the reference evaluation in
//! `RelatedUrnsQuery::evaluate`, and the traversal laws are checked on top.

use std::collections::BTreeSet;
use std::sync::Arc;

use edgestore_core::{
    Direction, Edge, Filter, GraphService, RelatedUrnsQuery, RelationshipFilter, Urn,
};
use edgestore_storage_tests::Fixture;
use proptest::prelude::*;

const RELATIONSHIP_TYPES: [&str; 3] = ["DownstreamOf", "hasOwner", "Contains"];
const NODES: usize = 8;

fn node(idx: usize) -> Urn {
    let entity_type = if idx % 3 == 0 { "user" } else { "dataset" };
    format!("urn:li:{}:node{}", entity_type, idx)
        .parse()
        .expect("generated urn parses")
}

fn edge_strategy() -> impl Strategy<Value = Edge> {
    (0..NODES, 0..NODES, 0..RELATIONSHIP_TYPES.len()).prop_map(|(src, dst, ty)| {
        Edge::new(node(src), node(dst), RELATIONSHIP_TYPES[ty])
    })
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Outgoing),
        Just(Direction::Incoming),
        Just(Direction::Undirected),
    ]
}

fn type_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some("dataset")), Just(Some("user"))]
}

fn query_strategy() -> impl Strategy<Value = RelatedUrnsQuery> {
    (
        prop::sample::subsequence(RELATIONSHIP_TYPES.to_vec(), 1..=RELATIONSHIP_TYPES.len()),
        prop::option::of(0..NODES),
        type_strategy(),
        type_strategy(),
        direction_strategy(),
    )
        .prop_map(|(types, anchor, source_type, destination_type, direction)| {
            let mut query = RelatedUrnsQuery::new(types)
                .relationship_filter(RelationshipFilter::new(direction))
                .page(0, 1000);
            if let Some(idx) = anchor {
                query = query.source_filter(Filter::urn(&node(idx)));
            }
            if let Some(t) = source_type {
                query = query.source_type(t);
            }
            if let Some(t) = destination_type {
                query = query.destination_type(t);
            }
            query
        })
}

fn fixtures() -> Vec<Fixture> {
    let mut fixtures = vec![Fixture::memory(), Fixture::buffered_memory()];
    #[cfg(feature = "sqlite")]
    fixtures.push(Fixture::sqlite_memory());
    fixtures
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

async fn load(service: &Arc<dyn GraphService>, edges: &[Edge]) {
    for edge in edges {
        service.add_edge(edge.clone()).await.expect("add_edge failed");
    }
    service.sync().await.expect("sync failed");
}

async fn run(service: &Arc<dyn GraphService>, query: &RelatedUrnsQuery) -> Vec<String> {
    service
        .find_related_urns(query)
        .await
        .expect("find_related_urns failed")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn backends_agree_with_reference(
        edges in prop::collection::vec(edge_strategy(), 0..40),
        query in query_strategy(),
    ) {
        let expected = query.evaluate(&edges).expect("reference evaluation failed");
        let rt = runtime();
        for fixture in fixtures() {
            let actual = rt.block_on(async {
                load(&fixture.service, &edges).await;
                run(&fixture.service, &query).await
            });
            prop_assert_eq!(&actual, &expected, "backend {}", fixture.name);
        }
    }

    #[test]
    fn undirected_is_union_of_directions(
        edges in prop::collection::vec(edge_strategy(), 0..40),
        query in query_strategy(),
    ) {
        let rt = runtime();
        for fixture in fixtures() {
            rt.block_on(async {
                load(&fixture.service, &edges).await;
            });
            let with = |direction| {
                let q = query.clone().relationship_filter(RelationshipFilter::new(direction));
                rt.block_on(run(&fixture.service, &q))
            };
            let union: BTreeSet<String> = with(Direction::Outgoing)
                .into_iter()
                .chain(with(Direction::Incoming))
                .collect();
            prop_assert_eq!(
                with(Direction::Undirected),
                union.into_iter().collect::<Vec<_>>(),
                "backend {}",
                fixture.name
            );
        }
    }

    #[test]
    fn pages_concatenate_to_full_result(
        edges in prop::collection::vec(edge_strategy(), 0..40),
        query in query_strategy(),
        page_size in 1usize..5,
    ) {
        let rt = runtime();
        for fixture in fixtures() {
            let (full, paged) = rt.block_on(async {
                load(&fixture.service, &edges).await;
                let full = run(&fixture.service, &query).await;
                let mut paged = Vec::new();
                let mut offset = 0;
                loop {
                    let page = run(&fixture.service, &query.clone().page(offset, page_size)).await;
                    if page.is_empty() {
                        break;
                    }
                    offset += page.len();
                    paged.extend(page);
                }
                (full, paged)
            });
            prop_assert_eq!(&paged, &full, "backend {}", fixture.name);
            let distinct: BTreeSet<&String> = full.iter().collect();
            prop_assert_eq!(distinct.len(), full.len());
        }
    }

    #[test]
    fn removed_node_is_unreachable(
        edges in prop::collection::vec(edge_strategy(), 1..40),
        victim in 0..NODES,
    ) {
        let rt = runtime();
        let victim = node(victim);
        let every_type = RelatedUrnsQuery::new(RELATIONSHIP_TYPES)
            .relationship_filter(RelationshipFilter::undirected())
            .page(0, 1000);
        for fixture in fixtures() {
            let (around, everywhere) = rt.block_on(async {
                load(&fixture.service, &edges).await;
                fixture.service.remove_node(&victim).await.expect("remove_node failed");
                fixture.service.sync().await.expect("sync failed");
                let around = run(
                    &fixture.service,
                    &every_type.clone().source_filter(Filter::urn(&victim)),
                )
                .await;
                (around, run(&fixture.service, &every_type).await)
            });
            prop_assert!(around.is_empty(), "backend {}", fixture.name);

            let survivors: Vec<Edge> = edges.iter().filter(|e| !e.touches(&victim)).cloned().collect();
            let expected = every_type.evaluate(&survivors).expect("reference evaluation failed");
            prop_assert_eq!(&everywhere, &expected, "backend {}", fixture.name);
        }
    }
}
