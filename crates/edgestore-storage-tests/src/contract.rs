//! Behavioural contract of [`edgestore_core::GraphService`]
//!
//! Each function takes a fresh, empty [`Fixture`] and panics on violation. Backends run
//! the whole set through [`crate::graph_service_contract!`].

use std::collections::BTreeSet;
use std::sync::Arc;

use edgestore_core::{
    Criterion, Direction, Edge, Filter, GraphError, GraphService, RelatedUrnsQuery,
    RelationshipFilter,
};

use crate::fixture::Fixture;
use crate::scenario::*;

const DIRECTIONS: [Direction; 3] = [Direction::Outgoing, Direction::Incoming, Direction::Undirected];

fn rel(direction: Direction) -> RelationshipFilter {
    RelationshipFilter::new(direction)
}

pub async fn scenario_urns_parse(_f: &Fixture) {
    for s in [
        DATASET_ONE,
        DATASET_TWO,
        DATASET_THREE,
        DATASET_FOUR,
        USER_ONE,
        USER_TWO,
    ] {
        assert_eq!(urn(s).to_string(), s);
    }
    assert_eq!(urn(DATASET_ONE).entity_type(), DATASET_TYPE);
    assert_eq!(urn(USER_TWO).entity_type(), USER_TYPE);
}

type FilterCase = (&'static str, &'static str, Direction, &'static [&'static str]);

pub async fn source_entity_filter(f: &Fixture) {
    populate(f.service()).await;

    let cases: [FilterCase; 9] = [
        (DATASET_TWO, DOWNSTREAM_OF, Direction::Outgoing, &[DATASET_ONE]),
        (DATASET_TWO, DOWNSTREAM_OF, Direction::Incoming, &[DATASET_THREE, DATASET_FOUR]),
        (
            DATASET_TWO,
            DOWNSTREAM_OF,
            Direction::Undirected,
            &[DATASET_ONE, DATASET_THREE, DATASET_FOUR],
        ),
        (DATASET_TWO, HAS_OWNER, Direction::Outgoing, &[USER_ONE]),
        (DATASET_TWO, HAS_OWNER, Direction::Incoming, &[]),
        (DATASET_TWO, HAS_OWNER, Direction::Undirected, &[USER_ONE]),
        (USER_ONE, HAS_OWNER, Direction::Outgoing, &[]),
        (USER_ONE, HAS_OWNER, Direction::Incoming, &[DATASET_ONE, DATASET_TWO]),
        (USER_ONE, HAS_OWNER, Direction::Undirected, &[DATASET_ONE, DATASET_TWO]),
    ];

    for (anchor, relationship_type, direction, expected) in cases {
        let q = query(&[relationship_type], rel(direction)).source_filter(urn_filter(anchor));
        assert_eq!(
            related(f.service(), &q).await,
            sorted(expected),
            "[{}] source={} type={} direction={}",
            f.name,
            anchor,
            relationship_type,
            direction
        );
    }
}

pub async fn destination_entity_filter(f: &Fixture) {
    populate(f.service()).await;

    let cases: [FilterCase; 9] = [
        (DATASET_TWO, DOWNSTREAM_OF, Direction::Outgoing, &[DATASET_TWO]),
        (DATASET_TWO, DOWNSTREAM_OF, Direction::Incoming, &[DATASET_TWO]),
        (DATASET_TWO, DOWNSTREAM_OF, Direction::Undirected, &[DATASET_TWO]),
        (USER_ONE, DOWNSTREAM_OF, Direction::Outgoing, &[]),
        (USER_ONE, DOWNSTREAM_OF, Direction::Incoming, &[]),
        (USER_ONE, DOWNSTREAM_OF, Direction::Undirected, &[]),
        (USER_ONE, HAS_OWNER, Direction::Outgoing, &[USER_ONE]),
        (USER_ONE, HAS_OWNER, Direction::Incoming, &[]),
        (USER_ONE, HAS_OWNER, Direction::Undirected, &[USER_ONE]),
    ];

    for (target, relationship_type, direction, expected) in cases {
        let q =
            query(&[relationship_type], rel(direction)).destination_filter(urn_filter(target));
        assert_eq!(
            related(f.service(), &q).await,
            sorted(expected),
            "[{}] destination={} type={} direction={}",
            f.name,
            target,
            relationship_type,
            direction
        );
    }
}

const ALL_DATASETS: &[&str] = &[DATASET_ONE, DATASET_TWO, DATASET_THREE, DATASET_FOUR];

pub async fn source_type(f: &Fixture) {
    populate(f.service()).await;

    let cases: [FilterCase; 9] = [
        (DATASET_TYPE, DOWNSTREAM_OF, Direction::Outgoing, &[DATASET_ONE, DATASET_TWO]),
        (
            DATASET_TYPE,
            DOWNSTREAM_OF,
            Direction::Incoming,
            &[DATASET_TWO, DATASET_THREE, DATASET_FOUR],
        ),
        (DATASET_TYPE, DOWNSTREAM_OF, Direction::Undirected, ALL_DATASETS),
        (USER_TYPE, DOWNSTREAM_OF, Direction::Outgoing, &[]),
        (USER_TYPE, DOWNSTREAM_OF, Direction::Incoming, &[]),
        (USER_TYPE, DOWNSTREAM_OF, Direction::Undirected, &[]),
        (USER_TYPE, HAS_OWNER, Direction::Outgoing, &[]),
        (USER_TYPE, HAS_OWNER, Direction::Incoming, ALL_DATASETS),
        (USER_TYPE, HAS_OWNER, Direction::Undirected, ALL_DATASETS),
    ];

    for (entity_type, relationship_type, direction, expected) in cases {
        let q = query(&[relationship_type], rel(direction))
            .source_type(entity_type)
            .destination_type(ANY_TYPE);
        assert_eq!(
            related(f.service(), &q).await,
            sorted(expected),
            "[{}] source_type={} type={} direction={}",
            f.name,
            entity_type,
            relationship_type,
            direction
        );
    }
}

pub async fn destination_type(f: &Fixture) {
    populate(f.service()).await;

    let cases: [FilterCase; 9] = [
        (DATASET_TYPE, DOWNSTREAM_OF, Direction::Outgoing, &[DATASET_ONE, DATASET_TWO]),
        (
            DATASET_TYPE,
            DOWNSTREAM_OF,
            Direction::Incoming,
            &[DATASET_TWO, DATASET_THREE, DATASET_FOUR],
        ),
        (DATASET_TYPE, DOWNSTREAM_OF, Direction::Undirected, ALL_DATASETS),
        (DATASET_TYPE, HAS_OWNER, Direction::Outgoing, &[]),
        (DATASET_TYPE, HAS_OWNER, Direction::Incoming, ALL_DATASETS),
        (DATASET_TYPE, HAS_OWNER, Direction::Undirected, ALL_DATASETS),
        (USER_TYPE, HAS_OWNER, Direction::Outgoing, &[USER_ONE, USER_TWO]),
        (USER_TYPE, HAS_OWNER, Direction::Incoming, &[]),
        (USER_TYPE, HAS_OWNER, Direction::Undirected, &[USER_ONE, USER_TWO]),
    ];

    for (entity_type, relationship_type, direction, expected) in cases {
        let q = query(&[relationship_type], rel(direction))
            .source_type(ANY_TYPE)
            .destination_type(entity_type);
        assert_eq!(
            related(f.service(), &q).await,
            sorted(expected),
            "[{}] destination_type={} type={} direction={}",
            f.name,
            entity_type,
            relationship_type,
            direction
        );
    }
}

pub async fn offset_and_count(f: &Fixture) {
    populate(f.service()).await;

    let base = query(&[DOWNSTREAM_OF], RelationshipFilter::outgoing()).source_type(DATASET_TYPE);
    let all = related(f.service(), &base.clone().page(0, 100)).await;
    assert_eq!(all, sorted(&[DATASET_ONE, DATASET_TWO]));

    let mut one_by_one = Vec::new();
    for idx in 0..all.len() {
        one_by_one.extend(related(f.service(), &base.clone().page(idx, 1)).await);
    }
    assert_eq!(one_by_one, all, "[{}] single-item pages", f.name);

    assert!(related(f.service(), &base.clone().page(all.len(), 10)).await.is_empty());
    assert!(related(f.service(), &base.clone().page(100, 10)).await.is_empty());
    assert!(related(f.service(), &base.clone().page(0, 0)).await.is_empty());

    let undirected = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected());
    assert_eq!(
        related(f.service(), &undirected.clone().page(1, 2)).await,
        related(f.service(), &undirected.page(0, 10)).await[1..3].to_vec()
    );
}

pub async fn remove_edges_from_node(f: &Fixture) {
    let cases: [(Direction, &[&str]); 3] = [
        (Direction::Outgoing, &[DATASET_THREE, DATASET_FOUR]),
        (Direction::Incoming, &[DATASET_ONE]),
        (Direction::Undirected, &[]),
    ];

    for (direction, expected_after) in cases {
        f.service().clear().await.expect("clear failed");
        f.service().sync().await.expect("sync failed");
        populate(f.service()).await;

        let node = urn(DATASET_TWO);
        let removed_types = vec![DOWNSTREAM_OF.to_string()];
        let same_types = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
            .source_filter(urn_filter(DATASET_TWO));
        let other_types = query(&[HAS_OWNER], RelationshipFilter::undirected())
            .source_filter(urn_filter(DATASET_TWO));

        let before = related(f.service(), &same_types).await;
        assert_eq!(before, sorted(&[DATASET_ONE, DATASET_THREE, DATASET_FOUR]));
        let other_before = related(f.service(), &other_types).await;
        assert!(!other_before.is_empty());

        f.service()
            .remove_edges_from_node(&node, &removed_types, &rel(direction))
            .await
            .expect("remove_edges_from_node failed");
        f.service().sync().await.expect("sync failed");

        let after = related(f.service(), &same_types).await;
        assert_eq!(
            after,
            sorted(expected_after),
            "[{}] remove {} edges of {}",
            f.name,
            direction,
            DATASET_TWO
        );
        assert!(after.iter().all(|u| before.contains(u)), "removal added results");
        assert_eq!(
            related(f.service(), &other_types).await,
            other_before,
            "[{}] other relationship types must be untouched",
            f.name
        );
    }
}

pub async fn remove_edges_respects_other_side_criteria(f: &Fixture) {
    populate(f.service()).await;

    let only_dataset_one = rel(Direction::Incoming).with_criteria(urn_filter(DATASET_ONE));
    f.service()
        .remove_edges_from_node(&urn(USER_ONE), &[HAS_OWNER.to_string()], &only_dataset_one)
        .await
        .expect("remove_edges_from_node failed");
    f.service().sync().await.expect("sync failed");

    let owners_of_user_one = query(&[HAS_OWNER], RelationshipFilter::incoming())
        .source_filter(urn_filter(USER_ONE));
    assert_eq!(
        related(f.service(), &owners_of_user_one).await,
        sorted(&[DATASET_TWO])
    );

    // Edges of other nodes stay put
    let owners_of_user_two = query(&[HAS_OWNER], RelationshipFilter::incoming())
        .source_filter(urn_filter(USER_TWO));
    assert_eq!(
        related(f.service(), &owners_of_user_two).await,
        sorted(&[DATASET_THREE, DATASET_FOUR])
    );
}

pub async fn remove_node(f: &Fixture) {
    populate(f.service()).await;

    let datasets_downstream = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
        .source_type(DATASET_TYPE);
    let users_owned = query(&[HAS_OWNER], RelationshipFilter::undirected()).source_type(USER_TYPE);

    assert_eq!(related(f.service(), &datasets_downstream).await, sorted(ALL_DATASETS));
    assert_eq!(related(f.service(), &users_owned).await, sorted(ALL_DATASETS));

    f.service()
        .remove_node(&urn(DATASET_TWO))
        .await
        .expect("remove_node failed");
    f.service().sync().await.expect("sync failed");

    // Every DownstreamOf edge touched dataset two
    assert!(related(f.service(), &datasets_downstream).await.is_empty());
    assert_eq!(
        related(f.service(), &users_owned).await,
        sorted(&[DATASET_ONE, DATASET_THREE, DATASET_FOUR])
    );

    let outgoing = query(&[DOWNSTREAM_OF], RelationshipFilter::outgoing()).source_type(DATASET_TYPE);
    assert!(related(f.service(), &outgoing).await.is_empty());

    let owners_of_user_one = query(&[HAS_OWNER], RelationshipFilter::incoming())
        .source_filter(urn_filter(USER_ONE));
    assert_eq!(
        related(f.service(), &owners_of_user_one).await,
        sorted(&[DATASET_ONE])
    );

    for direction in DIRECTIONS {
        let touching = query(&ALL_RELATIONSHIP_TYPES, rel(direction))
            .source_filter(urn_filter(DATASET_TWO));
        assert!(related(f.service(), &touching).await.is_empty());
    }

    assert_eq!(
        f.service().relationship_types().await.expect("relationship_types failed"),
        vec![HAS_OWNER.to_string()]
    );
}

pub async fn clear(f: &Fixture) {
    populate(f.service()).await;

    let datasets_downstream = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
        .source_type(DATASET_TYPE);
    let users_owned = query(&[HAS_OWNER], RelationshipFilter::undirected()).source_type(USER_TYPE);
    assert_eq!(related(f.service(), &datasets_downstream).await, sorted(ALL_DATASETS));
    assert_eq!(related(f.service(), &users_owned).await, sorted(ALL_DATASETS));
    assert!(!f.registry.is_empty());

    f.service().clear().await.expect("clear failed");
    f.service().sync().await.expect("sync failed");

    assert!(related(f.service(), &datasets_downstream).await.is_empty());
    assert!(related(f.service(), &users_owned).await.is_empty());
    assert!(f
        .service()
        .relationship_types()
        .await
        .expect("relationship_types failed")
        .is_empty());
    assert!(f.registry.is_empty(), "[{}] clear must reset the registry", f.name);

    // Idempotent
    f.service().clear().await.expect("second clear failed");
    f.service().sync().await.expect("sync failed");
    assert!(related(f.service(), &users_owned).await.is_empty());

    // Usable again afterwards
    populate(f.service()).await;
    assert_eq!(related(f.service(), &users_owned).await, sorted(ALL_DATASETS));
}

pub async fn direction_symmetry(f: &Fixture) {
    populate(f.service()).await;

    let type_sets: [&[&str]; 3] = [&[DOWNSTREAM_OF], &[HAS_OWNER], &ALL_RELATIONSHIP_TYPES];
    for anchor in [
        DATASET_ONE,
        DATASET_TWO,
        DATASET_THREE,
        DATASET_FOUR,
        USER_ONE,
        USER_TWO,
    ] {
        for types in type_sets {
            let run = |direction| {
                query(types, rel(direction))
                    .source_filter(urn_filter(anchor))
                    .page(0, 100)
            };
            let outgoing = related(f.service(), &run(Direction::Outgoing)).await;
            let incoming = related(f.service(), &run(Direction::Incoming)).await;
            let undirected = related(f.service(), &run(Direction::Undirected)).await;

            let union: BTreeSet<String> = outgoing.into_iter().chain(incoming).collect();
            assert_eq!(
                undirected,
                union.into_iter().collect::<Vec<_>>(),
                "[{}] anchor={} types={:?}",
                f.name,
                anchor,
                types
            );
        }
    }
}

pub async fn results_deduplicated_across_types(f: &Fixture) {
    populate(f.service()).await;

    let q = query(&ALL_RELATIONSHIP_TYPES, RelationshipFilter::undirected())
        .source_filter(urn_filter(DATASET_TWO));
    assert_eq!(
        related(f.service(), &q).await,
        sorted(&[DATASET_ONE, DATASET_THREE, DATASET_FOUR, USER_ONE])
    );

    // Both users are reached through two datasets each
    let users = query(&[HAS_OWNER], RelationshipFilter::outgoing()).source_type(DATASET_TYPE);
    assert_eq!(related(f.service(), &users).await, sorted(&[USER_ONE, USER_TWO]));
}

pub async fn self_loop_reported_once(f: &Fixture) {
    f.service()
        .add_edge(Edge::new(urn(DATASET_ONE), urn(DATASET_ONE), DOWNSTREAM_OF))
        .await
        .expect("add_edge failed");
    f.service().sync().await.expect("sync failed");

    let q = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
        .source_filter(urn_filter(DATASET_ONE));
    assert_eq!(related(f.service(), &q).await, sorted(&[DATASET_ONE]));
}

pub async fn attribute_filters(f: &Fixture) {
    populate(f.service()).await;
    let around_two = || {
        query(&ALL_RELATIONSHIP_TYPES, RelationshipFilter::undirected())
            .source_filter(urn_filter(DATASET_TWO))
    };

    let either = Filter::equals("entityType", USER_TYPE)
        .or(vec![Criterion::new("urn", DATASET_ONE)]);
    assert_eq!(
        related(f.service(), &around_two().destination_filter(either)).await,
        sorted(&[DATASET_ONE, USER_ONE])
    );

    let both = Filter::new(vec![
        Criterion::new("entityType", DATASET_TYPE),
        Criterion::new("urn", DATASET_THREE),
    ]);
    assert_eq!(
        related(f.service(), &around_two().destination_filter(both)).await,
        sorted(&[DATASET_THREE])
    );

    let datasets_only = RelationshipFilter::undirected()
        .with_criteria(Filter::equals("entityType", DATASET_TYPE));
    assert_eq!(
        related(
            f.service(),
            &around_two().relationship_filter(datasets_only)
        )
        .await,
        sorted(&[DATASET_ONE, DATASET_THREE, DATASET_FOUR])
    );
}

pub async fn malformed_filter_values_match_nothing(f: &Fixture) {
    populate(f.service()).await;

    let not_a_urn = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
        .source_filter(Filter::equals("urn", "SampleDatasetTwo"));
    assert!(related(f.service(), &not_a_urn).await.is_empty());

    let unknown_field = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected())
        .destination_filter(Filter::equals("platform", "hive"));
    assert!(related(f.service(), &unknown_field).await.is_empty());

    let unknown_type = query(&["NeverWritten"], RelationshipFilter::undirected());
    assert!(related(f.service(), &unknown_type).await.is_empty());
}

pub async fn empty_relationship_types_rejected(f: &Fixture) {
    populate(f.service()).await;

    let q = RelatedUrnsQuery::new(Vec::<String>::new());
    assert!(matches!(
        f.service().find_related_urns(&q).await,
        Err(GraphError::InvalidArgument(_))
    ));

    assert!(matches!(
        f.service()
            .remove_edges_from_node(&urn(DATASET_TWO), &[], &RelationshipFilter::undirected())
            .await,
        Err(GraphError::InvalidArgument(_))
    ));
}

pub async fn unknown_nodes_are_noops(f: &Fixture) {
    populate(f.service()).await;
    let ghost = urn("urn:li:dataset:ghost");

    f.service().remove_node(&ghost).await.expect("remove_node failed");
    f.service()
        .remove_edges_from_node(
            &ghost,
            &[DOWNSTREAM_OF.to_string()],
            &RelationshipFilter::undirected(),
        )
        .await
        .expect("remove_edges_from_node failed");
    f.service().sync().await.expect("sync failed");

    let around_ghost = query(&ALL_RELATIONSHIP_TYPES, RelationshipFilter::undirected())
        .source_filter(Filter::urn(&ghost));
    assert!(related(f.service(), &around_ghost).await.is_empty());

    let all = query(&[DOWNSTREAM_OF], RelationshipFilter::undirected()).source_type(DATASET_TYPE);
    assert_eq!(related(f.service(), &all).await, sorted(ALL_DATASETS));
}

pub async fn duplicate_add_is_one_edge(f: &Fixture) {
    let edge = Edge::new(urn(DATASET_TWO), urn(DATASET_ONE), DOWNSTREAM_OF);
    for value in [1, 2] {
        f.service()
            .add_edge(edge.clone().with_property("run", serde_json::json!(value)))
            .await
            .expect("add_edge failed");
    }
    f.service().sync().await.expect("sync failed");

    f.service()
        .remove_edges_from_node(
            &urn(DATASET_TWO),
            &[DOWNSTREAM_OF.to_string()],
            &RelationshipFilter::outgoing(),
        )
        .await
        .expect("remove_edges_from_node failed");
    f.service().sync().await.expect("sync failed");

    assert!(f
        .service()
        .relationship_types()
        .await
        .expect("relationship_types failed")
        .is_empty());
}

pub async fn registry_tracks_writes(f: &Fixture) {
    assert!(f.registry.is_empty());
    populate(f.service()).await;

    assert!(f.registry.has_type_field(DATASET_TYPE, DOWNSTREAM_OF));
    assert!(f.registry.has_type_field(DATASET_TYPE, HAS_OWNER));
    assert!(f.registry.has_type_field(USER_TYPE, HAS_OWNER));
    assert!(!f.registry.has_type_field(USER_TYPE, DOWNSTREAM_OF));
    assert!(f.registry.has_type_field(USER_TYPE, "urn"));
    assert!(f.registry.has_type_field(DATASET_TYPE, "entityType"));
    f.registry.validate().expect("registry invariant violated");

    assert_eq!(
        f.service().relationship_types().await.expect("relationship_types failed"),
        sorted(&ALL_RELATIONSHIP_TYPES)
    );
}

pub async fn concurrent_writers(f: &Fixture) {
    let mut handles = Vec::new();
    for writer in 0..4 {
        let service = Arc::clone(&f.service);
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                let source = urn(&format!("urn:li:dataset:w{}x{:02}", writer, i));
                service
                    .add_edge(Edge::new(source, urn(USER_ONE), HAS_OWNER))
                    .await
                    .expect("add_edge failed");
            }
        }));
    }
    for handle in handles {
        handle.await.expect("writer panicked");
    }
    f.service().sync().await.expect("sync failed");

    let owned = query(&[HAS_OWNER], RelationshipFilter::incoming())
        .source_filter(urn_filter(USER_ONE))
        .page(0, 1000);
    let result = related(f.service(), &owned).await;
    assert_eq!(result.len(), 100, "[{}] lost writes", f.name);
    f.registry.validate().expect("registry invariant violated");
}
