//! Backend-agnostic behavioural tests for `GraphService`
//!
//! Every backend must produce the same results for the same edge set. The
//! [`graph_service_contract!`] macro expands the whole suite into `#[tokio::test]`
//! functions for one fixture constructor:
//!
//! ```ignore
//! mod sqlite_memory {
//!     edgestore_storage_tests::graph_service_contract!(
//!         edgestore_storage_tests::Fixture::sqlite_memory()
//!     );
//! }
//! ```

pub mod contract;
pub mod fixture;
pub mod scenario;

pub use fixture::Fixture;

/// Generate the contract suite for a fixture expression
#[macro_export]
macro_rules! graph_service_contract {
    ($fixture:expr) => {
        $crate::graph_service_contract!(@tests $fixture;
            scenario_urns_parse,
            source_entity_filter,
            destination_entity_filter,
            source_type,
            destination_type,
            offset_and_count,
            remove_edges_from_node,
            remove_edges_respects_other_side_criteria,
            remove_node,
            clear,
            direction_symmetry,
            results_deduplicated_across_types,
            self_loop_reported_once,
            attribute_filters,
            malformed_filter_values_match_nothing,
            empty_relationship_types_rejected,
            unknown_nodes_are_noops,
            duplicate_add_is_one_edge,
            registry_tracks_writes,
            concurrent_writers,
        );
    };
    (@tests $fixture:expr; $($name:ident),* $(,)?) => {
        $(
            #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
            async fn $name() {
                let fixture = $fixture;
                $crate::contract::$name(&fixture).await;
            }
        )*
    };
}
