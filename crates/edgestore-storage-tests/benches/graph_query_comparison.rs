//! Compare traversal cost across backends on a synthetic lineage graph

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use edgestore_core::{
    Edge, Filter, GraphService, MemoryGraphService, RelatedUrnsQuery, RelationshipFilter, Urn,
};
use edgestore_sqlite::SqliteGraphService;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Runtime;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn dataset(idx: usize) -> Urn {
    format!("urn:li:dataset:(urn:li:dataPlatform:hive,table{},PROD)", idx)
        .parse()
        .expect("generated urn parses")
}

fn owner(idx: usize) -> Urn {
    format!("urn:li:user:owner{}", idx)
        .parse()
        .expect("generated urn parses")
}

/// Each dataset points at a random earlier one and has one of a few owners
fn lineage(size: usize) -> Vec<Edge> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut edges = Vec::with_capacity(size * 2);
    for idx in 1..size {
        let upstream = rng.random_range(0..idx);
        edges.push(Edge::new(dataset(idx), dataset(upstream), "DownstreamOf"));
        edges.push(Edge::new(dataset(idx), owner(idx % 17), "hasOwner"));
    }
    edges
}

fn backends(rt: &Runtime, edges: &[Edge]) -> Vec<(&'static str, Arc<dyn GraphService>)> {
    let memory: Arc<dyn GraphService> = Arc::new(MemoryGraphService::new());
    let sqlite: Arc<dyn GraphService> =
        Arc::new(SqliteGraphService::memory().expect("Failed to open SQLite"));
    let backends = vec![("memory", memory), ("sqlite", sqlite)];
    rt.block_on(async {
        for (_, service) in &backends {
            for edge in edges {
                service.add_edge(edge.clone()).await.expect("add_edge failed");
            }
            service.sync().await.expect("sync failed");
        }
    });
    backends
}

fn bench_related_urns(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to build runtime");
    let mut group = c.benchmark_group("find_related_urns");

    for size in SIZES {
        let edges = lineage(size);
        let anchored = RelatedUrnsQuery::new(["DownstreamOf"])
            .source_filter(Filter::urn(&dataset(0)))
            .relationship_filter(RelationshipFilter::incoming())
            .page(0, 100);
        let by_type = RelatedUrnsQuery::new(["DownstreamOf", "hasOwner"])
            .source_type("user")
            .relationship_filter(RelationshipFilter::undirected())
            .page(0, 100);

        for (name, service) in backends(&rt, &edges) {
            group.bench_with_input(BenchmarkId::new(format!("{}/anchored", name), size), &size, |b, _| {
                b.to_async(&rt).iter(|| async {
                    service.find_related_urns(&anchored).await.expect("query failed")
                });
            });
            group.bench_with_input(BenchmarkId::new(format!("{}/by_type", name), size), &size, |b, _| {
                b.to_async(&rt).iter(|| async {
                    service.find_related_urns(&by_type).await.expect("query failed")
                });
            });
        }
    }

    group.finish();
}

fn bench_add_edge(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to build runtime");
    let edges = lineage(1_000);
    let mut group = c.benchmark_group("add_edge");

    for (name, service) in backends(&rt, &[]) {
        group.bench_function(name, |b| {
            let mut next = 0usize;
            b.to_async(&rt).iter(|| {
                let edge = edges[next % edges.len()].clone();
                next += 1;
                let service = Arc::clone(&service);
                async move { service.add_edge(edge).await.expect("add_edge failed") }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_related_urns, bench_add_edge);
criterion_main!(benches);
