use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use items_pod::database_api::generate_document_id;
use items_pod::database_api::DocumentStore;
use items_pod::database_sqlite::SqliteStore;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;

fn document() -> Map<String, Value> {
    json!({"name": "benchmark", "count": 1, "active": true})
        .as_object()
        .cloned()
        .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = SqliteStore::open_in_memory("bench").unwrap();
    let data = document();

    c.bench_function("inserting documents into the SQLite store", |b| {
        b.iter(|| {
            runtime
                .block_on(store.insert(&generate_document_id(), &data))
                .unwrap()
        })
    });

    runtime.block_on(store.insert("known", &data)).unwrap();
    c.bench_function("reading one document from the SQLite store", |b| {
        b.iter(|| runtime.block_on(store.get("known")).unwrap())
    });

    c.bench_function("updating one document in the SQLite store", |b| {
        b.iter(|| runtime.block_on(store.update("known", &data)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
