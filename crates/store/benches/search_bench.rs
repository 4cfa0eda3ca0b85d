//! Search latency over a populated store

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use footprints_core::{CanonicalPath, FootprintKind, SortKey};
use footprints_store::{FootprintStore, SearchIndex};
use tempfile::TempDir;

const ROWS: usize = 5_000;

fn populate(store: &FootprintStore) {
    for i in 0..ROWS {
        let kind = match i % 4 {
            0 => FootprintKind::Folder,
            1 => FootprintKind::File,
            2 => FootprintKind::Shortcut,
            _ => FootprintKind::WebShortcut,
        };
        let name = format!("document-{i:05}.txt");
        let path = CanonicalPath {
            path: format!("/home/user/area-{}/{name}", i % 50),
            name,
            kind,
        };
        store.record_visit(&path).unwrap();
    }
}

fn bench_search(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let store = FootprintStore::open(temp.path().join("footprints.db")).unwrap();
    populate(&store);
    let index = SearchIndex::new(store);

    c.bench_function("search_all_by_recency", |b| {
        b.iter(|| index.search(black_box(""), SortKey::LastVisit).unwrap())
    });

    c.bench_function("search_substring_by_name", |b| {
        b.iter(|| index.search(black_box("area-7"), SortKey::Name).unwrap())
    });

    c.bench_function("search_substring_by_count", |b| {
        b.iter(|| index.search(black_box("00042"), SortKey::VisitCount).unwrap())
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
