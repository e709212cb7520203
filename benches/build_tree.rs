//! This bench builds and flattens the option list for a large collection of
//! pages where every page has up to eight children.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use picker::{build_tree, flatten, Item};

fn pages(count: u64) -> Vec<Item> {
    (1..=count)
        .map(|id| {
            let parent = (id > 1).then(|| (id - 2) / 8 + 1);
            Item::new(id, parent, format!("Page &amp; {id}"))
        })
        .collect()
}

fn build_and_flatten(c: &mut Criterion) {
    let items = pages(10_000);

    c.bench_function("build tree", |b| {
        b.iter(|| build_tree(&items));
    });

    c.bench_function("flatten", |b| {
        b.iter_batched(
            || build_tree(&items),
            |tree| flatten(&tree),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, build_and_flatten);
criterion_main!(benches);
