use criterion::{black_box, criterion_group, criterion_main, Criterion};
use git_statistics::model::{Commit, SortKey};
use git_statistics::stats::derive_view;

fn commits(n: u64, authors: u64) -> Vec<Commit> {
    (0..n)
        .map(|i| Commit::new(format!("author-{}", i % authors), i % 97, i % 31, i % 7 + 1))
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let input = commits(100_000, 250);
    for key in [SortKey::Commits, SortKey::LinesChanged] {
        c.bench_function(&format!("derive_view/{key}"), |b| {
            b.iter(|| derive_view(black_box(&input), key, true, 10))
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
