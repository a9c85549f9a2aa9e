use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use tui_tree_list::json::{nodes, Selector};
use tui_tree_list::{Node, SimpleRow, TreeHost, TreeList};

fn example_items() -> Vec<Node<SimpleRow<'static, &'static str>>> {
    let leaf = |identifier, text| Node::new(SimpleRow::row(identifier, text));
    let section = |identifier, text, children| {
        Node::with_children(SimpleRow::section(identifier, text), children)
            .expect("all item identifiers are unique")
    };
    vec![
        leaf("a", "Alfa"),
        section(
            "b",
            "Bravo",
            vec![
                leaf("c", "Charlie"),
                section("d", "Delta", vec![leaf("e", "Echo"), leaf("f", "Foxtrot")]),
                leaf("g", "Golf"),
            ],
        ),
        leaf("h", "Hotel"),
        section(
            "i",
            "India",
            vec![
                leaf("j", "Juliett"),
                leaf("k", "Kilo"),
                leaf("l", "Lima"),
                leaf("m", "Mike"),
                leaf("n", "November"),
            ],
        ),
        leaf("o", "Oscar"),
        section(
            "p",
            "Papa",
            vec![
                leaf("q", "Quebec"),
                leaf("r", "Romeo"),
                leaf("s", "Sierra"),
                leaf("t", "Tango"),
                leaf("u", "Uniform"),
                section(
                    "v",
                    "Victor",
                    vec![leaf("w", "Whiskey"), leaf("x", "Xray"), leaf("y", "Yankee")],
                ),
            ],
        ),
        leaf("z", "Zulu"),
    ]
}

fn metadata() -> serde_json::Value {
    let output = std::process::Command::new("cargo")
        .arg("metadata")
        .arg("--format-version=1")
        .arg("--all-features")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "cargo metadata should be executed successfully"
    );
    let stdout = String::from_utf8(output.stdout).expect("Should be able to parse metadata");
    let metadata: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    metadata
}

/// The metadata with the first package moved to the end and the second one removed.
fn shuffled_metadata() -> serde_json::Value {
    let mut metadata = metadata();
    if let Some(packages) = metadata
        .get_mut("packages")
        .and_then(serde_json::Value::as_array_mut)
    {
        if packages.len() > 2 {
            let first = packages.remove(0);
            packages.remove(0);
            packages.push(first);
        }
    }
    metadata
}

fn key(key: &str) -> Selector {
    Selector::Key(key.to_owned())
}

fn init(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("init");
    group.throughput(Throughput::Elements(1));

    group.bench_function("empty", |bencher| {
        bencher.iter(|| {
            black_box(TreeHost::<SimpleRow<usize>>::new(black_box(vec![])).unwrap());
        });
    });

    group.bench_function("example-items", |bencher| {
        bencher.iter(|| {
            black_box(TreeHost::new(black_box(example_items())).unwrap());
        });
    });

    let metadata = metadata();
    group.bench_function("metadata", |bencher| {
        bencher.iter(|| {
            black_box(TreeHost::new(nodes(black_box(&metadata))).unwrap());
        });
    });

    group.finish();
}

fn reconcile(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("reconcile");
    group.throughput(Throughput::Elements(1));

    let host = TreeHost::new(example_items()).unwrap();
    group.bench_function("example-items-identical", |bencher| {
        bencher.iter_batched(
            || (host.clone(), example_items()),
            |(mut host, items)| black_box(host.set_items(black_box(items)).unwrap()),
            BatchSize::SmallInput,
        );
    });

    let metadata = metadata();
    let shuffled = shuffled_metadata();
    let host = TreeHost::new(nodes(&metadata)).unwrap();
    group.bench_function("metadata-shuffled", |bencher| {
        bencher.iter_batched(
            || (host.clone(), nodes(&shuffled)),
            |(mut host, items)| black_box(host.set_items(black_box(items)).unwrap()),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("metadata-collapse", |bencher| {
        bencher.iter_batched(
            || host.clone(),
            |mut host| black_box(host.collapse(black_box(&[key("packages")])).unwrap()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn lookup(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("lookup");

    let metadata = metadata();
    let host = TreeHost::new(nodes(&metadata)).unwrap();
    let rows = host.row_count();
    group.throughput(Throughput::Elements(rows as u64));
    group.bench_function("metadata-path-at", |bencher| {
        bencher.iter(|| {
            for row in (0..rows).step_by(97) {
                black_box(host.path_at(black_box(row)));
            }
        });
    });

    let path = host.path_at(rows.saturating_sub(1)).unwrap_or_default();
    group.bench_function("metadata-row-index", |bencher| {
        bencher.iter(|| black_box(host.row_index(black_box(&path))));
    });

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    let host = TreeHost::<SimpleRow<usize>>::new(vec![]).unwrap();
    group.bench_function("empty", |bencher| {
        bencher.iter_batched(
            || (TreeList::new(SimpleRow::templates()), host.clone()),
            |(tree, mut host)| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(tree).render(buffer_size, black_box(&mut buffer), &mut host);
            },
            BatchSize::SmallInput,
        );
    });

    let host = TreeHost::new(example_items()).unwrap();
    group.bench_function("example-items", |bencher| {
        bencher.iter_batched(
            || (TreeList::new(SimpleRow::templates()), host.clone()),
            |(tree, mut host)| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(tree).render(buffer_size, black_box(&mut buffer), &mut host);
            },
            BatchSize::SmallInput,
        );
    });

    let metadata = metadata();
    let mut host = TreeHost::new(nodes(&metadata)).unwrap();
    host.select(vec![key("resolve"), key("nodes"), Selector::Index(0)]);
    group.bench_function("metadata", |bencher| {
        bencher.iter_batched(
            || (TreeList::new(SimpleRow::templates()), host.clone()),
            |(tree, mut host)| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(tree).render(buffer_size, black_box(&mut buffer), &mut host);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = init, reconcile, lookup, renders
}
criterion_main!(benches);
