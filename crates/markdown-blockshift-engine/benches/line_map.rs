use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use markdown_blockshift_engine::{DocumentSnapshot, LineClassifier, LineMap, TextEdit};
mod common;

fn bench_line_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_map");
    group.sample_size(10);

    let classifier = LineClassifier::new(4);
    let doc = DocumentSnapshot::from_text(&common::generate_lines(100_000));
    let map = LineMap::build(&doc, classifier);

    group.bench_function("build_100k", |b| {
        b.iter(|| std::hint::black_box(LineMap::build(&doc, classifier)));
    });

    // Keystroke inside a paragraph: metadata unchanged, arrays reused.
    let paragraph = doc
        .lines()
        .skip(doc.line_count() / 2)
        .find(|l| l.text.starts_with("Paragraph"))
        .map(|l| l.to)
        .unwrap_or(0);
    let (typed, typed_changes) = doc
        .apply_edits(vec![TextEdit::insert(paragraph, "x")])
        .unwrap();
    group.bench_function("prime_keystroke_100k", |b| {
        b.iter(|| std::hint::black_box(map.prime_from_edits(&typed, &typed_changes, classifier)));
    });

    // New line inserted: metadata spliced, indices recomputed.
    let (split, split_changes) = doc
        .apply_edits(vec![TextEdit::insert(paragraph, "\n- new item")])
        .unwrap();
    group.bench_function("prime_newline_100k", |b| {
        b.iter(|| std::hint::black_box(map.prime_from_edits(&split, &split_changes, classifier)));
    });

    let deep = DocumentSnapshot::from_text(&common::generate_deep_list(10_000));
    group.bench_function("build_deep_list_10k", |b| {
        b.iter_batched(
            || deep.clone(),
            |doc| std::hint::black_box(LineMap::build(&doc, classifier)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_line_map);
criterion_main!(benches);
