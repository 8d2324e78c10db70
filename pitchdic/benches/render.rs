use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pitchdic::diagram::{compose, render, svg};
use pitchdic::mora::segment;
use pitchdic::pattern::{align, from_accent_number};

const WORDS: [(&str, &str); 6] = [
    ("はし", "LHL"),
    ("しゅんかん", "LlHHH"),
    ("りょこう", "LlHHH"),
    ("アイスコーヒー", "LHHHHHLL"),
    ("きょうりょく", "LlHHlHH"),
    ("さくら", "LHH, HLL"),
];

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render");
    group.throughput(Throughput::Elements(WORDS.len() as u64));

    group.bench_function("segment", |b| {
        b.iter(|| {
            for (reading, _) in WORDS {
                std::hint::black_box(segment(reading));
            }
        })
    });

    let segmented: Vec<_> = WORDS
        .iter()
        .map(|&(reading, pattern)| (segment(reading), pattern))
        .collect();

    group.bench_function("align", |b| {
        b.iter(|| {
            for (mora, pattern) in &segmented {
                std::hint::black_box(align(pattern, mora));
            }
        })
    });

    group.bench_function("compose", |b| {
        let aligned: Vec<_> = segmented
            .iter()
            .map(|(mora, pattern)| (mora, align(pattern, mora)))
            .collect();
        b.iter(|| {
            for (mora, classes) in &aligned {
                std::hint::black_box(compose(mora, classes));
            }
        })
    });

    group.bench_function("render_svg", |b| {
        b.iter(|| {
            for (reading, pattern) in WORDS {
                std::hint::black_box(svg::to_svg(&render(reading, pattern)));
            }
        })
    });

    group.bench_function("from_accent_number", |b| {
        b.iter(|| {
            for (reading, _) in WORDS {
                std::hint::black_box(from_accent_number(reading, "0,1,2"));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
