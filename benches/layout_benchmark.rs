//! Benchmarks for parsing, pagination and PDF composition.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic card documents with the built-in fonts.

use cardbook::render::{self, RenderOptions};
use cardbook::{parse_str, FontLibrary, Paginator, ParseOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a Markdown document with the given number of cards.
fn create_test_markdown(card_count: usize) -> String {
    let mut text = String::from("# Benchmark Book\n\n");

    for i in 0..card_count {
        text.push_str(&format!("## Card {}\n", i + 1));
        text.push_str(
            "Each card carries **bold** text, `inline code` and enough words to wrap \
             over several lines of the page so that the greedy wrapper has work to do.\n",
        );
        text.push_str("- first point\n- second point\n");
        text.push_str("| Step | Owner |\n|------|-------|\n| plan | planner |\n| run | executor |\n");

        if i % 2 == 0 {
            text.push_str("```rust\nfn main() {\n    println!(\"card\");\n}\n```\n");
        } else {
            text.push_str("```\n");
            for role in ["👤 User", "🎼 Orchestrator", "📋 Planner", "⚙ Executor", "🛠 Tool", "📊 Result"] {
                text.push_str(&format!("┌──────────────┐\n│ {role} →  │\n└──────────────┘\n↓\n"));
            }
            text.push_str("```\n");
        }
    }

    text
}

/// Benchmark Markdown parsing at various sizes.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_parsing");

    for card_count in [10, 50, 200].iter() {
        let text = create_test_markdown(*card_count);

        group.bench_function(format!("{}_cards", card_count), |b| {
            b.iter(|| parse_str(black_box(&text), &ParseOptions::default()).unwrap());
        });
    }

    group.finish();
}

/// Benchmark page assignment.
fn bench_pagination(c: &mut Criterion) {
    let fonts = FontLibrary::builtin();
    let mut group = c.benchmark_group("pagination");

    for card_count in [10, 50, 200].iter() {
        let doc = parse_str(&create_test_markdown(*card_count), &ParseOptions::default()).unwrap();

        group.bench_function(format!("{}_cards", card_count), |b| {
            b.iter(|| Paginator::new(&fonts).paginate(black_box(&doc)));
        });
    }

    group.finish();
}

/// Benchmark full PDF composition and the carousel renderer.
fn bench_rendering(c: &mut Criterion) {
    let fonts = FontLibrary::builtin();
    let options = RenderOptions::default();
    let doc = parse_str(&create_test_markdown(50), &ParseOptions::default()).unwrap();

    c.bench_function("compose_pdf_50_cards", |b| {
        b.iter(|| render::to_pdf(black_box(&doc), &fonts, &options).unwrap());
    });

    c.bench_function("carousel_50_cards", |b| {
        b.iter(|| render::to_carousel(black_box(&doc), &options));
    });
}

criterion_group!(benches, bench_parsing, bench_pagination, bench_rendering);
criterion_main!(benches);
