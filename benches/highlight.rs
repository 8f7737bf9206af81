//! Benchmarks for the highlighting pipeline
//!
//! Run with: cargo bench --bench highlight

use std::io::Cursor;

use token_highlight::lines::LineGroups;
use token_highlight::syntax::{LexingEngine, Token, TreeSitterEngine};
use token_highlight::{escape_plain, HighlightConfig, HighlightError, Highlighter};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const RUST_SAMPLE: &str = include_str!("../samples/syntax/sample.rs");

fn generate_large_rust(lines: usize) -> String {
    let mut source = String::with_capacity(lines * 40);
    for i in 0..lines {
        match i % 4 {
            0 => source.push_str(&format!("fn function_{}() -> u32 {{\n", i)),
            1 => source.push_str(&format!("    let value = \"string {}\";\n", i)),
            2 => source.push_str("    /* block\n       comment */ 42\n"),
            _ => source.push_str("}\n"),
        }
    }
    source
}

fn highlighter() -> Highlighter {
    match Highlighter::from_config(HighlightConfig::default()) {
        Ok(hl) => hl,
        Err(e) => panic!("bench setup failed: {}", e),
    }
}

// ============================================================================
// Whole-document path
// ============================================================================

#[divan::bench]
fn text_sample(bencher: divan::Bencher) {
    let hl = highlighter();
    bencher.bench_local(|| divan::black_box(hl.highlight_text("sample.rs", None, RUST_SAMPLE)));
}

#[divan::bench(args = [100, 1000, 10000])]
fn text_large_rust(bencher: divan::Bencher, lines: usize) {
    let hl = highlighter();
    let source = generate_large_rust(lines);
    bencher.bench_local(|| divan::black_box(hl.highlight_text("large.rs", None, &source)));
}

// ============================================================================
// Streaming path
// ============================================================================

#[divan::bench(args = [100, 1000, 10000])]
fn stream_large_rust(bencher: divan::Bencher, lines: usize) {
    let hl = highlighter();
    let source = generate_large_rust(lines);
    bencher.bench_local(|| {
        let out = hl.highlight_stream("large.rs", None, source.as_bytes(), source.len());
        divan::black_box(out)
    });
}

#[divan::bench(args = [100, 1000, 10000])]
fn stream_plaintext(bencher: divan::Bencher, lines: usize) {
    let hl = highlighter();
    let source = "plain <text> & more\n".repeat(lines);
    bencher.bench_local(|| {
        let out = hl.highlight_stream("notes.unknown", None, source.as_bytes(), source.len());
        divan::black_box(out)
    });
}

#[divan::bench(args = [1000, 10000])]
fn escape_plain_lines(bencher: divan::Bencher, lines: usize) {
    let source = "<script>alert('x')</script>\n".repeat(lines);
    bencher.bench_local(|| divan::black_box(escape_plain(Cursor::new(source.as_bytes()))));
}

// ============================================================================
// Pipeline stages
// ============================================================================

#[divan::bench(args = [1000, 10000])]
fn tokenise_only(bencher: divan::Bencher, lines: usize) {
    let engine = TreeSitterEngine::new();
    let rust = engine.get_by_name("rust");
    let source = generate_large_rust(lines);
    bencher.bench_local(|| {
        if let Some(grammar) = &rust {
            divan::black_box(engine.tokenise(grammar, &source).ok());
        }
    });
}

#[divan::bench(args = [1000, 10000])]
fn line_groups_only(bencher: divan::Bencher, lines: usize) {
    let engine = TreeSitterEngine::new();
    let source = generate_large_rust(lines);
    let tokens = engine
        .get_by_name("rust")
        .and_then(|grammar| engine.tokenise(&grammar, &source).ok())
        .unwrap_or_default();

    bencher.bench_local(|| {
        let groups = LineGroups::new(tokens.iter().cloned().map(Ok::<Token, HighlightError>));
        divan::black_box(groups.count())
    });
}
