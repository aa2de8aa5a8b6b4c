use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use retrack::{Flags, Regex};

const PARAGRAPH: &str = "Tom Sawyer and Huckleberry Finn were washing the fence \
    on a Saturday in 1876, while Aunt Polly watched; Twain wrote it all down. \
    Nobody was rushing, and the price of paint was $12.50 per can. \
    Write to becky.thatcher@stpetersburg.example.org for details!\n";

fn make_text(paragraphs: usize) -> String {
    PARAGRAPH.repeat(paragraphs)
}

// Common regex patterns to benchmark
const PATTERNS: &[(&str, &str)] = &[
    ("simple_literal", "Twain"),
    ("character_class", "[a-z]shing"),
    ("alternation", "Huck[a-zA-Z]+|Saw[a-zA-Z]+"),
    ("complex_class", "[a-q][^u-z]{13}x"),
    ("multi_alternation", "Tom|Sawyer|Huckleberry|Finn"),
    ("bounded_repeat", ".{2,4}(Tom|Sawyer|Huckleberry|Finn)"),
    ("word_suffix", "[a-zA-Z]+ing"),
    ("lazy_repeat", "T.*?n"),
    ("digit_sequence", r"\d+"),
    (
        "email_pattern",
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    ),
];

fn bench_regex_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_compile");

    for (name, pattern) in PATTERNS {
        group.bench_with_input(BenchmarkId::new("compile", name), pattern, |b, pattern| {
            b.iter(|| Regex::new(pattern).unwrap())
        });
    }

    group.finish();
}

fn bench_regex_find_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_find_all");

    let small = make_text(4);
    let medium = make_text(400);
    let texts = [("small", small.as_str()), ("medium", medium.as_str())];

    for (text_name, text) in &texts {
        group.throughput(Throughput::Bytes(text.len() as u64));

        for (pattern_name, pattern) in PATTERNS {
            let regex = Regex::new(pattern).unwrap();
            let bench_name = format!("{}_on_{}", pattern_name, text_name);

            group.bench_with_input(BenchmarkId::new("find_all", bench_name), text, |b, text| {
                b.iter(|| regex.find_iter(text).count())
            });
        }
    }

    group.finish();
}

fn bench_optimizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimizer");

    let text = make_text(100);
    group.throughput(Throughput::Bytes(text.len() as u64));

    for (pattern_name, pattern) in [("literal_run", "w[a]s[h]ing"), ("unrolled", "s{2}|e{3}x")] {
        for (mode, flags) in [("optimized", Flags::default()), ("plain", Flags { no_opt: true })] {
            let regex = Regex::with_flags(pattern, flags).unwrap();
            let bench_name = format!("{}_{}", pattern_name, mode);
            group.bench_with_input(
                BenchmarkId::new("find_all", bench_name),
                &text,
                |b, text| b.iter(|| regex.find_iter(text).count()),
            );
        }
    }

    group.finish();
}

fn bench_pathological_cases(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological_cases");

    // Exponential in the input length; keep the inputs short.
    let pathological_patterns = [
        ("nested_quantifiers", r"(a+)+b", "aaaaaaaaaaaaaaaaaa"),
        ("alternation_backtrack", r"(a|a)*b", "aaaaaaaaaaaaaaaaaa"),
        ("deep_recursion", r"((a)*)*b", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
    ];

    for (name, pattern, input) in &pathological_patterns {
        let regex = Regex::new(pattern).unwrap();

        group.bench_with_input(BenchmarkId::new("pathological", name), input, |b, input| {
            b.iter(|| regex.search(input).is_some())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_regex_compile,
    bench_regex_find_all,
    bench_optimizer,
    bench_pathological_cases
);
criterion_main!(benches);
