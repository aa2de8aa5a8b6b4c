use criterion::{criterion_group, criterion_main, Criterion};
use retrack::Regex;
use std::hint::black_box;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("match", |b| {
        b.iter(|| {
            let re = Regex::new(r"\d+").unwrap();
            let _result = re.search(black_box("Price: $123"));
        })
    });

    c.bench_function("complex match", |b| {
        b.iter(|| {
            let re = Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap();
            let _result = re.search(black_box("Born on 12/25/1990 and graduated on 5/15/2012"));
        })
    });

    let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
    c.bench_function("anchored find", |b| {
        b.iter(|| re.find(black_box("contact: someone@example.com"), 9))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
