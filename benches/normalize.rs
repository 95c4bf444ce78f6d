//! Benchmarks for projecting a survey table onto canonical records

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use polars::prelude::{Column, DataFrame};
use vigitel_loader::SchemaRegistry;
use vigitel_loader::app::services::record_normalizer::RecordNormalizer;

fn int_column(name: &str, rows: usize, f: impl Fn(usize) -> i64) -> Column {
    Column::new(name.into(), (0..rows).map(f).collect::<Vec<i64>>())
}

fn real_column(name: &str, rows: usize, f: impl Fn(usize) -> f64) -> Column {
    Column::new(name.into(), (0..rows).map(f).collect::<Vec<f64>>())
}

/// A table shaped like a published year, with `rows` respondents
fn survey_table(year: i64, rows: usize) -> DataFrame {
    DataFrame::new(vec![
        real_column("pesorake", rows, |i| 0.5 + (i % 7) as f64 / 10.0),
        int_column("ano", rows, |_| year),
        int_column("cidade", rows, |i| (i % 27) as i64 + 1),
        int_column("q6", rows, |i| 18 + (i % 70) as i64),
        int_column("q7", rows, |i| (i % 2) as i64 + 1),
        int_column("civil", rows, |i| if i % 50 == 0 { 888 } else { (i % 5) as i64 + 1 }),
        int_column("q8_anos", rows, |i| (i % 16) as i64),
        real_column("q9", rows, |i| if i % 40 == 0 { 777.0 } else { 50.0 + (i % 60) as f64 }),
        int_column("q11", rows, |i| 150 + (i % 45) as i64),
        int_column("q42", rows, |i| (i % 2) as i64 + 1),
        int_column("q45", rows, |i| (i % 4) as i64 + 1),
        int_column("q60", rows, |i| (i % 3) as i64 + 1),
        int_column("q69", rows, |i| (i % 5) as i64 + 1),
        int_column("q75", rows, |i| (i % 2) as i64 + 1),
        int_column("q76", rows, |i| if i % 30 == 0 { 777 } else { (i % 2) as i64 + 1 }),
        real_column("imc", rows, |i| 18.5 + (i % 20) as f64 * 0.7),
    ])
    .expect("benchmark table columns have equal length")
}

fn bench_normalize(c: &mut Criterion) {
    let registry = SchemaRegistry::vigitel().expect("built-in registry is valid");
    let normalizer = RecordNormalizer::new(&registry);

    let mut group = c.benchmark_group("normalize");
    for rows in [1_000usize, 10_000, 50_000] {
        let table = survey_table(2012, rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let records = normalizer
                    .normalize(black_box(table), 2012)
                    .expect("table has every registered field");
                records.filter(|record| record.is_ok()).count()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
