//! Benchmarks for extraction and crawling
//!
//! Run with: cargo bench --bench crawl

use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use metadata_gather::GatherError;
use metadata_gather::crawler::{crawl, try_crawl};
use metadata_gather::extraction::csv::extract_csv_from_reader;
use metadata_gather::extraction::json::extract_json_from_slice;
use metadata_gather::extraction::ExtractorRegistry;
use metadata_gather::gather::{GatherOptions, crawl_file};
use metadata_gather::store::MetadataStore;
use metadata_gather::types::{Record, Value};

/// CSV with an integer, a quoted string and a sometimes-null column.
fn generate_csv(rows: usize) -> String {
    let mut out = String::from("id,name,score\n");
    for i in 0..rows {
        let score = if i % 3 == 0 {
            "null".to_string()
        } else {
            (i * 7).to_string()
        };
        out.push_str(&format!("{i},\"user_{i}\",{score}\n"));
    }
    out
}

fn generate_json(rows: usize) -> String {
    let items: Vec<String> = (0..rows)
        .map(|i| {
            let score = if i % 3 == 0 {
                "null".to_string()
            } else {
                (i * 7).to_string()
            };
            format!(r#"{{"id": {i}, "name": "user_{i}", "score": {score}}}"#)
        })
        .collect();
    format!("[{}]", items.join(","))
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for rows in [100, 1_000, 10_000].iter() {
        let csv = generate_csv(*rows);
        group.throughput(Throughput::Bytes(csv.len() as u64));
        group.bench_with_input(BenchmarkId::new("csv", rows), &csv, |b, csv| {
            b.iter(|| {
                let records = extract_csv_from_reader(Cursor::new(csv.clone().into_bytes()), "bench.csv")
                    .unwrap();
                black_box(records.count())
            });
        });

        let json = generate_json(*rows);
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::new("json", rows), &json, |b, json| {
            b.iter(|| {
                let records = extract_json_from_slice(json.as_bytes(), "bench.json").unwrap();
                black_box(records.count())
            });
        });
    }

    group.finish();
}

fn bench_crawl(c: &mut Criterion) {
    let mut group = c.benchmark_group("crawl");

    for fields in [10, 100, 1_000].iter() {
        let records: Vec<Record> = (0..10_000)
            .map(|i| {
                let value = if i % 5 == 0 {
                    Value::Null
                } else {
                    Value::Integer(i as i64)
                };
                Record::new(format!("field_{}", i % fields), value)
            })
            .collect();
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", fields), &records, |b, records| {
            b.iter(|| black_box(crawl(records.iter().cloned()).unwrap()));
        });
    }

    let csv = generate_csv(10_000);
    group.bench_function("extract_and_crawl_csv", |b| {
        b.iter(|| {
            let records = extract_csv_from_reader(Cursor::new(csv.clone().into_bytes()), "bench.csv")
                .unwrap();
            black_box(try_crawl(records.map(|r| r.map_err(GatherError::from))).unwrap())
        });
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let source = std::env::temp_dir().join(format!(
        "metadata-gather-bench-{}.csv",
        std::process::id()
    ));
    std::fs::write(&source, generate_csv(10_000)).unwrap();
    let registry = ExtractorRegistry::default();
    let options = GatherOptions::default();

    c.bench_function("crawl_file_in_memory_store", |b| {
        b.iter(|| {
            let mut store = MetadataStore::open_in_memory().unwrap();
            black_box(crawl_file(&registry, &mut store, &source, &options).unwrap())
        });
    });

    let _ = std::fs::remove_file(source);
}

criterion_group!(benches, bench_extraction, bench_crawl, bench_pipeline);
criterion_main!(benches);
