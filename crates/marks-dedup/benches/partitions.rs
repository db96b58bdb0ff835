use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use marks_core::UrlRecord;
use marks_core::config::{BlockBy, DedupConfig};
use marks_dedup::partition_records;

const SIZES: &[usize] = &[100, 500, 2_000];
const SITES: &[&str] = &["rust-lang.org", "github.com", "news.ycombinator.com", "docs.rs", "lwn.net"];
const TOPICS: &[&str] = &["ownership", "async runtimes", "trait objects", "lifetimes", "macros", "allocators"];

/// Deterministic corpus where roughly a fifth of names are near-duplicates.
fn corpus(size: usize) -> Vec<UrlRecord> {
    let added = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
    (0..size)
        .map(|i| {
            let site = SITES[i % SITES.len()];
            let topic = TOPICS[(i / 7) % TOPICS.len()];
            let name = if i % 5 == 0 {
                format!("{topic} explained, part {}", i / 5)
            } else {
                format!("{topic} notes #{i} on {site}")
            };
            UrlRecord {
                id: i.to_string(),
                name,
                url: format!("https://{site}/post/{i}"),
                folder_name: format!("folder {}", i % 11),
                date_added: added,
                last_visited: None,
            }
        })
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    for block_by in [BlockBy::None, BlockBy::Site] {
        let mut group = c.benchmark_group(format!("partition.{block_by:?}").to_lowercase());
        let config = DedupConfig {
            block_by,
            ..DedupConfig::default()
        };
        for &size in SIZES {
            let records = corpus(size);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
                b.iter(|| black_box(partition_records(records, &config).partition_count()));
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
