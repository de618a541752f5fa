//! End-to-end pipeline test: normalize one vendor export, merge it into
//! a fresh store, derive a coarser timeframe, audit, and export chunks.

use std::io::Write as _;
use std::num::NonZeroUsize;

use cairn_lib::prelude::*;
use chrono::{TimeDelta, TimeZone, Utc};

fn descriptor_json(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("vendor.json");
    std::fs::write(
        &path,
        r#"{
            "vendor": "acme",
            "delimiter": ";",
            "has_header": true,
            "columns": {"date": 0, "time": 1, "open": 2, "high": 3, "low": 4, "close": 5, "volume": 6},
            "timestamp_format": "%Y-%m-%d %H:%M",
            "timezone": "America/New_York",
            "bar_label": "close"
        }"#,
    )
    .unwrap();
    path
}

fn vendor_file(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("acme.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "date;time;open;high;low;close;volume").unwrap();
    // close-labeled 09:31-09:40 Eastern = open-labeled 14:30-14:39 UTC
    for i in 0..10 {
        writeln!(
            file,
            "2024-01-02;09:{:02};100.{i};101.{i};99.{i};100.{i};100",
            31 + i
        )
        .unwrap();
    }
    // one malformed row and one invariant violation
    writeln!(file, "garbage;row;x;x;x;x;x").unwrap();
    writeln!(file, "2024-01-02;09:45;100.0;90.0;99.0;100.0;100").unwrap();
    path
}

#[test]
fn full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = SourceDescriptor::from_json_file(&descriptor_json(dir.path())).unwrap();
    let raw = vendor_file(dir.path());
    let key = SeriesKey::new("es", Timeframe::Minute1);

    // normalize
    let mut stream = normalize(&raw, &descriptor, key.timeframe()).unwrap();
    let bars: Vec<Bar> = stream.by_ref().collect();
    let report = stream.report();
    assert_eq!(report.parsed, 10);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.rejected_bars, 1);
    assert_eq!(
        bars[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
    );

    // merge + persist
    let data_dir = dir.path().join("data");
    let mut store = Store::open(&data_dir, key.clone()).unwrap();
    let merged = store.merge(bars.clone());
    assert_eq!(merged.added, 10);
    store.persist().unwrap();

    // re-ingesting the same batch is an idempotent correction
    let merged_again = store.merge(bars);
    assert_eq!(merged_again.added, 0);
    assert_eq!(merged_again.updated, 10);
    store.persist().unwrap();

    // reopen sees exactly what was persisted
    let reopened = Store::open(&data_dir, key.clone()).unwrap();
    assert_eq!(reopened.state(), StoreState::Loaded);
    assert_eq!(reopened.timeline().len(), 10);

    // derive m5: 14:30-14:39 covers two 5-minute windows
    let m5 = derive(reopened.timeline(), Timeframe::Minute5);
    assert_eq!(m5.len(), 2);
    assert_eq!(
        m5.first().unwrap().timestamp,
        Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
    );
    assert_eq!(m5.first().unwrap().volume, 500);

    // audit: contiguous minutes, no gaps
    let gaps = audit(reopened.timeline(), TimeDelta::minutes(1)).unwrap();
    assert!(gaps.is_empty());

    // export and reconstruct
    let chunked = export(reopened.timeline(), &key, NonZeroUsize::new(4).unwrap());
    assert_eq!(chunked.manifest.total_bars, 10);
    assert_eq!(chunked.manifest.num_chunks, 3);

    let out = write_to_dir(&chunked, &dir.path().join("exports")).unwrap();
    let manifest: Manifest =
        serde_json::from_str(&std::fs::read_to_string(out.join("meta.json")).unwrap()).unwrap();
    assert_eq!(manifest, chunked.manifest);

    let mut rebuilt: Vec<Bar> = Vec::new();
    for i in 0..manifest.num_chunks {
        let chunk: Vec<Bar> = serde_json::from_str(
            &std::fs::read_to_string(out.join(format!("chunk_{i}.json"))).unwrap(),
        )
        .unwrap();
        rebuilt.extend(chunk);
    }
    assert_eq!(rebuilt, reopened.timeline().bars());
}
