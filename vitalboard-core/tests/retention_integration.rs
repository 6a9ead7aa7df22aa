//! Retention against the JSON-lines store
//!
//! Exercises the full path: board poll, commit with pruning, reopen, and the
//! flat "latest" view the daemon's query command prints.

#![cfg(feature = "store-file")]

mod common;

use common::{MockBus, NoDelay};
use tempfile::tempdir;
use vitalboard_core::{
    constants::time::MS_PER_DAY, JsonLinesStore, RetentionPolicy, RetentionStore, RetentionWriter,
    SensorBoard, SensorRecord,
};

const T0: u64 = 1_700_000_000_000;

#[test]
fn seven_day_horizon_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let mut writer =
        RetentionWriter::new(JsonLinesStore::open(&path).unwrap(), RetentionPolicy::default());

    for day in 0..7 {
        assert_eq!(writer.commit(&SensorRecord::new(T0 + day * MS_PER_DAY)).unwrap(), 0);
    }

    // Exactly seven days old: kept
    assert_eq!(writer.commit(&SensorRecord::new(T0 + 7 * MS_PER_DAY)).unwrap(), 0);
    assert_eq!(writer.store().load().unwrap().len(), 8);

    // One millisecond later: the first record falls out
    assert_eq!(writer.commit(&SensorRecord::new(T0 + 7 * MS_PER_DAY + 1)).unwrap(), 1);

    let records = writer.store().load().unwrap();
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|r| r.timestamp > T0));
    assert_eq!(writer.stats().inserted, 9);
    assert_eq!(writer.stats().pruned, 1);

    // Reopening sees the pruned store
    let reopened = JsonLinesStore::open(&path).unwrap();
    assert_eq!(reopened.load().unwrap(), records);
    assert_eq!(
        reopened.latest().unwrap().map(|r| r.timestamp),
        Some(T0 + 7 * MS_PER_DAY + 1)
    );
}

#[test]
fn long_outage_prunes_everything_stale() {
    let dir = tempdir().unwrap();
    let mut writer = RetentionWriter::new(
        JsonLinesStore::open(dir.path()).unwrap(),
        RetentionPolicy::from_days(7),
    );

    for hour in 0..24 {
        writer.commit(&SensorRecord::new(T0 + hour * 3_600_000)).unwrap();
    }

    let pruned = writer.commit(&SensorRecord::new(T0 + 30 * MS_PER_DAY)).unwrap();
    assert_eq!(pruned, 24);
    assert_eq!(writer.store().load().unwrap().len(), 1);
}

#[test]
fn polled_records_round_trip_through_the_file() {
    let dir = tempdir().unwrap();
    let mut board = SensorBoard::default();
    let mut bus = MockBus::reference_board();
    let mut delay = NoDelay::default();
    let mut writer = RetentionWriter::new(
        JsonLinesStore::open(dir.path()).unwrap(),
        RetentionPolicy::default(),
    );

    bus.fail(vitalboard_core::sensors::ags10::ADDRESS);
    let record = board.poll(&mut bus, &mut delay, T0).record;
    writer.commit(&record).unwrap();

    let latest = writer.store().latest().unwrap().unwrap();
    assert_eq!(latest, record);

    let flat = serde_json::to_value(latest.to_flat()).unwrap();
    assert_eq!(flat["timestamp"], T0);
    assert_eq!(flat["dht20_humidity"], 50.0);
    assert_eq!(flat["bmp581_pressure"], 101_325.0);
    // Faulted sensor: null, not absent
    assert!(flat["ags10_tvoc"].is_null());
    assert!(flat.as_object().unwrap().contains_key("ags10_tvoc"));
    // Empty PPG window: rejected sentinel
    assert_eq!(flat["heart_rate_bpm"], -1.0);
    assert_eq!(flat["spo2_percent"], -1.0);
}

#[test]
fn corrupt_row_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("0.jsonl"), "{not json}\n").unwrap();

    let store = JsonLinesStore::open(dir.path()).unwrap();
    assert_eq!(store.latest(), Err(vitalboard_core::StoreError::Serialization));
}
