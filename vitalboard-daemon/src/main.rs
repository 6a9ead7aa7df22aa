//! VitalBoard polling daemon
//!
//! ```text
//! vitalboard-daemon run   [--config PATH]   poll the board and store records
//! vitalboard-daemon query [--config PATH]   print the newest record as JSON
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to see rejected
//! vitals windows and empty FIFO reads.

mod config;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone};
use linux_embedded_hal::{Delay, I2cdev};
use serde_json::Value;
use vitalboard_core::{
    sensors::SENSOR_COUNT, FlatRecord, HalBus, JsonLinesStore, RetentionStore, RetentionWriter,
    SensorBoard, SystemTime, TimeSource, Timestamp,
};

use config::{DaemonConfig, DEFAULT_CONFIG_PATH};

const USAGE: &str = "usage: vitalboard-daemon <run|query> [--config PATH]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = DaemonConfig::load(&config_path)?;

    match args.get(1).map(String::as_str) {
        Some("run") => run(&config),
        Some("query") => query(&config),
        _ => bail!(USAGE),
    }
}

/// Poll forever; a failed cycle is logged and the loop carries on
fn run(config: &DaemonConfig) -> Result<()> {
    let i2c = I2cdev::new(&config.i2c_device)
        .with_context(|| format!("cannot open {}", config.i2c_device.display()))?;
    let mut bus = HalBus::new(i2c);
    let mut delay = Delay;
    let clock = SystemTime;

    let mut board = SensorBoard::new(&config.board);
    let store = JsonLinesStore::open(&config.store_dir)
        .with_context(|| format!("cannot open store {}", config.store_dir.display()))?;
    let mut writer = RetentionWriter::new(store, config.retention());

    let faults = board.configure(&mut bus, &mut delay);
    log::info!(
        "Board configured on {} ({} of {} sensors ready), storing to {}",
        config.i2c_device.display(),
        SENSOR_COUNT - faults.len(),
        SENSOR_COUNT,
        config.store_dir.display()
    );

    let interval = Duration::from_millis(config.poll_interval_ms);
    loop {
        let started = Instant::now();

        let outcome = board.poll(&mut bus, &mut delay, clock.now());
        if !outcome.faults.is_empty() {
            log::debug!("{} sensor(s) faulted this cycle", outcome.faults.len());
        }

        match writer.commit(&outcome.record) {
            Ok(0) => {}
            Ok(pruned) => log::info!("Pruned {} record(s) past the retention horizon", pruned),
            Err(e) => log::error!("Failed to store record: {}", e),
        }

        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
}

/// Print the newest stored record, or `null` if the store is empty
fn query(config: &DaemonConfig) -> Result<()> {
    let store = JsonLinesStore::open(&config.store_dir)
        .with_context(|| format!("cannot open store {}", config.store_dir.display()))?;
    let latest = store
        .latest()
        .with_context(|| format!("cannot read {}", config.store_dir.display()))?;

    let output = match latest {
        Some(record) => with_local_time(&record.to_flat())?,
        None => Value::Null,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Flat record plus a human-readable local `time` field
fn with_local_time(flat: &FlatRecord) -> Result<Value> {
    let mut value = serde_json::to_value(flat)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("time".into(), Value::String(local_time(flat.timestamp)));
    }
    Ok(value)
}

fn local_time(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
