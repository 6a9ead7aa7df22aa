//! JSON Lines retention store
//!
//! Records live in a directory of hourly segment files, one [`SensorRecord`]
//! per line, appended as it arrives:
//!
//! ```text
//! store/
//!   1699999200000.jsonl   {"timestamp":1700000000000,"dht20":{...},...}
//!   1700002800000.jsonl
//!   watermark             1699395200001
//! ```
//!
//! A segment is named after the first millisecond it covers. Pruning never
//! rewrites a segment: segments entirely below the cutoff are unlinked, and a
//! cutoff that falls inside a segment only raises the persisted watermark,
//! below which rows are ignored on read. Only the oldest segment is ever
//! parsed by a prune, and its live timestamps are cached between calls, so
//! the steady-state cost of a commit does not depend on how much history the
//! store holds.
//!
//! The watermark is replaced through a sibling `.tmp` file and a rename, so a
//! crash mid-write leaves either the old or the new value. A missing
//! directory or watermark reads as empty.

use std::collections::{BTreeSet, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::constants::time::STORE_SEGMENT_MS;
use crate::errors::StoreError;
use crate::record::SensorRecord;
use crate::time::Timestamp;
use crate::traits::RetentionStore;

const SEGMENT_EXTENSION: &str = "jsonl";
const WATERMARK_FILE: &str = "watermark";

/// Work done by [`JsonLinesStore::delete_older_than`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SegmentStats {
    /// Segment files parsed to find stale rows
    pub segments_scanned: u64,
    /// Segment files unlinked because every row was stale
    pub segments_dropped: u64,
    /// Times the watermark file was replaced
    pub watermark_writes: u64,
}

/// Live timestamps of the oldest segment, ascending
#[derive(Debug, Clone)]
struct Head {
    start: Timestamp,
    live: VecDeque<Timestamp>,
}

/// Only the timestamp is needed to prune a row
#[derive(Deserialize)]
struct Stamp {
    timestamp: Timestamp,
}

/// Directory-backed store of hourly JSON-lines segments
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    dir: PathBuf,
    segments: BTreeSet<Timestamp>,
    watermark: Timestamp,
    head: Option<Head>,
    stats: SegmentStats,
}

impl JsonLinesStore {
    /// Open (creating if needed) the store directory at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error("create", e))?;

        let mut segments = BTreeSet::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_error("list", e))? {
            let entry = entry.map_err(|e| io_error("list", e))?;
            if let Some(start) = segment_start(&entry.path()) {
                segments.insert(start);
            }
        }

        let watermark = read_watermark(&dir)?;
        log_debug!(
            "Opened store {} with {} segments, watermark {}",
            dir.display(),
            segments.len(),
            watermark
        );

        Ok(Self {
            dir,
            segments,
            watermark,
            head: None,
            stats: SegmentStats::default(),
        })
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of segment files on disk
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Rows older than this are treated as deleted
    pub fn watermark(&self) -> Timestamp {
        self.watermark
    }

    /// Prune work counters since open
    pub fn stats(&self) -> SegmentStats {
        self.stats
    }

    /// Read every live record, oldest segment first, file order within one
    pub fn load(&self) -> Result<Vec<SensorRecord>, StoreError> {
        let mut records = Vec::new();
        for &start in &self.segments {
            records.extend(
                self.read_rows::<SensorRecord>(start)?
                    .into_iter()
                    .filter(|r| r.timestamp >= self.watermark),
            );
        }
        Ok(records)
    }

    fn segment_path(&self, start: Timestamp) -> PathBuf {
        self.dir.join(format!("{}.{}", start, SEGMENT_EXTENSION))
    }

    fn read_rows<T: DeserializeOwned>(&self, start: Timestamp) -> Result<Vec<T>, StoreError> {
        let path = self.segment_path(start);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("open", e)),
        };

        let mut rows = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| io_error("read", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(&line).map_err(|e| {
                log_error!("Unparseable row in {}: {}", path.display(), e);
                StoreError::Serialization
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn load_head(&mut self, start: Timestamp) -> Result<Head, StoreError> {
        if let Some(head) = self.head.take() {
            if head.start == start {
                return Ok(head);
            }
        }

        self.stats.segments_scanned += 1;
        let mut live: Vec<Timestamp> = self
            .read_rows::<Stamp>(start)?
            .into_iter()
            .map(|s| s.timestamp)
            .filter(|&ts| ts >= self.watermark)
            .collect();
        live.sort_unstable();
        Ok(Head {
            start,
            live: live.into(),
        })
    }

    fn remove_segment(&mut self, start: Timestamp) -> Result<(), StoreError> {
        match fs::remove_file(self.segment_path(start)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("remove", e)),
        }
        self.segments.remove(&start);
        self.stats.segments_dropped += 1;
        Ok(())
    }

    fn write_watermark(&mut self, watermark: Timestamp) -> Result<(), StoreError> {
        let path = self.dir.join(WATERMARK_FILE);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, watermark.to_string()).map_err(|e| io_error("write", e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error("rename", e))?;
        self.stats.watermark_writes += 1;
        Ok(())
    }
}

/// Segment start encoded in a file name, `None` for anything else
fn segment_start(path: &Path) -> Option<Timestamp> {
    if path.extension()? != SEGMENT_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

fn read_watermark(dir: &Path) -> Result<Timestamp, StoreError> {
    let path = dir.join(WATERMARK_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => text.trim().parse().map_err(|e| {
            log_error!("Unparseable watermark in {}: {}", path.display(), e);
            StoreError::Serialization
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(io_error("read", e)),
    }
}

fn io_error(operation: &'static str, error: std::io::Error) -> StoreError {
    log_error!("Store {} failed: {}", operation, error);
    StoreError::Io { operation }
}

impl RetentionStore for JsonLinesStore {
    fn insert(&mut self, record: &SensorRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(|_| StoreError::Serialization)?;
        line.push(b'\n');

        let ts = record.timestamp;
        let start = ts - ts % STORE_SEGMENT_MS;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.segment_path(start))
            .map_err(|e| io_error("open", e))?;
        file.write_all(&line).map_err(|e| io_error("append", e))?;
        self.segments.insert(start);

        if let Some(head) = self.head.as_mut() {
            if head.start == start && ts >= self.watermark {
                let at = head.live.partition_point(|&t| t <= ts);
                head.live.insert(at, ts);
            }
        }
        Ok(())
    }

    fn delete_older_than(&mut self, cutoff: Timestamp) -> Result<usize, StoreError> {
        if cutoff <= self.watermark {
            return Ok(0);
        }

        let mut pruned = 0;
        while let Some(&start) = self.segments.iter().next() {
            if start >= cutoff {
                break;
            }
            let mut head = self.load_head(start)?;

            if start + STORE_SEGMENT_MS <= cutoff {
                pruned += head.live.len();
                self.remove_segment(start)?;
                continue;
            }

            let before = head.live.len();
            while head.live.front().map_or(false, |&ts| ts < cutoff) {
                head.live.pop_front();
            }
            let hidden = before - head.live.len();
            self.head = Some(head);
            if hidden > 0 {
                self.write_watermark(cutoff)?;
                pruned += hidden;
            }
            break;
        }

        self.watermark = cutoff;
        if pruned > 0 {
            log_debug!("Pruned {} records older than {}", pruned, cutoff);
        }
        Ok(pruned)
    }

    fn latest(&self) -> Result<Option<SensorRecord>, StoreError> {
        for &start in self.segments.iter().rev() {
            let newest = self
                .read_rows::<SensorRecord>(start)?
                .into_iter()
                .filter(|r| r.timestamp >= self.watermark)
                .max_by_key(|r| r.timestamp);
            if newest.is_some() {
                return Ok(newest);
            }
        }
        Ok(None)
    }
}
