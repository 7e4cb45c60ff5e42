//! Append-only sensor logs
//!
//! Each sensor id owns one file of back-to-back [RECORD_SIZE] records in
//! write order. The file is created lazily on the first append and stays open
//! for the life of the store.
//!
//! # Locking
//!
//! The registry, every append and every tail-read share a single lock. This
//! keeps a reader's size computation from racing an appender and guarantees a
//! single writer at the end of any file. Records for one sensor therefore
//! appear in lock acquisition order.

use std::{
    collections::{HashMap, hash_map::Entry},
    io::SeekFrom,
    path::{Path, PathBuf},
};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
    sync::Mutex,
};
use tracing::{debug, info};

use crate::record::{self, RECORD_SIZE, Reading};

use error::StoreError;
use naming::FileNaming;

pub mod error;
pub mod naming;

pub struct LogStore {
    dir: PathBuf,
    naming: FileNaming,
    /// sensor id -> open log
    logs: Mutex<HashMap<String, SensorLog>>,
}

struct SensorLog {
    path: PathBuf,
    /// append handle
    file: File,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>, naming: FileNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Appends one reading to the log of `sensor_id`, creating the log if this
    /// id has not been seen before. Returns once the record has been handed to
    /// the OS, so a following [LogStore::tail_read] observes it.
    pub async fn append(&self, sensor_id: &str, timestamp: i64, value: f64) -> Result<(), StoreError> {
        let block = record::encode(&Reading::new(sensor_id, timestamp, value));

        let mut logs = self.logs.lock().await;
        let log = match logs.entry(sensor_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.naming.log_path(&self.dir, sensor_id)?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await?;
                info!(sensor_id, path = %path.display(), "opened sensor log");
                entry.insert(SensorLog { path, file })
            }
        };

        log.file.write_all(&block).await?;
        log.file.flush().await?;
        Ok(())
    }

    /// Returns the last `count` readings of `sensor_id`, oldest first.
    ///
    /// `count` is clamped to the number of records in the log; zero or a
    /// negative count gives an empty result. Fails with
    /// [StoreError::UnknownSensor] if nothing was ever appended for the id by
    /// this store, regardless of `count`.
    pub async fn tail_read(&self, sensor_id: &str, count: i64) -> Result<Vec<Reading>, StoreError> {
        let logs = self.logs.lock().await;
        let log = logs
            .get(sensor_id)
            .ok_or_else(|| StoreError::UnknownSensor(sensor_id.to_string()))?;

        read_tail(&log.path, count)
            .await
            .map_err(|source| StoreError::Unreadable {
                sensor_id: sensor_id.to_string(),
                source,
            })
    }
}

async fn read_tail(path: &Path, count: i64) -> std::io::Result<Vec<Reading>> {
    let mut file = File::open(path).await?;
    let total_bytes = file.metadata().await?.len();
    let total_records = total_bytes / RECORD_SIZE as u64;

    let n = match u64::try_from(count) {
        Ok(count) => count.min(total_records),
        Err(_) => 0,
    };
    if total_bytes % RECORD_SIZE as u64 != 0 {
        debug!(path = %path.display(), total_bytes, "log ends in a partial record");
    }

    // counted back from the end, so records appended after a torn one line up
    file.seek(SeekFrom::Start(total_bytes - n * RECORD_SIZE as u64))
        .await?;

    let mut reader = BufReader::new(file);
    let mut readings = Vec::with_capacity(n as usize);
    let mut block = [0u8; RECORD_SIZE];
    for _ in 0..n {
        reader.read_exact(&mut block).await?;
        readings.push(record::decode(&block));
    }

    Ok(readings)
}
