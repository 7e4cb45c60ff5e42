//! Fixed-width binary form of a [Reading]
//!
//! # Record Format
//!
//! ```txt
//! +--------------------------+----------------+-------------+
//! | sensor_id: [u8; 32]      | timestamp: i64 | value: f64  |
//! | NUL padded, <= 31 bytes  | (LE, seconds)  | (LE, IEEE)  |
//! +--------------------------+----------------+-------------+
//! ```
//!
//! Every record is exactly [RECORD_SIZE] bytes, so the N-th record from
//! the end of a log always starts at `len - N * RECORD_SIZE`.

/// Size of the sensor id field, including the terminating NUL
pub const SENSOR_ID_LEN: usize = 32;
pub const RECORD_SIZE: usize = SENSOR_ID_LEN + 8 + 8;

const TIMESTAMP_OFFSET: usize = SENSOR_ID_LEN;
const VALUE_OFFSET: usize = SENSOR_ID_LEN + 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub sensor_id: String,
    /// seconds since epoch
    pub timestamp: i64,
    pub value: f64,
}

impl Reading {
    pub fn new(sensor_id: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp,
            value,
        }
    }
}

/// Ids longer than `SENSOR_ID_LEN - 1` bytes are truncated, never rejected.
/// Truncation is byte-wise, so it may split a multi-byte character.
pub fn encode(reading: &Reading) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];

    let id = reading.sensor_id.as_bytes();
    let id_len = id.len().min(SENSOR_ID_LEN - 1);
    buf[..id_len].copy_from_slice(&id[..id_len]);

    buf[TIMESTAMP_OFFSET..VALUE_OFFSET].copy_from_slice(&reading.timestamp.to_le_bytes());
    buf[VALUE_OFFSET..].copy_from_slice(&reading.value.to_le_bytes());
    buf
}

pub fn decode(buf: &[u8; RECORD_SIZE]) -> Reading {
    let id_field = &buf[..SENSOR_ID_LEN];
    let id_len = id_field
        .iter()
        .position(|b| *b == 0)
        .unwrap_or(SENSOR_ID_LEN);
    let sensor_id = String::from_utf8_lossy(&id_field[..id_len]).into_owned();

    let mut ts_bytes = [0u8; 8];
    ts_bytes.copy_from_slice(&buf[TIMESTAMP_OFFSET..VALUE_OFFSET]);
    let mut value_bytes = [0u8; 8];
    value_bytes.copy_from_slice(&buf[VALUE_OFFSET..]);

    Reading {
        sensor_id,
        timestamp: i64::from_le_bytes(ts_bytes),
        value: f64::from_le_bytes(value_bytes),
    }
}
