//! Text line protocol
//!
//! ```txt
//! LOG|<sensor_id>|<YYYY-MM-DDTHH:MM:SS>|<value>   -> (no response)
//! GET|<sensor_id>|<count>                          -> <n>;<ts>|<value>;...
//!                                                  -> ERROR|<CODE>
//! ```
//!
//! Lines with the wrong number of fields, or an unknown prefix, get no
//! response at all. A LOG whose timestamp or value does not parse is dropped.

use std::fmt;

use jiff::tz::TimeZone;

use crate::{record::Reading, store::error::StoreError};

use error::CommandError;

pub mod codec;
pub mod error;
pub mod time;

pub const FIELD_SEPARATOR: char = '|';
pub const RECORD_SEPARATOR: char = ';';

const LOG_PREFIX: &str = "LOG|";
const GET_PREFIX: &str = "GET|";
const LOG_FIELDS: usize = 4;
const GET_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Log {
        sensor_id: String,
        timestamp: i64,
        value: f64,
    },
    Get {
        sensor_id: String,
        count: i64,
    },
}

impl Command {
    pub fn parse(line: &str, tz: &TimeZone) -> Result<Self, CommandError> {
        if line.starts_with(LOG_PREFIX) {
            let fields = split_fields(line);
            if fields.len() != LOG_FIELDS {
                return Err(CommandError::Malformed {
                    command: "LOG",
                    expected: LOG_FIELDS,
                    found: fields.len(),
                });
            }

            let timestamp = time::parse_timestamp(fields[2], tz)
                .map_err(|_| CommandError::UnparsableTimestamp(fields[2].to_string()))?;
            let value = fields[3]
                .trim()
                .parse::<f64>()
                .map_err(|_| CommandError::UnparsableValue(fields[3].to_string()))?;

            Ok(Self::Log {
                sensor_id: fields[1].to_string(),
                timestamp,
                value,
            })
        } else if line.starts_with(GET_PREFIX) {
            let fields = split_fields(line);
            if fields.len() != GET_FIELDS {
                return Err(CommandError::Malformed {
                    command: "GET",
                    expected: GET_FIELDS,
                    found: fields.len(),
                });
            }

            let count = fields[2]
                .trim()
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidNumRecords(fields[2].to_string()))?;

            Ok(Self::Get {
                sensor_id: fields[1].to_string(),
                count,
            })
        } else {
            Err(CommandError::Unrecognized)
        }
    }
}

/// Splits on `|`. A single empty field left by a trailing `|` is not counted,
/// so `GET|a|` has two fields and `LOG|a|t|v|` has four.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if line.ends_with(FIELD_SEPARATOR) {
        fields.pop();
    }
    fields
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidSensorId,
    InvalidNumRecords,
    CannotReadLogFile,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSensorId => "INVALID_SENSOR_ID",
            Self::InvalidNumRecords => "INVALID_NUM_RECORDS",
            Self::CannotReadLogFile => "CANNOT_READ_LOG_FILE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&StoreError> for ErrorCode {
    fn from(value: &StoreError) -> Self {
        match value {
            StoreError::UnknownSensor(_) | StoreError::RejectedSensorId(_) => Self::InvalidSensorId,
            StoreError::Unreadable { .. } | StoreError::Io(_) => Self::CannotReadLogFile,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Readings(Vec<Reading>),
    Error(ErrorCode),
}

impl Response {
    /// Renders the response line, without the line terminator
    pub fn render(&self, tz: &TimeZone) -> String {
        match self {
            Self::Readings(readings) => {
                let mut out = readings.len().to_string();
                for reading in readings {
                    out.push(RECORD_SEPARATOR);
                    out.push_str(&time::format_timestamp(reading.timestamp, tz));
                    out.push(FIELD_SEPARATOR);
                    out.push_str(&format_value(reading.value));
                }
                out
            }
            Self::Error(code) => format!("ERROR{FIELD_SEPARATOR}{code}"),
        }
    }
}

/// Six fixed decimals, unless that loses precision, in which case the
/// shortest form that parses back to the same value
pub fn format_value(value: f64) -> String {
    let fixed = format!("{value:.6}");
    match fixed.parse::<f64>() {
        Ok(back) if back == value => fixed,
        _ => value.to_string(),
    }
}
