use jiff::{Timestamp, civil::DateTime, tz::TimeZone};

/// `YYYY-MM-DDTHH:MM:SS`, always read and written as wall-clock time in the
/// server's zone
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_timestamp(s: &str, tz: &TimeZone) -> Result<i64, jiff::Error> {
    let datetime = DateTime::strptime(WIRE_FORMAT, s.trim())?;
    Ok(tz.to_zoned(datetime)?.timestamp().as_second())
}

/// Falls back to raw seconds for values outside the representable range
pub fn format_timestamp(secs: i64, tz: &TimeZone) -> String {
    match Timestamp::from_second(secs) {
        Ok(ts) => tz.to_datetime(ts).strftime(WIRE_FORMAT).to_string(),
        Err(_) => secs.to_string(),
    }
}
