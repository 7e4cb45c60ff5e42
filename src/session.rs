use futures_util::{SinkExt, StreamExt};
use jiff::tz::TimeZone;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, error, warn};

use crate::{
    protocol::{Command, ErrorCode, Response, codec::LineCodec, error::CommandError},
    store::{LogStore, error::StoreError},
};

/// Serves one client until it disconnects. Every line is handled on its own;
/// only a transport error ends the session early.
pub async fn run<S>(stream: S, store: &LogStore, tz: &TimeZone) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LineCodec::new());

    while let Some(line) = framed.next().await {
        let line = line?;
        if let Some(response) = execute(store, &line, tz).await {
            framed.send(response.render(tz)).await?;
        }
    }

    Ok(())
}

/// Parses and executes a single line, returning the response to send, if any
pub async fn execute(store: &LogStore, line: &str, tz: &TimeZone) -> Option<Response> {
    let cmd = match Command::parse(line, tz) {
        Ok(cmd) => cmd,
        Err(e) => {
            if let Some(code) = e.code() {
                return Some(Response::Error(code));
            }
            match e {
                CommandError::UnparsableTimestamp(_) | CommandError::UnparsableValue(_) => {
                    warn!("dropping reading: {e}")
                }
                _ => debug!("ignoring line {line:?}: {e}"),
            }
            return None;
        }
    };

    match cmd {
        Command::Log {
            sensor_id,
            timestamp,
            value,
        } => {
            if let Err(e) = store.append(&sensor_id, timestamp, value).await {
                match e {
                    StoreError::RejectedSensorId(_) => warn!("dropping reading: {e}"),
                    _ => error!("appending to `{sensor_id}`: {e}"),
                }
            }
            None
        }
        Command::Get { sensor_id, count } => Some(match store.tail_read(&sensor_id, count).await {
            Ok(readings) => Response::Readings(readings),
            Err(e) => {
                let code = ErrorCode::from(&e);
                if code == ErrorCode::CannotReadLogFile {
                    error!("{e}");
                }
                Response::Error(code)
            }
        }),
    }
}
