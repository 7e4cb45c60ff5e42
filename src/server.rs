use std::{io, sync::Arc};

use jiff::tz::TimeZone;
use tokio::net::TcpListener;
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{config::ServerConfig, session, store::LogStore};

pub async fn run(cfg: ServerConfig) -> io::Result<()> {
    let listener = TcpListener::bind((cfg.bind_addr, cfg.port)).await?;
    info!(
        "listening on {}, logs in {}",
        listener.local_addr()?,
        cfg.data_dir.display()
    );

    let store = Arc::new(LogStore::new(cfg.data_dir, cfg.naming));
    serve(listener, store, cfg.time_zone).await
}

/// Accepts connections forever, one task per client, all sharing `store`
pub async fn serve(listener: TcpListener, store: Arc<LogStore>, tz: TimeZone) -> io::Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(r) => r,
            Err(e) => {
                warn!("accepting connection: {e}");
                continue;
            }
        };

        let store = store.clone();
        let tz = tz.clone();
        let span = span!(Level::INFO, "Connection", %peer);
        tokio::spawn(
            async move {
                debug!("connected");
                match session::run(stream, &store, &tz).await {
                    Ok(()) => debug!("disconnected"),
                    Err(e) => warn!("connection closed: {e}"),
                }
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::Path};

    use tempfile::tempdir;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpStream,
    };

    use super::*;
    use crate::store::naming::FileNaming;

    async fn start(dir: &Path) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(LogStore::new(dir, FileNaming::Verbatim));
        tokio::spawn(serve(listener, store, TimeZone::UTC));
        addr
    }

    struct Client {
        reader: BufReader<TcpStream>,
    }

    impl Client {
        async fn connect(addr: SocketAddr) -> Self {
            let stream = TcpStream::connect(addr).await.unwrap();
            Self {
                reader: BufReader::new(stream),
            }
        }

        async fn send(&mut self, line: &str) {
            self.reader.get_mut().write_all(line.as_bytes()).await.unwrap();
        }

        async fn recv(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            line
        }
    }

    #[tokio::test]
    async fn test_log_then_get() {
        let dir = tempdir().unwrap();
        let addr = start(dir.path()).await;
        let mut client = Client::connect(addr).await;

        client.send("LOG|temp1|2024-01-15T10:00:00|23.5\r\n").await;
        client.send("GET|temp1|1\r\n").await;
        assert_eq!(client.recv().await, "1;2024-01-15T10:00:00|23.500000\r\n");
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let dir = tempdir().unwrap();
        let addr = start(dir.path()).await;
        let mut client = Client::connect(addr).await;

        client.send("GET|unknown|5\r\n").await;
        assert_eq!(client.recv().await, "ERROR|INVALID_SENSOR_ID\r\n");
    }

    #[tokio::test]
    async fn test_malformed_is_silent() {
        let dir = tempdir().unwrap();
        let addr = start(dir.path()).await;
        let mut client = Client::connect(addr).await;

        client.send("LOG|onlytwo\r\n").await;
        client.send("GET|onlytwo|1\r\n").await;
        // first response belongs to the GET, the LOG produced nothing
        assert_eq!(client.recv().await, "ERROR|INVALID_SENSOR_ID\r\n");
        assert!(!dir.path().join("onlytwo.log").exists());
    }

    #[tokio::test]
    async fn test_bad_count() {
        let dir = tempdir().unwrap();
        let addr = start(dir.path()).await;
        let mut client = Client::connect(addr).await;

        client.send("GET|temp1|abc\r\n").await;
        assert_eq!(client.recv().await, "ERROR|INVALID_NUM_RECORDS\r\n");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_clients_share_store() {
        let dir = tempdir().unwrap();
        let addr = start(dir.path()).await;

        let mut writers = Vec::new();
        for i in 0..4 {
            writers.push(tokio::spawn(async move {
                let mut client = Client::connect(addr).await;
                for j in 0..50 {
                    client
                        .send(&format!("LOG|shared|2024-01-15T10:00:00|{}\r\n", i * 100 + j))
                        .await;
                }
                // round trip so every LOG above has been handled
                client.send("GET|shared|0\r\n").await;
                assert_eq!(client.recv().await, "0\r\n");
            }));
        }
        for writer in writers {
            writer.await.unwrap();
        }

        let mut reader = Client::connect(addr).await;
        reader.send("GET|shared|1000\r\n").await;
        let response = reader.recv().await;
        let mut segments = response.trim_end().split(';');
        assert_eq!(segments.next(), Some("200"));
        assert_eq!(segments.count(), 200);
    }
}
