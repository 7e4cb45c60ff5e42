use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no log exists for sensor `{0}`")]
    UnknownSensor(String),
    #[error("log for sensor `{sensor_id}` cannot be read: {source}")]
    Unreadable {
        sensor_id: String,
        source: std::io::Error,
    },
    #[error("sensor id `{0}` is not allowed as a file name")]
    RejectedSensorId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
