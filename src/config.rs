use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use jiff::tz::TimeZone;

use crate::{cli::Cli, store::naming::FileNaming};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// where `<sensor_id>.log` files live
    pub data_dir: PathBuf,
    pub naming: FileNaming,
    /// zone used to read and write wire timestamps
    pub time_zone: TimeZone,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            data_dir: PathBuf::from("."),
            naming: FileNaming::Verbatim,
            time_zone: TimeZone::system(),
        }
    }
}

impl From<Cli> for ServerConfig {
    fn from(value: Cli) -> Self {
        Self::new(value.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cli() {
        let cfg = ServerConfig::from(Cli { port: 7000 });
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(cfg.data_dir, PathBuf::from("."));
        assert_eq!(cfg.naming, FileNaming::Verbatim);
    }
}
