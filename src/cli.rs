use clap_derive::Parser;

/// Time-series append store for sensor readings
#[derive(Parser, Debug, Clone)]
#[command(name = "sensorlog", version, about, long_about = None)]
pub struct Cli {
    /// TCP port to listen on
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn test_parse() {
        let cli = Cli::try_parse_from(["sensorlog", "7000"]).unwrap();
        assert_eq!(cli.port, 7000);

        assert!(Cli::try_parse_from(["sensorlog"]).is_err());
        assert!(Cli::try_parse_from(["sensorlog", "7000", "7001"]).is_err());
        assert!(Cli::try_parse_from(["sensorlog", "http"]).is_err());
        assert!(Cli::try_parse_from(["sensorlog", "--data-dir", "x", "7000"]).is_err());
    }
}
