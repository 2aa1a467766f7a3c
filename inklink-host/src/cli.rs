//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::HostConfig;

/// Send a two-color image to an inklink e-paper controller.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serial device path or tcp://host:port of a serial bridge.
    #[arg(short, long, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Device image slot (0-15).
    #[arg(short, long)]
    pub slot: Option<u8>,

    /// Attempts per start, page and end exchange.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u8>,

    /// Wait after a busy start reply, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub busy_backoff_ms: Option<u32>,

    /// Read timeout of tcp:// endpoints, in milliseconds. Serial devices keep their tty setting.
    #[arg(long, value_name = "MS")]
    pub read_timeout_ms: Option<u64>,

    /// Primary (black) plane: stripes, ramp, checker, solid:<byte> or a raw plane file.
    #[arg(long, value_name = "SOURCE")]
    pub primary: Option<String>,

    /// Accent (red) plane: stripes, ramp, checker, solid:<byte> or a raw plane file.
    #[arg(long, value_name = "SOURCE")]
    pub accent: Option<String>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Overwrite file settings with the flags that were given
    pub fn apply(&self, config: &mut HostConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.link.endpoint = Some(endpoint.clone());
        }
        if let Some(ms) = self.read_timeout_ms {
            config.link.read_timeout_ms = ms;
        }
        if let Some(slot) = self.slot {
            config.transfer.slot = slot;
        }
        if let Some(n) = self.max_attempts {
            config.transfer.max_attempts = n;
        }
        if let Some(ms) = self.busy_backoff_ms {
            config.transfer.busy_backoff_ms = ms;
        }
        if let Some(primary) = &self.primary {
            config.image.primary = primary.clone();
        }
        if let Some(accent) = &self.accent {
            config.image.accent = accent.clone();
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_file() {
        let mut config: HostConfig = r#"
            [link]
            endpoint = "/dev/ttyUSB0"
            [transfer]
            slot = 2
            max_attempts = 4
        "#
        .parse()
        .unwrap();

        let cli = Cli::try_parse_from([
            "inklink",
            "--endpoint",
            "tcp://localhost:7000",
            "--slot",
            "5",
            "--accent",
            "solid:0x00",
        ])
        .unwrap();
        cli.apply(&mut config);

        assert_eq!(config.link.endpoint.as_deref(), Some("tcp://localhost:7000"));
        assert_eq!(config.transfer.slot, 5);
        // Untouched by flags
        assert_eq!(config.transfer.max_attempts, 4);
        assert_eq!(config.image.primary, "stripes");
        assert_eq!(config.image.accent, "solid:0x00");
    }

    #[test]
    fn test_read_timeout_help_names_tcp() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "read_timeout_ms")
            .unwrap();
        assert!(arg.get_help().unwrap().to_string().contains("tcp://"));
    }

    #[test]
    fn test_verbosity() {
        let quiet = Cli::try_parse_from(["inklink"]).unwrap();
        assert_eq!(quiet.log_level(), "info");
        let debug = Cli::try_parse_from(["inklink", "-v"]).unwrap();
        assert_eq!(debug.log_level(), "debug");
        let trace = Cli::try_parse_from(["inklink", "-vv"]).unwrap();
        assert_eq!(trace.log_level(), "trace");
    }
}
