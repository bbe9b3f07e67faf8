//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

/// Floor for the follow poll interval; zero would spin at end of file
const MIN_POLL_INTERVAL_MS: u64 = 1;

/// Command line flags; each one overrides its environment variable
#[derive(Debug, Default, Parser)]
#[command(version, about = "Valheim server status from the console log")]
pub struct Cli {
    /// HTTP port of the status API
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding vhserver-console.log and its dated archives
    #[arg(long = "log-dir-path")]
    pub log_dir_path: Option<PathBuf>,

    /// How often to check the live log for new lines, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Skip replaying the dated archive logs at startup
    #[arg(long)]
    pub no_replay: bool,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server port
    pub http_port: u16,
    /// Console log directory
    pub log_dir: PathBuf,
    /// Wait between end-of-file checks while following the live log
    pub follow_poll_interval: Duration,
    /// Capacity of the channel between the log reader and the ingest worker
    pub event_buffer: usize,
    /// Replay archived logs before following the live one
    pub replay_history: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 8000,
            log_dir: PathBuf::from("/home/vhserver/log/console"),
            follow_poll_interval: Duration::from_millis(100),
            event_buffer: 1024,
            replay_history: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let poll_ms: u64 = env_or(
            "VHSTATUS_POLL_INTERVAL_MS",
            defaults.follow_poll_interval.as_millis() as u64,
        )?;

        Ok(Self {
            http_port: env_or("VHSTATUS_PORT", defaults.http_port)?,
            log_dir: env::var("VHSTATUS_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            follow_poll_interval: poll_interval(poll_ms),
            event_buffer: env_or("VHSTATUS_EVENT_BUFFER", defaults.event_buffer)?,
            replay_history: env_or("VHSTATUS_REPLAY_HISTORY", defaults.replay_history)?,
        })
    }

    /// Apply command line overrides
    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(port) = cli.port {
            self.http_port = port;
        }
        if let Some(dir) = cli.log_dir_path {
            self.log_dir = dir;
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.follow_poll_interval = poll_interval(ms);
        }
        if cli.no_replay {
            self.replay_history = false;
        }
        self
    }
}

fn poll_interval(ms: u64) -> Duration {
    Duration::from_millis(ms.max(MIN_POLL_INTERVAL_MS))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "vhstatus",
            "--port",
            "9000",
            "--log-dir-path",
            "/tmp/logs",
            "--poll-interval-ms",
            "250",
            "--no-replay",
        ])
        .unwrap();

        let config = AppConfig::default().with_cli(cli);
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.follow_poll_interval, Duration::from_millis(250));
        assert!(!config.replay_history);
        assert_eq!(config.event_buffer, 1024);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let cli = Cli::try_parse_from(["vhstatus", "--poll-interval-ms", "0"]).unwrap();
        let config = AppConfig::default().with_cli(cli);
        assert_eq!(config.follow_poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_empty_cli_keeps_config() {
        let config = AppConfig::default().with_cli(Cli::default());
        assert_eq!(config.http_port, 8000);
        assert!(config.replay_history);
    }

    #[test]
    fn test_env_or_parses_and_rejects() {
        let key = "VHSTATUS_TEST_ENV_OR_PORT";
        assert_eq!(env_or::<u16>(key, 8000).unwrap(), 8000);

        env::set_var(key, "8123");
        assert_eq!(env_or::<u16>(key, 8000).unwrap(), 8123);

        env::set_var(key, "not-a-port");
        assert!(env_or::<u16>(key, 8000).is_err());

        env::remove_var(key);
    }
}
