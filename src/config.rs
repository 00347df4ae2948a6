//! Command-line and environment configuration for the `gatehouse` binary.
//!
//! The library itself reads no configuration; everything here ends up as
//! arguments to [`Server::bind`](crate::Server::bind),
//! [`HttpTransport::new`](crate::client::HttpTransport::new) and
//! [`assemble_with_assets`](crate::system::assemble_with_assets).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(name = "gatehouse", version, about = "Building entry and exit service")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "GATEHOUSE_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// Base URI of the user directory service.
    #[arg(long, env = "GATEHOUSE_USER_DIRECTORY")]
    pub user_directory: String,

    /// Base URI of the entry logger service.
    #[arg(long, env = "GATEHOUSE_ENTRY_LOGGER")]
    pub entry_logger: String,

    /// Directory served for every path no other route claims.
    /// Defaults to the `public/` directory shipped with the crate.
    #[arg(long, env = "GATEHOUSE_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Timeout for one upstream exchange, in milliseconds. 0 disables it.
    #[arg(long, default_value_t = 2000)]
    pub upstream_timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout_ms > 0).then(|| Duration::from_millis(self.upstream_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPSTREAMS: [&str; 5] = [
        "gatehouse",
        "--user-directory",
        "http://directory:8080",
        "--entry-logger",
        "http://entries:8080",
    ];

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(UPSTREAMS).unwrap();
        assert_eq!(config.upstream_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.user_directory, "http://directory:8080");
    }

    #[test]
    fn zero_timeout_disables_it() {
        let args = UPSTREAMS.into_iter().chain(["--upstream-timeout-ms", "0", "--log-format", "json"]);
        let config = Config::try_parse_from(args).unwrap();
        assert_eq!(config.upstream_timeout(), None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let args = UPSTREAMS.into_iter().chain(["--log-format", "xml"]);
        assert!(Config::try_parse_from(args).is_err());
    }
}
