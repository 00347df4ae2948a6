use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatehouse::client::HttpTransport;
use gatehouse::clock::SystemClock;
use gatehouse::config::{Config, LogFormat};
use gatehouse::events::TracingSink;
use gatehouse::system::{self, Dependencies};
use gatehouse::{Error, Server};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();
    init_tracing(config.log_format);

    let timeout = config.upstream_timeout();
    let deps = Dependencies {
        clock: Arc::new(SystemClock),
        events: Arc::new(TracingSink),
        user_directory: Arc::new(HttpTransport::new(&config.user_directory, timeout)?),
        entry_logger: Arc::new(HttpTransport::new(&config.entry_logger, timeout)?),
    };
    info!(
        user_directory = %config.user_directory,
        entry_logger = %config.entry_logger,
        timeout_ms = config.upstream_timeout_ms,
        "upstreams configured"
    );

    let pipeline = match config.assets {
        Some(root) => system::assemble_with_assets(deps, root),
        None => system::assemble(deps),
    };

    Server::bind(&config.addr)?.serve(pipeline).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}
