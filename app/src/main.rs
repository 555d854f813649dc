//! BusWay command-line client
//!
//! ```bash
//! busway buses --origin Mumbai
//! busway login asha --password secret
//! busway book 3 17
//! busway bookings
//! ```

use anyhow::Context;
use busway::{App, Cli, Config, SessionFile};
use busway_api::BusWayClient;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Variables already set take precedence over `.env`
    let env_file = dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &env_file {
        debug!(path = %path.display(), "Loaded .env");
    }
    info!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let client = BusWayClient::with_timeout(&config.api_url, config.http_timeout())
        .context("Invalid BUSWAY_API_URL")?;
    let sessions = SessionFile::new(&config.session_file);
    // Views settle shortly after the request itself times out
    let wait = config.http_timeout().saturating_add(Duration::from_secs(5));
    let mut app = App::new(Arc::new(client), sessions, wait)?;

    let mut stdout = std::io::stdout().lock();
    app.run(cli.command, &mut stdout).await
}
