use std::sync::Arc;

use anyhow::Context;

use eventgate::config::Config;
use eventgate::handlers::status::mark_started;
use eventgate::middleware::warn_if_open;
use eventgate::observability::init_tracing;
use eventgate::router::build_router;
use eventgate::server::Server;
use eventgate::sheets::{SharedValuesApi, SheetsClient};
use eventgate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let log_buffer = init_tracing(&config).context("initializing tracing")?;

    warn_if_open(&config);
    if !config.sheets_configured() {
        tracing::warn!("store credentials are missing: API routes will answer 503 until configured");
    }
    mark_started();

    let api: SharedValuesApi = Arc::new(
        SheetsClient::new(config.sheets.clone()).context("building store client")?,
    );
    let state = AppState::new(config.clone(), api, log_buffer);
    let app = build_router(state);

    Server::new(config).serve(app).await.context("server error")?;
    Ok(())
}
