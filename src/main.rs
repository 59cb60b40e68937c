use std::time::Duration;

mod app;
mod config;
mod db;
mod error;
mod hashing;
mod notify;
mod otp;
mod state;
#[cfg(test)]
mod testing;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "wahire=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        otp_ttl_seconds = config.otp.ttl_seconds,
        mail_configured = config.mail.is_some(),
        gemini_configured = config.gemini_api_key.is_some(),
        "configuration loaded"
    );

    let app_state = AppState::init(config).await?;

    otp::spawn_sweeper(
        app_state.otp.clone(),
        Duration::from_secs(app_state.config.otp.sweep_interval_secs),
    );

    app::serve(app::build_app(app_state)).await
}
