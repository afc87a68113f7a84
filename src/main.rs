mod app;
mod config;
mod error;
mod foods;
mod state;

use crate::config::{AppConfig, LogConfig, LogFormat};
use crate::state::AppState;

fn init_tracing(log: &LogConfig) {
    match log.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(log.filter.as_str())
            .with_target(false)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(log.filter.as_str())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.log);

    let state = AppState::new(config.clone());
    let app = app::build_app(state);

    app::serve(app, &config).await
}
