use taskdesk::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "taskdesk=debug,axum=info,tower_http=info".to_string());
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
    if !config.owner_scoped_mutations {
        tracing::warn!(
            "record mutations match on id only; set OWNER_SCOPED_MUTATIONS=true to restrict them to the caller"
        );
    }

    let state = AppState::init(config).await?;
    let config = state.config.clone();
    let app = app::build_app(state)?;
    app::serve(app, &config).await
}
