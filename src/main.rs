use wpjm_public_api::config::Settings;
use wpjm_public_api::{api_base, create_app, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before reading settings
    let _ = dotenvy::dotenv();
    let settings = Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .init();

    let post_store = store::connect(&settings).await?;
    let app = create_app(AppState::new(post_store));

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    tracing::info!("Server running on http://{}{}", settings.listen_addr, api_base());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for ctrl+c");
    }
    tracing::info!("received ctrl+c interrupt, closing server");
}
