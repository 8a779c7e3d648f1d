use axum::Router;
use axum::response::Html;
use axum::routing::{get, post};
use tracing_subscriber::EnvFilter;

use news_researcher::api;
use news_researcher::config::AppConfig;
use news_researcher::state::AppState;
use news_researcher::stores::resolve_pending_deletion;
use news_researcher::types::RagError;

#[tokio::main]
async fn main() -> Result<(), RagError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "starting news researcher");

    // Must happen before the store is opened: opening recreates the index.
    let cleanup = resolve_pending_deletion(&config.data_dir, &config.index_dir()).await?;
    tracing::info!(?cleanup, "deletion marker resolved");

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, cleanup).await?;

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/status", get(api::status::status))
        .route("/api/articles", post(api::articles::process_articles))
        .route("/api/clear", post(api::articles::clear_database))
        .route("/api/ask", post(api::ask::ask))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
