// Yatube server

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use yatube::{app_state::AppState, blog_interface::create_blog_router, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("yatube=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    let app = create_blog_router(app_state).layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("Yatube starting on http://{}", addr);
    info!("  database: {}", config.database.url);
    info!("  media:    {}", config.media.root.display());
    info!(
        "  feed: {} posts per page, home page cached for {}s",
        config.feed.per_page, config.cache.ttl_secs
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
