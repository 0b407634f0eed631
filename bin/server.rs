// Card Gallery - Web Server
// REST API with Axum over the merged sheet collection

use anyhow::{Context, Result};
use card_gallery::api::{build_router, AppState};
use card_gallery::{load_gallery, DefaultFetcher, GalleryConfig, GalleryStatus};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🌐 Card Gallery v{}", card_gallery::VERSION);

    // Load configuration
    let config_path = GalleryConfig::path();
    let config = GalleryConfig::load(&config_path)?;
    info!(
        "✓ Config loaded from {} ({} sources)",
        config_path.display(),
        config.sources.len()
    );

    // Initial fetch; a failing sheet never blocks startup
    let fetcher = DefaultFetcher::new();
    let gallery = load_gallery(&fetcher, &config.sources).await;

    if gallery.status() == GalleryStatus::Unavailable {
        warn!("No source could be loaded, serving the empty gallery");
    }

    let state = AppState::new(fetcher, config.sources, gallery);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;

    info!("🚀 Server running on http://{}", config.server.bind);
    info!("   API: http://{}/api/cards", config.server.bind);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
