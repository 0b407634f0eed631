// 🌐 Gallery REST API
// Axum router over the query engine; the gallery is swapped wholesale on refresh

use crate::card::{Card, Category};
use crate::config::SheetSource;
use crate::gallery::{load_gallery, Gallery, GalleryStatus, SheetFetcher, SourceFailure};
use crate::query::{self, CategorySelection, QueryOptions, SortKey};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
pub struct AppState<F> {
    pub gallery: Arc<RwLock<Gallery>>,
    pub sources: Arc<Vec<SheetSource>>,
    pub fetcher: Arc<F>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            gallery: Arc::clone(&self.gallery),
            sources: Arc::clone(&self.sources),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: SheetFetcher> AppState<F> {
    pub fn new(fetcher: F, sources: Vec<SheetSource>, gallery: Gallery) -> Self {
        Self {
            gallery: Arc::new(RwLock::new(gallery)),
            sources: Arc::new(sources),
            fetcher: Arc::new(fetcher),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

/// Query string of GET /api/cards
///
/// Toggles default to on so a bare request lists everything.
#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    pub q: Option<String>,
    pub mew: Option<bool>,
    pub cameo: Option<bool>,
    pub intl: Option<bool>,
    pub sort: Option<String>,
}

impl From<CardQuery> for QueryOptions {
    fn from(params: CardQuery) -> Self {
        QueryOptions {
            query: params.q.unwrap_or_default(),
            categories: CategorySelection {
                mew: params.mew.unwrap_or(true),
                cameo: params.cameo.unwrap_or(true),
                intl: params.intl.unwrap_or(true),
            },
            sort: params
                .sort
                .as_deref()
                .map(SortKey::parse_or_default)
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct CategoryCount {
    category: Category,
    name: String,
    count: usize,
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    status: GalleryStatus,
    total_cards: usize,
    by_category: Vec<CategoryCount>,
    loaded_sources: Vec<String>,
    failed_sources: Vec<SourceFailure>,
}

impl StatsResponse {
    fn from_gallery(gallery: &Gallery) -> Self {
        let by_category = query::category_counts(&gallery.cards)
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category,
                name: category.name().to_string(),
                count,
            })
            .collect();

        Self {
            status: gallery.status(),
            total_cards: gallery.cards.len(),
            by_category,
            loaded_sources: gallery.loaded.clone(),
            failed_sources: gallery.failures.clone(),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check<F>(State(state): State<AppState<F>>) -> impl IntoResponse {
    let status = state.gallery.read().await.status();
    Json(ApiResponse::ok(status))
}

/// GET /api/cards - Filtered and sorted cards
async fn list_cards<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<CardQuery>,
) -> impl IntoResponse {
    let options = QueryOptions::from(params);
    let gallery = state.gallery.read().await;

    let cards: Vec<Card> = query::apply(&gallery.cards, &options)
        .into_iter()
        .cloned()
        .collect();

    Json(ApiResponse::ok(cards))
}

/// GET /api/cards/:id - Detail view
async fn get_card<F>(
    State(state): State<AppState<F>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let gallery = state.gallery.read().await;

    match query::find_by_id(&gallery.cards, &id) {
        Some(card) => (StatusCode::OK, Json(ApiResponse::ok(card.clone()))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Card not found: {}", id))),
        )
            .into_response(),
    }
}

/// GET /api/stats - Counts and source outcomes
async fn get_stats<F>(State(state): State<AppState<F>>) -> impl IntoResponse {
    let gallery = state.gallery.read().await;
    Json(ApiResponse::ok(StatsResponse::from_gallery(&gallery)))
}

/// POST /api/refresh - Refetch every source and replace the collection
async fn refresh<F: SheetFetcher>(State(state): State<AppState<F>>) -> impl IntoResponse {
    let gallery = load_gallery(state.fetcher.as_ref(), &state.sources).await;
    let stats = StatsResponse::from_gallery(&gallery);

    *state.gallery.write().await = gallery;
    info!("Gallery refreshed: {} cards", stats.total_cards);

    Json(ApiResponse::ok(stats))
}

// ============================================================================
// Router
// ============================================================================

/// Build the full router: `/api/*` plus CORS and request tracing
pub fn build_router<F: SheetFetcher + 'static>(state: AppState<F>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check::<F>))
        .route("/cards", get(list_cards::<F>))
        .route("/cards/:id", get(get_card::<F>))
        .route("/stats", get(get_stats::<F>))
        .route("/refresh", post(refresh::<F>))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
