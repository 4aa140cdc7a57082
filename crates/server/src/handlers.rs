use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use recommender::{CacheStats, Recommendation};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub movie_name: String,
    /// Defaults to the configured count when absent
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub selected_movie: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub count: usize,
    pub movies: Vec<String>,
}

/// Hit/miss/size view of the cache, as reported by /health
#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl From<CacheStats> for CacheInfo {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            size: stats.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub movie_count: usize,
    pub cache_info: CacheInfo,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub message: &'static str,
    pub cache_info: CacheStats,
}

// Handlers

/// Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Movie Recommender API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "Optimized with caching",
        "endpoints": {
            "/movies": "GET - List all movies",
            "/recommend": "POST - Get movie recommendations",
            "/health": "GET - Health and cache statistics",
            "/cache/clear": "GET - Clear the recommendation cache",
        }
    }))
}

/// Every title, sorted
pub async fn get_movies(State(state): State<AppState>) -> Json<MoviesResponse> {
    let movies = state.service.list_titles().to_vec();
    Json(MoviesResponse {
        count: movies.len(),
        movies,
    })
}

/// Recommendations for one movie
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    let count = request.count.unwrap_or(state.default_count);
    if count == 0 {
        return Err(ApiError::InvalidInput(
            "count must be a positive integer".to_string(),
        ));
    }

    // Selection is CPU-bound; keep it off the async workers. If the client
    // goes away the blocking task still runs to completion.
    let service = state.service.clone();
    let title = request.movie_name.clone();
    let recommendations =
        tokio::task::spawn_blocking(move || service.recommend_cached(&title, count))
            .await
            .map_err(|e| ApiError::Internal(format!("recommendation task failed: {}", e)))??;

    Ok(Json(RecommendResponse {
        selected_movie: request.movie_name,
        recommendations: recommendations.to_vec(),
    }))
}

/// Liveness plus cache counters
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.service.movie_count() > 0,
        movie_count: state.service.movie_count(),
        cache_info: state.service.cache_stats().into(),
    })
}

/// Drop every cached result and reset counters
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    Json(ClearCacheResponse {
        message: "Cache cleared successfully",
        cache_info: state.service.cache_clear(),
    })
}
