use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};
use crate::routes::{self, moods, recommendations, users, voice, watched_movies};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outside TraceLayer, so the trace span can see the id
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Mood gate
        .route("/moods/user/:user_id", get(moods::history).post(moods::record))
        .route("/moods/user/:user_id/should-show", get(moods::should_show))
        .route("/moods/user/:user_id/latest", get(moods::latest))
        // Watched movies
        .route("/watched-movies", get(watched_movies::list_all))
        .route(
            "/watched-movies/user/:user_id",
            get(watched_movies::list_for_user).post(watched_movies::mark_watched),
        )
        .route(
            "/watched-movies/user/:user_id/stats",
            get(watched_movies::stats),
        )
        .route(
            "/watched-movies/user/:user_id/status/:tmdb_id",
            get(watched_movies::status),
        )
        .route(
            "/watched-movies/user/:user_id/:tmdb_id",
            put(watched_movies::update).delete(watched_movies::remove),
        )
        // Users
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).delete(users::delete))
        .route("/users/:id/preferences", put(users::update_preferences))
        .route("/users/username/:username", get(users::get_by_username))
        // Recommendations
        .route("/recommendations/:username", get(recommendations::list))
        .route("/recommendations/:username/stats", get(recommendations::stats))
        .route(
            "/recommendations/:username/refresh",
            post(recommendations::refresh),
        )
        // Voice
        .route("/voice/resolve", post(voice::resolve))
}
