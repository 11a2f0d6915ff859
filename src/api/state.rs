use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::{Config, Profiles},
    db::Stores,
    services::{
        refresh::RefreshPublisher, MoodGate, RecommendationService, UserService, VoiceGate,
        WatchedMovieTracker,
    },
};

/// Shared application state
///
/// Each service is cheap to clone; handlers pull the one they need through
/// [`FromRef`].
#[derive(Clone)]
pub struct AppState {
    pub mood_gate: MoodGate,
    pub watched_movies: WatchedMovieTracker,
    pub users: UserService,
    pub recommendations: RecommendationService,
    pub voice_gate: VoiceGate,
}

impl AppState {
    pub fn new(
        stores: Stores,
        publisher: Arc<dyn RefreshPublisher>,
        profiles: Profiles,
        config: &Config,
    ) -> Self {
        Self {
            mood_gate: MoodGate::new(stores.moods, config.mood_cooldown_secs),
            watched_movies: WatchedMovieTracker::new(
                stores.watched_movies,
                stores.users.clone(),
                publisher.clone(),
                profiles.clone(),
            ),
            users: UserService::new(stores.users),
            recommendations: RecommendationService::new(
                stores.recommendations,
                publisher,
                profiles.clone(),
            ),
            voice_gate: VoiceGate::from_config(config, profiles),
        }
    }
}

impl FromRef<AppState> for MoodGate {
    fn from_ref(state: &AppState) -> Self {
        state.mood_gate.clone()
    }
}

impl FromRef<AppState> for WatchedMovieTracker {
    fn from_ref(state: &AppState) -> Self {
        state.watched_movies.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for RecommendationService {
    fn from_ref(state: &AppState) -> Self {
        state.recommendations.clone()
    }
}

impl FromRef<AppState> for VoiceGate {
    fn from_ref(state: &AppState) -> Self {
        state.voice_gate.clone()
    }
}
