use std::sync::Arc;

use tracing::instrument;

use crate::{
    config::Profiles,
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{RecommendationRow, RecommendationStats, RefreshAction, RefreshEvent},
    services::refresh::RefreshPublisher,
};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Serves the recommendation cache tables and queues refreshes for them
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    publisher: Arc<dyn RefreshPublisher>,
    profiles: Profiles,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn RecommendationStore>,
        publisher: Arc<dyn RefreshPublisher>,
        profiles: Profiles,
    ) -> Self {
        Self {
            store,
            publisher,
            profiles,
        }
    }

    #[instrument(skip(self))]
    pub async fn for_profile(
        &self,
        username: &str,
        limit: Option<i64>,
        shuffle: Option<bool>,
    ) -> AppResult<Vec<RecommendationRow>> {
        let table = self.table_for(username)?;
        let limit = resolve_limit(limit)?;
        self.store
            .active(&table, limit, shuffle.unwrap_or(true))
            .await
    }

    pub async fn stats(&self, username: &str) -> AppResult<RecommendationStats> {
        let table = self.table_for(username)?;
        self.store.stats(&table).await
    }

    /// Queues a rebuild of the profile's table and returns the queued event
    #[instrument(skip(self))]
    pub fn request_refresh(&self, username: &str) -> AppResult<RefreshEvent> {
        self.table_for(username)?;
        let event = RefreshEvent::new(username, RefreshAction::Refresh);
        self.publisher.publish(event.clone());
        tracing::info!(event_id = %event.id, "Refresh requested");
        Ok(event)
    }

    fn table_for(&self, username: &str) -> AppResult<String> {
        self.profiles
            .dashboard_table(username)
            .ok_or_else(|| AppError::NotFound(format!("Unknown profile '{}'", username)))
    }
}

/// Defaults to 50; anything outside 1..=100 is rejected
pub fn resolve_limit(limit: Option<i64>) -> AppResult<i64> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, n
        ))),
    }
}
