use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::{
    db::MoodStore,
    error::{AppError, AppResult},
    models::{Mood, MoodSelection, DEFAULT_PAGE},
};

const MAX_PAGE_LEN: usize = 50;

/// Decides when to re-prompt a user for their mood and records the answers
///
/// Per (user, page) the state is either "no selection" or "selected at t";
/// re-selecting replaces the payload in place.
#[derive(Clone)]
pub struct MoodGate {
    store: Arc<dyn MoodStore>,
    cooldown: Duration,
}

impl MoodGate {
    pub fn new(store: Arc<dyn MoodStore>, cooldown_secs: i64) -> Self {
        Self {
            store,
            cooldown: Duration::seconds(cooldown_secs),
        }
    }

    /// Whether the mood prompt should be shown right now
    pub async fn should_show(&self, user_id: i32, page: &str) -> bool {
        self.should_show_at(user_id, page, Utc::now()).await
    }

    /// Same as [`MoodGate::should_show`] with an explicit clock
    ///
    /// Store failures show the prompt rather than hide it.
    #[instrument(skip(self))]
    pub async fn should_show_at(&self, user_id: i32, page: &str, now: DateTime<Utc>) -> bool {
        match self.store.latest(user_id, page).await {
            Ok(last) => prompt_due(last.as_ref(), now, self.cooldown),
            Err(e) => {
                tracing::warn!(error = %e, "Mood lookup failed, showing prompt");
                true
            }
        }
    }

    /// Upserts the user's mood for a page and returns the stored row
    #[instrument(skip(self))]
    pub async fn record_selection(
        &self,
        user_id: i32,
        page: &str,
        mood: Mood,
    ) -> AppResult<MoodSelection> {
        validate_page(page)?;
        let selection = self.store.upsert(user_id, page, mood).await?;

        tracing::info!(
            selection_id = selection.id,
            mood = %selection.mood,
            "Mood selection recorded"
        );

        Ok(selection)
    }

    pub async fn latest(&self, user_id: i32, page: &str) -> AppResult<Option<MoodSelection>> {
        self.store.latest(user_id, page).await
    }

    pub async fn history(&self, user_id: i32) -> AppResult<Vec<MoodSelection>> {
        self.store.list_for_user(user_id).await
    }
}

/// Pure re-prompt predicate: no selection, or the last one is older than the cooldown
pub fn prompt_due(last: Option<&MoodSelection>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(selection) => now - selection.selected_at > cooldown,
    }
}

/// Resolves an optional `page` parameter, falling back to the main page
pub fn page_or_default(page: Option<String>) -> String {
    page.map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGE.to_string())
}

fn validate_page(page: &str) -> AppResult<()> {
    if page.trim().is_empty() {
        return Err(AppError::InvalidInput("Page must not be empty".to_string()));
    }
    if page.chars().count() > MAX_PAGE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Page must be at most {} characters",
            MAX_PAGE_LEN
        )));
    }
    Ok(())
}
