use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Mood;

/// Page used when a caller does not name one
pub const DEFAULT_PAGE: &str = "main";

/// The latest mood a user picked on a page (one row per user and page)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MoodSelection {
    pub id: i32,
    pub user_id: i32,
    pub mood: Mood,
    pub selected_at: DateTime<Utc>,
    pub page: String,
}
