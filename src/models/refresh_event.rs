use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the recommender should do for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefreshAction {
    /// Rebuild the profile's recommendation table
    Refresh,
    /// Deactivate a disliked movie and demote similar ones
    Dislike { tmdb_id: i32 },
}

impl RefreshAction {
    /// Command-line arguments after the script path
    pub fn command_args(&self, username: &str) -> Vec<String> {
        match self {
            RefreshAction::Refresh => vec!["refresh".to_string(), username.to_string()],
            RefreshAction::Dislike { tmdb_id } => vec![
                "dislike".to_string(),
                username.to_string(),
                tmdb_id.to_string(),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RefreshAction::Refresh => "refresh",
            RefreshAction::Dislike { .. } => "dislike",
        }
    }
}

/// Message placed on the refresh queue and consumed by the refresh worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshEvent {
    pub id: Uuid,
    pub username: String,
    pub action: RefreshAction,
    /// Number of failed attempts so far
    #[serde(default)]
    pub attempt: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl RefreshEvent {
    pub fn new(username: impl Into<String>, action: RefreshAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            action,
            attempt: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Copy of this event scheduled for another attempt
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            enqueued_at: Utc::now(),
            ..self.clone()
        }
    }
}
