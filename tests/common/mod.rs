//! In-memory stores and a recording publisher for driving the router in tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use sqlx::types::Json;

use firetv_api::{
    api::{create_router, AppState},
    config::{Config, Profiles},
    db::{MoodStore, RecommendationStore, Stores, UserStore, WatchedMovieStore},
    error::{AppError, AppResult},
    models::{
        Mood, MoodSelection, MovieRating, NewUser, NewWatchedMovie, RecommendationRow,
        RecommendationStats, RefreshEvent, User, UserPreferences, WatchedMovie,
        WatchedMovieFilter, WatchedMovieUpdate, WatchedMovieWithUser, WatchedStats,
    },
    services::refresh::RefreshPublisher,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    moods: Vec<MoodSelection>,
    watched: Vec<WatchedMovie>,
    dashboards: HashMap<String, Vec<(RecommendationRow, bool)>>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, user_id: i32) -> AppResult<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(AppError::NotFound("User not found".to_string()))
        }
    }
}

/// Single in-memory database backing every store trait
///
/// Emulates the unique and foreign-key constraints of the real schema.
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    /// Database seeded with the four default profile users (ids 1-4)
    pub fn seeded() -> Arc<Self> {
        let db = Arc::new(Self::default());
        {
            let mut tables = db.tables.lock().unwrap();
            for name in ["anshul", "shikhar", "priyanshu", "shaurya"] {
                let id = tables.next_id();
                let now = Utc::now();
                tables.users.push(User {
                    id,
                    username: name.to_string(),
                    email: Some(format!("{}@firetv.local", name)),
                    display_name: name.to_string(),
                    avatar_url: None,
                    preferences: Json(UserPreferences::default()),
                    created_at: now,
                    updated_at: now,
                });
            }
        }
        db
    }

    /// Moves every mood selection of a user into the past
    pub fn age_moods(&self, user_id: i32, secs: i64) {
        let mut tables = self.tables.lock().unwrap();
        for selection in tables.moods.iter_mut().filter(|m| m.user_id == user_id) {
            selection.selected_at = selection.selected_at - Duration::seconds(secs);
        }
    }

    pub fn mood_count(&self, user_id: i32) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.moods.iter().filter(|m| m.user_id == user_id).count()
    }

    pub fn watched_count(&self, user_id: i32) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.watched.iter().filter(|w| w.user_id == user_id).count()
    }

    pub fn add_recommendation(&self, table: &str, tmdb_id: i32, score: f64, active: bool) {
        let mut tables = self.tables.lock().unwrap();
        tables
            .dashboards
            .entry(table.to_string())
            .or_default()
            .push((
                RecommendationRow {
                    tmdb_id,
                    title: format!("Movie {}", tmdb_id),
                    genres: vec!["Drama".to_string()],
                    vote_average: Some(7.5),
                    popularity: Some(42.0),
                    overview: None,
                    poster_path: None,
                    similarity_score: score,
                    recommendation_reason: Some("Similar to what you loved".to_string()),
                    added_at: Utc::now(),
                },
                active,
            ));
    }
}

#[async_trait]
impl MoodStore for MemoryDb {
    async fn upsert(&self, user_id: i32, page: &str, mood: Mood) -> AppResult<MoodSelection> {
        let mut tables = self.tables.lock().unwrap();
        tables.require_user(user_id)?;

        if let Some(existing) = tables
            .moods
            .iter_mut()
            .find(|m| m.user_id == user_id && m.page == page)
        {
            existing.mood = mood;
            existing.selected_at = Utc::now();
            return Ok(existing.clone());
        }

        let selection = MoodSelection {
            id: tables.next_id(),
            user_id,
            mood,
            selected_at: Utc::now(),
            page: page.to_string(),
        };
        tables.moods.push(selection.clone());
        Ok(selection)
    }

    async fn latest(&self, user_id: i32, page: &str) -> AppResult<Option<MoodSelection>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .moods
            .iter()
            .find(|m| m.user_id == user_id && m.page == page)
            .cloned())
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MoodSelection>> {
        let tables = self.tables.lock().unwrap();
        let mut moods: Vec<_> = tables
            .moods
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        moods.sort_by(|a, b| b.selected_at.cmp(&a.selected_at));
        Ok(moods)
    }
}

#[async_trait]
impl WatchedMovieStore for MemoryDb {
    async fn upsert(&self, user_id: i32, movie: NewWatchedMovie) -> AppResult<WatchedMovie> {
        let mut tables = self.tables.lock().unwrap();
        tables.require_user(user_id)?;
        let now = Utc::now();

        if let Some(existing) = tables
            .watched
            .iter_mut()
            .find(|w| w.user_id == user_id && w.tmdb_id == movie.tmdb_id)
        {
            existing.rating = movie.rating;
            existing.current_mood = movie.current_mood;
            existing.watched_at = now;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = WatchedMovie {
            id: tables.next_id(),
            user_id,
            movie_id: movie.movie_id,
            tmdb_id: movie.tmdb_id,
            title: movie.title,
            watched_at: now,
            rating: movie.rating,
            current_mood: movie.current_mood,
            created_at: now,
            updated_at: now,
        };
        tables.watched.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        user_id: i32,
        tmdb_id: i32,
        update: WatchedMovieUpdate,
    ) -> AppResult<Option<WatchedMovie>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables
            .watched
            .iter_mut()
            .find(|w| w.user_id == user_id && w.tmdb_id == tmdb_id)
        else {
            return Ok(None);
        };

        if let Some(rating) = update.rating {
            row.rating = rating;
        }
        if let Some(mood) = update.current_mood {
            row.current_mood = Some(mood);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn find(&self, user_id: i32, tmdb_id: i32) -> AppResult<Option<WatchedMovie>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .watched
            .iter()
            .find(|w| w.user_id == user_id && w.tmdb_id == tmdb_id)
            .cloned())
    }

    async fn delete(&self, user_id: i32, tmdb_id: i32) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.watched.len();
        tables
            .watched
            .retain(|w| !(w.user_id == user_id && w.tmdb_id == tmdb_id));
        Ok((before - tables.watched.len()) as u64)
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: WatchedMovieFilter,
    ) -> AppResult<Vec<WatchedMovie>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .watched
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| filter.rating.map_or(true, |r| w.rating == r))
            .filter(|w| filter.mood.map_or(true, |m| w.current_mood == Some(m)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(rows)
    }

    async fn stats_for_user(&self, user_id: i32) -> AppResult<WatchedStats> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<_> = tables
            .watched
            .iter()
            .filter(|w| w.user_id == user_id)
            .collect();
        let count = |rating: MovieRating| rows.iter().filter(|w| w.rating == rating).count() as i64;

        Ok(WatchedStats {
            total: rows.len() as i64,
            disliked: count(MovieRating::Disliked),
            good: count(MovieRating::Good),
            loved: count(MovieRating::Loved),
        })
    }

    async fn list_all(&self) -> AppResult<Vec<WatchedMovieWithUser>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .watched
            .iter()
            .filter_map(|w| {
                let user = tables.users.iter().find(|u| u.id == w.user_id)?;
                Some(WatchedMovieWithUser {
                    movie: w.clone(),
                    username: user.username.clone(),
                    display_name: user.display_name.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if user.email.is_some() && tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: tables.next_id(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            preferences: Json(user.preferences),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.clone())
    }

    async fn update_preferences(
        &self,
        user_id: i32,
        preferences: UserPreferences,
    ) -> AppResult<Option<User>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.iter_mut().find(|u| u.id == user_id).map(|u| {
            u.preferences = Json(preferences);
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn delete(&self, user_id: i32) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != user_id);
        let removed = (before - tables.users.len()) as u64;
        if removed > 0 {
            tables.moods.retain(|m| m.user_id != user_id);
            tables.watched.retain(|w| w.user_id != user_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl RecommendationStore for MemoryDb {
    async fn active(
        &self,
        table: &str,
        limit: i64,
        _shuffle: bool,
    ) -> AppResult<Vec<RecommendationRow>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .dashboards
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, active)| *active)
                    .map(|(row, _)| row.clone())
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn stats(&self, table: &str) -> AppResult<RecommendationStats> {
        let tables = self.tables.lock().unwrap();
        let rows = tables.dashboards.get(table).cloned().unwrap_or_default();
        let active: Vec<_> = rows.iter().filter(|(_, a)| *a).collect();
        let average = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|(r, _)| r.similarity_score).sum::<f64>() / active.len() as f64
        };

        Ok(RecommendationStats {
            active_recommendations: active.len() as i64,
            total_recommendations: rows.len() as i64,
            average_similarity_score: average,
        })
    }
}

/// Publisher that keeps every event it is handed
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<RefreshEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<RefreshEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl RefreshPublisher for RecordingPublisher {
    fn publish(&self, event: RefreshEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<MemoryDb>,
    pub publisher: Arc<RecordingPublisher>,
}

pub fn spawn_app() -> TestApp {
    let db = MemoryDb::seeded();
    let publisher = Arc::new(RecordingPublisher::default());

    let stores = Stores {
        moods: db.clone(),
        watched_movies: db.clone(),
        users: db.clone(),
        recommendations: db.clone(),
    };
    let state = AppState::new(
        stores,
        publisher.clone(),
        Profiles::default(),
        &Config::default(),
    );

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        db,
        publisher,
    }
}
