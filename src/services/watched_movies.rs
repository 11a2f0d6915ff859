use std::sync::Arc;

use tracing::instrument;

use crate::{
    config::Profiles,
    db::{UserStore, WatchedMovieStore},
    error::{AppError, AppResult},
    models::{
        MovieRating, NewWatchedMovie, RefreshAction, RefreshEvent, WatchedMovie,
        WatchedMovieFilter, WatchedMovieUpdate, WatchedMovieWithUser, WatchedStats,
    },
    services::refresh::RefreshPublisher,
};

const MAX_TITLE_LEN: usize = 255;

/// Tracks what each user watched and how they rated it
///
/// Marking a movie watched is last-action-wins: repeating it overwrites the
/// rating and mood and renews `watched_at`. Partial updates leave
/// `watched_at` alone.
#[derive(Clone)]
pub struct WatchedMovieTracker {
    store: Arc<dyn WatchedMovieStore>,
    users: Arc<dyn UserStore>,
    publisher: Arc<dyn RefreshPublisher>,
    profiles: Profiles,
}

impl WatchedMovieTracker {
    pub fn new(
        store: Arc<dyn WatchedMovieStore>,
        users: Arc<dyn UserStore>,
        publisher: Arc<dyn RefreshPublisher>,
        profiles: Profiles,
    ) -> Self {
        Self {
            store,
            users,
            publisher,
            profiles,
        }
    }

    /// Records that the user watched a movie, overwriting any earlier record
    ///
    /// The row is written first; refresh work is published only afterwards and
    /// only for allow-listed profiles. A disliked rating also asks the
    /// recommender to drop that title before the refresh runs.
    #[instrument(skip(self, movie), fields(tmdb_id = movie.tmdb_id, rating = %movie.rating))]
    pub async fn mark_watched(
        &self,
        user_id: i32,
        movie: NewWatchedMovie,
    ) -> AppResult<WatchedMovie> {
        validate_new_movie(&movie)?;

        let row = self.store.upsert(user_id, movie).await?;
        tracing::info!(watched_id = row.id, "Movie marked as watched");

        // Dislike goes first so the refresh already excludes the title
        let mut actions = Vec::with_capacity(2);
        if row.rating == MovieRating::Disliked {
            actions.push(RefreshAction::Dislike {
                tmdb_id: row.tmdb_id,
            });
        }
        actions.push(RefreshAction::Refresh);
        self.request_refresh(user_id, &actions).await;

        Ok(row)
    }

    /// Partial update of rating and/or mood
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: i32,
        tmdb_id: i32,
        update: WatchedMovieUpdate,
    ) -> AppResult<WatchedMovie> {
        if update.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        // `update` moves into the store, so note the rating first
        let disliked = update.rating == Some(MovieRating::Disliked);

        let row = self
            .store
            .update(user_id, tmdb_id, update)
            .await?
            .ok_or_else(not_found)?;

        if disliked {
            self.request_refresh(user_id, &[RefreshAction::Dislike { tmdb_id }])
                .await;
        }

        Ok(row)
    }

    pub async fn set_rating(
        &self,
        user_id: i32,
        tmdb_id: i32,
        rating: MovieRating,
    ) -> AppResult<WatchedMovie> {
        let update = WatchedMovieUpdate {
            rating: Some(rating),
            ..Default::default()
        };
        self.update(user_id, tmdb_id, update).await
    }

    pub async fn status(&self, user_id: i32, tmdb_id: i32) -> AppResult<Option<WatchedMovie>> {
        self.store.find(user_id, tmdb_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: i32, tmdb_id: i32) -> AppResult<()> {
        match self.store.delete(user_id, tmdb_id).await? {
            0 => Err(not_found()),
            _ => {
                tracing::info!("Watched movie removed");
                Ok(())
            }
        }
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        filter: WatchedMovieFilter,
    ) -> AppResult<Vec<WatchedMovie>> {
        self.store.list_for_user(user_id, filter).await
    }

    pub async fn stats_for_user(&self, user_id: i32) -> AppResult<WatchedStats> {
        self.store.stats_for_user(user_id).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<WatchedMovieWithUser>> {
        self.store.list_all().await
    }

    /// Publishes refresh work for the user's profile; never fails the caller
    async fn request_refresh(&self, user_id: i32, actions: &[RefreshAction]) {
        let username = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.username,
            Ok(None) => {
                tracing::warn!(user_id, "No user for refresh request");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id, "User lookup for refresh failed");
                return;
            }
        };

        if !self.profiles.contains(&username) {
            tracing::debug!(%username, "User is not a recommendation profile, skipping refresh");
            return;
        }

        for action in actions {
            self.publisher
                .publish(RefreshEvent::new(username.clone(), *action));
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Watched movie not found".to_string())
}

fn validate_new_movie(movie: &NewWatchedMovie) -> AppResult<()> {
    if movie.tmdb_id <= 0 || movie.movie_id <= 0 {
        return Err(AppError::InvalidInput(
            "movie_id and tmdb_id must be positive".to_string(),
        ));
    }
    let title = movie.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}
