use std::sync::Arc;

use tracing::instrument;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, User, UserPreferences},
};

const MAX_USERNAME_LEN: usize = 50;
const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Raw signup fields before validation
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Option<UserPreferences>,
}

impl SignupRequest {
    /// Trims fields and fills defaults; the display name falls back to the username
    pub fn validate(self) -> AppResult<NewUser> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::InvalidInput("Username is required".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }

        let email = non_blank(self.email);
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(AppError::InvalidInput("Invalid email address".to_string()));
            }
        }

        let display_name = non_blank(self.display_name).unwrap_or_else(|| username.clone());
        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Display name must be at most {} characters",
                MAX_DISPLAY_NAME_LEN
            )));
        }

        Ok(NewUser {
            username,
            email,
            display_name,
            avatar_url: non_blank(self.avatar_url),
            preferences: self.preferences.unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create(&self, request: SignupRequest) -> AppResult<User> {
        let new_user = request.validate()?;
        let user = self.store.create(new_user).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn get(&self, user_id: i32) -> AppResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.store
            .find_by_username(username.trim())
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.store.list().await
    }

    #[instrument(skip(self, preferences))]
    pub async fn update_preferences(
        &self,
        user_id: i32,
        preferences: UserPreferences,
    ) -> AppResult<User> {
        self.store
            .update_preferences(user_id, preferences)
            .await?
            .ok_or_else(user_not_found)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32) -> AppResult<()> {
        match self.store.delete(user_id).await? {
            0 => Err(user_not_found()),
            _ => {
                tracing::info!("User deleted");
                Ok(())
            }
        }
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}
