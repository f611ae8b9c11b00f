//! Typed wrappers over the `/treinamentos` endpoints.

mod api;
mod model;
mod wire;

pub use model::{NewTraining, Training, TrainingCreated, TrainingStatus};

use crate::core::{ApiClient, ApiError, CacheMode, CachePolicy, RetryConfig};

/// Access to the trainings catalogue for one caller.
///
/// Mutations drop every cached `/treinamentos` response so later reads see them.
#[derive(Debug, Clone)]
pub struct Trainings {
    client: ApiClient,
    token: Option<String>,
    cache: Option<CachePolicy>,
    retry_override: Option<RetryConfig>,
}

impl Trainings {
    /// Creates a handle using `client`.
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.clone(),
            token: None,
            cache: None,
            retry_override: None,
        }
    }

    /// Authenticates calls with a bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the cache mode for reads made through this handle.
    #[must_use]
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache = Some(self.cache.unwrap_or_default().mode(mode));
        self
    }

    /// Overrides the default retry policy for calls made through this handle.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    fn opts(&self, cached: bool) -> api::CallOptions<'_> {
        api::CallOptions {
            token: self.token.as_deref(),
            cache: if cached { self.cache.as_ref() } else { None },
            retry_override: self.retry_override.as_ref(),
        }
    }

    /// Lists every training visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the listing cannot be parsed.
    pub async fn list(&self) -> Result<Vec<Training>, ApiError> {
        api::list(&self.client, &self.opts(true)).await
    }

    /// Fetches one training by id.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; `DATA_NOT_FOUND` when the id does not exist.
    pub async fn get(&self, id: &str) -> Result<Training, ApiError> {
        api::get(&self.client, id, &self.opts(true)).await
    }

    /// Creates a training.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; `VALIDATION_ERROR` when the backend rejects the fields.
    pub async fn create(&self, training: &NewTraining) -> Result<TrainingCreated, ApiError> {
        api::create(&self.client, training, &self.opts(false)).await
    }

    /// Replaces a training's fields.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, training: &NewTraining) -> Result<(), ApiError> {
        api::update(&self.client, id, training, &self.opts(false)).await
    }

    /// Deletes a training.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        api::delete(&self.client, id, &self.opts(false)).await
    }
}
