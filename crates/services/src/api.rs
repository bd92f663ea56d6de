use async_trait::async_trait;
use flashcards_core::model::{Credential, Flashcard, ProgressReport};
use reqwest::Client;
use storage::repository::{Storage, StorageError};
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the backend lives and which slice of the deck to request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    category: Option<String>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` when `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            raw: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("url cannot be a base".into()));
        }
        Ok(Self {
            base_url: parsed,
            category: None,
        })
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// `GET` endpoint for the deck, scoped to the category when one is set.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the base URL cannot take path segments.
    pub fn flashcards_url(&self) -> Result<Url, ApiError> {
        match self.category.as_deref() {
            Some(category) => self.endpoint(&["api", "flashcards", category]),
            None => self.endpoint(&["api", "flashcards"]),
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the base URL cannot take path segments.
    pub fn progress_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["api", "progress"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                raw: self.base_url.to_string(),
                reason: "url cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Backend contract used by the study flow.
#[async_trait]
pub trait FlashcardApi: Send + Sync {
    /// Fetch the full flashcard collection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or non-success statuses.
    async fn fetch_flashcards(&self) -> Result<Vec<Flashcard>, ApiError>;

    /// Post one grading outcome. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or non-success statuses.
    async fn post_progress(&self, report: &ProgressReport) -> Result<(), ApiError>;
}

/// `reqwest`-backed client. The credential is fixed at construction.
#[derive(Clone)]
pub struct HttpFlashcardApi {
    client: Client,
    config: ApiConfig,
    credential: Credential,
}

impl HttpFlashcardApi {
    #[must_use]
    pub fn new(config: ApiConfig, credential: Credential) -> Self {
        Self {
            client: Client::new(),
            config,
            credential,
        }
    }

    /// Build a client whose credential is read once from `storage`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the stored token cannot be read.
    pub async fn from_storage(config: ApiConfig, storage: &Storage) -> Result<Self, StorageError> {
        let credential = storage.load_credential().await?;
        if !credential.is_present() {
            tracing::warn!("no bearer token stored; requests will be sent without one");
        }
        Ok(Self::new(config, credential))
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl FlashcardApi for HttpFlashcardApi {
    async fn fetch_flashcards(&self) -> Result<Vec<Flashcard>, ApiError> {
        let url = self.config.flashcards_url()?;
        tracing::debug!(%url, "fetching flashcards");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.credential.token())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }

        let cards: Vec<Flashcard> = response.json().await?;
        Ok(cards)
    }

    async fn post_progress(&self, report: &ProgressReport) -> Result<(), ApiError> {
        let url = self.config.progress_url()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.credential.token())
            .json(report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
