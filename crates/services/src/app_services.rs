use std::sync::Arc;

use storage::repository::Storage;

use crate::api::{ApiConfig, FlashcardApi, HttpFlashcardApi};
use crate::error::AppServicesError;
use crate::progress_reporter::{ProgressReporter, ReportStats, ReporterWorker, RetryPolicy};
use crate::study_service::StudyService;

/// Assembles app-facing services around one backend client.
pub struct AppServices {
    storage: Storage,
    study: Arc<StudyService>,
    worker: ReporterWorker,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Must be called inside a tokio runtime; the progress worker is spawned here.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the token lookup fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        policy: RetryPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, config, policy).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the stored token cannot be read.
    pub async fn with_storage(
        storage: Storage,
        config: ApiConfig,
        policy: RetryPolicy,
    ) -> Result<Self, AppServicesError> {
        let api = HttpFlashcardApi::from_storage(config, &storage).await?;
        tracing::info!(
            api_url = %api.config().base_url(),
            category = api.config().category().unwrap_or("-"),
            "flashcard api configured"
        );
        let api: Arc<dyn FlashcardApi> = Arc::new(api);
        let (reporter, worker) = ProgressReporter::spawn(Arc::clone(&api), policy);
        let study = Arc::new(StudyService::new(api, reporter));

        Ok(Self {
            storage,
            study,
            worker,
        })
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    /// Close the report queue and wait for already queued reports to drain.
    ///
    /// Outstanding `StudyService` clones stay usable for loading, but their
    /// grades are no longer reported.
    pub async fn shutdown(self) -> ReportStats {
        let stats = self.worker.join().await;
        tracing::info!(
            delivered = stats.delivered,
            dropped = stats.dropped,
            "progress reports flushed"
        );
        stats
    }
}
