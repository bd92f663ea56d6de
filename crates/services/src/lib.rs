#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod progress_reporter;
pub mod study_service;

pub use api::{ApiConfig, DEFAULT_API_URL, FlashcardApi, HttpFlashcardApi};
pub use app_services::AppServices;
pub use error::{ApiError, AppServicesError};
pub use progress_reporter::{ProgressReporter, ReportStats, ReporterWorker, RetryPolicy};
pub use study_service::StudyService;
