use std::sync::Arc;

use flashcards_core::model::Flashcard;
use flashcards_core::{GradeOutcome, SessionError, StudySession};

use crate::api::FlashcardApi;
use crate::error::ApiError;
use crate::progress_reporter::ProgressReporter;

/// Orchestrates deck loading and graded answers with background reporting.
#[derive(Clone)]
pub struct StudyService {
    api: Arc<dyn FlashcardApi>,
    reporter: ProgressReporter,
}

impl StudyService {
    #[must_use]
    pub fn new(api: Arc<dyn FlashcardApi>, reporter: ProgressReporter) -> Self {
        Self { api, reporter }
    }

    /// Fetch the deck once.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request fails, the status is not a success
    /// or the body is not a flashcard array.
    pub async fn load_deck(&self) -> Result<Vec<Flashcard>, ApiError> {
        let cards = self.api.fetch_flashcards().await?;
        tracing::info!(count = cards.len(), "flashcards loaded");
        if cards.is_empty() {
            tracing::warn!("backend returned an empty deck");
        }
        Ok(cards)
    }

    /// Start a session over a freshly fetched deck.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the deck cannot be loaded.
    pub async fn start_session(&self) -> Result<StudySession, ApiError> {
        let cards = self.load_deck().await?;
        Ok(StudySession::with_cards(cards))
    }

    /// Grade the current card and queue its progress report.
    ///
    /// The session moves on immediately; delivery happens in the background.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the session has no gradable card.
    pub fn grade(
        &self,
        session: &mut StudySession,
        is_correct: bool,
    ) -> Result<GradeOutcome, SessionError> {
        let outcome = session.grade(is_correct)?;
        tracing::debug!(
            flashcard_id = %outcome.report.flashcard_id,
            score = outcome.report.score.value(),
            finished = outcome.finished,
            "card graded"
        );
        self.reporter.submit(outcome.report);
        Ok(outcome)
    }
}
