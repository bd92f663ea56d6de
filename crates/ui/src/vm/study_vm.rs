use flashcards_core::{SessionError, SessionPhase, StudySession};
use services::StudyService;

use crate::vm::FlashcardVm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyIntent {
    Grade(bool),
    Reveal,
    Advance,
}

/// Owns the session for the study view and formats its labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudyVm {
    session: StudySession,
}

impl StudyVm {
    #[must_use]
    pub fn new(session: StudySession) -> Self {
        Self { session }
    }

    /// A view model with no cards yet.
    #[must_use]
    pub fn loading() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    #[must_use]
    pub fn session(&self) -> &StudySession {
        &self.session
    }

    #[must_use]
    pub fn current_card(&self) -> Option<FlashcardVm> {
        self.session.current_card().map(FlashcardVm::from_card)
    }

    #[must_use]
    pub fn score_label(&self) -> String {
        format!("Puntuación: {}", self.session.score())
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        format!(
            "Tarjeta {} de {}",
            self.session.current_index() + 1,
            self.session.len()
        )
    }

    #[must_use]
    pub fn completion_label(&self) -> Option<String> {
        self.session.is_finished().then(|| {
            format!(
                "Sesión completada: {} de {}",
                self.session.score(),
                self.session.graded()
            )
        })
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.session.is_loading() && !self.session.is_last()
    }

    /// Apply one user action. Grades are handed to `study` so the report
    /// is queued.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the action does not apply to the current phase.
    pub fn dispatch(&mut self, study: &StudyService, intent: StudyIntent) -> Result<(), SessionError> {
        match intent {
            StudyIntent::Grade(is_correct) => {
                study.grade(&mut self.session, is_correct)?;
            }
            StudyIntent::Reveal => self.session.reveal()?,
            StudyIntent::Advance => {
                self.session.advance();
            }
        }
        Ok(())
    }
}
