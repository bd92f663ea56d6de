//! Study session state machine.
//!
//! `Loading` (no cards) → `Showing(i)` → `Showing(i + 1)` on grade or advance.
//! Grading the last card ends in `Revealed(last)`, where only the advance
//! control remains and advancing is a no-op. `reveal` reaches `Revealed(i)`
//! from a showing card without grading it, except on the last card, which
//! must be graded.

use thiserror::Error;

use crate::model::{Flashcard, ProgressReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Showing(usize),
    Revealed(usize),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no flashcards loaded")]
    NotLoaded,
    #[error("card {0} is revealed and can no longer be graded")]
    AlreadyRevealed(usize),
    #[error("card {0} is the last card and has to be graded")]
    LastCard(usize),
}

/// Result of a successful grade action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradeOutcome {
    pub report: ProgressReport,
    pub advanced: bool,
    pub finished: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudySession {
    cards: Vec<Flashcard>,
    current_index: usize,
    revealed: bool,
    score: u32,
    graded: u32,
    finished: bool,
}

impl StudySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cards(cards: Vec<Flashcard>) -> Self {
        let mut session = Self::new();
        session.load(cards);
        session
    }

    /// Replace the deck wholesale and return to the first card.
    pub fn load(&mut self, cards: Vec<Flashcard>) {
        self.cards = cards;
        self.current_index = 0;
        self.revealed = false;
        self.finished = false;
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.cards.is_empty() {
            SessionPhase::Loading
        } else if self.revealed {
            SessionPhase::Revealed(self.current_index)
        } else {
            SessionPhase::Showing(self.current_index)
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.cards.get(self.current_index)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn graded(&self) -> u32 {
        self.graded
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        !self.cards.is_empty() && self.current_index + 1 == self.cards.len()
    }

    /// Grade the showing card and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before any cards are loaded and
    /// `SessionError::AlreadyRevealed` when the card is no longer gradable.
    pub fn grade(&mut self, is_correct: bool) -> Result<GradeOutcome, SessionError> {
        let index = match self.phase() {
            SessionPhase::Loading => return Err(SessionError::NotLoaded),
            SessionPhase::Revealed(index) => return Err(SessionError::AlreadyRevealed(index)),
            SessionPhase::Showing(index) => index,
        };
        let report = ProgressReport::for_card(&self.cards[index], is_correct);

        if is_correct {
            self.score = self.score.saturating_add(1);
        }
        self.graded = self.graded.saturating_add(1);

        let advanced = self.step_forward();
        if !advanced {
            self.revealed = true;
            self.finished = true;
        }

        Ok(GradeOutcome {
            report,
            advanced,
            finished: self.finished,
        })
    }

    /// Show the advance control for the current card without grading it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before any cards are loaded and
    /// `SessionError::LastCard` on the ungraded last card.
    pub fn reveal(&mut self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::Loading => Err(SessionError::NotLoaded),
            SessionPhase::Revealed(_) => Ok(()),
            SessionPhase::Showing(index) if self.is_last() => Err(SessionError::LastCard(index)),
            SessionPhase::Showing(_) => {
                self.revealed = true;
                Ok(())
            }
        }
    }

    /// Move to the next card without grading. No-op on the last card.
    pub fn advance(&mut self) -> bool {
        self.step_forward()
    }

    fn step_forward(&mut self) -> bool {
        if self.current_index + 1 < self.cards.len() {
            self.current_index += 1;
            self.revealed = false;
            true
        } else {
            false
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlashcardId, ProgressScore};

    fn deck(size: u64) -> Vec<Flashcard> {
        (1..=size)
            .map(|id| Flashcard::new(FlashcardId::new(id * 10), format!("Card {id}"), "", None))
            .collect()
    }

    #[test]
    fn empty_session_is_loading() {
        let mut session = StudySession::new();
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert_eq!(session.grade(true), Err(SessionError::NotLoaded));
        assert_eq!(session.reveal(), Err(SessionError::NotLoaded));
        assert!(!session.advance());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn loading_an_empty_deck_stays_loading() {
        let session = StudySession::with_cards(Vec::new());
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.current_card().is_none());
    }

    #[test]
    fn three_card_sequence_scores_two() {
        let mut session = StudySession::with_cards(deck(3));
        session.grade(true).unwrap();
        session.grade(false).unwrap();
        let outcome = session.grade(true).unwrap();

        assert_eq!(session.score(), 2);
        assert_eq!(session.graded(), 3);
        assert_eq!(session.current_index(), 2);
        assert!(outcome.finished);
        assert!(!outcome.advanced);
        assert_eq!(session.phase(), SessionPhase::Revealed(2));
    }

    #[test]
    fn grade_reports_current_card() {
        let mut session = StudySession::with_cards(deck(3));
        let outcome = session.grade(false).unwrap();
        assert_eq!(outcome.report.flashcard_id, FlashcardId::new(10));
        assert_eq!(outcome.report.score, ProgressScore::Incorrect);

        let outcome = session.grade(true).unwrap();
        assert_eq!(outcome.report.flashcard_id, FlashcardId::new(20));
        assert_eq!(outcome.report.score, ProgressScore::Correct);
    }

    #[test]
    fn index_moves_by_one_per_action_and_stays_in_bounds() {
        let mut session = StudySession::with_cards(deck(4));
        let mut previous = session.current_index();
        for step in 0..10 {
            let moved = if step % 2 == 0 {
                session
                    .grade(step % 4 == 0)
                    .is_ok_and(|outcome| outcome.advanced)
            } else {
                session.advance()
            };
            let now = session.current_index();
            if moved {
                assert_eq!(now, previous + 1, "step {step} reported a move");
            } else {
                assert_eq!(now, previous, "step {step} reported no move");
            }
            assert!(now < session.len());
            previous = now;
        }
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.graded(), 3);
        assert!(session.is_finished());
    }

    #[test]
    fn score_only_moves_on_correct_grades() {
        let mut session = StudySession::with_cards(deck(5));
        session.grade(false).unwrap();
        assert_eq!(session.score(), 0);
        session.advance();
        assert_eq!(session.score(), 0);
        session.grade(true).unwrap();
        assert_eq!(session.score(), 1);
        assert!(session.score() <= session.graded());
    }

    #[test]
    fn advance_on_last_card_is_noop() {
        let mut session = StudySession::with_cards(deck(2));
        assert!(session.advance());
        assert!(session.is_last());
        assert!(!session.advance());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.phase(), SessionPhase::Showing(1));
    }

    #[test]
    fn last_card_cannot_be_graded_twice() {
        let mut session = StudySession::with_cards(deck(1));
        session.grade(true).unwrap();
        assert_eq!(session.grade(true), Err(SessionError::AlreadyRevealed(0)));
        assert_eq!(session.score(), 1);
        assert_eq!(session.graded(), 1);
    }

    #[test]
    fn reveal_then_advance_skips_grading() {
        let mut session = StudySession::with_cards(deck(3));
        session.reveal().unwrap();
        assert_eq!(session.phase(), SessionPhase::Revealed(0));
        assert_eq!(session.grade(true), Err(SessionError::AlreadyRevealed(0)));
        assert!(session.advance());
        assert_eq!(session.phase(), SessionPhase::Showing(1));
        assert_eq!(session.graded(), 0);
    }

    #[test]
    fn reveal_on_last_card_keeps_it_gradable() {
        let mut session = StudySession::with_cards(deck(2));
        assert!(session.advance());
        assert_eq!(session.reveal(), Err(SessionError::LastCard(1)));
        assert_eq!(session.phase(), SessionPhase::Showing(1));
        assert!(!session.is_finished());

        let outcome = session.grade(false).unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.report.flashcard_id, FlashcardId::new(20));
        assert_eq!(session.phase(), SessionPhase::Revealed(1));
        assert_eq!(session.reveal(), Ok(()));
        assert_eq!(session.graded(), 1);
    }

    #[test]
    fn reload_replaces_deck_and_resets_position() {
        let mut session = StudySession::with_cards(deck(3));
        session.grade(true).unwrap();
        session.load(deck(2));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.len(), 2);
        assert_eq!(session.phase(), SessionPhase::Showing(0));
    }
}
