use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::flashcard::Flashcard;
use crate::model::ids::FlashcardId;

/// Outcome of grading one card, sent as `0` or `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProgressScore {
    Incorrect,
    Correct,
}

impl ProgressScore {
    #[must_use]
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Self::Incorrect => 0,
            Self::Correct => 1,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProgressError {
    #[error("progress score must be 0 or 1, got {0}")]
    InvalidScore(u8),
}

impl From<ProgressScore> for u8 {
    fn from(score: ProgressScore) -> Self {
        score.value()
    }
}

impl TryFrom<u8> for ProgressScore {
    type Error = ProgressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Incorrect),
            1 => Ok(Self::Correct),
            other => Err(ProgressError::InvalidScore(other)),
        }
    }
}

/// Write-only grading fact posted to `POST /api/progress`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub flashcard_id: FlashcardId,
    pub score: ProgressScore,
}

impl ProgressReport {
    #[must_use]
    pub fn for_card(card: &Flashcard, is_correct: bool) -> Self {
        Self {
            flashcard_id: card.id(),
            score: ProgressScore::from_correct(is_correct),
        }
    }
}
