mod credential;
mod flashcard;
mod ids;
mod progress;

pub use credential::{BearerToken, Credential};
pub use flashcard::Flashcard;
pub use ids::{FlashcardId, ParseIdError};
pub use progress::{ProgressError, ProgressReport, ProgressScore};
