use flashcards_core::model::{Flashcard, FlashcardId};

/// UI-ready view of the card being studied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashcardVm {
    pub id: FlashcardId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl FlashcardVm {
    #[must_use]
    pub fn from_card(card: &Flashcard) -> Self {
        Self {
            id: card.id(),
            title: card.title().to_owned(),
            description: card.description().trim().to_owned(),
            image_url: card.image_url().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
