use serde::{Deserialize, Serialize};

use crate::model::ids::FlashcardId;

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A single study item as served by `GET /api/flashcards`.
///
/// `description` and `image_url` may be `null` or absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    id: FlashcardId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl Flashcard {
    #[must_use]
    pub fn new(
        id: FlashcardId,
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: Some(description.into()),
            image_url,
        }
    }

    #[must_use]
    pub fn id(&self) -> FlashcardId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Image location, if the card has one. Blank URLs count as absent.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
