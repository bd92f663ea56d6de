use std::sync::Arc;

use services::StudyService;

pub trait UiApp: Send + Sync {
    fn study_service(&self) -> Arc<StudyService>;

    /// Category the deck is scoped to, if any. Shown as a subtitle.
    fn category(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct AppContext {
    study: Arc<StudyService>,
    category: Option<String>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            study: app.study_service(),
            category: app.category(),
        }
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
