mod card_vm;
mod study_vm;

pub use card_vm::FlashcardVm;
pub use study_vm::{StudyIntent, StudyVm};
