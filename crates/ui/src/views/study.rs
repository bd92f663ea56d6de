use std::sync::Arc;

use dioxus::document::eval;
use dioxus::prelude::*;
use flashcards_core::SessionPhase;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{FlashcardVm, StudyIntent, StudyVm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const LOADING_TEXT: &str = "Cargando flashcards...";

fn intent_for_key(phase: SessionPhase, key: &Key, code: Code) -> Option<StudyIntent> {
    match phase {
        SessionPhase::Loading => None,
        SessionPhase::Showing(_) => match key {
            Key::Character(value) if value == "1" => Some(StudyIntent::Grade(true)),
            Key::Character(value) if value == "2" => Some(StudyIntent::Grade(false)),
            _ if code == Code::Space => Some(StudyIntent::Reveal),
            _ => None,
        },
        SessionPhase::Revealed(_) => {
            (*key == Key::Enter || code == Code::Space).then_some(StudyIntent::Advance)
        }
    }
}

#[component]
pub fn StudyView() -> Element {
    let ctx = use_context::<AppContext>();
    let study = ctx.study();
    let category = ctx.category().map(str::to_owned);

    let vm = use_signal(StudyVm::loading);

    let study_for_resource = Arc::clone(&study);
    let resource = use_resource(move || {
        let study = Arc::clone(&study_for_resource);
        let mut vm = vm;

        async move {
            match study.start_session().await {
                Ok(session) => {
                    vm.set(StudyVm::new(session));
                    Ok::<_, ViewError>(())
                }
                Err(err) => {
                    // No retry: the view stays on its loading text.
                    tracing::error!(error = %err, "failed to load flashcards");
                    Err(ViewError::DeckUnavailable)
                }
            }
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let study = Arc::clone(&study);
        use_callback(move |intent: StudyIntent| {
            let mut vm = vm;
            if let Err(err) = vm.write().dispatch(&study, intent) {
                tracing::debug!(error = %err, ?intent, "study action ignored");
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<StudyTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    use_effect(move || {
        if !vm.read().is_loading() {
            let _ = eval("document.getElementById('study-root')?.focus();");
        }
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        let phase = vm.read().phase();
        if let Some(intent) = intent_for_key(phase, &evt.data.key(), evt.data.code()) {
            evt.prevent_default();
            dispatch_intent.call(intent);
        }
    });

    let vm_guard = vm.read();
    let card = vm_guard.current_card();
    let ready = matches!(state, ViewState::Ready(()));

    match card {
        Some(card) if ready => {
            let phase = vm_guard.phase();
            let score_label = vm_guard.score_label();
            let progress_label = vm_guard.progress_label();
            let completion_label = vm_guard.completion_label();
            let can_advance = vm_guard.can_advance();

            rsx! {
                div {
                    class: "flashcard-container",
                    id: "study-root",
                    tabindex: "0",
                    onkeydown: move |evt| on_key.call(evt),
                    if let Some(category) = category {
                        div { class: "category", "{category}" }
                    }
                    div { class: "score", "{score_label}" }
                    div { class: "flashcard",
                        CardFace { card }
                        match phase {
                            SessionPhase::Showing(_) => rsx! {
                                div { class: "answer-options",
                                    button {
                                        class: "option-button correct",
                                        id: "study-correct",
                                        r#type: "button",
                                        onclick: move |_| dispatch_intent.call(StudyIntent::Grade(true)),
                                        "Correcto"
                                    }
                                    button {
                                        class: "option-button incorrect",
                                        id: "study-incorrect",
                                        r#type: "button",
                                        onclick: move |_| dispatch_intent.call(StudyIntent::Grade(false)),
                                        "Incorrecto"
                                    }
                                }
                            },
                            SessionPhase::Revealed(_) => rsx! {
                                button {
                                    class: "next-button",
                                    id: "study-next",
                                    r#type: "button",
                                    disabled: !can_advance,
                                    onclick: move |_| dispatch_intent.call(StudyIntent::Advance),
                                    "Siguiente"
                                }
                            },
                            SessionPhase::Loading => rsx! {},
                        }
                    }
                    if let Some(label) = completion_label {
                        div { class: "completion", "{label}" }
                    }
                    div { class: "progress", "{progress_label}" }
                }
            }
        }
        _ => rsx! {
            div { class: "loading", "{LOADING_TEXT}" }
        },
    }
}

#[component]
fn CardFace(card: FlashcardVm) -> Element {
    rsx! {
        div { class: "flashcard-content",
            if let Some(src) = card.image_url.as_deref() {
                img { class: "flashcard-image", src: "{src}", alt: "{card.title}" }
            }
            h3 { "{card.title}" }
            if card.has_description() {
                p { "{card.description}" }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct StudyTestHandles {
    dispatch: Rc<RefCell<Option<Callback<StudyIntent>>>>,
    vm: Rc<RefCell<Option<Signal<StudyVm>>>>,
}

#[cfg(test)]
impl StudyTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<StudyIntent>, vm: Signal<StudyVm>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<StudyIntent> {
        (*self.dispatch.borrow()).expect("study dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<StudyVm> {
        (*self.vm.borrow()).expect("study vm registered")
    }
}
