use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use flashcards_core::SessionPhase;
use flashcards_core::model::{Flashcard, FlashcardId, ProgressReport};
use services::{
    ApiError, FlashcardApi, ProgressReporter, ReportStats, ReporterWorker, RetryPolicy,
    StudyService,
};

use crate::context::{UiApp, build_app_context};
use crate::views::StudyView;
use crate::views::study::StudyTestHandles;
use crate::vm::StudyIntent;

/// Serves a fixed deck (or a failure) and records progress posts.
pub struct ScriptedApi {
    deck: Option<Vec<Flashcard>>,
    posted: Mutex<Vec<ProgressReport>>,
}

impl ScriptedApi {
    pub fn posted(&self) -> Vec<ProgressReport> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlashcardApi for ScriptedApi {
    async fn fetch_flashcards(&self) -> Result<Vec<Flashcard>, ApiError> {
        self.deck.clone().ok_or_else(|| ApiError::InvalidBaseUrl {
            raw: "http://offline.test".into(),
            reason: "backend unreachable".into(),
        })
    }

    async fn post_progress(&self, report: &ProgressReport) -> Result<(), ApiError> {
        self.posted.lock().unwrap().push(*report);
        Ok(())
    }
}

#[derive(Clone)]
struct TestApp {
    study: Arc<StudyService>,
    category: Option<String>,
}

impl UiApp for TestApp {
    fn study_service(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    fn category(&self) -> Option<String> {
        self.category.clone()
    }
}

#[derive(Props, Clone)]
struct StudyHarnessProps {
    app: Arc<TestApp>,
    handles: StudyTestHandles,
}

impl PartialEq for StudyHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn StudyRouterHarness(props: StudyHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    rsx! { StudyView {} }
}

pub struct StudyHarness {
    pub dom: VirtualDom,
    pub api: Arc<ScriptedApi>,
    handles: StudyTestHandles,
    worker: ReporterWorker,
}

impl StudyHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let the deck request resolve.
    pub async fn load(&mut self) {
        self.rebuild();
        self.drive_async().await;
        self.drive_async().await;
    }

    pub fn send(&mut self, intent: StudyIntent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
        drive_dom(&mut self.dom);
    }

    pub fn phase(&self) -> SessionPhase {
        let vm = self.handles.vm();
        self.dom.in_runtime(|| vm.read().phase())
    }

    pub fn score(&self) -> u32 {
        let vm = self.handles.vm();
        self.dom.in_runtime(|| vm.read().session().score())
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    /// Tear the view down and wait for queued reports to be delivered.
    pub async fn finish(self) -> (Vec<ProgressReport>, ReportStats) {
        let Self {
            dom, api, worker, ..
        } = self;
        drop(dom);
        let stats = tokio::time::timeout(Duration::from_secs(1), worker.join())
            .await
            .expect("progress worker drained");
        (api.posted(), stats)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn deck(size: u64) -> Vec<Flashcard> {
    (1..=size)
        .map(|id| {
            Flashcard::new(
                FlashcardId::new(id),
                format!("Emoción {id}"),
                format!("Descripción {id}"),
                Some(format!("https://img.test/{id}.png")),
            )
        })
        .collect()
}

/// `deck: None` makes the deck request fail.
pub fn setup_study_harness(deck: Option<Vec<Flashcard>>, category: Option<&str>) -> StudyHarness {
    let api = Arc::new(ScriptedApi {
        deck,
        posted: Mutex::new(Vec::new()),
    });
    let api_dyn: Arc<dyn FlashcardApi> = api.clone();
    let (reporter, worker) = ProgressReporter::spawn(Arc::clone(&api_dyn), RetryPolicy::no_retry());
    let study = Arc::new(StudyService::new(api_dyn, reporter));

    let app = Arc::new(TestApp {
        study,
        category: category.map(str::to_owned),
    });
    let handles = StudyTestHandles::default();
    let dom = VirtualDom::new_with_props(
        StudyRouterHarness,
        StudyHarnessProps {
            app,
            handles: handles.clone(),
        },
    );

    StudyHarness {
        dom,
        api,
        handles,
        worker,
    }
}
