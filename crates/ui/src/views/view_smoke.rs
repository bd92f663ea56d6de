use flashcards_core::SessionPhase;
use flashcards_core::model::{FlashcardId, ProgressScore};

use super::test_harness::{deck, setup_study_harness};
use crate::vm::StudyIntent;

#[tokio::test(flavor = "current_thread")]
async fn study_view_shows_loading_text_before_deck_arrives() {
    let mut harness = setup_study_harness(Some(deck(2)), None);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Cargando flashcards..."), "missing loading in {html}");
    assert!(!html.contains("Correcto"), "unexpected controls in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_stays_loading_when_fetch_fails() {
    let mut harness = setup_study_harness(None, None);
    harness.load().await;
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Cargando flashcards..."), "missing loading in {html}");
    assert!(!html.contains("Correcto"), "unexpected controls in {html}");
    assert_eq!(harness.phase(), SessionPhase::Loading);

    harness.send(StudyIntent::Grade(true));
    let (posted, _) = harness.finish().await;
    assert!(posted.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_stays_loading_for_empty_deck() {
    let mut harness = setup_study_harness(Some(Vec::new()), None);
    harness.load().await;
    let html = harness.render();
    assert!(html.contains("Cargando flashcards..."), "missing loading in {html}");
    assert!(!html.contains("Puntuación"), "unexpected score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_renders_first_card() {
    let mut harness = setup_study_harness(Some(deck(3)), Some("emociones"));
    harness.load().await;

    let html = harness.render();
    for expected in [
        "Puntuación: 0",
        "Emoción 1",
        "Descripción 1",
        "https://img.test/1.png",
        "Correcto",
        "Incorrecto",
        "Tarjeta 1 de 3",
        "emociones",
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(!html.contains("Siguiente"), "unexpected advance in {html}");
    assert_eq!(harness.phase(), SessionPhase::Showing(0));
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_grades_through_deck_and_reports_each_card() {
    let mut harness = setup_study_harness(Some(deck(3)), None);
    harness.load().await;

    harness.send(StudyIntent::Grade(true));
    assert!(harness.render().contains("Tarjeta 2 de 3"));
    harness.send(StudyIntent::Grade(false));
    harness.send(StudyIntent::Grade(true));

    assert_eq!(harness.score(), 2);
    assert_eq!(harness.phase(), SessionPhase::Revealed(2));
    let html = harness.render();
    for expected in [
        "Puntuación: 2",
        "Tarjeta 3 de 3",
        "Sesión completada: 2 de 3",
        "Siguiente",
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(!html.contains("Correcto"), "last card still gradable in {html}");

    // Neither a second grade nor an advance on the last card changes anything.
    harness.send(StudyIntent::Grade(true));
    harness.send(StudyIntent::Advance);
    assert_eq!(harness.score(), 2);
    assert_eq!(harness.phase(), SessionPhase::Revealed(2));

    let (posted, stats) = harness.finish().await;
    assert_eq!(stats.delivered, 3);
    let payloads: Vec<_> = posted
        .iter()
        .map(|report| (report.flashcard_id, report.score))
        .collect();
    assert_eq!(
        payloads,
        vec![
            (FlashcardId::new(1), ProgressScore::Correct),
            (FlashcardId::new(2), ProgressScore::Incorrect),
            (FlashcardId::new(3), ProgressScore::Correct),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_reveal_then_advance_skips_grading() {
    let mut harness = setup_study_harness(Some(deck(3)), None);
    harness.load().await;

    harness.send(StudyIntent::Reveal);
    let html = harness.render();
    assert!(html.contains("Siguiente"), "missing advance in {html}");
    assert!(!html.contains("Correcto"), "unexpected grading in {html}");

    harness.send(StudyIntent::Advance);
    assert_eq!(harness.phase(), SessionPhase::Showing(1));
    assert_eq!(harness.score(), 0);
    let html = harness.render();
    assert!(html.contains("Tarjeta 2 de 3"), "missing progress in {html}");
    assert!(html.contains("Emoción 2"), "missing second card in {html}");

    let (posted, _) = harness.finish().await;
    assert!(posted.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_last_card_stays_gradable_after_reveal() {
    let mut harness = setup_study_harness(Some(deck(2)), None);
    harness.load().await;

    harness.send(StudyIntent::Advance);
    harness.send(StudyIntent::Reveal);
    assert_eq!(harness.phase(), SessionPhase::Showing(1));
    let html = harness.render();
    assert!(html.contains("Correcto"), "last card lost its grading in {html}");
    assert!(!html.contains("Siguiente"), "unexpected advance in {html}");

    harness.send(StudyIntent::Grade(false));
    assert_eq!(harness.phase(), SessionPhase::Revealed(1));
    let html = harness.render();
    assert!(
        html.contains("Sesión completada: 0 de 1"),
        "missing completion in {html}"
    );

    let (posted, stats) = harness.finish().await;
    assert_eq!(stats.delivered, 1);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].flashcard_id, FlashcardId::new(2));
    assert_eq!(posted[0].score, ProgressScore::Incorrect);
}
