//! Integration tests for the application context.
//!
//! Runs whole workflows against an on-disk database and reopens it to check
//! that every component reloads its own documents.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use routine_core::coach::{MessageKind, Source};
use routine_core::hooks::{handler, HookError, HookSet};
use routine_core::ledger::CompletionStatus;
use routine_core::{
    Config, Database, EventDraft, HookPoint, Intensity, Mood, PluginDescriptor, RoutineApp,
};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn open(dir: &tempfile::TempDir) -> RoutineApp {
    let db = Database::open_at(&dir.path().join("routine.db")).unwrap();
    RoutineApp::with_store(Arc::new(db), Config::default()).unwrap()
}

#[tokio::test]
async fn test_full_day_workflow_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let today = day("2026-10-19");

    {
        let mut app = open(&dir);
        let meditate = app.add_event(EventDraft::recurring("Meditate")).await.unwrap();
        let gym = app
            .add_event(
                EventDraft::one_time("Gym", today).at(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            )
            .await
            .unwrap();
        app.ledger_mut().complete_event(&meditate.id, today).unwrap();
        app.ledger_mut()
            .skip_event(&gym.id, today, Some("too tired"))
            .unwrap();
        app.ledger_mut().log_mood(today, Mood::Bad, None).unwrap();
        app.plugins_mut().enable("hydration", false).unwrap();
        app.hydration().unwrap().add(500).unwrap();
        app.coach_mut().set_intensity(Intensity::Warrior).unwrap();
        app.chat("I'm tired", today).await.unwrap();
    }

    let app = open(&dir);
    let stats = app.ledger().daily_stats(today);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.completion_rate, 50);
    assert_eq!(stats.skipped_tasks[0].reason.as_deref(), Some("too tired"));

    // Only the recurring event carries over to the next day.
    let tomorrow = app.ledger().daily_stats(day("2026-10-20"));
    assert_eq!(tomorrow.total, 1);
    assert_eq!(tomorrow.pending, 1);

    assert!(app.plugins().is_enabled("hydration"));
    assert_eq!(app.hydration().unwrap().state().unwrap().consumed_ml, 500);
    assert_eq!(app.coach().intensity(), Intensity::Warrior);
    assert_eq!(app.coach().chat_history().len(), 2);

    let feedback = app.daily_feedback(today).await;
    let kinds: Vec<_> = feedback.iter().filter_map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![MessageKind::Feedback, MessageKind::Penalty, MessageKind::Stoic]
    );
    assert!(feedback.iter().all(|m| m.source == Some(Source::Local)));
    assert!(feedback[0].content.contains("not acceptable"));
}

#[tokio::test]
async fn test_plugin_handlers_fold_in_order_and_survive_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&dir);

    let prefix = PluginDescriptor::new("prefix", "Prefix", "tags titles").with_hooks(HookSet {
        before_event_add: Some(handler(|mut draft: EventDraft| async move {
            draft.title = format!("[x] {}", draft.title);
            Ok(draft)
        })),
        ..HookSet::default()
    });
    let broken = PluginDescriptor::new("broken", "Broken", "always fails").with_hooks(HookSet {
        before_event_add: Some(handler(|_draft: EventDraft| async move {
            Err(HookError::Failed("storage offline".into()))
        })),
        ..HookSet::default()
    });
    app.plugins_mut().register(prefix).unwrap();
    app.plugins_mut().register(broken).unwrap();
    app.plugins_mut().enable("broken", false).unwrap();
    app.plugins_mut().enable("prefix", false).unwrap();

    assert_eq!(
        app.pipeline().handlers_for(HookPoint::BeforeEventAdd),
        vec!["event-tidy", "broken", "prefix"]
    );

    let event = app
        .add_event(EventDraft::recurring("  stretch  "))
        .await
        .unwrap();
    assert_eq!(event.title, "[x] stretch");
}

#[tokio::test]
async fn test_removed_event_leaves_status_history_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&dir);
    let today = day("2026-10-19");

    let e = app.add_event(EventDraft::recurring("Journal")).await.unwrap();
    app.ledger_mut().complete_event(&e.id, today).unwrap();
    assert!(app.remove_event(&e.id).await.unwrap());

    assert_eq!(app.ledger().daily_stats(today).total, 0);
    assert!(app.timeline(today).await.is_empty());
    // The orphan record stays in the log but no longer counts anywhere.
    assert_eq!(
        app.ledger().event_status(&e.id, today),
        CompletionStatus::Completed
    );
}
