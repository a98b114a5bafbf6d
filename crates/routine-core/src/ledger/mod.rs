//! Event / completion / mood ledger.
//!
//! The ledger owns three documents (`events`, `completion_log`, `mood_log`)
//! and is their only writer. Every mutator persists before it notifies, and
//! a failed write leaves the in-memory state exactly as it was before the
//! call.

mod event;
mod mood;
mod stats;

pub use event::{CompletionRecord, CompletionStatus, Event, EventDraft, Recurrence};
pub use mood::{Mood, MoodEntry, MoodHistoryEntry};
pub use stats::{completion_rate, DailyStats, DaySnapshot, ScheduledEvent, SkippedTask};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::notify::{SubscriptionId, Subscribers};
use crate::storage::{keys, load_document, save_document, DocumentStore};

/// day -> event id -> record
pub type CompletionLog = BTreeMap<NaiveDate, BTreeMap<String, CompletionRecord>>;

/// day -> mood
pub type MoodLog = BTreeMap<NaiveDate, MoodEntry>;

/// What changed in the ledger. Delivered to subscribers after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerChange {
    EventAdded { id: String },
    EventRemoved { id: String, existed: bool },
    StatusChanged {
        id: String,
        date: NaiveDate,
        status: CompletionStatus,
    },
    MoodLogged { date: NaiveDate, mood: Mood },
}

pub struct Ledger {
    store: Arc<dyn DocumentStore>,
    events: Vec<Event>,
    completion_log: CompletionLog,
    mood_log: MoodLog,
    subscribers: Subscribers<LedgerChange>,
}

impl Ledger {
    /// Load the three ledger documents from `store`. Missing documents start empty.
    ///
    /// # Errors
    /// Returns an error if a stored document cannot be read or parsed.
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self> {
        let events = load_document(store.as_ref(), keys::EVENTS)?;
        let completion_log = load_document(store.as_ref(), keys::COMPLETION_LOG)?;
        let mood_log = load_document(store.as_ref(), keys::MOOD_LOG)?;
        Ok(Self {
            store,
            events,
            completion_log,
            mood_log,
            subscribers: Subscribers::new(),
        })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Append a new event built from `draft`.
    ///
    /// # Errors
    /// Returns a validation error for a blank title, or a storage error if
    /// the event list cannot be written (the event is then not added).
    pub fn add_event(&mut self, draft: EventDraft) -> Result<Event> {
        draft.validate()?;
        let event = Event::from_draft(Uuid::now_v7().to_string(), draft, Utc::now());

        self.events.push(event.clone());
        if let Err(e) = save_document(self.store.as_ref(), keys::EVENTS, &self.events) {
            self.events.pop();
            return Err(e);
        }

        tracing::debug!(id = %event.id, title = %event.title, "event added");
        self.subscribers.notify(&LedgerChange::EventAdded {
            id: event.id.clone(),
        });
        Ok(event)
    }

    /// Hard-delete an event. Unknown ids are a no-op; returns whether
    /// anything was removed.
    pub fn remove_event(&mut self, id: &str) -> Result<bool> {
        let previous = self.events.clone();
        self.events.retain(|e| e.id != id);
        let existed = self.events.len() != previous.len();

        if let Err(e) = save_document(self.store.as_ref(), keys::EVENTS, &self.events) {
            self.events = previous;
            return Err(e);
        }

        self.subscribers.notify(&LedgerChange::EventRemoved {
            id: id.to_string(),
            existed,
        });
        Ok(existed)
    }

    pub fn complete_event(&mut self, id: &str, day: NaiveDate) -> Result<()> {
        self.upsert_record(
            id,
            day,
            CompletionRecord::Completed {
                completed_at: Utc::now(),
            },
        )
    }

    /// Mark an event skipped for `day`. Blank reasons are stored as no reason.
    pub fn skip_event(&mut self, id: &str, day: NaiveDate, reason: Option<&str>) -> Result<()> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self.upsert_record(
            id,
            day,
            CompletionRecord::Skipped {
                skipped_at: Utc::now(),
                reason,
            },
        )
    }

    fn upsert_record(&mut self, id: &str, day: NaiveDate, record: CompletionRecord) -> Result<()> {
        let status = record.status();
        let previous = self
            .completion_log
            .entry(day)
            .or_default()
            .insert(id.to_string(), record);

        if let Err(e) = save_document(self.store.as_ref(), keys::COMPLETION_LOG, &self.completion_log) {
            let day_log = self.completion_log.entry(day).or_default();
            match previous {
                Some(prior) => {
                    day_log.insert(id.to_string(), prior);
                }
                None => {
                    day_log.remove(id);
                    if day_log.is_empty() {
                        self.completion_log.remove(&day);
                    }
                }
            }
            return Err(e);
        }

        self.subscribers.notify(&LedgerChange::StatusChanged {
            id: id.to_string(),
            date: day,
            status,
        });
        Ok(())
    }

    /// Recurring events plus the one-time events dated `day`, in insertion order.
    pub fn events_for_date(&self, day: NaiveDate) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.recurrence.occurs_on(day))
            .cloned()
            .collect()
    }

    pub fn record(&self, id: &str, day: NaiveDate) -> Option<&CompletionRecord> {
        self.completion_log.get(&day)?.get(id)
    }

    pub fn event_status(&self, id: &str, day: NaiveDate) -> CompletionStatus {
        self.record(id, day)
            .map(CompletionRecord::status)
            .unwrap_or(CompletionStatus::Pending)
    }

    pub fn daily_stats(&self, day: NaiveDate) -> DailyStats {
        let day_events = self.events_for_date(day);
        let mut completed = 0;
        let mut skipped = 0;
        let mut pending = 0;
        let mut skipped_tasks = Vec::new();

        for event in day_events.iter() {
            match self.record(&event.id, day) {
                Some(CompletionRecord::Completed { .. }) => completed += 1,
                Some(CompletionRecord::Skipped { reason, .. }) => {
                    skipped += 1;
                    skipped_tasks.push(SkippedTask {
                        event: event.clone(),
                        reason: reason.clone(),
                    });
                }
                None => pending += 1,
            }
        }

        let total = day_events.len();
        DailyStats {
            date: day,
            total,
            completed,
            skipped,
            pending,
            completion_rate: completion_rate(completed, total),
            skipped_tasks,
        }
    }

    /// Stats, mood and per-event statuses for `day`, read together.
    pub fn snapshot(&self, day: NaiveDate) -> DaySnapshot {
        let schedule = self
            .events_for_date(day)
            .into_iter()
            .map(|event| {
                let status = self.event_status(&event.id, day);
                ScheduledEvent { event, status }
            })
            .collect();
        DaySnapshot {
            date: day,
            stats: self.daily_stats(day),
            mood: self.mood(day).cloned(),
            schedule,
        }
    }

    /// Record the mood for `day`, replacing any earlier entry.
    pub fn log_mood(&mut self, day: NaiveDate, mood: Mood, note: Option<&str>) -> Result<()> {
        let entry = MoodEntry {
            mood,
            note: note
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            logged_at: Utc::now(),
        };
        let previous = self.mood_log.insert(day, entry);

        if let Err(e) = save_document(self.store.as_ref(), keys::MOOD_LOG, &self.mood_log) {
            match previous {
                Some(prior) => {
                    self.mood_log.insert(day, prior);
                }
                None => {
                    self.mood_log.remove(&day);
                }
            }
            return Err(e);
        }

        self.subscribers
            .notify(&LedgerChange::MoodLogged { date: day, mood });
        Ok(())
    }

    pub fn mood(&self, day: NaiveDate) -> Option<&MoodEntry> {
        self.mood_log.get(&day)
    }

    /// The last `days` calendar days ending today (local time), newest first.
    pub fn mood_history(&self, days: u32) -> Vec<MoodHistoryEntry> {
        self.mood_history_from(Local::now().date_naive(), days)
    }

    /// The last `days` calendar days ending at `today`, newest first.
    pub fn mood_history_from(&self, today: NaiveDate, days: u32) -> Vec<MoodHistoryEntry> {
        (0..days)
            .filter_map(|offset| today.checked_sub_signed(Duration::days(i64::from(offset))))
            .map(|date| MoodHistoryEntry {
                date,
                entry: self.mood_log.get(&date).cloned(),
            })
            .collect()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&LedgerChange) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::storage::Database;
    use chrono::NaiveTime;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger() -> (Arc<Database>, Ledger) {
        let db = Arc::new(Database::open_memory().unwrap());
        let ledger = Ledger::open(db.clone()).unwrap();
        (db, ledger)
    }

    /// Store whose writes can be switched off to exercise rollback.
    struct FlakyStore {
        inner: Database,
        fail_writes: AtomicBool,
    }

    impl DocumentStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DatabaseError::Locked);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), DatabaseError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn recurring_event_appears_every_day() {
        let (_db, mut ledger) = ledger();
        let meditate = ledger.add_event(EventDraft::recurring("Meditate")).unwrap();

        for d in ["2026-10-19", "2026-10-20", "2030-02-28"] {
            let events = ledger.events_for_date(day(d));
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].id, meditate.id);
        }

        let stats = ledger.daily_stats(day("2026-10-19"));
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn one_time_event_only_on_its_day() {
        let (_db, mut ledger) = ledger();
        ledger
            .add_event(EventDraft::one_time("Dentist", day("2026-10-19")))
            .unwrap();
        assert_eq!(ledger.events_for_date(day("2026-10-19")).len(), 1);
        assert!(ledger.events_for_date(day("2026-10-18")).is_empty());
    }

    #[test]
    fn blank_title_is_not_stored() {
        let (db, mut ledger) = ledger();
        assert!(ledger.add_event(EventDraft::recurring("  ")).is_err());
        assert!(ledger.events().is_empty());
        assert!(db.get(keys::EVENTS).unwrap().is_none());
    }

    #[test]
    fn last_write_wins_per_key() {
        let (_db, mut ledger) = ledger();
        let today = day("2026-10-19");
        let a = ledger.add_event(EventDraft::recurring("A")).unwrap();
        let b = ledger.add_event(EventDraft::recurring("B")).unwrap();

        ledger.complete_event(&a.id, today).unwrap();
        ledger.skip_event(&a.id, today, None).unwrap();
        assert_eq!(ledger.event_status(&a.id, today), CompletionStatus::Skipped);

        ledger.skip_event(&b.id, today, Some("later")).unwrap();
        ledger.complete_event(&b.id, today).unwrap();
        assert_eq!(ledger.event_status(&b.id, today), CompletionStatus::Completed);
        assert!(ledger.record(&b.id, today).unwrap().reason().is_none());

        // Other days are unaffected.
        assert_eq!(
            ledger.event_status(&a.id, day("2026-10-20")),
            CompletionStatus::Pending
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let (_db, mut ledger) = ledger();
        let keep = ledger.add_event(EventDraft::recurring("Keep")).unwrap();
        let drop = ledger.add_event(EventDraft::recurring("Drop")).unwrap();

        assert!(ledger.remove_event(&drop.id).unwrap());
        let once = ledger.events().to_vec();
        assert!(!ledger.remove_event(&drop.id).unwrap());
        assert_eq!(ledger.events(), once.as_slice());
        assert_eq!(ledger.events()[0].id, keep.id);
        assert!(!ledger.remove_event("never-existed").unwrap());
    }

    #[test]
    fn skipped_tasks_carry_reason() {
        let (_db, mut ledger) = ledger();
        let today = day("2026-10-19");
        let gym = ledger
            .add_event(
                EventDraft::one_time("Gym", today).at(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            )
            .unwrap();
        ledger.skip_event(&gym.id, today, Some("too tired")).unwrap();

        let stats = ledger.daily_stats(today);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.skipped_tasks.len(), 1);
        assert_eq!(stats.skipped_tasks[0].event.title, "Gym");
        assert_eq!(stats.skipped_tasks[0].reason.as_deref(), Some("too tired"));
    }

    #[test]
    fn blank_skip_reason_is_dropped() {
        let (_db, mut ledger) = ledger();
        let today = day("2026-10-19");
        let e = ledger.add_event(EventDraft::recurring("Walk")).unwrap();
        ledger.skip_event(&e.id, today, Some("   ")).unwrap();
        assert!(ledger.daily_stats(today).skipped_tasks[0].reason.is_none());
    }

    #[test]
    fn state_survives_reopen() {
        let (db, mut ledger) = ledger();
        let today = day("2026-10-19");
        let e = ledger.add_event(EventDraft::recurring("Journal")).unwrap();
        ledger.complete_event(&e.id, today).unwrap();
        ledger.log_mood(today, Mood::Good, Some("slept well")).unwrap();

        let reopened = Ledger::open(db).unwrap();
        assert_eq!(reopened.events().len(), 1);
        assert_eq!(reopened.event_status(&e.id, today), CompletionStatus::Completed);
        let mood = reopened.mood(today).unwrap();
        assert_eq!(mood.mood, Mood::Good);
        assert_eq!(mood.note.as_deref(), Some("slept well"));
    }

    #[test]
    fn mood_relog_overwrites() {
        let (_db, mut ledger) = ledger();
        let today = day("2026-10-19");
        ledger.log_mood(today, Mood::Bad, None).unwrap();
        ledger.log_mood(today, Mood::Great, Some("")).unwrap();
        let entry = ledger.mood(today).unwrap();
        assert_eq!(entry.mood, Mood::Great);
        assert!(entry.note.is_none());
    }

    #[test]
    fn mood_history_is_newest_first_with_placeholders() {
        let (_db, mut ledger) = ledger();
        let today = day("2026-10-19");
        ledger.log_mood(today, Mood::Neutral, None).unwrap();
        ledger.log_mood(day("2026-10-17"), Mood::Terrible, None).unwrap();
        ledger.log_mood(day("2026-10-01"), Mood::Great, None).unwrap();

        let history = ledger.mood_history_from(today, 3);
        let dates: Vec<_> = history.iter().map(|h| h.date).collect();
        assert_eq!(
            dates,
            vec![day("2026-10-19"), day("2026-10-18"), day("2026-10-17")]
        );
        let moods: Vec<_> = history.iter().map(MoodHistoryEntry::mood).collect();
        assert_eq!(moods, vec![Some(Mood::Neutral), None, Some(Mood::Terrible)]);
        assert!(ledger.mood_history_from(today, 0).is_empty());
    }

    #[test]
    fn subscribers_see_each_mutation_and_can_leave() {
        let (_db, mut ledger) = ledger();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let sub = ledger.subscribe(move |c| sink.lock().unwrap().push(c.clone()));

        let today = day("2026-10-19");
        let e = ledger.add_event(EventDraft::recurring("Read")).unwrap();
        ledger.complete_event(&e.id, today).unwrap();
        ledger.log_mood(today, Mood::Good, None).unwrap();
        ledger.remove_event(&e.id).unwrap();
        assert_eq!(changes.lock().unwrap().len(), 4);
        assert!(matches!(
            changes.lock().unwrap()[1],
            LedgerChange::StatusChanged {
                status: CompletionStatus::Completed,
                ..
            }
        ));

        assert!(ledger.unsubscribe(sub));
        ledger.add_event(EventDraft::recurring("Quiet")).unwrap();
        assert_eq!(changes.lock().unwrap().len(), 4);
    }

    #[test]
    fn failed_write_rolls_back_and_stays_silent() {
        let store = Arc::new(FlakyStore {
            inner: Database::open_memory().unwrap(),
            fail_writes: AtomicBool::new(false),
        });
        let mut ledger = Ledger::open(store.clone()).unwrap();
        let today = day("2026-10-19");
        let e = ledger.add_event(EventDraft::recurring("Lift")).unwrap();
        ledger.complete_event(&e.id, today).unwrap();
        ledger.log_mood(today, Mood::Good, None).unwrap();

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        ledger.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(ledger.add_event(EventDraft::recurring("Swim")).is_err());
        assert!(ledger.remove_event(&e.id).is_err());
        assert!(ledger.skip_event(&e.id, today, Some("rain")).is_err());
        assert!(ledger.complete_event("other", day("2026-10-20")).is_err());
        assert!(ledger.log_mood(today, Mood::Terrible, None).is_err());

        assert_eq!(ledger.events().len(), 1);
        assert_eq!(ledger.event_status(&e.id, today), CompletionStatus::Completed);
        assert!(ledger.record("other", day("2026-10-20")).is_none());
        assert_eq!(ledger.mood(today).unwrap().mood, Mood::Good);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    proptest::proptest! {
        #[test]
        fn stats_partition_holds(statuses in proptest::collection::vec(0u8..3, 0..40)) {
            let (_db, mut ledger) = ledger();
            let today = day("2026-10-19");
            for (i, s) in statuses.iter().enumerate() {
                let e = ledger.add_event(EventDraft::one_time(format!("task {i}"), today)).unwrap();
                match s {
                    1 => ledger.complete_event(&e.id, today).unwrap(),
                    2 => ledger.skip_event(&e.id, today, None).unwrap(),
                    _ => {}
                }
            }
            let stats = ledger.daily_stats(today);
            proptest::prop_assert_eq!(stats.completed + stats.skipped + stats.pending, stats.total);
            proptest::prop_assert_eq!(stats.total, statuses.len());
            proptest::prop_assert_eq!(stats.completion_rate, completion_rate(stats.completed, stats.total));
            proptest::prop_assert_eq!(stats.skipped_tasks.len(), stats.skipped);
        }
    }
}
