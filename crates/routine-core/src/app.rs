//! Application context: the one place the components are wired together.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::coach::{CoachEngine, CoachMessage};
use crate::error::Result;
use crate::hooks::{point, Header, HookPipeline, Removal, TimelineItem};
use crate::ledger::{Event, EventDraft, Ledger, MoodHistoryEntry};
use crate::plugins::hydration::{self, HydrationTracker};
use crate::plugins::{self, PluginManager};
use crate::storage::{Config, Database, DocumentStore};

/// Owns the store, ledger, hook pipeline, plugin manager and coach.
///
/// Built once at startup. Event add/remove and timeline rendering go through
/// here so plugins see them via the hook points.
pub struct RoutineApp {
    config: Config,
    store: Arc<dyn DocumentStore>,
    pipeline: Arc<HookPipeline>,
    ledger: Ledger,
    plugins: PluginManager,
    coach: CoachEngine,
}

impl RoutineApp {
    /// Open the on-disk database and configuration in the data directory.
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        let db = Database::open()?;
        Self::with_store(Arc::new(db), config)
    }

    /// Build the context over an existing store and register the built-in
    /// plugins.
    pub fn with_store(store: Arc<dyn DocumentStore>, config: Config) -> Result<Self> {
        let pipeline = Arc::new(HookPipeline::new());
        let ledger = Ledger::open(Arc::clone(&store))?;
        let mut plugins = PluginManager::open(Arc::clone(&store), Arc::clone(&pipeline))?;
        for plugin in plugins::builtin(Arc::clone(&store), &config) {
            plugins.register(plugin)?;
        }
        let coach = CoachEngine::open(Arc::clone(&store), &config.coach)?;

        tracing::debug!(
            events = ledger.events().len(),
            plugins = plugins.all_plugins().len(),
            handlers = pipeline.total_handlers(),
            "routine app ready"
        );

        Ok(Self {
            config,
            store,
            pipeline,
            ledger,
            plugins,
            coach,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn pipeline(&self) -> &Arc<HookPipeline> {
        &self.pipeline
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginManager {
        &mut self.plugins
    }

    pub fn coach(&self) -> &CoachEngine {
        &self.coach
    }

    pub fn coach_mut(&mut self) -> &mut CoachEngine {
        &mut self.coach
    }

    /// Run `draft` through before-event-add, store it, then run
    /// after-event-add. Returns the stored event.
    pub async fn add_event(&mut self, draft: EventDraft) -> Result<Event> {
        let draft = self.pipeline.execute::<point::BeforeEventAdd>(draft).await;
        let event = self.ledger.add_event(draft)?;
        self.pipeline
            .execute::<point::AfterEventAdd>(event.clone())
            .await;
        Ok(event)
    }

    /// Remove an event with the remove hooks around the ledger call.
    /// Returns whether anything was removed.
    pub async fn remove_event(&mut self, id: &str) -> Result<bool> {
        let removal = Removal {
            id: id.to_string(),
            event: self.ledger.event(id).cloned(),
        };
        let removal = self
            .pipeline
            .execute::<point::BeforeEventRemove>(removal)
            .await;
        let existed = self.ledger.remove_event(&removal.id)?;
        self.pipeline
            .execute::<point::AfterEventRemove>(removal)
            .await;
        Ok(existed)
    }

    /// The day's events ordered by time of day (unscheduled last), each
    /// passed through render-timeline-item.
    pub async fn timeline(&self, day: NaiveDate) -> Vec<TimelineItem> {
        let mut schedule = self.ledger.snapshot(day).schedule;
        schedule.sort_by_key(|item| (item.event.time.is_none(), item.event.time));

        let mut items = Vec::with_capacity(schedule.len());
        for item in schedule {
            let row = TimelineItem {
                event: item.event,
                status: item.status,
                badges: Vec::new(),
            };
            items.push(self.pipeline.execute::<point::RenderTimelineItem>(row).await);
        }
        items
    }

    pub async fn header(&self, day: NaiveDate) -> Header {
        self.pipeline
            .execute::<point::RenderHeader>(Header::for_day(day))
            .await
    }

    pub async fn daily_feedback(&self, day: NaiveDate) -> Vec<CoachMessage> {
        self.coach.daily_feedback(&self.ledger, day).await
    }

    pub async fn chat(&self, text: &str, day: NaiveDate) -> Result<CoachMessage> {
        self.coach.chat(text, &self.ledger, day).await
    }

    /// Mood history over the configured window, ending today.
    pub fn mood_history(&self) -> Vec<MoodHistoryEntry> {
        self.ledger.mood_history(self.config.mood.history_days)
    }

    /// Hydration tracker, available while the hydration plugin is enabled.
    pub fn hydration(&self) -> Option<HydrationTracker> {
        if !self.plugins.is_enabled(hydration::PLUGIN_ID) {
            return None;
        }
        Some(HydrationTracker::new(
            Arc::clone(&self.store),
            self.config.hydration.target_ml,
        ))
    }
}
