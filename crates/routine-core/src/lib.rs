//! # Routine OS Core Library
//!
//! Core logic for the Routine OS daily-routine tracker. Everything the
//! `routine` CLI does goes through this crate; the CLI itself only parses
//! arguments and prints results.
//!
//! ## Architecture
//!
//! - **Ledger**: events, per-day completion/skip records and mood entries,
//!   persisted as JSON documents and published to subscribers after each
//!   successful write
//! - **Hooks**: a closed set of typed hook points that plugins attach async
//!   handlers to; handlers run in order and a failing one is skipped
//! - **Plugins**: registration vs. enablement, with the enabled set persisted
//! - **Coach**: rule-based accountability feedback and chat, with one
//!   optional call to an OpenAI-compatible endpoint and a local fallback
//! - **Storage**: SQLite key/value documents and TOML configuration
//!
//! ## Key Components
//!
//! - [`RoutineApp`]: application context wiring the components together
//! - [`Ledger`]: schedule and status state
//! - [`HookPipeline`]: hook registry and executor
//! - [`PluginManager`]: plugin registry and enablement
//! - [`CoachEngine`]: feedback and chat
//! - [`Database`] / [`Config`]: persistence and configuration

pub mod app;
pub mod coach;
pub mod error;
pub mod hooks;
pub mod ledger;
pub mod notify;
pub mod plugins;
pub mod storage;

pub use app::RoutineApp;
pub use coach::{CoachEngine, CoachMessage, Intensity, MessageKind, Source};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use hooks::{HookPipeline, HookPoint, HookSet};
pub use ledger::{
    CompletionStatus, DailyStats, Event, EventDraft, Ledger, LedgerChange, Mood, Recurrence,
};
pub use notify::SubscriptionId;
pub use plugins::{PluginDescriptor, PluginManager};
pub use storage::{Config, Database, DocumentStore};
