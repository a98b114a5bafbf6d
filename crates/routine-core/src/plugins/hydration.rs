//! Water intake tracker. Ships disabled; exposes a widget and no hooks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{PluginDescriptor, Widget};
use crate::error::Result;
use crate::storage::{keys, save_document, DocumentStore};

pub const PLUGIN_ID: &str = "hydration";

const DEFAULT_TARGET_ML: u32 = 2000;
const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationState {
    pub target_ml: u32,
    pub consumed_ml: u32,
}

impl Default for HydrationState {
    fn default() -> Self {
        Self {
            target_ml: DEFAULT_TARGET_ML,
            consumed_ml: 0,
        }
    }
}

impl HydrationState {
    /// min(100, round(100 * consumed / target)). A zero target counts as met.
    pub fn percent(&self) -> u32 {
        if self.target_ml == 0 {
            return 100;
        }
        let consumed = u64::from(self.consumed_ml);
        let target = u64::from(self.target_ml);
        ((200 * consumed + target) / (2 * target)).min(100) as u32
    }

    /// Add `ml`, capped at the target.
    pub fn add(&mut self, ml: u32) {
        self.consumed_ml = self.consumed_ml.saturating_add(ml).min(self.target_ml);
    }

    pub fn reset(&mut self) {
        self.consumed_ml = 0;
    }
}

/// Reads and writes the `plugin.hydration` document.
#[derive(Clone)]
pub struct HydrationTracker {
    store: Arc<dyn DocumentStore>,
    target_ml: u32,
}

impl HydrationTracker {
    pub fn new(store: Arc<dyn DocumentStore>, target_ml: u32) -> Self {
        Self { store, target_ml }
    }

    /// Stored state with the configured target applied.
    pub fn state(&self) -> Result<HydrationState> {
        let stored: Option<HydrationState> = match self.store.get(keys::HYDRATION)? {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        let consumed_ml = stored.map(|s| s.consumed_ml).unwrap_or(0);
        Ok(HydrationState {
            target_ml: self.target_ml,
            consumed_ml: consumed_ml.min(self.target_ml),
        })
    }

    pub fn add(&self, ml: u32) -> Result<HydrationState> {
        let mut state = self.state()?;
        state.add(ml);
        save_document(self.store.as_ref(), keys::HYDRATION, &state)?;
        Ok(state)
    }

    pub fn reset(&self) -> Result<HydrationState> {
        let mut state = self.state()?;
        state.reset();
        save_document(self.store.as_ref(), keys::HYDRATION, &state)?;
        Ok(state)
    }
}

struct HydrationWidget {
    tracker: HydrationTracker,
}

impl Widget for HydrationWidget {
    fn title(&self) -> &str {
        "Hydration"
    }

    fn render(&self) -> Result<String> {
        let state = self.tracker.state()?;
        let percent = state.percent();
        let filled = BAR_WIDTH * percent as usize / 100;
        Ok(format!(
            "Hydration {percent:>3}%\n[{}{}]\n{}ml / target {}ml",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            state.consumed_ml,
            state.target_ml,
        ))
    }
}

pub fn descriptor(tracker: HydrationTracker) -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_ID, "Hydration", "Quick water intake tracker")
        .with_widget(Arc::new(HydrationWidget { tracker }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn tracker(target_ml: u32) -> HydrationTracker {
        HydrationTracker::new(Arc::new(Database::open_memory().unwrap()), target_ml)
    }

    #[test]
    fn starts_empty() {
        let t = tracker(2000);
        assert_eq!(
            t.state().unwrap(),
            HydrationState {
                target_ml: 2000,
                consumed_ml: 0
            }
        );
        assert_eq!(t.state().unwrap().percent(), 0);
    }

    #[test]
    fn consumption_is_capped_at_target() {
        let t = tracker(2000);
        t.add(500).unwrap();
        assert_eq!(t.state().unwrap().percent(), 25);
        t.add(1750).unwrap();
        let state = t.state().unwrap();
        assert_eq!(state.consumed_ml, 2000);
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn reset_clears_consumption() {
        let t = tracker(2000);
        t.add(250).unwrap();
        assert_eq!(t.reset().unwrap().consumed_ml, 0);
        assert_eq!(t.state().unwrap().consumed_ml, 0);
    }

    #[test]
    fn lowered_target_clamps_stored_value() {
        let store: Arc<dyn DocumentStore> = Arc::new(Database::open_memory().unwrap());
        HydrationTracker::new(store.clone(), 3000).add(2500).unwrap();
        let state = HydrationTracker::new(store, 1000).state().unwrap();
        assert_eq!(state.consumed_ml, 1000);
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn percent_rounds() {
        let state = HydrationState {
            target_ml: 3000,
            consumed_ml: 250,
        };
        assert_eq!(state.percent(), 8);
        assert_eq!(
            HydrationState {
                target_ml: 0,
                consumed_ml: 0
            }
            .percent(),
            100
        );
    }

    #[test]
    fn widget_renders_bar() {
        let t = tracker(2000);
        t.add(1000).unwrap();
        let widget = HydrationWidget { tracker: t };
        let text = widget.render().unwrap();
        assert!(text.starts_with("Hydration  50%"));
        assert!(text.contains("[##########----------]"));
        assert!(text.ends_with("1000ml / target 2000ml"));
    }
}
