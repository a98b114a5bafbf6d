//! Plugin registry and enablement.
//!
//! Registration and enablement are independent. The registry is filled at
//! startup from [`builtin`] and never persisted; the enabled id set is the
//! only thing written to the store. A plugin's hooks are attached to the
//! [`HookPipeline`] exactly while it is both registered and enabled.

pub mod hydration;
pub mod tidy;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hooks::{HookPipeline, HookPoint, HookSet};
use crate::notify::{SubscriptionId, Subscribers};
use crate::storage::{keys, load_document, save_document, Config, DocumentStore};

/// Callback run when a plugin becomes active or inactive.
pub type Lifecycle = Arc<dyn Fn() + Send + Sync>;

/// Something a plugin can show next to the timeline.
pub trait Widget: Send + Sync {
    fn title(&self) -> &str;

    /// Current text rendering of the widget.
    fn render(&self) -> Result<String>;
}

#[derive(Clone)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_enabled: bool,
    pub init: Option<Lifecycle>,
    pub destroy: Option<Lifecycle>,
    pub hooks: Option<HookSet>,
    pub widget: Option<Arc<dyn Widget>>,
}

impl PluginDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            default_enabled: false,
            init: None,
            destroy: None,
            hooks: None,
            widget: None,
        }
    }

    pub fn enabled_by_default(mut self) -> Self {
        self.default_enabled = true;
        self
    }

    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_widget(mut self, widget: Arc<dyn Widget>) -> Self {
        self.widget = Some(widget);
        self
    }

    pub fn on_init(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.init = Some(Arc::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.destroy = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("default_enabled", &self.default_enabled)
            .field("hooks", &self.hooks)
            .field("widget", &self.widget.as_ref().map(|w| w.title().to_string()))
            .finish()
    }
}

/// Listing row for one registered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub default_enabled: bool,
    pub hooks: Vec<HookPoint>,
    pub has_widget: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginChange {
    Registered { id: String },
    Enabled { id: String },
    Disabled { id: String },
}

/// The plugins that ship with the application, in registration order.
pub fn builtin(store: Arc<dyn DocumentStore>, config: &Config) -> Vec<PluginDescriptor> {
    vec![
        tidy::descriptor(),
        hydration::descriptor(hydration::HydrationTracker::new(
            store,
            config.hydration.target_ml,
        )),
    ]
}

pub struct PluginManager {
    store: Arc<dyn DocumentStore>,
    pipeline: Arc<HookPipeline>,
    registry: Vec<PluginDescriptor>,
    enabled: BTreeSet<String>,
    /// Ids whose `default_enabled` flag has already been honoured.
    defaults_applied: BTreeSet<String>,
    subscribers: Subscribers<PluginChange>,
}

impl PluginManager {
    /// Load the persisted enabled set. Nothing is registered yet.
    pub fn open(store: Arc<dyn DocumentStore>, pipeline: Arc<HookPipeline>) -> Result<Self> {
        let enabled = load_document(store.as_ref(), keys::ENABLED_PLUGINS)?;
        let defaults_applied = load_document(store.as_ref(), keys::PLUGIN_DEFAULTS_APPLIED)?;
        Ok(Self {
            store,
            pipeline,
            registry: Vec::new(),
            enabled,
            defaults_applied,
            subscribers: Subscribers::new(),
        })
    }

    pub fn pipeline(&self) -> &Arc<HookPipeline> {
        &self.pipeline
    }

    /// Add a plugin to the registry.
    ///
    /// Returns false for an empty id or an id that is already registered.
    /// A `default_enabled` plugin is enabled the first time its id is ever
    /// registered against this store; later registrations respect whatever
    /// the user chose since. If the plugin ends up enabled, its hooks are
    /// attached and `init` runs without a further write.
    pub fn register(&mut self, plugin: PluginDescriptor) -> Result<bool> {
        if plugin.id.trim().is_empty() {
            tracing::warn!(name = %plugin.name, "plugin descriptor is missing an id");
            return Ok(false);
        }
        if self.is_registered(&plugin.id) {
            return Ok(false);
        }

        if plugin.default_enabled && !self.defaults_applied.contains(&plugin.id) {
            self.apply_default(&plugin.id)?;
        }

        if self.enabled.contains(&plugin.id) {
            self.activate(&plugin);
        }

        let id = plugin.id.clone();
        self.registry.push(plugin);
        self.subscribers.notify(&PluginChange::Registered { id });
        Ok(true)
    }

    /// Enable a registered plugin. Unknown or already-enabled ids are a no-op.
    ///
    /// `silent` skips both the write and the notification.
    pub fn enable(&mut self, id: &str, silent: bool) -> Result<bool> {
        let Some(plugin) = self.plugin(id).cloned() else {
            return Ok(false);
        };
        if self.enabled.contains(id) {
            return Ok(false);
        }

        self.enabled.insert(id.to_string());
        if !silent {
            if let Err(e) = self.persist() {
                self.enabled.remove(id);
                return Err(e);
            }
        }

        self.activate(&plugin);
        if !silent {
            self.subscribers.notify(&PluginChange::Enabled { id: id.to_string() });
        }
        Ok(true)
    }

    /// Disable a registered plugin. Unknown or already-disabled ids are a no-op.
    pub fn disable(&mut self, id: &str, silent: bool) -> Result<bool> {
        let Some(plugin) = self.plugin(id).cloned() else {
            return Ok(false);
        };
        if !self.enabled.contains(id) {
            return Ok(false);
        }

        self.enabled.remove(id);
        if !silent {
            if let Err(e) = self.persist() {
                self.enabled.insert(id.to_string());
                return Err(e);
            }
        }

        self.deactivate(&plugin);
        if !silent {
            self.subscribers.notify(&PluginChange::Disabled { id: id.to_string() });
        }
        Ok(true)
    }

    /// Flip enablement. Returns whether the plugin is enabled afterwards.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        if self.is_enabled(id) {
            self.disable(id, false)?;
        } else {
            self.enable(id, false)?;
        }
        Ok(self.is_enabled(id))
    }

    fn activate(&self, plugin: &PluginDescriptor) {
        if let Some(hooks) = &plugin.hooks {
            self.pipeline.register_plugin(&plugin.id, hooks);
        }
        if let Some(init) = &plugin.init {
            init();
        }
        tracing::debug!(plugin = %plugin.id, "plugin activated");
    }

    fn deactivate(&self, plugin: &PluginDescriptor) {
        if plugin.hooks.is_some() {
            self.pipeline.unregister_plugin(&plugin.id);
        }
        if let Some(destroy) = &plugin.destroy {
            destroy();
        }
        tracing::debug!(plugin = %plugin.id, "plugin deactivated");
    }

    fn persist(&self) -> Result<()> {
        save_document(self.store.as_ref(), keys::ENABLED_PLUGINS, &self.enabled)
    }

    /// Enable `id` once on behalf of its `default_enabled` flag and record
    /// that the default was applied. Both documents roll back together.
    fn apply_default(&mut self, id: &str) -> Result<()> {
        let newly_enabled = self.enabled.insert(id.to_string());
        self.defaults_applied.insert(id.to_string());

        let written = self.persist().and_then(|()| {
            save_document(
                self.store.as_ref(),
                keys::PLUGIN_DEFAULTS_APPLIED,
                &self.defaults_applied,
            )
        });
        if let Err(e) = written {
            if newly_enabled {
                self.enabled.remove(id);
            }
            self.defaults_applied.remove(id);
            // Best effort: the enabled set may already have been written.
            let _ = self.persist();
            return Err(e);
        }

        if newly_enabled {
            tracing::info!(plugin = %id, "plugin enabled by default");
        }
        Ok(())
    }

    /// Whether `id` is in the enabled set. Ids persisted as enabled report
    /// true even before their plugin is registered.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.contains(id)
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.plugin(id).is_some()
    }

    pub fn plugin(&self, id: &str) -> Option<&PluginDescriptor> {
        self.registry.iter().find(|p| p.id == id)
    }

    pub fn all_plugins(&self) -> &[PluginDescriptor] {
        &self.registry
    }

    pub fn enabled_plugins(&self) -> Vec<&PluginDescriptor> {
        self.registry
            .iter()
            .filter(|p| self.enabled.contains(&p.id))
            .collect()
    }

    pub fn summaries(&self) -> Vec<PluginSummary> {
        self.registry
            .iter()
            .map(|p| PluginSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                description: p.description.clone(),
                enabled: self.enabled.contains(&p.id),
                default_enabled: p.default_enabled,
                hooks: p.hooks.as_ref().map(HookSet::points).unwrap_or_default(),
                has_widget: p.widget.is_some(),
            })
            .collect()
    }

    /// The widget of an enabled plugin.
    pub fn widget(&self, id: &str) -> Option<Arc<dyn Widget>> {
        if !self.is_enabled(id) {
            return None;
        }
        self.plugin(id)?.widget.clone()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&PluginChange) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
