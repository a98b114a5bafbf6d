//! Hook registry and sequential execution.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;

use super::{point, Handler, Header, Hook, HookError, HookPoint, HookSet, Removal, TimelineItem};
use crate::ledger::{Event, EventDraft};

pub struct Entry<T> {
    plugin: String,
    handler: Handler<T>,
}

pub type Lane<T> = Vec<Entry<T>>;

#[derive(Default)]
pub struct Lanes {
    pub(super) before_event_add: Lane<EventDraft>,
    pub(super) after_event_add: Lane<Event>,
    pub(super) before_event_remove: Lane<Removal>,
    pub(super) after_event_remove: Lane<Removal>,
    pub(super) render_timeline_item: Lane<TimelineItem>,
    pub(super) render_header: Lane<Header>,
}

#[derive(Default)]
struct Registry {
    plugins: BTreeMap<String, HookSet>,
    lanes: Lanes,
}

/// Registry of plugin handlers per hook point.
///
/// Mutation goes through `&self` so the plugin manager and the code that
/// runs hooks can share one pipeline behind an `Arc`.
#[derive(Default)]
pub struct HookPipeline {
    registry: RwLock<Registry>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach every handler in `hooks` under `plugin_id`.
    ///
    /// Returns false, without touching the registry, if `plugin_id` is
    /// already registered.
    pub fn register_plugin(&self, plugin_id: &str, hooks: &HookSet) -> bool {
        let mut registry = self.write();
        if registry.plugins.contains_key(plugin_id) {
            tracing::warn!(plugin = plugin_id, "plugin is already registered with the hook pipeline");
            return false;
        }

        attach::<point::BeforeEventAdd>(&mut registry.lanes, plugin_id, hooks);
        attach::<point::AfterEventAdd>(&mut registry.lanes, plugin_id, hooks);
        attach::<point::BeforeEventRemove>(&mut registry.lanes, plugin_id, hooks);
        attach::<point::AfterEventRemove>(&mut registry.lanes, plugin_id, hooks);
        attach::<point::RenderTimelineItem>(&mut registry.lanes, plugin_id, hooks);
        attach::<point::RenderHeader>(&mut registry.lanes, plugin_id, hooks);

        registry.plugins.insert(plugin_id.to_string(), hooks.clone());
        tracing::info!(plugin = plugin_id, points = ?hooks.points(), "plugin hooks registered");
        true
    }

    /// Detach exactly the handler instances that `plugin_id` registered.
    /// Returns false if the plugin was not registered.
    pub fn unregister_plugin(&self, plugin_id: &str) -> bool {
        let mut registry = self.write();
        let Some(hooks) = registry.plugins.remove(plugin_id) else {
            return false;
        };

        detach::<point::BeforeEventAdd>(&mut registry.lanes, plugin_id, &hooks);
        detach::<point::AfterEventAdd>(&mut registry.lanes, plugin_id, &hooks);
        detach::<point::BeforeEventRemove>(&mut registry.lanes, plugin_id, &hooks);
        detach::<point::AfterEventRemove>(&mut registry.lanes, plugin_id, &hooks);
        detach::<point::RenderTimelineItem>(&mut registry.lanes, plugin_id, &hooks);
        detach::<point::RenderHeader>(&mut registry.lanes, plugin_id, &hooks);

        tracing::info!(plugin = plugin_id, "plugin hooks unregistered");
        true
    }

    pub fn is_registered(&self, plugin_id: &str) -> bool {
        self.read().plugins.contains_key(plugin_id)
    }

    pub fn registered_plugins(&self) -> Vec<String> {
        self.read().plugins.keys().cloned().collect()
    }

    /// Number of handlers attached to `point`.
    pub fn handler_count(&self, point: HookPoint) -> usize {
        let registry = self.read();
        let lanes = &registry.lanes;
        match point {
            HookPoint::BeforeEventAdd => lanes.before_event_add.len(),
            HookPoint::AfterEventAdd => lanes.after_event_add.len(),
            HookPoint::BeforeEventRemove => lanes.before_event_remove.len(),
            HookPoint::AfterEventRemove => lanes.after_event_remove.len(),
            HookPoint::RenderTimelineItem => lanes.render_timeline_item.len(),
            HookPoint::RenderHeader => lanes.render_header.len(),
        }
    }

    pub fn total_handlers(&self) -> usize {
        HookPoint::ALL
            .into_iter()
            .map(|point| self.handler_count(point))
            .sum()
    }

    /// Plugin ids with a handler on `point`, in execution order.
    pub fn handlers_for(&self, point: HookPoint) -> Vec<String> {
        fn owners<T>(lane: &Lane<T>) -> Vec<String> {
            lane.iter().map(|e| e.plugin.clone()).collect()
        }
        let registry = self.read();
        let lanes = &registry.lanes;
        match point {
            HookPoint::BeforeEventAdd => owners(&lanes.before_event_add),
            HookPoint::AfterEventAdd => owners(&lanes.after_event_add),
            HookPoint::BeforeEventRemove => owners(&lanes.before_event_remove),
            HookPoint::AfterEventRemove => owners(&lanes.after_event_remove),
            HookPoint::RenderTimelineItem => owners(&lanes.render_timeline_item),
            HookPoint::RenderHeader => owners(&lanes.render_header),
        }
    }

    /// Fold `payload` through the handlers of hook `H`, one at a time.
    ///
    /// A handler that returns an error or panics is logged and skipped; the
    /// next handler receives the last good payload. Never fails.
    pub async fn execute<H: Hook>(&self, payload: H::Payload) -> H::Payload {
        // Snapshot the lane so no lock is held across an await.
        let handlers: Vec<(String, Handler<H::Payload>)> = H::lane(&self.read().lanes)
            .iter()
            .map(|e| (e.plugin.clone(), Arc::clone(&e.handler)))
            .collect();

        let mut current = payload;
        for (plugin, handler) in handlers {
            let input = current.clone();
            let outcome = AssertUnwindSafe(async move { handler(input).await })
                .catch_unwind()
                .await
                .unwrap_or(Err(HookError::Panicked));

            match outcome {
                Ok(next) => current = next,
                Err(e) => {
                    tracing::error!(hook = %H::POINT, plugin = %plugin, error = %e, "hook handler failed; skipping");
                }
            }
        }
        current
    }
}

fn attach<H: Hook>(lanes: &mut Lanes, plugin_id: &str, hooks: &HookSet) {
    if let Some(handler) = H::handler(hooks) {
        H::lane_mut(lanes).push(Entry {
            plugin: plugin_id.to_string(),
            handler: Arc::clone(handler),
        });
    }
}

fn detach<H: Hook>(lanes: &mut Lanes, plugin_id: &str, hooks: &HookSet) {
    if let Some(handler) = H::handler(hooks) {
        H::lane_mut(lanes)
            .retain(|e| !(e.plugin == plugin_id && Arc::ptr_eq(&e.handler, handler)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{handler, sync_handler};
    use crate::ledger::EventDraft;

    fn suffix(tag: &'static str) -> Handler<EventDraft> {
        sync_handler(move |mut draft: EventDraft| {
            draft.title.push_str(tag);
            Ok(draft)
        })
    }

    #[tokio::test]
    async fn unknown_or_empty_point_returns_input() {
        let pipeline = HookPipeline::new();
        let draft = EventDraft::recurring("Plan");
        let out = pipeline.execute::<point::BeforeEventAdd>(draft.clone()).await;
        assert_eq!(out, draft);
    }

    #[tokio::test]
    async fn handlers_fold_in_registration_order() {
        let pipeline = HookPipeline::new();
        assert!(pipeline.register_plugin(
            "a",
            &HookSet {
                before_event_add: Some(suffix("-a")),
                ..HookSet::default()
            }
        ));
        assert!(pipeline.register_plugin(
            "b",
            &HookSet {
                before_event_add: Some(handler(|mut draft: EventDraft| async move {
                    tokio::task::yield_now().await;
                    draft.title.push_str("-b");
                    Ok(draft)
                })),
                ..HookSet::default()
            }
        ));

        let out = pipeline
            .execute::<point::BeforeEventAdd>(EventDraft::recurring("x"))
            .await;
        assert_eq!(out.title, "x-a-b");
        assert_eq!(pipeline.handlers_for(HookPoint::BeforeEventAdd), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failing_and_panicking_handlers_are_skipped() {
        let pipeline = HookPipeline::new();
        pipeline.register_plugin(
            "first",
            &HookSet {
                before_event_add: Some(suffix("-1")),
                ..HookSet::default()
            },
        );
        pipeline.register_plugin(
            "broken",
            &HookSet {
                before_event_add: Some(sync_handler(|_draft: EventDraft| {
                    Err(HookError::Failed("nope".into()))
                })),
                ..HookSet::default()
            },
        );
        pipeline.register_plugin(
            "panicky",
            &HookSet {
                before_event_add: Some(sync_handler(|_draft: EventDraft| -> Result<EventDraft, HookError> {
                    panic!("handler bug")
                })),
                ..HookSet::default()
            },
        );
        pipeline.register_plugin(
            "last",
            &HookSet {
                before_event_add: Some(suffix("-2")),
                ..HookSet::default()
            },
        );

        let out = pipeline
            .execute::<point::BeforeEventAdd>(EventDraft::recurring("x"))
            .await;
        assert_eq!(out.title, "x-1-2");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let pipeline = HookPipeline::new();
        let hooks = HookSet {
            before_event_add: Some(suffix("-a")),
            ..HookSet::default()
        };
        assert!(pipeline.register_plugin("a", &hooks));
        assert!(!pipeline.register_plugin("a", &hooks));
        assert_eq!(pipeline.handler_count(HookPoint::BeforeEventAdd), 1);
    }

    #[tokio::test]
    async fn unregister_removes_only_that_plugins_instances() {
        let pipeline = HookPipeline::new();
        // Same handler instance shared by two plugins.
        let shared = suffix("-s");
        pipeline.register_plugin(
            "one",
            &HookSet {
                before_event_add: Some(shared.clone()),
                render_header: Some(sync_handler(Ok)),
                ..HookSet::default()
            },
        );
        pipeline.register_plugin(
            "two",
            &HookSet {
                before_event_add: Some(shared),
                ..HookSet::default()
            },
        );
        assert_eq!(pipeline.total_handlers(), 3);

        assert!(pipeline.unregister_plugin("one"));
        assert!(!pipeline.unregister_plugin("one"));
        assert_eq!(pipeline.handlers_for(HookPoint::BeforeEventAdd), vec!["two"]);
        assert_eq!(pipeline.handler_count(HookPoint::RenderHeader), 0);
        assert_eq!(pipeline.registered_plugins(), vec!["two".to_string()]);

        let out = pipeline
            .execute::<point::BeforeEventAdd>(EventDraft::recurring("x"))
            .await;
        assert_eq!(out.title, "x-s");
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let pipeline = HookPipeline::new();
        assert!(!pipeline.unregister_plugin("ghost"));
        assert_eq!(pipeline.total_handlers(), 0);
    }
}
