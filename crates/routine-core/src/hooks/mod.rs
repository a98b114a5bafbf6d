//! Plugin hook points.
//!
//! The set of hook points is closed. Each point has a statically typed
//! payload; a handler receives the payload produced by the previous handler
//! and returns the next one. Handlers are async so a plugin can do I/O, but
//! they always run one at a time, in registration order.
//!
//! | Point                  | Payload          |
//! |------------------------|------------------|
//! | `before-event-add`     | [`EventDraft`]   |
//! | `after-event-add`      | [`Event`]        |
//! | `before-event-remove`  | [`Removal`]      |
//! | `after-event-remove`   | [`Removal`]      |
//! | `render-timeline-item` | [`TimelineItem`] |
//! | `render-header`        | [`Header`]       |

mod payload;
mod pipeline;

pub use payload::{Header, Removal, TimelineItem};
pub use pipeline::HookPipeline;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::ledger::{Event, EventDraft};

/// Error returned by a hook handler. The pipeline logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("handler panicked")]
    Panicked,
}

pub type HookFuture<T> = BoxFuture<'static, Result<T, HookError>>;

/// A single hook handler. Cloning shares the same instance; the pipeline
/// unregisters handlers by instance identity.
pub type Handler<T> = Arc<dyn Fn(T) -> HookFuture<T> + Send + Sync>;

/// Wrap an async closure as a [`Handler`].
pub fn handler<T, F, Fut>(f: F) -> Handler<T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HookError>> + Send + 'static,
{
    Arc::new(move |payload| f(payload).boxed())
}

/// Wrap a synchronous closure as a [`Handler`].
pub fn sync_handler<T, F>(f: F) -> Handler<T>
where
    T: Send + 'static,
    F: Fn(T) -> Result<T, HookError> + Send + Sync + 'static,
{
    Arc::new(move |payload| futures::future::ready(f(payload)).boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookPoint {
    BeforeEventAdd,
    AfterEventAdd,
    BeforeEventRemove,
    AfterEventRemove,
    RenderTimelineItem,
    RenderHeader,
}

impl HookPoint {
    pub const ALL: [HookPoint; 6] = [
        HookPoint::BeforeEventAdd,
        HookPoint::AfterEventAdd,
        HookPoint::BeforeEventRemove,
        HookPoint::AfterEventRemove,
        HookPoint::RenderTimelineItem,
        HookPoint::RenderHeader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::BeforeEventAdd => "before-event-add",
            HookPoint::AfterEventAdd => "after-event-add",
            HookPoint::BeforeEventRemove => "before-event-remove",
            HookPoint::AfterEventRemove => "after-event-remove",
            HookPoint::RenderTimelineItem => "render-timeline-item",
            HookPoint::RenderHeader => "render-header",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookPoint {
    type Err = ValidationError;

    /// Accepts the kebab-case name or the camelCase form (`beforeEventAdd`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        HookPoint::ALL
            .into_iter()
            .find(|p| p.as_str().replace('-', "") == normalized)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "hook point".into(),
                value: s.to_string(),
                expected: HookPoint::ALL.map(|p| p.as_str()).join(", "),
            })
    }
}

/// The handlers one plugin contributes, at most one per hook point.
#[derive(Clone, Default)]
pub struct HookSet {
    pub before_event_add: Option<Handler<EventDraft>>,
    pub after_event_add: Option<Handler<Event>>,
    pub before_event_remove: Option<Handler<Removal>>,
    pub after_event_remove: Option<Handler<Removal>>,
    pub render_timeline_item: Option<Handler<TimelineItem>>,
    pub render_header: Option<Handler<Header>>,
}

impl HookSet {
    /// Hook points this set has a handler for.
    pub fn points(&self) -> Vec<HookPoint> {
        let present = [
            self.before_event_add.is_some(),
            self.after_event_add.is_some(),
            self.before_event_remove.is_some(),
            self.after_event_remove.is_some(),
            self.render_timeline_item.is_some(),
            self.render_header.is_some(),
        ];
        HookPoint::ALL
            .into_iter()
            .zip(present)
            .filter_map(|(point, has)| has.then_some(point))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("points", &self.points())
            .finish()
    }
}

/// Static description of a hook point: its payload type and where its
/// handlers live. Implemented by the marker types in [`point`].
pub trait Hook {
    const POINT: HookPoint;
    type Payload: Clone + Send + 'static;

    #[doc(hidden)]
    fn handler(set: &HookSet) -> Option<&Handler<Self::Payload>>;

    #[doc(hidden)]
    fn lane(lanes: &pipeline::Lanes) -> &pipeline::Lane<Self::Payload>;

    #[doc(hidden)]
    fn lane_mut(lanes: &mut pipeline::Lanes) -> &mut pipeline::Lane<Self::Payload>;
}

/// Marker types naming each hook point for [`HookPipeline::execute`].
pub mod point {
    use super::*;

    macro_rules! hook_point {
        ($marker:ident, $variant:ident, $field:ident, $payload:ty) => {
            pub struct $marker;

            impl Hook for $marker {
                const POINT: HookPoint = HookPoint::$variant;
                type Payload = $payload;

                fn handler(set: &HookSet) -> Option<&Handler<$payload>> {
                    set.$field.as_ref()
                }

                fn lane(lanes: &pipeline::Lanes) -> &pipeline::Lane<$payload> {
                    &lanes.$field
                }

                fn lane_mut(lanes: &mut pipeline::Lanes) -> &mut pipeline::Lane<$payload> {
                    &mut lanes.$field
                }
            }
        };
    }

    hook_point!(BeforeEventAdd, BeforeEventAdd, before_event_add, EventDraft);
    hook_point!(AfterEventAdd, AfterEventAdd, after_event_add, Event);
    hook_point!(BeforeEventRemove, BeforeEventRemove, before_event_remove, Removal);
    hook_point!(AfterEventRemove, AfterEventRemove, after_event_remove, Removal);
    hook_point!(RenderTimelineItem, RenderTimelineItem, render_timeline_item, TimelineItem);
    hook_point!(RenderHeader, RenderHeader, render_header, Header);
}
