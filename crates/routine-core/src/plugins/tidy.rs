//! Normalizes event drafts before they reach the ledger and tags recurring
//! rows on the timeline. Enabled by default.

use super::PluginDescriptor;
use crate::hooks::{sync_handler, HookSet, TimelineItem};
use crate::ledger::{Event, EventDraft};

pub const PLUGIN_ID: &str = "event-tidy";

pub const RECURRING_BADGE: &str = "recurring";

/// Trim the title, collapse internal runs of whitespace, and drop a blank
/// description.
pub fn tidy_draft(mut draft: EventDraft) -> EventDraft {
    draft.title = draft.title.split_whitespace().collect::<Vec<_>>().join(" ");
    draft.description = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    draft
}

fn badge_recurring(mut item: TimelineItem) -> TimelineItem {
    if item.event.is_recurring() && !item.badges.iter().any(|b| b == RECURRING_BADGE) {
        item.badges.push(RECURRING_BADGE.to_string());
    }
    item
}

pub fn hooks() -> HookSet {
    HookSet {
        before_event_add: Some(sync_handler(|draft: EventDraft| Ok(tidy_draft(draft)))),
        after_event_add: Some(sync_handler(|event: Event| {
            tracing::info!(id = %event.id, title = %event.title, "event added");
            Ok(event)
        })),
        render_timeline_item: Some(sync_handler(|item: TimelineItem| Ok(badge_recurring(item)))),
        ..HookSet::default()
    }
}

pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(
        PLUGIN_ID,
        "Event Tidy",
        "Cleans up event titles and marks recurring items",
    )
    .enabled_by_default()
    .with_hooks(hooks())
    .on_init(|| tracing::debug!("event-tidy initialized"))
    .on_destroy(|| tracing::debug!("event-tidy destroyed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{point, HookPipeline};
    use crate::ledger::CompletionStatus;
    use chrono::Utc;

    #[test]
    fn tidies_title_and_description() {
        let draft = EventDraft::recurring("  Morning \t run  ").with_description("   ");
        let tidy = tidy_draft(draft);
        assert_eq!(tidy.title, "Morning run");
        assert!(tidy.description.is_none());
    }

    #[tokio::test]
    async fn recurring_rows_get_a_single_badge() {
        let pipeline = HookPipeline::new();
        pipeline.register_plugin(PLUGIN_ID, &hooks());

        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Meditate",
            "type": "recurring",
            "created_at": Utc::now(),
        }))
        .unwrap();
        let item = TimelineItem {
            event,
            status: CompletionStatus::Pending,
            badges: vec![RECURRING_BADGE.to_string()],
        };

        let out = pipeline.execute::<point::RenderTimelineItem>(item).await;
        assert_eq!(out.badges, vec![RECURRING_BADGE]);
    }
}
