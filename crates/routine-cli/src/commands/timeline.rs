use chrono::NaiveDate;
use clap::Args;
use routine_core::hooks::{Header, TimelineItem};
use serde::Serialize;

use super::{day_or_today, open_app, print_json, status_marker, CliResult};

#[derive(Args)]
pub struct TimelineArgs {
    /// Day (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct TimelineView {
    header: Header,
    items: Vec<TimelineItem>,
}

pub async fn run(args: TimelineArgs) -> CliResult {
    let app = open_app()?;
    let day = day_or_today(args.date);
    let header = app.header(day).await;
    let items = app.timeline(day).await;

    if args.json {
        return print_json(&TimelineView { header, items });
    }

    if header.badges.is_empty() {
        println!("{}", header.title);
    } else {
        println!("{}  [{}]", header.title, header.badges.join("] ["));
    }
    if items.is_empty() {
        println!("  nothing scheduled");
    }
    for item in &items {
        let badges = if item.badges.is_empty() {
            String::new()
        } else {
            format!("  [{}]", item.badges.join("] ["))
        };
        println!(
            "  {} {:<11}  {}{badges}",
            status_marker(item.status),
            item.event.time_label(),
            item.event.title
        );
    }

    for plugin in app.plugins().enabled_plugins() {
        if let Some(widget) = app.plugins().widget(&plugin.id) {
            println!();
            println!("== {} ==", widget.title());
            println!("{}", widget.render()?);
        }
    }
    Ok(())
}
