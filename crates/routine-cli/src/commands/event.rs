use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;
use routine_core::EventDraft;

use super::{day_or_today, open_app, parse_time, print_json, status_marker, CliResult};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add an event (one-time on --date or today, unless --recurring)
    Add {
        /// Event title
        title: String,
        /// Repeat every day
        #[arg(long, conflicts_with = "date")]
        recurring: bool,
        /// Day of a one-time event (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time of day (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove an event
    Remove {
        /// Event ID
        id: String,
    },
    /// List events for a day
    List {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// List every stored event instead of one day
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an event completed for a day
    Complete {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark an event skipped for a day
    Skip {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Why it was skipped
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show an event's status for a day
    Status {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(action: EventAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        EventAction::Add {
            title,
            recurring,
            date,
            time,
            description,
        } => {
            let mut draft = if recurring {
                EventDraft::recurring(title)
            } else {
                EventDraft::one_time(title, day_or_today(date))
            };
            draft.time = time;
            draft.description = description;
            let event = app.add_event(draft).await?;
            print_json(&event)?;
        }
        EventAction::Remove { id } => {
            if app.remove_event(&id).await? {
                println!("removed {id}");
            } else {
                println!("no event with id {id}");
            }
        }
        EventAction::List { date, all, json } => {
            if all {
                if json {
                    print_json(app.ledger().events())?;
                } else {
                    for e in app.ledger().events() {
                        println!("{}  {:<11}  {:<9}  {}", e.id, e.time_label(), e.recurrence.label(), e.title);
                    }
                }
                return Ok(());
            }

            let snapshot = app.ledger().snapshot(day_or_today(date));
            if json {
                print_json(&snapshot.schedule)?;
            } else if snapshot.schedule.is_empty() {
                println!("no events on {}", snapshot.date);
            } else {
                for item in &snapshot.schedule {
                    println!(
                        "{} {:<11}  {}  ({})",
                        status_marker(item.status),
                        item.event.time_label(),
                        item.event.title,
                        item.event.id
                    );
                }
            }
        }
        EventAction::Complete { id, date } => {
            let day = day_or_today(date);
            warn_if_unknown(&app, &id);
            app.ledger_mut().complete_event(&id, day)?;
            println!("completed {id} on {day}");
        }
        EventAction::Skip { id, date, reason } => {
            let day = day_or_today(date);
            warn_if_unknown(&app, &id);
            app.ledger_mut().skip_event(&id, day, reason.as_deref())?;
            println!("skipped {id} on {day}");
        }
        EventAction::Status { id, date } => {
            println!("{}", app.ledger().event_status(&id, day_or_today(date)));
        }
    }
    Ok(())
}

fn warn_if_unknown(app: &routine_core::RoutineApp, id: &str) {
    if app.ledger().event(id).is_none() {
        eprintln!("warning: no event with id {id}; recording anyway");
    }
}
