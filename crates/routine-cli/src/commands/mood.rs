use chrono::NaiveDate;
use clap::Subcommand;
use routine_core::Mood;

use super::{day_or_today, open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Log today's mood (terrible, bad, neutral, good, great)
    Log {
        mood: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the mood logged for a day
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Recent days, most recent first
    History {
        /// Number of days (defaults to mood.history_days)
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: MoodAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        MoodAction::Log { mood, note, date } => {
            let mood: Mood = mood.parse()?;
            let day = day_or_today(date);
            app.ledger_mut().log_mood(day, mood, note.as_deref())?;
            println!("mood for {day}: {mood}");
        }
        MoodAction::Show { date } => {
            let day = day_or_today(date);
            match app.ledger().mood(day) {
                Some(entry) => match &entry.note {
                    Some(note) => println!("{}: {} ({note})", day, entry.mood),
                    None => println!("{}: {}", day, entry.mood),
                },
                None => println!("{day}: no mood logged"),
            }
        }
        MoodAction::History { days, json } => {
            let history = match days {
                Some(days) => app.ledger().mood_history(days),
                None => app.mood_history(),
            };
            if json {
                return print_json(&history);
            }
            for row in &history {
                let mood = row.mood().map(|m| m.as_str()).unwrap_or("-");
                println!("{}  {mood}", row.date);
            }
        }
    }
    Ok(())
}
