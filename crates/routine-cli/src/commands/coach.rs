use chrono::NaiveDate;
use clap::Subcommand;
use routine_core::coach::{CoachMessage, MessageKind, Role, Source};
use routine_core::Intensity;

use super::{day_or_today, open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum CoachAction {
    /// Feedback on a day's routine
    Feedback {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Send a message to the coach
    Chat {
        message: String,
        /// Day used as schedule context
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the chat transcript
    History {
        #[arg(long)]
        json: bool,
    },
    /// Clear the chat transcript
    Clear,
    /// Show or set the coach intensity (spartan, warrior, human)
    Intensity { level: Option<String> },
    /// Manage the remote model API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store an API key
    Set { key: String },
    /// Remove the stored API key
    Clear,
    /// Report whether a key is stored
    Status,
}

pub async fn run(action: CoachAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        CoachAction::Feedback { date, json } => {
            let messages = app.daily_feedback(day_or_today(date)).await;
            if json {
                return print_json(&messages);
            }
            for message in &messages {
                print_message(message);
            }
        }
        CoachAction::Chat { message, date } => {
            let reply = app.chat(&message, day_or_today(date)).await?;
            print_message(&reply);
        }
        CoachAction::History { json } => {
            let history = app.coach().chat_history();
            if json {
                return print_json(&history);
            }
            if history.is_empty() {
                println!("no messages");
            }
            for message in &history {
                print_message(message);
            }
        }
        CoachAction::Clear => {
            app.coach().clear_chat_history()?;
            println!("chat history cleared");
        }
        CoachAction::Intensity { level } => match level {
            None => println!("{}", app.coach().intensity()),
            Some(level) => {
                let intensity: Intensity = level.parse()?;
                app.coach_mut().set_intensity(intensity)?;
                println!("intensity set to {intensity}");
            }
        },
        CoachAction::Key { action } => match action {
            KeyAction::Set { key } => {
                app.coach_mut().set_api_key(&key)?;
                if app.coach().has_api_key() {
                    println!("api key stored");
                } else {
                    println!("api key cleared");
                }
            }
            KeyAction::Clear => {
                app.coach_mut().clear_api_key()?;
                println!("api key cleared");
            }
            KeyAction::Status => {
                let state = if app.coach().has_api_key() { "set" } else { "not set" };
                println!("api key: {state}");
            }
        },
    }
    Ok(())
}

fn print_message(message: &CoachMessage) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Coach => match message.kind {
            Some(MessageKind::Penalty) => "penalty",
            Some(MessageKind::Stoic) => "stoic",
            Some(MessageKind::Reminder) => "reminder",
            Some(MessageKind::Feedback) | None => "coach",
        },
    };
    let origin = match message.source {
        Some(Source::Remote) => " (remote)",
        Some(Source::Local) | None => "",
    };
    println!("[{speaker}{origin}] {}", message.content);
    if let Some(penalty) = &message.penalty {
        println!("    -> {} ({})", penalty.task, penalty.duration);
    }
}
