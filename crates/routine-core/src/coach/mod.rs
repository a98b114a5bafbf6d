//! Accountability coach.
//!
//! Feedback and chat replies are derived from a [`DaySnapshot`] of the
//! ledger. When an API key is stored the engine makes exactly one remote
//! call; any failure there (or no key at all) falls back to local,
//! rule-based generation, which is deterministic apart from catalog draws.

mod catalog;
mod intensity;
mod message;
mod prompt;
pub mod remote;

pub use catalog::{draw, PenaltyTask, PENALTIES, STOIC_QUOTES};
pub use intensity::Intensity;
pub use message::{CoachMessage, MessageKind, Penalty, PenaltyIntensity, Role, Source};
pub use remote::{ChatMessage, RemoteError, RemoteModel};

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use thiserror::Error;

use crate::error::{Result, ValidationError};
use crate::ledger::{DaySnapshot, Ledger, Mood};
use crate::storage::{keys, load_document, save_document, CoachConfig, DocumentStore};

/// Failure inside local generation. Never escapes the engine.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("{0} catalog is empty")]
    EmptyCatalog(&'static str),
}

const FATIGUE: &[&str] = &["tired", "exhausted", "can't"];
const DEFERRAL: &[&str] = &["skip", "postpone", "later", "tomorrow"];
const FEELINGS: &[&str] = &["feel", "mood", "bad", "sad", "depressed"];
const POSITIVE: &[&str] = &["good", "great", "amazing"];
const HELP: &[&str] = &["help", "advice", "what should"];
const COMPLETION: &[&str] = &["done", "finished", "completed"];

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Plain-text description of a day, as sent to the remote model.
pub fn build_context(snapshot: &DaySnapshot) -> String {
    let stats = &snapshot.stats;
    let mut ctx = String::from("\n--- TODAY'S DATA ---\n");
    let _ = writeln!(ctx, "Date: {}", snapshot.date.format("%a %b %d %Y"));
    let _ = writeln!(ctx, "Total tasks: {}", stats.total);
    let _ = writeln!(
        ctx,
        "Completed: {} | Skipped: {} | Pending: {}",
        stats.completed, stats.skipped, stats.pending
    );
    let _ = writeln!(ctx, "Completion rate: {}%", stats.completion_rate);

    if !stats.skipped_tasks.is_empty() {
        ctx.push_str("\nSKIPPED TASKS:\n");
        for task in &stats.skipped_tasks {
            let excuse = match &task.reason {
                Some(reason) => format!(" (excuse: \"{reason}\")"),
                None => " (no excuse given)".to_string(),
            };
            let _ = writeln!(
                ctx,
                "- \"{}\" at {}{excuse}",
                task.event.title,
                task.event.time_label()
            );
        }
    }

    if let Some(mood) = &snapshot.mood {
        let note = mood
            .note
            .as_ref()
            .map(|n| format!(" - \"{n}\""))
            .unwrap_or_default();
        let _ = writeln!(ctx, "\nUSER MOOD: {}{note}", mood.mood);
    }

    if !snapshot.schedule.is_empty() {
        ctx.push_str("\nFULL SCHEDULE:\n");
        for item in &snapshot.schedule {
            let _ = writeln!(
                ctx,
                "- [{}] \"{}\" at {} ({})",
                item.status.as_str().to_uppercase(),
                item.event.title,
                item.event.time_label(),
                item.event.recurrence.label()
            );
        }
    }

    ctx
}

pub struct CoachEngine {
    store: Arc<dyn DocumentStore>,
    remote: Option<RemoteModel>,
    history_window: usize,
    intensity: Intensity,
    api_key: String,
    transcript: Mutex<Vec<CoachMessage>>,
    rng: Mutex<Mcg128Xsl64>,
}

impl CoachEngine {
    /// Load intensity, API key and chat transcript from `store`.
    ///
    /// An unrecognized stored intensity falls back to spartan. If the HTTP
    /// client cannot be built the engine runs local-only.
    pub fn open(store: Arc<dyn DocumentStore>, config: &CoachConfig) -> Result<Self> {
        let stored: Option<String> = load_document(store.as_ref(), keys::COACH_INTENSITY)?;
        let intensity = match stored {
            Some(raw) => raw.parse::<Intensity>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring stored coach intensity");
                Intensity::default()
            }),
            None => Intensity::default(),
        };
        let api_key: Option<String> = load_document(store.as_ref(), keys::COACH_API_KEY)?;
        let transcript: Vec<CoachMessage> = load_document(store.as_ref(), keys::COACH_CHAT)?;

        let remote = match RemoteModel::new(config) {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::warn!(error = %e, "remote coach unavailable; using local feedback only");
                None
            }
        };

        Ok(Self {
            store,
            remote,
            history_window: config.history_window,
            intensity,
            api_key: api_key.unwrap_or_default(),
            transcript: Mutex::new(transcript),
            rng: Mutex::new(Mcg128Xsl64::from_entropy()),
        })
    }

    /// Pin the random source used for penalty and quote draws.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(Mcg128Xsl64::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: Intensity) -> Result<()> {
        save_document(self.store.as_ref(), keys::COACH_INTENSITY, intensity.as_str())?;
        self.intensity = intensity;
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Store the key used for remote calls. A blank key clears it.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return self.clear_api_key();
        }
        save_document(self.store.as_ref(), keys::COACH_API_KEY, key)?;
        self.api_key = key.to_string();
        Ok(())
    }

    pub fn clear_api_key(&mut self) -> Result<()> {
        self.store.remove(keys::COACH_API_KEY)?;
        self.api_key.clear();
        Ok(())
    }

    pub fn chat_history(&self) -> Vec<CoachMessage> {
        lock(&self.transcript).clone()
    }

    pub fn clear_chat_history(&self) -> Result<()> {
        let mut transcript = lock(&self.transcript);
        save_document(self.store.as_ref(), keys::COACH_CHAT, &Vec::<CoachMessage>::new())?;
        transcript.clear();
        Ok(())
    }

    fn credentials(&self) -> Option<(&RemoteModel, &str)> {
        if !self.has_api_key() {
            return None;
        }
        self.remote.as_ref().map(|model| (model, self.api_key.as_str()))
    }

    /// Feedback messages for `day`. Never fails; remote errors and local
    /// generation errors are logged and replaced.
    pub async fn daily_feedback(&self, ledger: &Ledger, day: NaiveDate) -> Vec<CoachMessage> {
        let snapshot = ledger.snapshot(day);

        if let Some((model, key)) = self.credentials() {
            let messages = [
                ChatMessage::system(prompt::PERSONA),
                ChatMessage::system(self.intensity.tone_prompt()),
                ChatMessage::user(format!(
                    "{}\n{}",
                    prompt::FEEDBACK_REQUEST,
                    build_context(&snapshot)
                )),
            ];
            match model.complete(key, &messages).await {
                Ok(content) => {
                    return vec![CoachMessage::feedback(content).with_source(Source::Remote)];
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote feedback failed; falling back to local");
                }
            }
        }

        match self.generate_local_feedback(&snapshot) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(error = %e, "local feedback generation failed");
                vec![CoachMessage::feedback(self.intensity.apply(
                    "Something broke while judging your day. Even the system is testing you. Do your tasks anyway.",
                ))
                .with_source(Source::Local)]
            }
        }
    }

    /// Rule-based feedback for a day. Order: completion tier, one penalty
    /// per skipped task, mood, pending reminder.
    pub fn generate_local_feedback(&self, snapshot: &DaySnapshot) -> Result<Vec<CoachMessage>, CoachError> {
        let stats = &snapshot.stats;
        let tone = self.intensity;
        let local = |m: CoachMessage| m.with_source(Source::Local);

        if stats.total == 0 {
            return Ok(vec![local(CoachMessage::feedback(tone.apply(
                "You have zero tasks scheduled. That's not discipline, that's hiding. Build your day or your day builds you.",
            )))]);
        }

        let mut messages = Vec::new();
        let rate = stats.completion_rate;
        let tier = if rate == 100 {
            Some("All tasks completed. Acceptable. Don't let this make you comfortable; that's where decay starts. Raise the bar tomorrow.".to_string())
        } else if rate >= 80 {
            Some(format!(
                "{rate}% completion. Almost. \"Almost\" is the language of people who don't finish. Close the gap."
            ))
        } else if rate >= 50 {
            Some(format!(
                "{rate}%. Half-measures. You showed up for half your life today. The other half? Wasted. That's unacceptable."
            ))
        } else if stats.completed > 0 {
            Some(format!(
                "{rate}% completion rate. Pathetic. You had {} tasks and couldn't handle {} of them. What exactly were you doing?",
                stats.total,
                stats.total - stats.completed
            ))
        } else if stats.skipped > 0 {
            Some(format!(
                "Zero completions. {} skipped. You didn't have a bad day. You chose to fail. Every skip was a decision. Own it.",
                stats.skipped
            ))
        } else {
            None
        };
        if let Some(text) = tier {
            messages.push(local(CoachMessage::feedback(tone.apply(&text))));
        }

        let mut rng = lock(&self.rng);
        for task in &stats.skipped_tasks {
            let penalty = draw(&PENALTIES, &mut *rng).ok_or(CoachError::EmptyCatalog("penalty"))?;
            let excuse = match &task.reason {
                Some(reason) => format!(" Your excuse: \"{reason}.\" Irrelevant."),
                None => " No excuse given. At least you didn't insult me with a lie.".to_string(),
            };
            let text = format!(
                "You skipped \"{}.\"{excuse} Penalty: {}",
                task.event.title, penalty.task
            );
            messages.push(local(CoachMessage::penalty(tone.apply(&text), penalty.into())));
        }

        match snapshot.mood.as_ref().map(|m| m.mood) {
            Some(mood @ (Mood::Bad | Mood::Terrible)) => {
                let quote = draw(&STOIC_QUOTES, &mut *rng).ok_or(CoachError::EmptyCatalog("quote"))?;
                let text = format!(
                    "You feel \"{mood}.\" Good, you're aware. Now hear this: pain is information, not permission to quit. {quote} Your feelings are valid. Your excuses are not. Move."
                );
                messages.push(local(CoachMessage::stoic(tone.apply(&text))));
            }
            Some(Mood::Neutral) => {
                messages.push(local(CoachMessage::stoic(tone.apply(
                    "\"Neutral\" is just comfortable mediocrity dressed up as stability. You're not here to coast. Find the edge and push past it.",
                ))));
            }
            Some(Mood::Good | Mood::Great) | None => {}
        }

        if stats.pending > 0 {
            let plural = if stats.pending > 1 { "s" } else { "" };
            let text = format!(
                "{} task{plural} still pending. The day isn't over. You still have time to not be a disappointment. Execute.",
                stats.pending
            );
            messages.push(local(CoachMessage::reminder(tone.apply(&text))));
        }

        Ok(messages)
    }

    /// Append `text` to the transcript, reply, and append the reply.
    ///
    /// # Errors
    /// Rejects blank input. Returns a storage error if the transcript cannot
    /// be written; the entry that failed to persist is dropped again.
    pub async fn chat(&self, text: &str, ledger: &Ledger, day: NaiveDate) -> Result<CoachMessage> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyField("message".into()).into());
        }
        let snapshot = ledger.snapshot(day);

        let recent: Vec<ChatMessage> = {
            let mut transcript = lock(&self.transcript);
            transcript.push(CoachMessage::user(text));
            if let Err(e) = save_document(self.store.as_ref(), keys::COACH_CHAT, &*transcript) {
                transcript.pop();
                return Err(e);
            }
            let start = transcript.len().saturating_sub(self.history_window);
            transcript[start..]
                .iter()
                .map(|m| match m.role {
                    Role::Coach => ChatMessage::assistant(m.content.clone()),
                    Role::User => ChatMessage::user(m.content.clone()),
                })
                .collect()
        };

        let mut reply = None;
        if let Some((model, key)) = self.credentials() {
            let mut messages = vec![
                ChatMessage::system(prompt::PERSONA),
                ChatMessage::system(self.intensity.tone_prompt()),
                ChatMessage::system(format!(
                    "Current schedule context:\n{}",
                    build_context(&snapshot)
                )),
            ];
            messages.extend(recent);
            match model.complete(key, &messages).await {
                Ok(content) => reply = Some(CoachMessage::reply(content, Source::Remote)),
                Err(e) => tracing::warn!(error = %e, "remote chat failed; falling back to local"),
            }
        }

        let reply = match reply {
            Some(reply) => reply,
            None => {
                let content = self.local_chat_response(text, &snapshot).unwrap_or_else(|e| {
                    tracing::error!(error = %e, "local chat generation failed");
                    self.intensity
                        .apply("Even the system is testing you. Stop typing and go execute.")
                });
                CoachMessage::reply(content, Source::Local)
            }
        };

        let mut transcript = lock(&self.transcript);
        transcript.push(reply.clone());
        if let Err(e) = save_document(self.store.as_ref(), keys::COACH_CHAT, &*transcript) {
            transcript.pop();
            return Err(e);
        }
        Ok(reply)
    }

    /// Keyword-driven reply. First matching group wins: fatigue, deferral,
    /// feelings, positive, help, completion; then skipped count, then a
    /// catch-all.
    pub fn local_chat_response(&self, text: &str, snapshot: &DaySnapshot) -> Result<String, CoachError> {
        let stats = &snapshot.stats;
        let msg = text.to_lowercase();
        let pending = stats.pending;
        let rate = stats.completion_rate;
        let tone = self.intensity;

        let quote = || {
            draw(&STOIC_QUOTES, &mut *lock(&self.rng))
                .copied()
                .ok_or(CoachError::EmptyCatalog("quote"))
        };

        let text = if mentions(&msg, FATIGUE) {
            format!(
                "\"Tired\" is not a status. It's a choice to announce weakness. {} You have {pending} tasks left. Start the next one in the next 60 seconds or the tiredness wins.",
                quote()?
            )
        } else if mentions(&msg, DEFERRAL) {
            let penalty = draw(&PENALTIES, &mut *lock(&self.rng))
                .ok_or(CoachError::EmptyCatalog("penalty"))?;
            format!(
                "Postpone? That's just quitting with extra steps. You do it now or you pay the price. Penalty: {}. Your call.",
                penalty.task.trim_end_matches('.')
            )
        } else if mentions(&msg, FEELINGS) {
            format!(
                "Your feelings are real. They're also irrelevant to whether you execute. {} Pain is the fee for a life worth living. Now get back to work.",
                quote()?
            )
        } else if mentions(&msg, POSITIVE) {
            format!(
                "Feeling good is not an achievement. It's a temporary state. Use it. You have {pending} pending tasks; this is the easiest they'll ever be. Move while the momentum is there."
            )
        } else if mentions(&msg, HELP) {
            if pending > 0 {
                format!(
                    "Stop asking. Start doing. Your next task is waiting. {pending} items remain. Pick the hardest one and attack it first. That's my advice. Every time."
                )
            } else {
                "You want advice? Add harder tasks. If you're finishing everything comfortably, your bar is too low. Discomfort is the only reliable compass for growth.".to_string()
            }
        } else if mentions(&msg, COMPLETION) {
            if rate == 100 {
                "Acceptable. But don't celebrate baseline expectations. What's tomorrow look like? It should be harder than today.".to_string()
            } else {
                format!(
                    "\"Done\"? Your completion rate is {rate}%. You're not done. You quit. There's a difference. Get back in there."
                )
            }
        } else if stats.skipped > 0 {
            format!(
                "You're chatting instead of executing. You have {} skipped tasks haunting your record today. Every second here is a second not fixing that. Go.",
                stats.skipped
            )
        } else {
            format!(
                "I don't do small talk. You have {pending} pending tasks and a {rate}% completion rate. Talk is cheap. Action is the only currency I accept. What are you going to DO?"
            )
        };

        Ok(tone.apply(&text))
    }
}
