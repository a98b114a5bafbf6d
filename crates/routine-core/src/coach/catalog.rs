//! Fixed penalty and quote catalogs.

use rand::seq::SliceRandom;
use rand::Rng;

use super::message::PenaltyIntensity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyTask {
    pub task: &'static str,
    pub intensity: PenaltyIntensity,
    pub duration: &'static str,
}

const fn penalty(task: &'static str, intensity: PenaltyIntensity, duration: &'static str) -> PenaltyTask {
    PenaltyTask {
        task,
        intensity,
        duration,
    }
}

pub static PENALTIES: [PenaltyTask; 10] = [
    penalty("50 burpees. Now.", PenaltyIntensity::High, "10 min"),
    penalty(
        "100 pushups. No breaks longer than 10 seconds.",
        PenaltyIntensity::High,
        "8 min",
    ),
    penalty(
        "2 minute cold shower. Full cold. No easing in.",
        PenaltyIntensity::High,
        "2 min",
    ),
    penalty(
        "5 minute plank. If you collapse, restart that minute.",
        PenaltyIntensity::High,
        "5 min",
    ),
    penalty(
        "200 jumping jacks. Count every single one.",
        PenaltyIntensity::Medium,
        "8 min",
    ),
    penalty(
        "3 sets of 30 squats. 10 second rest between sets.",
        PenaltyIntensity::Medium,
        "6 min",
    ),
    penalty(
        "Write 500 words about why you failed today. No excuses allowed, only analysis.",
        PenaltyIntensity::Mental,
        "15 min",
    ),
    penalty(
        "Hold wall sit until failure. Rest 30 seconds. Repeat 3 times.",
        PenaltyIntensity::High,
        "8 min",
    ),
    penalty(
        "10 minute sprint intervals. 30 seconds on, 15 seconds off.",
        PenaltyIntensity::High,
        "10 min",
    ),
    penalty(
        "Tomorrow starts at 5 AM. Non-negotiable. Set the alarm now.",
        PenaltyIntensity::Schedule,
        "next day",
    ),
];

pub static STOIC_QUOTES: [&str; 10] = [
    "The impediment to action advances action. What stands in the way becomes the way. - Marcus Aurelius",
    "We suffer more in imagination than in reality. - Seneca",
    "Man is not worried by real problems so much as by his imagined anxieties about real problems. - Epictetus",
    "You have power over your mind, not outside events. Realize this, and you will find strength. - Marcus Aurelius",
    "The best revenge is not to be like your enemy. - Marcus Aurelius",
    "Waste no more time arguing about what a good man should be. Be one. - Marcus Aurelius",
    "It is not that we have a short time to live, but that we waste a great deal of it. - Seneca",
    "First say to yourself what you would be; and then do what you have to do. - Epictetus",
    "He who fears death will never do anything worthy of a man who is alive. - Seneca",
    "Difficulties strengthen the mind, as labor does the body. - Seneca",
];

/// Uniform draw from `catalog`. `None` only for an empty catalog.
pub fn draw<'a, T, R>(catalog: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    catalog.choose(rng)
}
