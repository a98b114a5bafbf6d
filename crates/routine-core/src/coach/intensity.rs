//! Coach tone levels.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// Full harshness; text is left untouched.
    #[default]
    Spartan,
    Warrior,
    Human,
}

const HUMAN_PREFIX: &str = "I hear you. ";

const WARRIOR_WORDS: [(&str, &str); 6] = [
    ("pathetic", "below standard"),
    ("unacceptable", "not acceptable"),
    ("disappointment", "setback"),
    ("quitting", "stopping"),
    ("quit", "stopped"),
    ("coward", "undisciplined"),
];

const HUMAN_WORDS: [(&str, &str); 6] = [
    ("pathetic", "not good enough"),
    ("unacceptable", "not acceptable"),
    ("disappointment", "setback"),
    ("quitting", "stopping"),
    ("quit", "stopped"),
    ("coward", "undisciplined"),
];

type Substitutions = Vec<(Regex, &'static str)>;

fn compile(words: &[(&str, &'static str)]) -> Substitutions {
    words
        .iter()
        .filter_map(|(word, replacement)| {
            Regex::new(&format!(r"(?i)\b{word}\b"))
                .ok()
                .map(|re| (re, *replacement))
        })
        .collect()
}

fn substitute(text: &str, subs: &Substitutions) -> String {
    subs.iter().fold(text.to_string(), |acc, (re, replacement)| {
        re.replace_all(&acc, *replacement).into_owned()
    })
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Spartan, Intensity::Warrior, Intensity::Human];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Spartan => "spartan",
            Intensity::Warrior => "warrior",
            Intensity::Human => "human",
        }
    }

    /// Tone instruction sent to the remote model.
    pub fn tone_prompt(&self) -> &'static str {
        match self {
            Intensity::Spartan => "Tone: full Spartan. Harsh, direct, zero tolerance.",
            Intensity::Warrior => {
                "Tone: strict but less abrasive. Still direct. Reduce insults. Focus on discipline."
            }
            Intensity::Human => {
                "Tone: firm and practical but more supportive. No insults. Still demands action."
            }
        }
    }

    /// Rewrite locally generated text for this tone. Whole words only,
    /// case-insensitive.
    pub fn apply(&self, text: &str) -> String {
        static WARRIOR: OnceLock<Substitutions> = OnceLock::new();
        static HUMAN: OnceLock<Substitutions> = OnceLock::new();

        match self {
            Intensity::Spartan => text.to_string(),
            Intensity::Warrior => substitute(text, WARRIOR.get_or_init(|| compile(&WARRIOR_WORDS))),
            Intensity::Human => format!(
                "{HUMAN_PREFIX}{}",
                substitute(text, HUMAN.get_or_init(|| compile(&HUMAN_WORDS)))
            ),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Intensity::ALL
            .into_iter()
            .find(|i| i.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "intensity".into(),
                value: s.to_string(),
                expected: "spartan, warrior, human".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spartan_leaves_text_alone() {
        let text = "Pathetic. Unacceptable.";
        assert_eq!(Intensity::Spartan.apply(text), text);
    }

    #[test]
    fn warrior_softens_whole_words() {
        assert_eq!(
            Intensity::Warrior.apply("Pathetic. That's unacceptable, you QUIT."),
            "below standard. That's not acceptable, you stopped."
        );
        assert_eq!(
            Intensity::Warrior.apply("That's just quitting with extra steps."),
            "That's just stopping with extra steps."
        );
        // Partial words stay intact.
        assert_eq!(Intensity::Warrior.apply("quite cowardly"), "quite cowardly");
    }

    #[test]
    fn human_prefixes_and_softens() {
        assert_eq!(
            Intensity::Human.apply("Pathetic. Don't be a disappointment."),
            "I hear you. not good enough. Don't be a setback."
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Warrior".parse::<Intensity>().unwrap(), Intensity::Warrior);
        assert!("gentle".parse::<Intensity>().is_err());
    }
}
