//! Dialogue configuration: command table, phrase sets, and question patterns.
//!
//! Every field has a Portuguese-first default (with English aliases), and a
//! TOML file only needs to name the sections it overrides:
//!
//! ```toml
//! fillers = ["Hmm, conte mais!"]
//!
//! [[commands]]
//! prefix = "aprender"
//! action = "teach"
//!
//! [[questions]]
//! kind = "what_is"
//! pattern = '(?i)^(?P<cue>o que é)\s+(?P<topic>.+?)\s*\??$'
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DialogueResult;

/// Handler a command prefix routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// `prefix: topic = fact`
    Teach,
    /// `prefix: topic = fact`, deletes the exact fact.
    Forget,
    /// `prefix: expression`
    Calculate,
    /// Lists stale topics.
    Review,
    /// `prefix: topic`
    Infer,
    /// `prefix: source code`
    AnalyzeCode,
}

/// A command keyword bound to its handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBinding {
    pub prefix: String,
    pub action: CommandAction,
}

impl CommandBinding {
    pub fn new(prefix: impl Into<String>, action: CommandAction) -> Self {
        Self {
            prefix: prefix.into(),
            action,
        }
    }
}

/// Interrogative forms recognized by the question-pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    WhatIs,
    HowTo,
    WhoIs,
    WhichIs,
    WhereIs,
    WhyIs,
    WhenIs,
}

/// A question pattern. The regex must capture `topic` and may capture `cue`
/// (the interrogative words themselves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPattern {
    pub kind: QuestionKind,
    pub pattern: String,
}

impl QuestionPattern {
    pub fn new(kind: QuestionKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

/// A time-of-day greeting and its tailored reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGreeting {
    pub phrase: String,
    pub reply: String,
}

impl TimeGreeting {
    pub fn new(phrase: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            reply: reply.into(),
        }
    }
}

/// Configuration for the intent dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Command prefixes, tested in order.
    pub commands: Vec<CommandBinding>,

    /// Phrases that mark an utterance as a greeting.
    pub greetings: Vec<String>,

    /// Morning/afternoon/evening phrases with tailored replies.
    pub time_greetings: Vec<TimeGreeting>,

    /// Generic greeting replies, picked at random.
    pub greeting_replies: Vec<String>,

    /// Phrases that mark an utterance as a farewell.
    pub farewells: Vec<String>,

    /// Farewell replies, picked at random.
    pub farewell_replies: Vec<String>,

    /// Last-resort replies, picked at random.
    pub fillers: Vec<String>,

    /// Question patterns, tested in order.
    pub questions: Vec<QuestionPattern>,

    /// Follow-up suggestion template; `{word}` is replaced by a related word.
    pub follow_up_template: String,

    /// Maximum follow-up suggestions kept per turn.
    pub max_follow_ups: usize,

    /// Maximum stale topics listed by the review command.
    pub review_limit: usize,

    /// Reply to an empty utterance.
    pub empty_message: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        use CommandAction::*;
        use QuestionKind::*;

        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            commands: vec![
                CommandBinding::new("aprender", Teach),
                CommandBinding::new("ensinar", Teach),
                CommandBinding::new("teach", Teach),
                CommandBinding::new("esquecer", Forget),
                CommandBinding::new("forget", Forget),
                CommandBinding::new("calcular", Calculate),
                CommandBinding::new("calculate", Calculate),
                CommandBinding::new("revisar", Review),
                CommandBinding::new("review", Review),
                CommandBinding::new("relacionar", Infer),
                CommandBinding::new("infer", Infer),
                CommandBinding::new("analisar código", AnalyzeCode),
                CommandBinding::new("analisar codigo", AnalyzeCode),
                CommandBinding::new("analyze code", AnalyzeCode),
            ],
            greetings: strings(&[
                "oi", "olá", "ola", "bom dia", "boa tarde", "boa noite", "hello", "hi", "hey",
                "good morning",
            ]),
            time_greetings: vec![
                TimeGreeting::new("bom dia", "Bom dia! Como posso te ajudar nesta manhã?"),
                TimeGreeting::new("boa tarde", "Boa tarde! Em que posso ajudar?"),
                TimeGreeting::new("boa noite", "Boa noite! Em que posso ajudar?"),
                TimeGreeting::new("good morning", "Good morning! How can I help?"),
            ],
            greeting_replies: strings(&[
                "Olá! Como posso te ajudar hoje?",
                "Oi! Tudo bem com você?",
                "Olá! O que vamos aprender hoje?",
            ]),
            farewells: strings(&["tchau", "adeus", "até logo", "sair", "bye", "goodbye"]),
            farewell_replies: strings(&[
                "Até logo! Foi um prazer conversar com você.",
                "Tchau! Volte sempre que quiser me ensinar algo novo.",
            ]),
            fillers: strings(&[
                "Desculpe, não entendi. Pode reformular?",
                "Ainda estou aprendendo. Pode explicar melhor?",
                "Não sei muito sobre isso ainda, mas você pode me ensinar!",
            ]),
            questions: vec![
                QuestionPattern::new(
                    WhatIs,
                    r"(?i)^(?P<cue>o que (?:é|e|são)|what(?: is| are|'s))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    HowTo,
                    r"(?i)^(?P<cue>como|how (?:to|do i|do you|does|can i))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    WhoIs,
                    r"(?i)^(?P<cue>quem (?:é|e|foi|são)|who (?:is|was|are))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    WhichIs,
                    r"(?i)^(?P<cue>qual (?:é|e|o|a|foi)|quais (?:são|os|as)|which (?:is|are))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    WhereIs,
                    r"(?i)^(?P<cue>onde (?:é|e|fica|está|esta)|where (?:is|are))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    WhyIs,
                    r"(?i)^(?P<cue>por ?qu[eê]|why (?:is|are|do|does))\s+(?P<topic>.+?)\s*\??$",
                ),
                QuestionPattern::new(
                    WhenIs,
                    r"(?i)^(?P<cue>quando (?:é|e|foi|será)|when (?:is|was|are))\s+(?P<topic>.+?)\s*\??$",
                ),
            ],
            follow_up_template: "Quer saber mais sobre {word}?".to_string(),
            max_follow_ups: 2,
            review_limit: 3,
            empty_message: "Por favor, envie uma mensagem.".to_string(),
        }
    }
}

impl DialogueConfig {
    /// Parse a TOML configuration; omitted fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> DialogueResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> DialogueResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The first prefix bound to `action`, used when naming command syntax.
    pub fn prefix_for(&self, action: CommandAction) -> Option<&str> {
        self.commands
            .iter()
            .find(|c| c.action == action)
            .map(|c| c.prefix.as_str())
    }
}
