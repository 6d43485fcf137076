//! The ordered rule table.
//!
//! Every rule is data: a tagged variant carrying its matcher. The dispatcher
//! walks the table once and the first rule that matches wins.

use regex::Regex;

use crate::config::{CommandAction, DialogueConfig, QuestionKind};
use crate::error::{DialogueError, DialogueResult};

/// One entry of the dispatch table.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Case-insensitive literal prefix on the trimmed utterance.
    Command {
        prefix: String,
        action: CommandAction,
    },

    /// Utterance contains any of these phrases (as whole words).
    Greeting { phrases: Vec<Vec<String>> },

    /// Utterance contains any of these phrases (as whole words).
    Farewell { phrases: Vec<Vec<String>> },

    /// Anchored interrogative pattern capturing `topic` (and optionally `cue`).
    Question { kind: QuestionKind, regex: Regex },
}

/// What a matching rule extracted from the utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    Command {
        action: CommandAction,
        argument: String,
    },
    Greeting,
    Farewell,
    Question {
        kind: QuestionKind,
        cue: String,
        topic: String,
    },
}

impl Rule {
    /// Test this rule against a trimmed utterance and its lower-cased words.
    pub fn matches(&self, utterance: &str, words: &[String]) -> Option<RuleMatch> {
        match self {
            Rule::Command { prefix, action } => {
                strip_command_prefix(utterance, prefix).map(|argument| RuleMatch::Command {
                    action: *action,
                    argument: argument.to_string(),
                })
            }
            Rule::Greeting { phrases } => phrases
                .iter()
                .any(|p| contains_phrase(words, p))
                .then_some(RuleMatch::Greeting),
            Rule::Farewell { phrases } => phrases
                .iter()
                .any(|p| contains_phrase(words, p))
                .then_some(RuleMatch::Farewell),
            Rule::Question { kind, regex } => {
                let captures = regex.captures(utterance)?;
                let topic = captures.name("topic")?.as_str().trim();
                if topic.is_empty() {
                    return None;
                }
                let cue = captures
                    .name("cue")
                    .map(|m| m.as_str().trim().to_lowercase())
                    .unwrap_or_default();
                Some(RuleMatch::Question {
                    kind: *kind,
                    cue,
                    topic: topic.to_lowercase(),
                })
            }
        }
    }
}

/// The compiled, ordered rule chain: commands, greetings, farewells, questions.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Compile the rule chain from configuration.
    pub fn from_config(config: &DialogueConfig) -> DialogueResult<Self> {
        let mut rules = Vec::new();

        for binding in &config.commands {
            rules.push(Rule::Command {
                prefix: binding.prefix.trim().to_string(),
                action: binding.action,
            });
        }

        // Time-of-day phrases greet even when the generic set omits them.
        let greeting_phrases = config
            .greetings
            .iter()
            .chain(config.time_greetings.iter().map(|g| &g.phrase))
            .map(|p| split_words(p))
            .filter(|words| !words.is_empty())
            .collect();
        rules.push(Rule::Greeting {
            phrases: greeting_phrases,
        });
        rules.push(Rule::Farewell {
            phrases: config.farewells.iter().map(|p| split_words(p)).collect(),
        });

        for question in &config.questions {
            let regex = Regex::new(&question.pattern).map_err(|source| {
                DialogueError::InvalidPattern {
                    kind: question.kind,
                    source,
                }
            })?;
            if !regex.capture_names().any(|name| name == Some("topic")) {
                return Err(DialogueError::MissingTopicGroup(question.kind));
            }
            rules.push(Rule::Question {
                kind: question.kind,
                regex,
            });
        }

        Ok(Self { rules })
    }

    /// The first rule matching the utterance.
    pub fn first_match(&self, utterance: &str) -> Option<RuleMatch> {
        let utterance = utterance.trim();
        let words = split_words(utterance);
        self.rules
            .iter()
            .find_map(|rule| rule.matches(utterance, &words))
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Lower-cased words of `text`, split on anything that is not a letter or digit.
pub fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `phrase` occurs in `words` as a contiguous run of whole words.
pub(crate) fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}

/// Strip a command prefix case-insensitively.
///
/// The prefix must be followed by the end of input, a `:` separator, or
/// whitespace; the trimmed remainder is the command argument.
fn strip_command_prefix<'a>(utterance: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }

    let mut chars = utterance.chars();
    let mut end = 0;
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end += actual.len_utf8();
    }

    let rest = &utterance[end..];
    if !(rest.is_empty() || rest.starts_with(':') || rest.starts_with(char::is_whitespace)) {
        return None;
    }

    let rest = rest.trim_start();
    Some(rest.strip_prefix(':').unwrap_or(rest).trim())
}
