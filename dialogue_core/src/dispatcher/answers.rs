//! Greeting, farewell, question, and fallback handlers.

use knowledge_store::{Entity, KnowledgeStore, Topic};
use tracing::debug;

use super::rules::{contains_phrase, split_words};
use super::{Intent, IntentDispatcher, Reply};
use crate::config::QuestionKind;
use crate::retrieval::ScoredFact;

const DEFAULT_FILLER: &str = "Hmm, não entendi.";

impl IntentDispatcher {
    /// Time-of-day reply, else a random generic one, else the persona greeting.
    pub(super) fn greet(&mut self, store: &KnowledgeStore, utterance: &str) -> Reply {
        let words = split_words(utterance);
        let tailored = self
            .config
            .time_greetings
            .iter()
            .find(|g| contains_phrase(&words, &split_words(&g.phrase)))
            .map(|g| g.reply.clone());

        let text = tailored
            .or_else(|| self.picker.pick(&self.config.greeting_replies).cloned())
            .unwrap_or_else(|| store.personality().greeting.clone());
        Reply::new(text, Intent::Greeting)
    }

    pub(super) fn farewell(&mut self) -> Reply {
        let text = self
            .picker
            .pick(&self.config.farewell_replies)
            .cloned()
            .unwrap_or_else(|| "Até logo!".to_string());
        Reply::new(text, Intent::Farewell)
    }

    /// Three-tier lookup: cue plus topic, bare topic, then semantic search on
    /// the composed query.
    pub(super) fn answer_question(
        &self,
        store: &KnowledgeStore,
        kind: QuestionKind,
        cue: &str,
        topic: &str,
    ) -> Reply {
        let composed = format!("{cue} {topic}");
        let facts = self.lookup_question(store, &composed, topic);
        let answered = !facts.is_empty();

        let text = match facts.as_slice() {
            [] => format!(
                "Ainda não sei sobre '{topic}'. Você pode me ensinar usando: {}",
                self.teach_hint(topic)
            ),
            [fact] => format!("Sobre '{topic}': {fact}"),
            facts => {
                let lines: Vec<String> = facts.iter().map(|f| format!("- {f}")).collect();
                format!("Sobre '{topic}', eu sei que:\n{}", lines.join("\n"))
            }
        };

        Reply::new(
            text,
            Intent::Question {
                kind,
                topic: topic.to_string(),
                answered,
            },
        )
    }

    fn lookup_question(&self, store: &KnowledgeStore, composed: &str, topic: &str) -> Vec<String> {
        let owned = |facts: Vec<&str>| facts.into_iter().map(str::to_string).collect::<Vec<_>>();

        let facts = store.facts_for(composed);
        if !facts.is_empty() {
            return owned(facts);
        }
        let facts = store.facts_for(topic);
        if !facts.is_empty() {
            return owned(facts);
        }

        if store.embedder().is_none() {
            return Vec::new();
        }
        let k = self.retrieval.config().semantic_top_k;
        match self.retrieval.semantic_search(store, composed, k) {
            Ok(results) => results
                .into_iter()
                .filter(|r| r.score > 0.0)
                .map(|r| r.text)
                .collect(),
            Err(e) => {
                debug!(error = %e, "semantic lookup skipped");
                Vec::new()
            }
        }
    }

    /// Retrieval, then entities, then known words, then filler.
    pub(super) fn fall_back(
        &mut self,
        store: &KnowledgeStore,
        utterance: &str,
        tokens: &[String],
        entities: Vec<Entity>,
    ) -> Reply {
        let results = self.retrieval.search(store, utterance);
        if !results.is_empty() {
            return self.format_results(results);
        }

        if let Some(first) = entities.first() {
            let hint = self.teach_hint(Topic::new(&first.span).as_str());
            let spans: Vec<String> = entities.into_iter().map(|e| e.span).collect();
            let text = format!(
                "Entendi que você falou sobre {}, mas ainda não sei nada sobre isso. Pode me ensinar? Use: {hint}",
                spans.join(", ")
            );
            self.context.last_entities = spans.clone();
            return Reply::new(text, Intent::Entities(spans));
        }

        let mut known: Vec<String> = Vec::new();
        for token in tokens {
            if store.is_known_word(token) && !known.contains(token) {
                known.push(token.clone());
            }
        }
        if let Some(first) = known.first() {
            let text = format!(
                "Reconheço as palavras: {}. Pode me ensinar mais? Use: {}",
                known.join(", "),
                self.teach_hint(first)
            );
            return Reply::new(text, Intent::KnownWords(known));
        }

        let text = self
            .picker
            .pick(&self.config.fillers)
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILLER.to_string());
        Reply::new(text, Intent::Filler)
    }

    /// One result as a sentence; several as a numbered list with an optional
    /// follow-up suggestion.
    fn format_results(&self, results: Vec<ScoredFact>) -> Reply {
        let text = match results.as_slice() {
            [single] => format!("Eu encontrei algo sobre isso: {}", single.text),
            many => {
                let lines: Vec<String> = many
                    .iter()
                    .enumerate()
                    .map(|(i, r)| format!("{}. {}", i + 1, r.text))
                    .collect();
                let mut text = format!("Eu encontrei algumas coisas sobre isso:\n{}", lines.join("\n"));
                if let Some(follow_up) = self.context.follow_up_questions.first() {
                    text.push_str("\n\n");
                    text.push_str(follow_up);
                }
                text
            }
        };
        Reply::new(text, Intent::Retrieval { results })
    }
}
