//! Intent dispatcher - routes one utterance to one reply.
//!
//! Evaluation is a single first-match-wins pass:
//!
//! 1. **Rule table**: command prefixes, greetings, farewells, question patterns
//! 2. **Retrieval**: ranked facts for the raw utterance
//! 3. **Entities**: acknowledge extracted entities and ask to be taught
//! 4. **Known words**: acknowledge recognized vocabulary
//! 5. **Filler**: a random configured phrase
//!
//! The dispatcher never fails a turn. Collaborator errors degrade to the
//! next strategy and storage errors are logged.

mod answers;
mod commands;
mod context;
mod picker;
mod rules;

pub use context::*;
pub use picker::*;
pub use rules::*;

use knowledge_store::{Entity, EntityExtractor, KeywordExtractor, KnowledgeStore};
use tracing::{debug, warn};

use crate::collaborators::{Calculator, CodeAnalyzer};
use crate::config::{CommandAction, DialogueConfig, QuestionKind};
use crate::error::DialogueResult;
use crate::retrieval::{RetrievalEngine, ScoredFact};

/// Which branch of the chain produced a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Command(CommandAction),
    Greeting,
    Farewell,
    Question {
        kind: QuestionKind,
        topic: String,
        answered: bool,
    },
    Retrieval {
        results: Vec<ScoredFact>,
    },
    Entities(Vec<String>),
    KnownWords(Vec<String>),
    Filler,
    Empty,
}

/// The outcome of one dispatched utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub intent: Intent,
}

impl Reply {
    pub fn new(text: impl Into<String>, intent: Intent) -> Self {
        Self {
            text: text.into(),
            intent,
        }
    }
}

/// The ordered rule chain plus its per-conversation context.
pub struct IntentDispatcher {
    config: DialogueConfig,
    rules: RuleTable,
    retrieval: RetrievalEngine,
    context: ConversationalContext,
    picker: ResponsePicker,
    entity_extractor: Option<Box<dyn EntityExtractor>>,
    calculator: Option<Box<dyn Calculator>>,
    code_analyzer: Option<Box<dyn CodeAnalyzer>>,
}

impl IntentDispatcher {
    /// Compile the rule table from configuration.
    pub fn new(config: DialogueConfig) -> DialogueResult<Self> {
        let rules = RuleTable::from_config(&config)?;
        Ok(Self {
            config,
            rules,
            retrieval: RetrievalEngine::with_defaults(),
            context: ConversationalContext::new(),
            picker: ResponsePicker::from_entropy(),
            entity_extractor: None,
            calculator: None,
            code_analyzer: None,
        })
    }

    /// Create a dispatcher with the default configuration.
    pub fn with_defaults() -> DialogueResult<Self> {
        Self::new(DialogueConfig::default())
    }

    /// Replace the random source used for greeting, farewell, and filler picks.
    pub fn with_picker(mut self, picker: ResponsePicker) -> Self {
        self.picker = picker;
        self
    }

    /// Use a named-entity extractor instead of the keyword fallback.
    pub fn with_entity_extractor(mut self, extractor: impl EntityExtractor + 'static) -> Self {
        self.entity_extractor = Some(Box::new(extractor));
        self
    }

    pub fn with_calculator(mut self, calculator: impl Calculator + 'static) -> Self {
        self.calculator = Some(Box::new(calculator));
        self
    }

    pub fn with_code_analyzer(mut self, analyzer: impl CodeAnalyzer + 'static) -> Self {
        self.code_analyzer = Some(Box::new(analyzer));
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalEngine) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// The context built for the most recent utterance.
    pub fn context(&self) -> &ConversationalContext {
        &self.context
    }

    /// Route one utterance through the chain.
    pub fn dispatch(&mut self, store: &mut KnowledgeStore, utterance: &str) -> Reply {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Reply::new(self.config.empty_message.clone(), Intent::Empty);
        }

        let tokens = store.tokens(utterance);
        let entities = self.extract_entities(utterance);
        self.context.refresh(
            store,
            &tokens,
            &entities,
            &self.config.follow_up_template,
            self.config.max_follow_ups,
        );

        let reply = match self.rules.first_match(utterance) {
            Some(RuleMatch::Command { action, argument }) => {
                self.run_command(store, action, &argument)
            }
            Some(RuleMatch::Greeting) => self.greet(store, utterance),
            Some(RuleMatch::Farewell) => self.farewell(),
            Some(RuleMatch::Question { kind, cue, topic }) => {
                self.answer_question(store, kind, &cue, &topic)
            }
            None => self.fall_back(store, utterance, &tokens, entities),
        };

        debug!(intent = ?reply.intent, "utterance dispatched");
        reply
    }

    /// Entities from the configured extractor, or keywords when it is
    /// absent or failing.
    fn extract_entities(&self, utterance: &str) -> Vec<Entity> {
        if let Some(extractor) = &self.entity_extractor {
            match extractor.extract(utterance) {
                Ok(entities) => return entities,
                Err(e) => warn!(error = %e, "entity extraction failed, using keywords"),
            }
        }
        KeywordExtractor.keywords(utterance)
    }

    /// The teach syntax shown in guidance messages, e.g. `aprender: sol = informação`.
    fn teach_hint(&self, topic: &str) -> String {
        let prefix = self
            .config
            .prefix_for(CommandAction::Teach)
            .unwrap_or("aprender");
        format!("{prefix}: {topic} = informação")
    }
}

impl std::fmt::Debug for IntentDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDispatcher")
            .field("rules", &self.rules.rules().len())
            .field("retrieval", &self.retrieval)
            .field("context", &self.context)
            .field("entity_extractor", &self.entity_extractor.is_some())
            .field("calculator", &self.calculator.is_some())
            .field("code_analyzer", &self.code_analyzer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge_store::{CollaboratorError, Embedder, MemoryStorage, Topic};

    struct FixedExtractor(Vec<Entity>);

    impl EntityExtractor for FixedExtractor {
        fn extract(&self, _text: &str) -> Result<Vec<Entity>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    /// Two features: cat words and star words.
    struct TopicEmbedder;

    impl Embedder for TopicEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
            let text = text.to_lowercase();
            let count = |words: &[&str]| words.iter().map(|w| text.matches(w).count()).sum::<usize>();
            Ok(vec![
                count(&["gato", "felino"]) as f32,
                count(&["sol", "estrela"]) as f32,
            ])
        }
    }

    struct OfflineExtractor;

    impl EntityExtractor for OfflineExtractor {
        fn extract(&self, _text: &str) -> Result<Vec<Entity>, CollaboratorError> {
            Err(CollaboratorError::new("entity extractor", "offline"))
        }
    }

    fn dispatcher() -> IntentDispatcher {
        IntentDispatcher::with_defaults()
            .unwrap()
            .with_picker(ResponsePicker::seeded(42))
    }

    fn store() -> KnowledgeStore {
        KnowledgeStore::open(MemoryStorage::new())
    }

    #[test]
    fn test_empty_utterance() {
        let mut store = store();
        let reply = dispatcher().dispatch(&mut store, "   ");
        assert_eq!(reply.intent, Intent::Empty);
        assert_eq!(reply.text, "Por favor, envie uma mensagem.");
    }

    #[test]
    fn test_teach_then_question() {
        let mut store = store();
        let mut dispatcher = dispatcher();

        let reply = dispatcher.dispatch(&mut store, "aprender: sol = a estrela do sistema solar");
        assert_eq!(reply.intent, Intent::Command(CommandAction::Teach));
        assert_eq!(store.facts_for("sol"), vec!["a estrela do sistema solar"]);

        let reply = dispatcher.dispatch(&mut store, "o que é sol?");
        assert_eq!(
            reply.intent,
            Intent::Question {
                kind: QuestionKind::WhatIs,
                topic: "sol".to_string(),
                answered: true,
            }
        );
        assert!(reply.text.contains("a estrela do sistema solar"));
    }

    #[test]
    fn test_untaught_question_names_teach_syntax() {
        let mut store = store();
        let reply = dispatcher().dispatch(&mut store, "o que é sol");
        assert_eq!(
            reply.intent,
            Intent::Question {
                kind: QuestionKind::WhatIs,
                topic: "sol".to_string(),
                answered: false,
            }
        );
        assert!(reply.text.contains("aprender: sol = informação"));
    }

    #[test]
    fn test_question_uses_composed_query_first() {
        let mut store = store();
        store.add_fact("como fazer pão", "misture farinha, água e fermento");
        store.add_fact("fazer pão", "é divertido");

        let reply = dispatcher().dispatch(&mut store, "como fazer pão?");
        assert!(reply.text.contains("misture farinha"));
        assert!(!reply.text.contains("divertido"));
    }

    #[test]
    fn test_question_falls_back_to_semantic_search() {
        let mut store = KnowledgeStore::open(MemoryStorage::new()).with_embedder(TopicEmbedder);
        store.add_fact("gato", "um felino pequeno");
        store.add_fact("lua", "a estrela da noite");

        // Neither "o que é felino" nor "felino" is a topic.
        let reply = dispatcher().dispatch(&mut store, "o que é felino?");
        assert_eq!(
            reply.intent,
            Intent::Question {
                kind: QuestionKind::WhatIs,
                topic: "felino".to_string(),
                answered: true,
            }
        );
        assert_eq!(reply.text, "Sobre 'felino': um felino pequeno");
    }

    #[test]
    fn test_question_without_semantic_match_is_unanswered() {
        let mut store = KnowledgeStore::open(MemoryStorage::new()).with_embedder(TopicEmbedder);
        store.add_fact("lua", "a estrela da noite");

        let reply = dispatcher().dispatch(&mut store, "o que é felino?");
        assert!(matches!(reply.intent, Intent::Question { answered: false, .. }));
        assert!(reply.text.contains("aprender: felino = informação"));
    }

    #[test]
    fn test_retrieval_fallback_single_result() {
        let mut store = store();
        store.add_fact("gato", "animal doméstico comum");

        let reply = dispatcher().dispatch(&mut store, "gato");
        assert!(matches!(reply.intent, Intent::Retrieval { ref results } if results.len() == 1));
        assert_eq!(reply.text, "Eu encontrei algo sobre isso: animal doméstico comum");
    }

    #[test]
    fn test_retrieval_fallback_lists_and_suggests() {
        let mut store = store();
        store.add_fact("python", "linguagem de alto nível dinâmica");
        store.add_fact("python", "criada por guido");

        let mut dispatcher = dispatcher();
        let reply = dispatcher.dispatch(&mut store, "python");
        assert!(reply.text.contains("1. linguagem de alto nível dinâmica"));
        assert!(reply.text.contains("2. criada por guido"));
        assert!(reply.text.contains("Quer saber mais sobre linguagem?"));
        assert_eq!(dispatcher.context().current_topic, Some(Topic::new("python")));
        assert_eq!(dispatcher.context().follow_up_questions.len(), 2);
    }

    #[test]
    fn test_entity_fallback() {
        let mut store = store();
        let mut dispatcher = dispatcher();

        let reply = dispatcher.dispatch(&mut store, "gosto de astronomia");
        assert_eq!(
            reply.intent,
            Intent::Entities(vec!["gosto".to_string(), "astronomia".to_string()])
        );
        assert!(reply.text.contains("aprender: gosto = informação"));
        assert_eq!(dispatcher.context().last_entities, vec!["gosto", "astronomia"]);
    }

    #[test]
    fn test_entity_extractor_is_used() {
        let mut store = store();
        let mut dispatcher = dispatcher()
            .with_entity_extractor(FixedExtractor(vec![Entity::new("Lisboa", "LOC")]));

        let reply = dispatcher.dispatch(&mut store, "estive em lisboa");
        assert_eq!(reply.intent, Intent::Entities(vec!["Lisboa".to_string()]));
    }

    #[test]
    fn test_failing_extractor_falls_back_to_keywords() {
        let mut store = store();
        let mut dispatcher = dispatcher().with_entity_extractor(OfflineExtractor);

        let reply = dispatcher.dispatch(&mut store, "estive em lisboa");
        assert_eq!(
            reply.intent,
            Intent::Entities(vec!["estive".to_string(), "lisboa".to_string()])
        );
    }

    #[test]
    fn test_known_words_tier() {
        let mut store = store();
        store.add_fact("céu", "sol");
        store.delete_fact("céu", "sol").unwrap();

        // "sol" stays in the vocabulary with no facts behind it, and is too
        // short to count as a keyword entity.
        let reply = dispatcher().dispatch(&mut store, "sol");
        assert_eq!(reply.intent, Intent::KnownWords(vec!["sol".to_string()]));
        assert!(reply.text.contains("sol"));
    }

    #[test]
    fn test_filler_membership() {
        let mut store = store();
        let config = DialogueConfig::default();
        let mut dispatcher = dispatcher();

        for _ in 0..5 {
            let reply = dispatcher.dispatch(&mut store, "xyz ok");
            assert_eq!(reply.intent, Intent::Filler);
            assert!(config.fillers.contains(&reply.text));
        }
    }

    #[test]
    fn test_greeting_and_farewell_membership() {
        let mut store = store();
        let config = DialogueConfig::default();
        let mut dispatcher = dispatcher();

        let reply = dispatcher.dispatch(&mut store, "Oi!");
        assert_eq!(reply.intent, Intent::Greeting);
        assert!(config.greeting_replies.contains(&reply.text));

        let reply = dispatcher.dispatch(&mut store, "tchau");
        assert_eq!(reply.intent, Intent::Farewell);
        assert!(config.farewell_replies.contains(&reply.text));
    }

    #[test]
    fn test_time_of_day_greeting() {
        let mut store = store();
        let reply = dispatcher().dispatch(&mut store, "bom dia, Sonho");
        assert_eq!(reply.text, "Bom dia! Como posso te ajudar nesta manhã?");
    }

    #[test]
    fn test_english_time_of_day_greeting() {
        let mut store = store();
        let reply = dispatcher().dispatch(&mut store, "good morning");
        assert_eq!(reply.intent, Intent::Greeting);
        assert_eq!(reply.text, "Good morning! How can I help?");
    }

    #[test]
    fn test_greeting_without_replies_uses_personality() {
        let mut store = store();
        let config = DialogueConfig {
            greeting_replies: Vec::new(),
            ..DialogueConfig::default()
        };
        let mut dispatcher = IntentDispatcher::new(config).unwrap();

        let reply = dispatcher.dispatch(&mut store, "olá");
        assert_eq!(reply.text, store.personality().greeting);
    }
}
