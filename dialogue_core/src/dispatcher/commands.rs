//! Command handlers. Malformed arguments produce guidance, never errors.

use knowledge_store::{KnowledgeStore, Topic};
use tracing::warn;

use super::{Intent, IntentDispatcher, Reply};
use crate::config::CommandAction;

/// Split `topic = information`, both sides trimmed and non-empty.
fn parse_assignment(argument: &str) -> Option<(Topic, &str)> {
    let (topic, info) = argument.split_once('=')?;
    let topic = Topic::new(topic);
    let info = info.trim();
    (!topic.is_empty() && !info.is_empty()).then_some((topic, info))
}

impl IntentDispatcher {
    pub(super) fn run_command(
        &self,
        store: &mut KnowledgeStore,
        action: CommandAction,
        argument: &str,
    ) -> Reply {
        let text = match action {
            CommandAction::Teach => self.teach(store, argument),
            CommandAction::Forget => self.forget(store, argument),
            CommandAction::Calculate => self.calculate(argument),
            CommandAction::Review => self.review(store),
            CommandAction::Infer => self.infer(store, argument),
            CommandAction::AnalyzeCode => self.analyze_code(argument),
        };
        Reply::new(text, Intent::Command(action))
    }

    /// `Formato inválido. Use: <prefix>: <usage>`
    fn usage(&self, action: CommandAction, default_prefix: &str, usage: &str) -> String {
        let prefix = self.config.prefix_for(action).unwrap_or(default_prefix);
        format!("Formato inválido. Use: {prefix}: {usage}")
    }

    fn teach(&self, store: &mut KnowledgeStore, argument: &str) -> String {
        let Some((topic, info)) = parse_assignment(argument) else {
            return self.usage(CommandAction::Teach, "aprender", "tópico = informação");
        };

        match store.teach(topic.as_str(), info) {
            Ok(true) => format!("Obrigado! Aprendi sobre '{topic}': {info}"),
            Ok(false) => format!("Eu já sabia disso sobre '{topic}'."),
            Err(e) => {
                warn!(topic = %topic, error = %e, "failed to save taught fact");
                format!("Aprendi sobre '{topic}', mas não consegui salvar agora.")
            }
        }
    }

    fn forget(&self, store: &mut KnowledgeStore, argument: &str) -> String {
        let Some((topic, info)) = parse_assignment(argument) else {
            return self.usage(CommandAction::Forget, "esquecer", "tópico = informação");
        };

        match store.delete_fact(topic.as_str(), info) {
            Ok(true) => format!("Pronto, esqueci isso sobre '{topic}'."),
            Ok(false) => format!("Não encontrei esse fato sobre '{topic}'."),
            Err(e) => {
                warn!(topic = %topic, error = %e, "failed to save after forgetting");
                format!("Esqueci isso sobre '{topic}', mas não consegui salvar agora.")
            }
        }
    }

    fn calculate(&self, expression: &str) -> String {
        if expression.is_empty() {
            return self.usage(CommandAction::Calculate, "calcular", "expressão");
        }
        let Some(calculator) = &self.calculator else {
            return "A calculadora não está disponível no momento.".to_string();
        };

        match calculator.evaluate(expression) {
            Ok(value) => format!("O resultado de {expression} é {value}"),
            Err(e) => {
                warn!(expression, error = %e, "calculation failed");
                format!("Não consegui calcular '{expression}'.")
            }
        }
    }

    fn review(&self, store: &KnowledgeStore) -> String {
        let stale = store.old_facts(self.config.review_limit);
        if stale.is_empty() {
            return format!(
                "Está tudo em dia! Conheço {} tópico(s) e nenhum precisa de revisão.",
                store.facts().topic_count()
            );
        }
        let topics: Vec<&str> = stale.iter().map(|t| t.as_str()).collect();
        format!("Que tal revisarmos: {}?", topics.join(", "))
    }

    fn infer(&self, store: &KnowledgeStore, topic: &str) -> String {
        let topic = Topic::new(topic);
        if topic.is_empty() {
            return self.usage(CommandAction::Infer, "relacionar", "tópico");
        }

        let related = store.infer_relationship(topic.as_str());
        if related.is_empty() {
            format!("Ainda não conheço relações para '{topic}'.")
        } else {
            format!("'{topic}' está relacionado a: {}", related.join(", "))
        }
    }

    fn analyze_code(&self, source: &str) -> String {
        if source.is_empty() {
            return self.usage(CommandAction::AnalyzeCode, "analisar código", "código");
        }
        let Some(analyzer) = &self.code_analyzer else {
            return "A análise de código não está disponível no momento.".to_string();
        };

        match analyzer.analyze(source) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "code analysis failed");
                "Não consegui analisar esse código.".to_string()
            }
        }
    }
}
