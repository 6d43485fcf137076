//! End-to-end conversations against a knowledge file on disk.

use dialogue_core::{
    ChatSession, CommandAction, DialogueConfig, Intent, IntentDispatcher, QuestionKind,
    ResponsePicker,
};
use knowledge_store::{JsonFileStorage, KnowledgeStore};
use tempfile::TempDir;

fn open(dir: &TempDir) -> ChatSession {
    let store = KnowledgeStore::open(JsonFileStorage::new(dir.path().join("knowledge.json")));
    let dispatcher = IntentDispatcher::with_defaults()
        .unwrap()
        .with_picker(ResponsePicker::seeded(11));
    ChatSession::new(store.into(), dispatcher)
}

#[test]
fn test_teach_then_ask() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(&dir);

    let reply = session.respond("aprender: gato = animal doméstico comum");
    assert_eq!(reply.intent, Intent::Command(CommandAction::Teach));

    let reply = session.respond("o que é gato?");
    assert!(reply.text.contains("animal doméstico comum"));

    let reply = session.respond("gato");
    assert_eq!(reply.text, "Eu encontrei algo sobre isso: animal doméstico comum");
}

#[test]
fn test_untaught_question_prompts_for_teaching() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(&dir);

    let reply = session.respond("o que é sol");
    match &reply.intent {
        Intent::Question { kind, topic, answered } => {
            assert_eq!(*kind, QuestionKind::WhatIs);
            assert_eq!(topic, "sol");
            assert!(!answered);
        }
        other => panic!("unexpected intent {other:?}"),
    }
    assert!(reply.text.contains("aprender: sol = informação"));
}

#[test]
fn test_unknown_utterance_gets_filler() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(&dir);
    let fillers = DialogueConfig::default().fillers;

    let reply = session.respond("xyz ok");
    assert_eq!(reply.intent, Intent::Filler);
    assert!(fillers.contains(&reply.text));
}

#[test]
fn test_infer_command() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(&dir);

    session.respond("aprender: python = linguagem de alto nível dinâmica");
    let reply = session.respond("relacionar: python");
    for word in ["linguagem", "alto", "nível", "dinâmica"] {
        assert!(reply.text.contains(word), "missing {word}");
    }

    session.store().read(|store| {
        let related = store.infer_relationship("python");
        assert!(!related.iter().any(|w| w == "python"));
    });
}

#[test]
fn test_knowledge_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open(&dir);
        session.respond("aprender: sol = a estrela mais próxima");
        session.respond("oi");
    }

    let mut session = open(&dir);
    session.store().read(|store| {
        assert_eq!(store.facts_for("sol"), vec!["a estrela mais próxima"]);
        assert!(store.is_known_word("estrela"));
        assert_eq!(store.memory().history().len(), 2);
    });

    let reply = session.respond("o que é sol?");
    assert!(reply.text.contains("a estrela mais próxima"));
}

#[test]
fn test_greeting_and_farewell() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(&dir);
    let config = DialogueConfig::default();

    let reply = session.respond("olá");
    assert_eq!(reply.intent, Intent::Greeting);
    assert!(config.greeting_replies.contains(&reply.text));

    let reply = session.respond("boa noite");
    assert_eq!(reply.text, "Boa noite! Em que posso ajudar?");

    let reply = session.respond("adeus");
    assert_eq!(reply.intent, Intent::Farewell);
    assert!(config.farewell_replies.contains(&reply.text));
}

#[test]
fn test_corrupt_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("knowledge.json"), "{ not json").unwrap();

    let mut session = open(&dir);
    session.store().read(|store| assert!(store.all_topics().is_empty()));

    session.respond("aprender: lua = satélite natural da terra");
    let raw = std::fs::read_to_string(dir.path().join("knowledge.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["facts"]["lua"][0]["text"], "satélite natural da terra");
}

#[test]
fn test_session_open_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = DialogueConfig::from_toml_str(
        r#"
        [[commands]]
        prefix = "learn"
        action = "teach"
        "#,
    )
    .unwrap();

    let mut session = ChatSession::open(dir.path().join("kb.json"), config).unwrap();
    let reply = session.respond("learn: rust = a systems language");
    assert_eq!(reply.intent, Intent::Command(CommandAction::Teach));

    let reply = session.respond("what is rust?");
    assert!(reply.text.contains("a systems language"));
}
