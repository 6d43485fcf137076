//! A chat session - one dispatcher bound to one shared store.

use knowledge_store::{JsonFileStorage, KnowledgeStore, SharedKnowledgeStore};
use std::path::Path;
use tracing::{info, warn};

use crate::config::DialogueConfig;
use crate::dispatcher::{ConversationalContext, Intent, IntentDispatcher, Reply};
use crate::error::DialogueResult;

/// Runs complete turns: dispatch, then record and persist the exchange.
///
/// The store handle is shared, so several sessions may talk to the same
/// knowledge; each turn holds the write lock from dispatch to save.
#[derive(Debug)]
pub struct ChatSession {
    store: SharedKnowledgeStore,
    dispatcher: IntentDispatcher,
}

impl ChatSession {
    pub fn new(store: SharedKnowledgeStore, dispatcher: IntentDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Open a JSON knowledge file with the given dialogue configuration.
    pub fn open(path: impl AsRef<Path>, config: DialogueConfig) -> DialogueResult<Self> {
        let path = path.as_ref();
        let dispatcher = IntentDispatcher::new(config)?;
        let store = KnowledgeStore::open(JsonFileStorage::new(path));
        info!(path = %path.display(), topics = store.facts().topic_count(), "session opened");
        Ok(Self::new(store.into(), dispatcher))
    }

    /// Answer one utterance.
    ///
    /// Empty input is answered but not recorded. Failing to persist the
    /// turn is logged and the reply is still returned.
    pub fn respond(&mut self, utterance: &str) -> Reply {
        let dispatcher = &mut self.dispatcher;
        self.store.write(|store| {
            let reply = dispatcher.dispatch(store, utterance);
            if reply.intent == Intent::Empty {
                return reply;
            }
            if let Err(e) = store.record_conversation(utterance.trim(), &reply.text) {
                warn!(error = %e, "failed to record conversation turn");
            }
            reply
        })
    }

    /// Persist the document now.
    pub fn checkpoint(&self) -> DialogueResult<()> {
        self.store.write(|store| store.save())?;
        Ok(())
    }

    pub fn store(&self) -> &SharedKnowledgeStore {
        &self.store
    }

    pub fn context(&self) -> &ConversationalContext {
        self.dispatcher.context()
    }

    pub fn dispatcher(&self) -> &IntentDispatcher {
        &self.dispatcher
    }
}
