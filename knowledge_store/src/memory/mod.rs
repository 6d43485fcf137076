//! Conversation memory - two independent bounded FIFO buffers.
//!
//! `history` is the long audit trail of turns; `context` is a short rolling
//! window the dispatcher scans each turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of turns kept in the history buffer.
pub const HISTORY_CAPACITY: usize = 100;

/// Maximum number of turns kept in the context buffer.
pub const CONTEXT_CAPACITY: usize = 10;

/// One exchange between the user and the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub ai: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    pub fn new(user: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ai: ai.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded conversation buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    #[serde(rename = "conversations", default)]
    history: VecDeque<ConversationTurn>,

    #[serde(rename = "conversation_memory", default)]
    context: VecDeque<ConversationTurn>,
}

impl ConversationMemory {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to both buffers, evicting the oldest entries on overflow.
    pub fn record(&mut self, turn: ConversationTurn) {
        self.context.push_back(turn.clone());
        self.history.push_back(turn);
        self.enforce_capacity();
    }

    /// Trim both buffers to their capacities, oldest first.
    pub fn enforce_capacity(&mut self) {
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
        while self.context.len() > CONTEXT_CAPACITY {
            self.context.pop_front();
        }
    }

    /// The full history, oldest first.
    pub fn history(&self) -> &VecDeque<ConversationTurn> {
        &self.history
    }

    /// The last `n` turns of history, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&ConversationTurn> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).collect()
    }

    /// The short-term context window, oldest first.
    pub fn context(&self) -> &VecDeque<ConversationTurn> {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(i: usize) -> ConversationTurn {
        ConversationTurn::new(format!("user {i}"), format!("ai {i}"))
    }

    #[test]
    fn test_record_appends_to_both() {
        let mut memory = ConversationMemory::new();
        memory.record(turn(1));

        assert_eq!(memory.history().len(), 1);
        assert_eq!(memory.context().len(), 1);
        assert_eq!(memory.history()[0].user, "user 1");
    }

    #[test]
    fn test_history_capacity() {
        let mut memory = ConversationMemory::new();
        for i in 1..=HISTORY_CAPACITY + 1 {
            memory.record(turn(i));
        }

        let history = memory.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.front().unwrap().user, "user 2");
        assert_eq!(history.back().unwrap().user, "user 101");
        assert!(history.iter().all(|t| t.user != "user 1"));
        for (offset, t) in history.iter().enumerate() {
            assert_eq!(t.user, format!("user {}", offset + 2));
        }
    }

    #[test]
    fn test_context_capacity_independent() {
        let mut memory = ConversationMemory::new();
        for i in 1..=15 {
            memory.record(turn(i));
        }

        assert_eq!(memory.context().len(), CONTEXT_CAPACITY);
        assert_eq!(memory.context().front().unwrap().user, "user 6");
        assert_eq!(memory.history().len(), 15);
    }

    #[test]
    fn test_recent() {
        let mut memory = ConversationMemory::new();
        for i in 1..=4 {
            memory.record(turn(i));
        }

        let recent: Vec<_> = memory.recent(2).iter().map(|t| t.user.as_str()).collect();
        assert_eq!(recent, vec!["user 3", "user 4"]);
        assert_eq!(memory.recent(10).len(), 4);
    }

    #[test]
    fn test_enforce_capacity_after_load() {
        let json = serde_json::json!({
            "conversations": (0..120)
                .map(|i| serde_json::to_value(turn(i)).unwrap())
                .collect::<Vec<_>>(),
            "conversation_memory": []
        });
        let mut memory: ConversationMemory = serde_json::from_value(json).unwrap();
        memory.enforce_capacity();

        assert_eq!(memory.history().len(), HISTORY_CAPACITY);
        assert_eq!(memory.history()[0].user, "user 20");
    }
}
