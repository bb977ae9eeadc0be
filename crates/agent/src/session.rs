use tableside_core::domain::order::TableId;

use crate::llm::{ChatMessage, ChatRole};

/// Oldest turns are dropped past this many messages so prompts stay bounded.
pub const DEFAULT_HISTORY_LIMIT: usize = 40;

/// Conversation state for one table.
#[derive(Clone, Debug)]
pub struct ChatSession {
    table_id: TableId,
    history: Vec<ChatMessage>,
    history_limit: usize,
}

impl ChatSession {
    pub fn new(table_id: TableId) -> Self {
        Self::with_history_limit(table_id, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(table_id: TableId, history_limit: usize) -> Self {
        Self { table_id, history: Vec::new(), history_limit: history_limit.max(2) }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
        self.trim();
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
        self.trim();
    }

    /// Drops a trailing user message that never got an answer.
    pub fn discard_unanswered(&mut self) {
        if self.history.last().map(|message| message.role) == Some(ChatRole::User) {
            self.history.pop();
        }
    }

    // The chat service expects the conversation to open with a user turn.
    fn trim(&mut self) {
        if self.history.len() <= self.history_limit {
            return;
        }
        let mut excess = self.history.len() - self.history_limit;
        while excess < self.history.len() && self.history[excess].role == ChatRole::Assistant {
            excess += 1;
        }
        self.history.drain(..excess);
    }
}
