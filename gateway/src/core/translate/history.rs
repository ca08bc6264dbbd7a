use std::collections::VecDeque;

use crate::core::llm::anthropic::MessageParam;

/// Maximum number of records kept in the shared history.
pub const MAX_HISTORY_ENTRIES: usize = 128;

/// Bounded, chronologically ordered conversation history.
///
/// Records are only ever added in user/assistant pairs, and the oldest
/// records are evicted first once the cap is exceeded.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    entries: VecDeque<MessageParam>,
    capacity: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 2),
            capacity,
        }
    }

    /// Append one user record and one assistant record, then evict from the front.
    pub fn append_exchange(&mut self, user: MessageParam, assistant: MessageParam) {
        self.entries.push_back(user);
        self.entries.push_back(assistant);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Copy of the current records, oldest first.
    pub fn snapshot(&self) -> Vec<MessageParam> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::anthropic::Role;

    fn text_of(record: &MessageParam) -> &str {
        record.content[0].as_text().unwrap()
    }

    #[test]
    fn test_append_adds_pair() {
        let mut history = ConversationHistory::new();
        history.append_exchange(
            MessageParam::user_text("Hello --> French"),
            MessageParam::assistant_text("Bonjour"),
        );

        let records = history.snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, Role::User);
        assert_eq!(records[1].role, Role::Assistant);
    }

    #[test]
    fn test_cap_keeps_most_recent_in_order() {
        let mut history = ConversationHistory::new();
        for i in 0..100 {
            history.append_exchange(
                MessageParam::user_text(format!("u{i}")),
                MessageParam::assistant_text(format!("a{i}")),
            );
            assert!(history.len() <= MAX_HISTORY_ENTRIES);
        }

        let records = history.snapshot();
        assert_eq!(records.len(), MAX_HISTORY_ENTRIES);
        // 100 exchanges = 200 records, the first 72 records (36 exchanges) evicted
        assert_eq!(text_of(&records[0]), "u36");
        assert_eq!(text_of(&records[1]), "a36");
        assert_eq!(text_of(records.last().unwrap()), "a99");

        for pair in records.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    #[test]
    fn test_small_capacity() {
        let mut history = ConversationHistory::with_capacity(2);
        history.append_exchange(MessageParam::user_text("a"), MessageParam::assistant_text("b"));
        history.append_exchange(MessageParam::user_text("c"), MessageParam::assistant_text("d"));
        let records = history.snapshot();
        assert_eq!(text_of(&records[0]), "c");
        assert_eq!(text_of(&records[1]), "d");
    }
}
