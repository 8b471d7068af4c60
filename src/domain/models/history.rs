#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use std::collections::VecDeque;

use super::Message;

pub const HISTORY_CAPACITY: usize = 50;

/// Bounded conversation log. Appending past capacity evicts the oldest
/// message first.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> HistoryStore {
        return HistoryStore::with_capacity(HISTORY_CAPACITY);
    }
}

impl HistoryStore {
    pub fn with_capacity(capacity: usize) -> HistoryStore {
        return HistoryStore {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        };
    }

    pub fn append(&mut self, message: Message) {
        if self.capacity == 0 {
            return;
        }

        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn snapshot(&self) -> Vec<Message> {
        return self.messages.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }
}
