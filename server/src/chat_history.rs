use common::proto::ChatMessage;
use ringbuffer::{AllocRingBuffer, RingBuffer};

/// Broadcast chat kept for replay to late joiners; oldest entries fall off.
pub struct ChatHistory {
    messages: AllocRingBuffer<ChatMessage>,
}

impl std::fmt::Debug for ChatHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHistory")
            .field("len", &self.messages.len())
            .finish()
    }
}

impl ChatHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: AllocRingBuffer::new(capacity.max(1)),
        }
    }

    pub fn record(&mut self, message: ChatMessage) {
        self.messages.enqueue(message);
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.to_vec()
    }
}

#[cfg(test)]
impl ChatHistory {
    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            speaker_label: String::new(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_snapshot_keeps_order() {
        let mut history = ChatHistory::new(10);
        history.record(message("one"));
        history.record(message("two"));

        let texts: Vec<String> = history.snapshot().into_iter().map(|m| m.text).collect();

        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_oldest_messages_are_dropped() {
        let mut history = ChatHistory::new(2);
        history.record(message("one"));
        history.record(message("two"));
        history.record(message("three"));

        let texts: Vec<String> = history.snapshot().into_iter().map(|m| m.text).collect();

        assert_eq!(history.len(), 2);
        assert_eq!(texts, vec!["two", "three"]);
    }
}
