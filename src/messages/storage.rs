use super::types::{Message, Turn};
use uuid::Uuid;

/// Append-only conversation log
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop everything and start over from a single message
    pub fn replace_with(&mut self, message: Message) {
        self.messages.clear();
        self.messages.push(message);
    }

    pub fn get(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Prior turns for the responder, without the welcome sentinel
    pub fn history(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .filter(|m| !m.is_welcome())
            .map(Message::to_turn)
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Role;

    #[test]
    fn test_history_skips_welcome() {
        let mut log = MessageLog::new();
        log.add(Message::welcome("hello"));
        log.add(Message::user("question"));
        log.add(Message::assistant("answer"));

        let history = log.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::new(Role::User, "question"));
        assert_eq!(history[1], Turn::new(Role::Assistant, "answer"));
    }

    #[test]
    fn test_replace_with() {
        let mut log = MessageLog::new();
        log.add(Message::user("a"));
        log.add(Message::assistant("b"));
        log.replace_with(Message::welcome("fresh"));

        assert_eq!(log.len(), 1);
        assert!(log.last().is_some_and(Message::is_welcome));
    }

    #[test]
    fn test_lookup_by_id() {
        let mut log = MessageLog::new();
        let msg = Message::assistant("find me");
        let id = msg.id;
        log.add(msg);

        assert_eq!(log.get(id).map(|m| m.text.as_str()), Some("find me"));
        assert!(log.get(Uuid::new_v4()).is_none());
    }
}
