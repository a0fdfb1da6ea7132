//! In-memory conversation store. One map for the whole process; entries are
//! created lazily on first contact and removed on exit or finalize. Nothing
//! is persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::conversation::Conversation;

#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<HashMap<String, Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the conversation for `id`, creating it at `Start`
    /// with an empty order when absent. The closure runs under the map lock,
    /// which serializes transitions per key (and, coarsely, across keys).
    pub fn with<T>(&self, id: &str, f: impl FnOnce(&mut Conversation) -> T) -> T {
        let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let conversation =
            map.entry(id.to_string()).or_insert_with(|| Conversation::new(id.to_string()));
        f(conversation)
    }

    pub fn remove(&self, id: &str) -> Option<Conversation> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::conversation::DialogueState;

    use super::ConversationStore;

    #[test]
    fn conversations_are_created_lazily_and_reused() {
        let store = ConversationStore::new();
        assert!(!store.contains("a"));

        store.with("a", |conversation| {
            assert_eq!(conversation.state, DialogueState::Start);
            conversation.state = DialogueState::Menu;
        });
        assert!(store.contains("a"));

        store.with("a", |conversation| {
            assert_eq!(conversation.state, DialogueState::Menu);
        });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removal_resets_the_next_contact_to_start() {
        let store = ConversationStore::new();
        store.with("a", |conversation| {
            conversation.state = DialogueState::PaymentMethod;
            conversation.order.push_line("hamburguer-1".into(), "X".into(), 1, 1800);
        });

        assert!(store.remove("a").is_some());
        assert!(!store.contains("a"));

        store.with("a", |conversation| {
            assert_eq!(conversation.state, DialogueState::Start);
            assert!(conversation.order.is_empty());
        });
    }

    #[test]
    fn distinct_identities_do_not_share_state() {
        let store = ConversationStore::new();
        store.with("a", |conversation| conversation.state = DialogueState::Menu);
        store.with("b", |conversation| {
            assert_eq!(conversation.state, DialogueState::Start);
        });
        assert_eq!(store.len(), 2);
    }
}
