//! Registry of conversations waiting for a human agent. Marking a
//! conversation pushes it onto the admin surface; the chat layer also sends
//! a delayed follow-up that checks this registry before firing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug)]
struct PriorityInfo {
    marked_at: DateTime<Utc>,
}

/// One entry on the admin listing, oldest waiters first.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PrioritizedConversation {
    pub conversation_id: String,
    pub wait_minutes: i64,
}

#[derive(Clone, Default)]
pub struct PriorityRegistry {
    inner: Arc<Mutex<HashMap<String, PriorityInfo>>>,
}

impl PriorityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, conversation_id: &str) {
        tracing::info!(conversation_id, "conversation flagged for human attention");
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(conversation_id.to_string(), PriorityInfo { marked_at: Utc::now() });
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(conversation_id)
    }

    /// Clears the flag, e.g. when the conversation ends or finalizes.
    pub fn remove(&self, conversation_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(conversation_id)
            .is_some()
    }

    pub fn list(&self) -> Vec<PrioritizedConversation> {
        let now = Utc::now();
        let mut entries: Vec<PrioritizedConversation> = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(conversation_id, info)| PrioritizedConversation {
                conversation_id: conversation_id.clone(),
                wait_minutes: now.signed_duration_since(info.marked_at).num_minutes(),
            })
            .collect();
        entries.sort_by(|a, b| b.wait_minutes.cmp(&a.wait_minutes));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::PriorityRegistry;

    #[test]
    fn mark_and_remove_round_trip() {
        let registry = PriorityRegistry::new();
        assert!(!registry.contains("a"));

        registry.mark("a");
        assert!(registry.contains("a"));
        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.list()[0].conversation_id, "a");

        assert!(registry.remove("a"));
        assert!(!registry.contains("a"));
        assert!(!registry.remove("a"));
    }

    #[test]
    fn remarking_refreshes_without_duplicating() {
        let registry = PriorityRegistry::new();
        registry.mark("a");
        registry.mark("a");
        assert_eq!(registry.list().len(), 1);
    }
}
