use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopdesk_core::ChatMessage;

pub type AppendObserver = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Append-only transcript for one session. Insertion order is display order.
#[derive(Default)]
pub struct ConversationStore {
    messages: Mutex<Vec<ChatMessage>>,
    observers: Mutex<Vec<AppendObserver>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observers run synchronously after the message is visible through `all`.
    /// No store lock is held while they run, so they may read, append or subscribe.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        lock(&self.observers).push(Arc::new(observer));
    }

    pub fn append(&self, message: ChatMessage) {
        lock(&self.messages).push(message.clone());

        let observers: Vec<AppendObserver> = lock(&self.observers).clone();
        for observer in &observers {
            observer(&message);
        }
    }

    pub fn all(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        lock(&self.messages).last().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.messages).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.messages).is_empty()
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("messages", &self.len())
            .field("observers", &lock(&self.observers).len())
            .finish()
    }
}

// A panicking observer must not wedge the transcript.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use shopdesk_core::{ChatMessage, Role};

    use super::ConversationStore;

    #[test]
    fn append_preserves_insertion_order() {
        let store = ConversationStore::new();
        assert!(store.is_empty());

        store.append(ChatMessage::user("first"));
        store.append(ChatMessage::assistant("second", Vec::new()));
        store.append(ChatMessage::user("third"));

        let texts: Vec<String> =
            store.all().iter().map(|message| message.text().to_string()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.last().map(|message| message.role()), Some(Role::User));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_appends() {
        let store = ConversationStore::new();
        store.append(ChatMessage::user("hello"));

        let snapshot = store.all();
        store.append(ChatMessage::assistant("hi", Vec::new()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn observers_see_consistent_log_after_each_append() {
        let store = Arc::new(ConversationStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let observed_store = Arc::downgrade(&store);
        let observed = Arc::clone(&seen);
        store.subscribe(move |message| {
            let length = observed_store.upgrade().map(|store| store.len()).unwrap_or_default();
            observed.lock().expect("observer lock").push((message.text().to_string(), length));
        });

        store.append(ChatMessage::user("one"));
        store.append(ChatMessage::assistant("two", Vec::new()));

        let seen = seen.lock().expect("seen lock").clone();
        assert_eq!(seen, vec![("one".to_string(), 1), ("two".to_string(), 2)]);
    }

    #[test]
    fn observer_may_append_and_subscribe_without_deadlock() {
        let store = Arc::new(ConversationStore::new());

        let reentrant = Arc::downgrade(&store);
        store.subscribe(move |message| {
            let Some(store) = reentrant.upgrade() else {
                return;
            };
            if message.text() == "ping" {
                store.subscribe(|_| {});
                store.append(ChatMessage::assistant("pong", Vec::new()));
            }
        });

        store.append(ChatMessage::user("ping"));

        let texts: Vec<String> =
            store.all().iter().map(|message| message.text().to_string()).collect();
        assert_eq!(texts, vec!["ping", "pong"]);
        assert!(format!("{store:?}").contains("observers: 2"));
    }
}
