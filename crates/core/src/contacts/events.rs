//! Listener registry for cache change events
//!
//! Listeners are registered per event kind and called synchronously in
//! registration order. A listener that returns an error or panics is logged
//! and skipped; the remaining listeners still run.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use richchat_domain::{UserEvent, UserEventKind, UserInfo};
use tracing::warn;
use uuid::Uuid;

/// Outcome a listener reports back
pub type ListenerResult = std::result::Result<(), Box<dyn Error + Send + Sync>>;

/// Callback receiving its own copy of the changed record
pub type UserListener = Arc<dyn Fn(&UserInfo) -> ListenerResult + Send + Sync>;

/// Token returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<UserEventKind, Vec<(ListenerId, UserListener)>>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`.
    ///
    /// Registering the same `Arc` twice for one kind is a no-op that returns
    /// the existing id.
    pub fn add(&self, kind: UserEventKind, listener: UserListener) -> ListenerId {
        let mut listeners = self.listeners.write();
        let entries = listeners.entry(kind).or_default();

        if let Some((id, _)) = entries.iter().find(|(_, existing)| Arc::ptr_eq(existing, &listener))
        {
            return *id;
        }

        let id = ListenerId(Uuid::new_v4());
        entries.push((id, listener));
        id
    }

    /// Unregister a listener. Returns whether it was registered for `kind`.
    pub fn remove(&self, kind: UserEventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        before != entries.len()
    }

    #[must_use]
    pub fn count(&self, kind: UserEventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver one event to every listener of its kind.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may register or unregister from inside the callback.
    pub fn emit(&self, event: &UserEvent) {
        let snapshot: Vec<(ListenerId, UserListener)> =
            self.listeners.read().get(&event.kind).cloned().unwrap_or_default();

        for (id, listener) in snapshot {
            let copy = event.user.clone();
            match panic::catch_unwind(AssertUnwindSafe(|| listener(&copy))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(listener = %id, event = %event.kind, error = %err, "Error while executing event listener");
                }
                Err(_) => {
                    warn!(listener = %id, event = %event.kind, "Event listener panicked");
                }
            }
        }
    }

    pub fn emit_all(&self, events: &[UserEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, UserListener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let listener: UserListener = Arc::new(move |_user: &UserInfo| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (hits, listener)
    }

    fn added(user_id: &str) -> UserEvent {
        UserEvent::new(UserEventKind::Added, UserInfo::new(user_id))
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let registry = ListenerRegistry::new();
        let (hits, listener) = counter();

        let first = registry.add(UserEventKind::Added, Arc::clone(&listener));
        let second = registry.add(UserEventKind::Added, listener);
        assert_eq!(first, second);

        registry.emit(&added("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_only_receive_their_kind() {
        let registry = ListenerRegistry::new();
        let (hits, listener) = counter();
        registry.add(UserEventKind::Removed, listener);

        registry.emit(&added("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_listeners_do_not_block_others() {
        let registry = ListenerRegistry::new();
        let (hits, listener) = counter();

        registry.add(UserEventKind::Added, Arc::new(|_: &UserInfo| Err("boom".into())));
        registry.add(UserEventKind::Added, Arc::new(|_: &UserInfo| panic!("listener bug")));
        registry.add(UserEventKind::Added, listener);

        registry.emit(&added("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let registry = ListenerRegistry::new();
        let (hits, listener) = counter();
        let id = registry.add(UserEventKind::Added, listener);

        assert!(registry.remove(UserEventKind::Added, id));
        assert!(!registry.remove(UserEventKind::Added, id));
        assert!(!registry.remove(UserEventKind::Changed, id));

        registry.emit(&added("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(registry.count(UserEventKind::Added), 0);
    }
}
