use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use richchat_core::{ContactReconciler, DirectoryProvider, IdentityResolver, SessionContext};
use richchat_domain::{
    Contact, ContactsConfig, Identity, LocalUser, NewContact, Result as DomainResult,
    RichChatError, UserEventKind, UserInfo,
};

/// Resolvable contact with a display name and email derived from `id`.
pub fn contact(id: &str) -> Contact {
    Contact {
        user_id: Some(id.to_string()),
        display_name: Some(format!("User {id}")),
        email: Some(format!("{id}@example.com")),
        avatar_url: None,
        provider_ref: Some(format!("people/{id}")),
        resolvable: true,
    }
}

/// In-memory `DirectoryProvider`.
///
/// `create_contact` assigns the email as user id, matching the local
/// directory variant.
#[derive(Default)]
pub struct MockDirectory {
    contacts: Mutex<Vec<Contact>>,
    deleted: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl MockDirectory {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self { contacts: Mutex::new(contacts), ..Self::default() }
    }

    pub fn replace(&self, contacts: Vec<Contact>) {
        *self.contacts.lock().unwrap() = contacts;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn remote_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.contacts.lock().unwrap().iter().filter_map(|c| c.user_id.clone()).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DirectoryProvider for MockDirectory {
    async fn list_contacts(&self) -> DomainResult<Vec<Contact>> {
        // Suspend like a real network call would
        tokio::task::yield_now().await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RichChatError::ProviderUnavailable("directory offline".into()));
        }
        Ok(self.contacts.lock().unwrap().clone())
    }

    async fn create_contact(&self, new: NewContact) -> DomainResult<Contact> {
        let created = Contact {
            user_id: Some(new.email.clone()),
            display_name: new.display_name,
            email: Some(new.email.clone()),
            avatar_url: None,
            provider_ref: Some(format!("people/{}", new.email)),
            resolvable: true,
        };
        self.contacts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_contact(&self, provider_ref: &str) -> DomainResult<()> {
        self.contacts.lock().unwrap().retain(|c| c.provider_ref.as_deref() != Some(provider_ref));
        self.deleted.lock().unwrap().push(provider_ref.to_string());
        Ok(())
    }
}

/// `IdentityResolver` backed by a fixed map that records every call size.
#[derive(Default)]
pub struct MockResolver {
    known: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<usize>>,
    failing: AtomicBool,
}

impl MockResolver {
    /// Resolver that knows every id as `reg-{id}`.
    pub fn knowing(ids: &[&str]) -> Self {
        let resolver = Self::default();
        for id in ids {
            resolver.learn(id, &format!("reg-{id}"));
        }
        resolver
    }

    pub fn learn(&self, user_id: &str, registration_id: &str) {
        self.known.lock().unwrap().insert(user_id.to_string(), registration_id.to_string());
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Batch sizes of every call, sorted ascending.
    pub fn call_sizes(&self) -> Vec<usize> {
        let mut sizes = self.calls.lock().unwrap().clone();
        sizes.sort_unstable();
        sizes
    }
}

#[async_trait]
impl IdentityResolver for MockResolver {
    async fn resolve_identities(&self, user_ids: &[String]) -> DomainResult<Vec<Identity>> {
        self.calls.lock().unwrap().push(user_ids.len());
        if self.failing.load(Ordering::SeqCst) {
            return Err(RichChatError::ProviderUnavailable("resolver offline".into()));
        }
        let known = self.known.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| {
                known.get(id).map(|registration_id| Identity {
                    app_user_id: id.clone(),
                    registration_id: registration_id.clone(),
                })
            })
            .collect())
    }
}

/// Listener capturing every event the reconciler emits.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(UserEventKind, UserInfo)>>>,
}

impl EventLog {
    pub fn attach(&self, reconciler: &ContactReconciler) {
        for kind in [UserEventKind::Added, UserEventKind::Changed, UserEventKind::Removed] {
            let events = Arc::clone(&self.events);
            reconciler.add_event_listener(
                kind,
                Arc::new(move |user: &UserInfo| {
                    events.lock().unwrap().push((kind, user.clone()));
                    Ok(())
                }),
            );
        }
    }

    pub fn take(&self) -> Vec<(UserEventKind, UserInfo)> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn count(&self, kind: UserEventKind) -> usize {
        self.events.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }
}

pub fn session() -> Arc<SessionContext> {
    Arc::new(SessionContext::new(LocalUser {
        user_id: "local-user".into(),
        display_name: Some("Local User".into()),
        avatar_url: Some("https://img.example.com/me.png".into()),
        registration_id: Some("reg-local".into()),
        ..LocalUser::default()
    }))
}

/// Reconciler with an attached event log
pub struct ContactsHarness {
    pub directory: Arc<MockDirectory>,
    pub resolver: Arc<MockResolver>,
    pub reconciler: ContactReconciler,
    pub events: EventLog,
}

impl ContactsHarness {
    pub fn new(directory: MockDirectory, resolver: MockResolver) -> Self {
        let directory = Arc::new(directory);
        let resolver = Arc::new(resolver);
        let reconciler = ContactReconciler::new(
            directory.clone(),
            resolver.clone(),
            session(),
            ContactsConfig::default(),
        );
        let events = EventLog::default();
        events.attach(&reconciler);
        Self { directory, resolver, reconciler, events }
    }

    pub fn cached_ids(&self) -> Vec<String> {
        self.reconciler.users().into_iter().map(|u| u.user_id).collect()
    }
}
