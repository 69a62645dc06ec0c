//! Contact reconciliation service - converges the local cache to the directory

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use richchat_domain::{
    Contact, ContactsConfig, LocalUser, NewContact, Result, RichChatError, UserEvent,
    UserEventKind, UserInfo,
};
use tracing::{debug, info, warn};

use super::batch::resolve_in_batches;
use super::cache::{CacheEntry, UserCache};
use super::events::{ListenerId, ListenerRegistry, UserListener};
use super::ports::{DirectoryProvider, IdentityResolver};
use crate::session::SessionContext;

/// Keeps a `user_id -> UserInfo` cache in step with a remote directory
///
/// Events for one call are emitted after the cache lock is released. Calls to
/// [`sync_users`](Self::sync_users) must be serialized by the caller.
pub struct ContactReconciler {
    directory: Arc<dyn DirectoryProvider>,
    resolver: Arc<dyn IdentityResolver>,
    session: Arc<SessionContext>,
    settings: ContactsConfig,
    cache: RwLock<UserCache>,
    listeners: ListenerRegistry,
    initializing: AtomicBool,
}

/// Clears the in-flight flag on every exit path of `initialize`
struct InitializingGuard<'a>(&'a AtomicBool);

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ContactReconciler {
    pub fn new(
        directory: Arc<dyn DirectoryProvider>,
        resolver: Arc<dyn IdentityResolver>,
        session: Arc<SessionContext>,
        settings: ContactsConfig,
    ) -> Self {
        Self {
            directory,
            resolver,
            session,
            settings,
            cache: RwLock::new(UserCache::default()),
            listeners: ListenerRegistry::new(),
            initializing: AtomicBool::new(false),
        }
    }

    /// Load the full remote set, announce every record as added, then
    /// resolve registration ids.
    ///
    /// Remote records replace any existing cache entry with the same id.
    ///
    /// # Errors
    /// - `InvalidState` if another `initialize` is in flight
    /// - `ProviderUnavailable` if the directory cannot be listed; the cache
    ///   is left untouched
    pub async fn initialize(&self) -> Result<()> {
        if self.initializing.swap(true, Ordering::AcqRel) {
            return Err(RichChatError::InvalidState(
                "contact initialization already in progress".to_string(),
            ));
        }
        let _guard = InitializingGuard(&self.initializing);

        let remote = self.fetch_remote().await?;
        let mut events = Vec::with_capacity(remote.len());
        let mut pending = Vec::new();
        {
            let mut cache = self.cache.write();
            for entry in remote {
                if entry.resolvable {
                    pending.push(entry.info.user_id.clone());
                }
                events.push(UserEvent::new(UserEventKind::Added, entry.info.clone()));
                cache.insert(entry);
            }
        }

        info!(contacts = events.len(), "Contact cache initialized");
        self.listeners.emit_all(&events);
        self.resolve_pending(pending).await;
        Ok(())
    }

    /// Diff the remote set against the cache.
    ///
    /// Removals are applied first, then changes (registration ids carry
    /// forward), then additions. All of those events are emitted before any
    /// resolution event.
    ///
    /// # Errors
    /// Returns `ProviderUnavailable` if the directory cannot be listed; the
    /// cache is left untouched.
    pub async fn sync_users(&self) -> Result<()> {
        let remote = self.fetch_remote().await?;
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let cached = {
            let mut cache = self.cache.write();

            let stale_ids: Vec<String> = {
                let remote_ids: HashSet<&str> =
                    remote.iter().map(|entry| entry.info.user_id.as_str()).collect();
                cache
                    .user_ids()
                    .into_iter()
                    .filter(|user_id| !remote_ids.contains(user_id.as_str()))
                    .collect()
            };
            for user_id in stale_ids {
                if let Some(stale) = cache.remove(&user_id) {
                    events.push(UserEvent::new(UserEventKind::Removed, stale.info));
                }
            }

            let mut added = Vec::new();
            for mut entry in remote {
                let Some(existing) = cache.get(&entry.info.user_id) else {
                    added.push(entry);
                    continue;
                };

                entry.info.registration_id.clone_from(&existing.info.registration_id);
                if entry.resolvable && entry.info.registration_id.is_none() {
                    pending.push(entry.info.user_id.clone());
                }
                if *existing != entry {
                    events.push(UserEvent::new(UserEventKind::Changed, entry.info.clone()));
                    cache.insert(entry);
                }
            }

            for entry in added {
                if entry.resolvable {
                    pending.push(entry.info.user_id.clone());
                }
                events.push(UserEvent::new(UserEventKind::Added, entry.info.clone()));
                cache.insert(entry);
            }
            cache.len()
        };

        debug!(cached, events = events.len(), unresolved = pending.len(), "Contacts synchronized");
        self.listeners.emit_all(&events);
        self.resolve_pending(pending).await;
        Ok(())
    }

    /// Create a contact at the provider, then cache and announce it.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty email
    /// - `DuplicateContact` if the id the provider assigns is already cached;
    ///   nothing is emitted. Providers that key contacts by email are
    ///   checked before the remote call.
    /// - provider errors from `create_contact`
    pub async fn add_user(&self, email: &str, display_name: Option<&str>) -> Result<UserInfo> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RichChatError::InvalidInput("email must not be empty".to_string()));
        }
        if let Some(existing) = self.cache.read().find_ignore_case(email) {
            return Err(RichChatError::DuplicateContact(existing.user_id.clone()));
        }

        let contact = self
            .directory
            .create_contact(NewContact {
                email: email.to_string(),
                display_name: display_name.map(str::to_string),
            })
            .await?;
        let entry = self.entry_for(&contact).ok_or_else(|| {
            RichChatError::ProviderUnavailable("created contact has no user id".to_string())
        })?;
        let user_id = entry.info.user_id.clone();
        let resolvable = entry.resolvable;

        let added = {
            let mut cache = self.cache.write();
            if cache.contains(&user_id) {
                return Err(RichChatError::DuplicateContact(user_id));
            }
            let added = entry.info.clone();
            cache.insert(entry);
            added
        };

        info!(user_id = %user_id, "Contact added");
        self.listeners.emit(&UserEvent::new(UserEventKind::Added, added.clone()));

        if !resolvable {
            return Ok(added);
        }
        self.resolve_pending(vec![user_id.clone()]).await;
        Ok(self.cache.read().get(&user_id).map_or(added, |entry| entry.info.clone()))
    }

    /// Delete a contact at the provider, then drop it from the cache.
    ///
    /// # Errors
    /// - `NotFound` if `user_id` is not cached
    /// - provider errors from `delete_contact`; the cache is left untouched
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let provider_ref = self
            .cache
            .read()
            .get(user_id)
            .map(|entry| entry.info.provider_ref.clone().unwrap_or_else(|| user_id.to_string()))
            .ok_or_else(|| RichChatError::NotFound(format!("contact {user_id}")))?;

        self.directory.delete_contact(&provider_ref).await?;

        let removed = self.cache.write().remove(user_id);
        if let Some(entry) = removed {
            info!(user_id = %user_id, "Contact deleted");
            self.listeners.emit(&UserEvent::new(UserEventKind::Removed, entry.info));
        }
        Ok(())
    }

    /// Name to render for a registration id.
    ///
    /// Falls back to the registration id itself when it is not resolved to a
    /// cached user.
    #[must_use]
    pub fn display_name(&self, registration_id: &str) -> String {
        if self.session.is_local(registration_id) {
            let local = self.session.local_user();
            return local.display_name.filter(|name| !name.is_empty()).unwrap_or(local.user_id);
        }
        self.cache
            .read()
            .by_registration(registration_id)
            .map_or_else(|| registration_id.to_string(), |info| info.label().to_string())
    }

    #[must_use]
    pub fn user_avatar(&self, registration_id: &str) -> Option<String> {
        if self.session.is_local(registration_id) {
            return self.session.local_user().avatar_url;
        }
        self.cache.read().by_registration(registration_id).and_then(|info| info.avatar_url.clone())
    }

    /// Cached record for a registration id.
    #[must_use]
    pub fn user(&self, registration_id: &str) -> Option<UserInfo> {
        self.cache.read().by_registration(registration_id).cloned()
    }

    /// Snapshot of every cached record, ordered by user id.
    #[must_use]
    pub fn users(&self) -> Vec<UserInfo> {
        let mut users: Vec<UserInfo> = self.cache.read().values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users
    }

    #[must_use]
    pub fn local_user(&self) -> LocalUser {
        self.session.local_user()
    }

    pub fn add_event_listener(&self, kind: UserEventKind, listener: UserListener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    pub fn remove_event_listener(&self, kind: UserEventKind, id: ListenerId) -> bool {
        self.listeners.remove(kind, id)
    }

    async fn fetch_remote(&self) -> Result<Vec<CacheEntry>> {
        let contacts = self.directory.list_contacts().await.map_err(|err| match err {
            RichChatError::ProviderUnavailable(_) => err,
            other if other.is_auth_failure() => other,
            other => RichChatError::ProviderUnavailable(other.to_string()),
        })?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(contacts.len());
        for contact in &contacts {
            let Some(entry) = self.entry_for(contact) else {
                warn!(provider_ref = ?contact.provider_ref, "Skipping contact without user id");
                continue;
            };
            if !seen.insert(entry.info.user_id.clone()) {
                debug!(user_id = %entry.info.user_id, "Ignoring duplicate remote contact");
                continue;
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    fn entry_for(&self, contact: &Contact) -> Option<CacheEntry> {
        let placeholder = self.settings.placeholder_avatar_url.as_deref();
        UserInfo::from_contact(contact, None, placeholder)
            .map(|info| CacheEntry { info, resolvable: contact.resolvable })
    }

    async fn resolve_pending(&self, user_ids: Vec<String>) {
        if user_ids.is_empty() {
            return;
        }

        let identities = resolve_in_batches(
            self.resolver.as_ref(),
            &user_ids,
            self.settings.resolve_batch_size,
        )
        .await;

        let events: Vec<UserEvent> = {
            let mut cache = self.cache.write();
            identities
                .into_iter()
                .filter_map(|identity| {
                    cache.assign_registration(&identity.app_user_id, identity.registration_id)
                })
                .map(|user| UserEvent::new(UserEventKind::Changed, user))
                .collect()
        };

        debug!(requested = user_ids.len(), resolved = events.len(), "Registration ids resolved");
        self.listeners.emit_all(&events);
    }
}
