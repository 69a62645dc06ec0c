//! Local user cache with a reverse registration index

use std::collections::HashMap;

use richchat_domain::UserInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CacheEntry {
    pub info: UserInfo,
    /// Whether the user id may be sent to the identity resolver
    pub resolvable: bool,
}

/// `user_id -> UserInfo` plus `registration_id -> user_id`
///
/// The reverse index holds at most one entry per registration id. Assigning a
/// registration id to a second user overwrites the first mapping.
#[derive(Debug, Default)]
pub(crate) struct UserCache {
    users: HashMap<String, CacheEntry>,
    by_registration: HashMap<String, String>,
}

impl UserCache {
    pub fn get(&self, user_id: &str) -> Option<&CacheEntry> {
        self.users.get(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn by_registration(&self, registration_id: &str) -> Option<&UserInfo> {
        self.by_registration
            .get(registration_id)
            .and_then(|user_id| self.users.get(user_id))
            .map(|entry| &entry.info)
    }

    /// Cached user whose id equals `user_id` ignoring ASCII case.
    pub fn find_ignore_case(&self, user_id: &str) -> Option<&UserInfo> {
        self.users.get(user_id).map(|entry| &entry.info).or_else(|| {
            self.values().find(|info| info.user_id.eq_ignore_ascii_case(user_id))
        })
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &UserInfo> {
        self.users.values().map(|entry| &entry.info)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Insert or replace a record, keeping the reverse index consistent.
    pub fn insert(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        let user_id = entry.info.user_id.clone();
        let previous = self.users.remove(&user_id);
        if let Some(old) = &previous {
            self.unlink(old);
        }
        if let Some(registration_id) = &entry.info.registration_id {
            self.by_registration.insert(registration_id.clone(), user_id.clone());
        }
        self.users.insert(user_id, entry);
        previous
    }

    pub fn remove(&mut self, user_id: &str) -> Option<CacheEntry> {
        let removed = self.users.remove(user_id)?;
        self.unlink(&removed);
        Some(removed)
    }

    /// Record a resolved registration id.
    ///
    /// Returns the updated record when something changed, `None` when the
    /// user is unknown or already carries this registration id.
    pub fn assign_registration(&mut self, user_id: &str, registration_id: String) -> Option<UserInfo> {
        let current = self.users.get(user_id)?;
        if current.info.registration_id.as_deref() == Some(registration_id.as_str()) {
            return None;
        }
        let mut entry = current.clone();
        entry.info.registration_id = Some(registration_id);
        let updated = entry.info.clone();
        self.insert(entry);
        Some(updated)
    }

    fn unlink(&mut self, entry: &CacheEntry) {
        if let Some(registration_id) = &entry.info.registration_id {
            if self.by_registration.get(registration_id) == Some(&entry.info.user_id) {
                self.by_registration.remove(registration_id);
            }
        }
    }
}
