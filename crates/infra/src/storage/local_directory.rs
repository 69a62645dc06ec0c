//! Contact directory persisted in a local key-value store
//!
//! Used with the mock identity provider. Each record is a JSON `UserInfo`
//! stored under `enc(local_user_id)+domain+enc(user_id)`, so several local
//! users and domains can share one store.

use std::sync::Arc;

use async_trait::async_trait;
use richchat_common::KeyValueStore;
use richchat_core::DirectoryProvider;
use richchat_domain::{Contact, NewContact, Result, RichChatError, UserInfo};
use tracing::{debug, warn};

use crate::errors::InfraError;

const KEY_SEPARATOR: char = '+';

pub struct LocalDirectory {
    store: Arc<dyn KeyValueStore>,
    owner: String,
    domain: String,
}

impl LocalDirectory {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        local_user_id: &str,
        domain: impl Into<String>,
    ) -> Self {
        Self { store, owner: urlencoding::encode(local_user_id).into_owned(), domain: domain.into() }
    }

    fn key(&self, user_id: &str) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.owner,
            self.domain,
            urlencoding::encode(user_id)
        )
    }

    fn owns(&self, key: &str) -> bool {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        parts.len() >= 3 && parts[0] == self.owner && parts[1] == self.domain
    }

    fn save(&self, user: &UserInfo) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(&self.key(&user.user_id), &json).map_err(|e| InfraError::from(e).into())
    }
}

fn to_contact(user: UserInfo) -> Contact {
    Contact {
        provider_ref: Some(user.user_id.clone()),
        user_id: Some(user.user_id),
        display_name: user.display_name,
        email: user.email,
        avatar_url: user.avatar_url,
        resolvable: true,
    }
}

#[async_trait]
impl DirectoryProvider for LocalDirectory {
    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let keys = self.store.keys().map_err(InfraError::from)?;

        let mut contacts = Vec::new();
        for key in keys.iter().filter(|key| self.owns(key)) {
            let Some(json) = self.store.get(key).map_err(InfraError::from)? else {
                continue;
            };
            match serde_json::from_str::<UserInfo>(&json) {
                Ok(user) => contacts.push(to_contact(user)),
                Err(err) => warn!(key = %key, error = %err, "Failed to get user from local storage"),
            }
        }

        debug!(contacts = contacts.len(), domain = %self.domain, "Listed stored contacts");
        Ok(contacts)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let user_id = contact.email.trim().to_string();
        if user_id.is_empty() {
            return Err(RichChatError::InvalidInput("Missing userId".to_string()));
        }

        let mut user = UserInfo::new(user_id.clone());
        user.display_name = contact.display_name;
        user.email = Some(user_id);
        self.save(&user)?;
        Ok(to_contact(user))
    }

    async fn delete_contact(&self, provider_ref: &str) -> Result<()> {
        self.store.remove(&self.key(provider_ref)).map_err(|e| InfraError::from(e).into())
    }
}
