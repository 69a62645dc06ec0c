//! Google People API directory adapter
//!
//! Lists, creates and deletes the signed-in user's contacts through People
//! API v1. Contacts backed by a Google profile carry the profile id and are
//! resolvable; address-book-only entries carry their contact source id.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use richchat_core::{AuthProvider, DirectoryProvider};
use richchat_domain::constants::{GOOGLE_MAX_CONNECTIONS, GOOGLE_PEOPLE_API_BASE};
use richchat_domain::{Contact, NewContact, Result, RichChatError, ServiceScope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::http::HttpClient;

const PERSON_FIELDS: &str = "names,photos,emailAddresses,metadata";

/// `DirectoryProvider` backed by Google Contacts
pub struct GooglePeopleDirectory {
    http: HttpClient,
    auth: Arc<dyn AuthProvider>,
    base_url: String,
}

impl GooglePeopleDirectory {
    /// Adapter against the public People API.
    pub fn new(http: HttpClient, auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_base_url(http, auth, GOOGLE_PEOPLE_API_BASE)
    }

    /// Adapter against another API root (e.g. a test server).
    pub fn with_base_url(
        http: HttpClient,
        auth: Arc<dyn AuthProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, auth, base_url }
    }

    async fn token(&self) -> Result<String> {
        self.auth.get_service_token(ServiceScope::Directory, false).await
    }
}

#[async_trait]
impl DirectoryProvider for GooglePeopleDirectory {
    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let token = self.token().await?;
        let url = format!("{}/people/me/connections", self.base_url);
        let page_size = GOOGLE_MAX_CONNECTIONS.to_string();

        let mut contacts = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        loop {
            let mut query = vec![("pageSize", page_size.as_str()), ("personFields", PERSON_FIELDS)];
            if let Some(page) = page_token.as_deref() {
                query.push(("pageToken", page));
            }
            let request = self.http.request(Method::GET, &url, &token).query(&query);
            let page: ConnectionsPage = self.http.send_json(request).await?;

            contacts.extend(page.connections.iter().filter_map(|person| {
                let contact = person.to_contact();
                if contact.is_none() {
                    warn!(resource = %person.resource_name, "Failed to get user ID for person");
                }
                contact
            }));

            match page.next_page_token {
                Some(next) if !next.is_empty() => {
                    if !seen_tokens.insert(next.clone()) {
                        warn!(page_token = %next, "Page token repeated, stopping pagination");
                        break;
                    }
                    page_token = Some(next);
                }
                _ => break,
            }
        }

        debug!(contacts = contacts.len(), "Listed Google contacts");
        Ok(contacts)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let token = self.token().await?;
        let body = CreateContactBody {
            email_addresses: vec![EmailAddress {
                value: contact.email.clone(),
                display_name: contact.display_name.clone(),
            }],
            names: vec![Name {
                given_name: Some(contact.display_name.clone().unwrap_or_default()),
                display_name: None,
            }],
        };

        let url = format!("{}/people:createContact", self.base_url);
        let request = self.http.request(Method::POST, &url, &token).json(&body);
        let person: Person = self.http.send_json(request).await?;

        info!(resource = %person.resource_name, "Created Google contact");
        person.to_contact().ok_or_else(|| {
            RichChatError::ProviderUnavailable(
                "created contact has no metadata source".to_string(),
            )
        })
    }

    async fn delete_contact(&self, provider_ref: &str) -> Result<()> {
        let token = self.token().await?;
        let url = format!("{}/{}:deleteContact", self.base_url, provider_ref.trim_start_matches('/'));
        self.http.send(self.http.request(Method::DELETE, &url, &token)).await?;
        info!(resource = %provider_ref, "Deleted Google contact");
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/* People API wire types */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionsPage {
    #[serde(default)]
    connections: Vec<Person>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[serde(default)]
    resource_name: String,
    #[serde(default)]
    names: Vec<Name>,
    #[serde(default)]
    photos: Vec<Photo>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    metadata: Option<PersonMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonMetadata {
    #[serde(default)]
    sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "type")]
    kind: String,
    id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    given_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    #[serde(default)]
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContactBody {
    email_addresses: Vec<EmailAddress>,
    names: Vec<Name>,
}

impl Person {
    fn source_id(&self, kind: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .sources
            .iter()
            .find(|source| source.kind == kind)
            .and_then(|source| source.id.as_deref())
    }

    fn to_contact(&self) -> Option<Contact> {
        let profile_id = self.source_id("PROFILE");
        let user_id = profile_id.or_else(|| self.source_id("CONTACT"))?;
        let email = self.email_addresses.first().map(|address| address.value.clone());
        let display_name = self
            .names
            .first()
            .and_then(|name| name.display_name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| email.clone());

        Some(Contact {
            user_id: Some(user_id.to_string()),
            display_name,
            email,
            avatar_url: self.photos.first().and_then(|photo| photo.url.clone()),
            provider_ref: Some(self.resource_name.clone()),
            resolvable: profile_id.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(json: serde_json::Value) -> Person {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn profile_source_wins_and_is_resolvable() {
        let contact = person(serde_json::json!({
            "resourceName": "people/c1",
            "names": [{"displayName": "Ada"}],
            "emailAddresses": [{"value": "ada@example.com"}],
            "photos": [{"url": "https://img/ada"}],
            "metadata": {"sources": [
                {"type": "CONTACT", "id": "c1"},
                {"type": "PROFILE", "id": "1001"}
            ]}
        }))
        .to_contact()
        .unwrap();

        assert_eq!(contact.user_id.as_deref(), Some("1001"));
        assert!(contact.resolvable);
        assert_eq!(contact.avatar_url.as_deref(), Some("https://img/ada"));
        assert_eq!(contact.provider_ref.as_deref(), Some("people/c1"));
    }

    #[test]
    fn contact_only_entries_fall_back_to_email_name() {
        let contact = person(serde_json::json!({
            "resourceName": "people/c2",
            "emailAddresses": [{"value": "bob@example.com"}],
            "metadata": {"sources": [{"type": "CONTACT", "id": "c2"}]}
        }))
        .to_contact()
        .unwrap();

        assert_eq!(contact.user_id.as_deref(), Some("c2"));
        assert!(!contact.resolvable);
        assert_eq!(contact.display_name.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn person_without_sources_has_no_contact() {
        assert!(person(serde_json::json!({"resourceName": "people/x"})).to_contact().is_none());
    }
}
