//! Contact and user identity types
//!
//! `UserInfo` is the reconciled, locally cached view of a remote contact.
//! `Contact` is what a directory provider reports before reconciliation.

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Locally cached information about one contact
///
/// Equality is field-by-field, so two records built from the same remote data
/// compare equal regardless of how they were assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Stable external identity key
    pub user_id: String,
    /// Messaging backend registration id, once resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Opaque provider handle used to delete the contact remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
}

impl UserInfo {
    /// Create a record carrying only the identity key.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            registration_id: None,
            display_name: None,
            avatar_url: None,
            email: None,
            provider_ref: None,
        }
    }

    /// Build the cached record for a remote contact.
    ///
    /// Returns `None` when the contact has no user id. `placeholder_avatar`
    /// fills in for a missing avatar so that records built on different syncs
    /// stay comparable.
    #[must_use]
    pub fn from_contact(
        contact: &Contact,
        registration_id: Option<String>,
        placeholder_avatar: Option<&str>,
    ) -> Option<Self> {
        let user_id = contact.user_id.clone()?;
        let display_name = contact.display_name.clone().or_else(|| contact.email.clone());
        let avatar_url =
            contact.avatar_url.clone().or_else(|| placeholder_avatar.map(str::to_string));

        Some(Self {
            user_id,
            registration_id,
            display_name,
            avatar_url,
            email: contact.email.clone(),
            provider_ref: contact.provider_ref.clone(),
        })
    }

    /// Name to render: display name, then user id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.user_id)
    }
}

/// A contact as reported by a directory provider
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// External user id; `None` when the provider record has no usable source
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider_ref: Option<String>,
    /// Whether the user id can be sent to the identity resolver
    #[serde(default)]
    pub resolvable: bool,
}

/// Fields for creating a contact at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub email: String,
    pub display_name: Option<String>,
}

/// Result of resolving an external user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub app_user_id: String,
    pub registration_id: String,
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
}

/// Kind of cache change announced to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserEventKind {
    Added,
    Changed,
    Removed,
}

impl_domain_status_conversions!(UserEventKind {
    Added => "user_added",
    Changed => "user_changed",
    Removed => "user_removed",
});

/// A single cache change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    pub kind: UserEventKind,
    pub user: UserInfo,
}

impl UserEvent {
    #[must_use]
    pub fn new(kind: UserEventKind, user: UserInfo) -> Self {
        Self { kind, user }
    }
}
