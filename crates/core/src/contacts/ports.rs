//! Port interfaces for contact reconciliation

use async_trait::async_trait;
use richchat_domain::{Contact, Identity, NewContact, Result};

/// Remote address book the local cache converges to
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Current full contact list
    async fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// Create a contact and return it as the provider now reports it
    async fn create_contact(&self, contact: NewContact) -> Result<Contact>;

    /// Delete by the provider's own handle (`Contact::provider_ref`, or the
    /// user id when the provider has none)
    async fn delete_contact(&self, provider_ref: &str) -> Result<()>;
}

/// Maps external user ids to messaging registration ids
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve at most 50 ids per call. Unknown ids are simply absent from
    /// the result.
    async fn resolve_identities(&self, user_ids: &[String]) -> Result<Vec<Identity>>;
}
