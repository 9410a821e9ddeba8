//! Abstract storage interface for credential records

use async_trait::async_trait;

use crate::auth::user::CredentialRecord;
use crate::error::Result;

/// Credential record storage interface.
///
/// Emails passed in are already normalised.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Store a new record; fails with `AccountExists` if the email is taken
    async fn insert(&self, record: CredentialRecord) -> Result<()>;

    /// Look up a record by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>>;

    /// Replace an existing record wholesale (matched by id)
    async fn replace(&self, record: CredentialRecord) -> Result<()>;
}
