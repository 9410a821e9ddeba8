use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Stored login credentials of a staff account.
///
/// `password_hash` is a one-way digest and never leaves the server.
#[derive(Clone)]
pub struct CredentialRecord {
    /// Unique account identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Normalised email, the login identifier
    pub email: String,
    /// Argon2 PHC string (or a legacy SHA-256 hex digest)
    pub password_hash: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Same record with its digest replaced wholesale
    pub fn with_password_hash(&self, password_hash: String) -> Self {
        Self {
            password_hash,
            ..self.clone()
        }
    }

    /// Public view of the account
    pub fn account(&self) -> Account {
        Account {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account details safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub name: String,
    pub email: String,
}

/// Canonical form of a login email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_digest() {
        let record = CredentialRecord::new(
            "Ana".to_string(),
            "ana@gym.test".to_string(),
            "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        );
        let rendered = format!("{:?}", record);
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("ana@gym.test"));
    }

    #[test]
    fn test_with_password_hash_keeps_identity() {
        let record = CredentialRecord::new("Ana".into(), "ana@gym.test".into(), "old".into());
        let replaced = record.with_password_hash("new".into());
        assert_eq!(replaced.id, record.id);
        assert_eq!(replaced.created_at, record.created_at);
        assert_eq!(replaced.password_hash, "new");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@B.Com "), "a@b.com");
    }
}
