//! Registration and login
//!
//! Login is the only place a token is minted: the password is checked by the
//! credential store, then the token codec seals the account email.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::credential::PasswordHasher;
use crate::auth::token::TokenCodec;
use crate::auth::user::{normalize_email, Account, CredentialRecord};
use crate::constants::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
use crate::error::{GymGuardError, Result};
use crate::security::AuthTimer;
use crate::security_logger::{log_security_event, SecurityEvent};
use crate::storage::CredentialRepository;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: Account,
    pub token: String,
    /// UNIX seconds after which the token is rejected
    pub expires_at: u64,
}

/// Account registration and login against a credential repository
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn CredentialRepository>,
    hasher: Arc<PasswordHasher>,
    codec: Arc<TokenCodec>,
    min_auth_duration: Duration,
    // Verified against when the email is unknown so both paths cost one hash
    dummy_digest: Arc<str>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        hasher: Arc<PasswordHasher>,
        codec: Arc<TokenCodec>,
        min_auth_duration: Duration,
    ) -> Result<Self> {
        let dummy_digest = hasher.hash("gym-guard-dummy-password")?;
        Ok(Self {
            repository,
            hasher,
            codec,
            min_auth_duration,
            dummy_digest: dummy_digest.into(),
        })
    }

    /// Create a staff account
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let name = name.trim();
        let email = normalize_email(email);
        validate_registration(name, &email, password)?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        let record = CredentialRecord::new(name.to_string(), email, password_hash);
        let account = record.account();
        self.repository.insert(record).await?;

        log_security_event(&SecurityEvent::AccountRegistered {
            identity: account.email.clone(),
        });
        Ok(account)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let timer = AuthTimer::new(self.min_auth_duration);
        let result = self.check_credentials(email, password).await;
        timer.wait().await;
        result
    }

    async fn check_credentials(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email);
        let record = self.repository.find_by_email(&email).await?;

        if password.len() > MAX_PASSWORD_LEN {
            return Err(self.login_failed(&email, "password too long"));
        }

        let digest = match &record {
            Some(record) => record.password_hash.clone(),
            None => self.dummy_digest.to_string(),
        };
        let hasher = self.hasher.clone();
        let candidate = password.to_string();
        let verify_digest = digest.clone();
        let matched = run_blocking(move || hasher.verify(&candidate, &verify_digest)).await?;

        let record = match record {
            Some(record) if matched => record,
            Some(_) => return Err(self.login_failed(&email, "wrong password")),
            None => return Err(self.login_failed(&email, "unknown account")),
        };

        if self.hasher.needs_rehash(&digest) {
            self.upgrade_digest(&record, password).await;
        }

        let issued = self.codec.issue(&record.email)?;
        log_security_event(&SecurityEvent::AuthenticationSuccess {
            identity: record.email.clone(),
        });

        Ok(LoginOutcome {
            user: record.account(),
            token: issued.token,
            expires_at: issued.claims.expires_at,
        })
    }

    /// Replace a legacy or outdated digest; failure here never blocks login
    async fn upgrade_digest(&self, record: &CredentialRecord, password: &str) {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let rehashed = match run_blocking(move || hasher.hash(&password)).await {
            Ok(Ok(digest)) => digest,
            Ok(Err(e)) | Err(e) => {
                log::warn!("Could not rehash password for {}: {}", record.email, e);
                return;
            }
        };

        match self
            .repository
            .replace(record.with_password_hash(rehashed))
            .await
        {
            Ok(()) => log_security_event(&SecurityEvent::CredentialUpgraded {
                identity: record.email.clone(),
            }),
            Err(e) => log::warn!("Could not store rehashed password for {}: {}", record.email, e),
        }
    }

    fn login_failed(&self, email: &str, reason: &'static str) -> GymGuardError {
        log_security_event(&SecurityEvent::AuthenticationFailed {
            identity: email.to_string(),
            reason,
        });
        GymGuardError::CredentialMismatch
    }
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(GymGuardError::ValidationError(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }

    let plausible_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(|c| c.is_whitespace())
        }
        None => false,
    };
    if !plausible_email || email.len() > MAX_EMAIL_LEN {
        return Err(GymGuardError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }

    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(GymGuardError::ValidationError(format!(
            "Password must be between {} and {} bytes",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }

    Ok(())
}

/// Run CPU-heavy hashing off the async worker threads
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GymGuardError::SystemError(format!("Blocking task failed: {}", e)))
}
