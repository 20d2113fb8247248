//! Local identity provider
//!
//! Accounts live in the SQLite `accounts` table with argon2 password hashes.
//! The engine serves a single companion client, so there is one signed-in
//! account per process.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::Row;
use tokio::sync::{Mutex, RwLock};

use crate::application::ports::outbound::{Account, AuthError, ClockPort, IdentityPort};
use crate::domain::value_objects::AccountId;
use crate::infrastructure::persistence::SqliteConnection;

pub const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_FAILED_ATTEMPTS: u32 = 5;
const LOCKOUT_MINUTES: i64 = 5;

#[derive(Debug, Default)]
struct FailedAttempts {
    count: u32,
    locked_until: Option<DateTime<Utc>>,
}

pub struct SqliteIdentityProvider {
    connection: SqliteConnection,
    clock: Arc<dyn ClockPort>,
    current: RwLock<Option<Account>>,
    /// Consecutive failed logins per normalized email
    failures: Mutex<HashMap<String, FailedAttempts>>,
}

impl SqliteIdentityProvider {
    pub fn new(connection: SqliteConnection, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            connection,
            clock,
            current: RwLock::new(None),
            failures: Mutex::new(HashMap::new()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<(Account, String)>, AuthError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, password_hash, created_at FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.connection.pool())
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(backend)?;
        let created_at: i64 = row.try_get("created_at").map_err(backend)?;
        let account = Account {
            id: AccountId::from(id),
            email: row.try_get("email").map_err(backend)?,
            display_name: row.try_get("display_name").map_err(backend)?,
            created_at: Utc
                .timestamp_millis_opt(created_at)
                .single()
                .unwrap_or_default(),
        };
        let hash: String = row.try_get("password_hash").map_err(backend)?;
        Ok(Some((account, hash)))
    }

    async fn check_lockout(&self, email: &str) -> Result<(), AuthError> {
        let now = self.clock.now();
        let mut failures = self.failures.lock().await;
        if let Some(attempts) = failures.get_mut(email) {
            match attempts.locked_until {
                Some(until) if until > now => return Err(AuthError::TooManyRequests),
                Some(_) => *attempts = FailedAttempts::default(),
                None => {}
            }
        }
        Ok(())
    }

    async fn record_failure(&self, email: &str) {
        let now = self.clock.now();
        let mut failures = self.failures.lock().await;
        let attempts = failures.entry(email.to_string()).or_default();
        attempts.count += 1;
        if attempts.count >= MAX_FAILED_ATTEMPTS {
            attempts.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
            tracing::warn!(email = %email, "Too many failed sign-ins, locking");
        }
    }

    async fn sign_in_as(&self, account: Account) -> Account {
        *self.current.write().await = Some(account.clone());
        account
    }
}

fn backend(e: impl std::fmt::Display) -> AuthError {
    AuthError::Backend(e.to_string())
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail)
    }
}

#[async_trait]
impl IdentityPort for SqliteIdentityProvider {
    async fn current_account(&self) -> Option<Account> {
        self.current.read().await.clone()
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Account, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
        }
        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(backend)?
            .to_string();

        let account = Account {
            id: AccountId::new(),
            email,
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            created_at: self.clock.now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO accounts (id, email, display_name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(hash)
        .bind(account.created_at.timestamp_millis())
        .execute(self.connection.pool())
        .await;

        match inserted {
            Ok(_) => {}
            // Lost a race with another signup for the same email
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AuthError::EmailInUse)
            }
            Err(e) => return Err(backend(e)),
        }

        tracing::info!(account = %account.id, "Account created");
        Ok(self.sign_in_as(account).await)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email)?;
        self.check_lockout(&email).await?;

        let (account, hash) = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let parsed = PasswordHash::new(&hash).map_err(backend)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            self.record_failure(&email).await;
            return Err(AuthError::WrongPassword);
        }

        self.failures.lock().await.remove(&email);
        tracing::info!(account = %account.id, "Signed in");
        Ok(self.sign_in_as(account).await)
    }

    async fn logout(&self) {
        if let Some(account) = self.current.write().await.take() {
            tracing::info!(account = %account.id, "Signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;

    async fn create_test_provider() -> SqliteIdentityProvider {
        let connection = SqliteConnection::in_memory().await.unwrap();
        connection.initialize_schema().await.unwrap();
        SqliteIdentityProvider::new(connection, Arc::new(FixedClock(Utc::now())))
    }

    #[tokio::test]
    async fn test_signup_signs_in() {
        let provider = create_test_provider().await;
        assert!(provider.current_account().await.is_none());

        let account = provider
            .signup(" Keeper@Example.com ", "secret1", Some("Keeper"))
            .await
            .unwrap();
        assert_eq!(account.email, "keeper@example.com");
        assert_eq!(account.display_name.as_deref(), Some("Keeper"));
        assert_eq!(provider.current_account().await, Some(account));

        provider.logout().await;
        assert!(provider.current_account().await.is_none());
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let provider = create_test_provider().await;
        assert!(matches!(
            provider.signup("keeper@example.com", "12345", None).await,
            Err(AuthError::WeakPassword(6))
        ));
        assert!(matches!(
            provider.signup("not-an-email", "123456", None).await,
            Err(AuthError::InvalidEmail)
        ));

        provider.signup("keeper@example.com", "123456", None).await.unwrap();
        assert!(matches!(
            provider.signup("KEEPER@example.com", "abcdef", None).await,
            Err(AuthError::EmailInUse)
        ));
    }

    #[tokio::test]
    async fn test_login() {
        let provider = create_test_provider().await;
        let created = provider.signup("keeper@example.com", "secret1", None).await.unwrap();
        provider.logout().await;

        assert!(matches!(
            provider.login("nobody@example.com", "secret1").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            provider.login("keeper@example.com", "wrong!").await,
            Err(AuthError::WrongPassword)
        ));
        assert!(provider.current_account().await.is_none());

        let account = provider.login("keeper@example.com", "secret1").await.unwrap();
        assert_eq!(account.id, created.id);
        assert_eq!(provider.current_account().await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_lockout_after_repeated_failures() {
        let provider = create_test_provider().await;
        provider.signup("keeper@example.com", "secret1", None).await.unwrap();

        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert!(matches!(
                provider.login("keeper@example.com", "wrong!").await,
                Err(AuthError::WrongPassword)
            ));
        }
        // Even the right password is refused while locked
        assert!(matches!(
            provider.login("keeper@example.com", "secret1").await,
            Err(AuthError::TooManyRequests)
        ));
    }
}
