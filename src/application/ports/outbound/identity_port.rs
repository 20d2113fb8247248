//! Identity port - Who is signed in, and the sign-in lifecycle
//!
//! Authentication itself belongs to the identity provider. The application
//! only needs the current account and the transitions between signed-out and
//! signed-in, which gate where campaigns are persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::AccountId;

/// A signed-in account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Language used for user-facing authentication messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt-br")]
    BrazilianPortuguese,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::English),
            "pt" | "pt-br" => Ok(Locale::BrazilianPortuguese),
            other => Err(format!("Unknown locale '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailInUse,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("User not found")]
    UserNotFound,
    #[error("Wrong password")]
    WrongPassword,
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("Too many failed attempts")]
    TooManyRequests,
    #[error("Identity backend error: {0}")]
    Backend(String),
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailInUse => "auth/email-already-in-use",
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::WeakPassword(_) => "auth/weak-password",
            AuthError::TooManyRequests => "auth/too-many-requests",
            AuthError::Backend(_) => "auth/backend-error",
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self, locale: Locale) -> String {
        match locale {
            Locale::English => match self {
                AuthError::EmailInUse => "This email is already in use".to_string(),
                AuthError::InvalidEmail => "Invalid email".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::WrongPassword => "Wrong password".to_string(),
                AuthError::WeakPassword(min) => {
                    format!("Password must be at least {} characters", min)
                }
                AuthError::TooManyRequests => {
                    "Too many attempts. Try again later.".to_string()
                }
                AuthError::Backend(_) => "Authentication failed".to_string(),
            },
            Locale::BrazilianPortuguese => match self {
                AuthError::EmailInUse => "Este email já está em uso".to_string(),
                AuthError::InvalidEmail => "Email inválido".to_string(),
                AuthError::UserNotFound => "Usuário não encontrado".to_string(),
                AuthError::WrongPassword => "Senha incorreta".to_string(),
                AuthError::WeakPassword(min) => {
                    format!("A senha deve ter pelo menos {} caracteres", min)
                }
                AuthError::TooManyRequests => {
                    "Muitas tentativas. Tente novamente mais tarde.".to_string()
                }
                AuthError::Backend(_) => "Erro ao autenticar".to_string(),
            },
        }
    }
}

#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// The signed-in account, if any
    async fn current_account(&self) -> Option<Account>;

    /// Create an account and sign in as it
    async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Account, AuthError>;

    /// Sign in with email and password
    async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// Sign out; a no-op when nobody is signed in
    async fn logout(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_localized() {
        let err = AuthError::WeakPassword(6);
        assert_eq!(
            err.user_message(Locale::BrazilianPortuguese),
            "A senha deve ter pelo menos 6 caracteres"
        );
        assert_eq!(
            err.user_message(Locale::English),
            "Password must be at least 6 characters"
        );
        assert_eq!(err.code(), "auth/weak-password");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::BrazilianPortuguese);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::English);
        assert!("fr".parse::<Locale>().is_err());
    }
}
