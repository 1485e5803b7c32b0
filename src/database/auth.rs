//! Credentials and login sessions.
//!
//! Passwords are never stored: a credential holds the SHA-512 of the password salted with
//! the email. A session token is 16 random bytes; only its SHA-512 is stored, together with
//! an expiry.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::{
    database::{Collection, DocumentStore, encode, find},
    error::AppError,
};

mod session;

pub use session::{Session, SessionClaims};

const MIN_PASSWORD_LEN: usize = 6;
const BAD_LOGIN: &str = "Incorrect password or account does not exist.";

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a credential. Fails if the email is malformed, taken, or the password too weak.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AppError>;

    /// Checks a credential without touching any session.
    async fn verify(&self, email: &str, password: &str) -> Result<(), AppError>;

    /// Opens a new session for a verified email, closing any earlier ones.
    async fn open_session(&self, email: &str) -> Result<Session, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.verify(email, password).await?;
        self.open_session(email).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), AppError>;

    /// Resolves a token to its owner, if the session exists and has not expired.
    async fn session(&self, token: &str) -> Result<Option<SessionClaims>, AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Credential {
    email: String,
    hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    id: String,
    session_hash: String,
    email: String,
    expiration: DateTime<Utc>,
}

fn create_hash(email: impl Into<Vec<u8>>, pass: impl Into<Vec<u8>>) -> String {
    let email = email.into();
    let pass = pass.into();

    let email_len = email.len();
    let first_half = &email[0..email_len / 2];
    let last_half = &email[email_len / 2..];

    let salted = [first_half, &pass[..], last_half].concat();
    BASE64_STANDARD.encode(Sha512::digest(salted))
}

fn session_hash(token: &str) -> Option<String> {
    let session_id = BASE64_STANDARD.decode(token).ok()?;
    Some(BASE64_STANDARD.encode(Sha512::digest(session_id)))
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Auth("Invalid email address.".into())),
    }
}

/// Keeps credentials and sessions in the document store.
pub struct StoreAuth {
    store: Arc<dyn DocumentStore>,
    session_lifetime: TimeDelta,
}

impl StoreAuth {
    pub fn new(store: Arc<dyn DocumentStore>, session_hours: i64) -> Self {
        Self {
            store,
            session_lifetime: TimeDelta::hours(session_hours),
        }
    }
}

#[async_trait]
impl AuthService for StoreAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AppError> {
        validate_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let existing: Vec<Credential> =
            find(self.store.as_ref(), Collection::Credentials, "email", email).await?;
        if !existing.is_empty() {
            return Err(AppError::Auth("Email already in use.".into()));
        }

        let credential = Credential {
            email: email.to_owned(),
            hash: create_hash(email, password),
        };
        self.store
            .insert(Collection::Credentials, encode(&credential)?)
            .await?;

        tracing::info!("Credential created for {email}");
        Ok(())
    }

    async fn verify(&self, email: &str, password: &str) -> Result<(), AppError> {
        let credentials: Vec<Credential> =
            find(self.store.as_ref(), Collection::Credentials, "email", email).await?;
        let hash = create_hash(email, password);

        if !credentials.iter().any(|c| c.hash == hash) {
            return Err(AppError::Auth(BAD_LOGIN.into()));
        }
        Ok(())
    }

    async fn open_session(&self, email: &str) -> Result<Session, AppError> {
        // Clear previous sessions
        let previous: Vec<SessionRecord> =
            find(self.store.as_ref(), Collection::Sessions, "email", email).await?;
        for session in previous {
            self.store.delete(Collection::Sessions, &session.id).await?;
        }

        let mut session_id = [0u8; 16];
        rand::fill(&mut session_id);

        let record = SessionRecord {
            id: String::new(),
            session_hash: BASE64_STANDARD.encode(Sha512::digest(session_id)),
            email: email.to_owned(),
            expiration: Utc::now() + self.session_lifetime,
        };
        self.store
            .insert(Collection::Sessions, encode(&record)?)
            .await?;

        tracing::info!("Logged in {email}");
        Ok(Session::new(session_id))
    }

    async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        let Some(hash) = session_hash(token) else {
            return Ok(());
        };

        let sessions: Vec<SessionRecord> =
            find(self.store.as_ref(), Collection::Sessions, "session_hash", hash).await?;
        for session in sessions {
            self.store.delete(Collection::Sessions, &session.id).await?;
            tracing::info!("Logged out {}", session.email);
        }
        Ok(())
    }

    async fn session(&self, token: &str) -> Result<Option<SessionClaims>, AppError> {
        let Some(hash) = session_hash(token) else {
            return Ok(None);
        };

        let sessions: Vec<SessionRecord> =
            find(self.store.as_ref(), Collection::Sessions, "session_hash", hash).await?;
        let Some(session) = sessions.into_iter().next() else {
            return Ok(None);
        };

        if Utc::now() > session.expiration {
            self.store.delete(Collection::Sessions, &session.id).await?;
            return Ok(None);
        }

        Ok(Some(SessionClaims {
            email: session.email,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use rstest::rstest;

    fn auth() -> StoreAuth {
        StoreAuth::new(Arc::new(MemoryStore::new()), 1)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_opens_a_session() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();

        let session = auth.sign_in("ada@x.com", "hunter22").await.unwrap();
        let claims = auth.session(&session.session_token).await.unwrap();

        assert_eq!(
            claims,
            Some(SessionClaims {
                email: "ada@x.com".into()
            })
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();

        let err = auth.sign_in("ada@x.com", "hunter23").await.unwrap_err();
        assert_eq!(err.to_string(), BAD_LOGIN);
    }

    #[tokio::test]
    async fn unknown_account_is_rejected_the_same_way() {
        let err = auth().sign_in("ghost@x.com", "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg == BAD_LOGIN));
    }

    #[tokio::test]
    async fn duplicate_sign_up_fails() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();
        let err = auth.sign_up("ada@x.com", "another1").await.unwrap_err();
        assert_eq!(err.to_string(), "Email already in use.");
    }

    #[rstest]
    #[case("no-at-sign", "hunter22")]
    #[case("@x.com", "hunter22")]
    #[case("ada@x.com", "short")]
    #[tokio::test]
    async fn sign_up_validates_input(#[case] email: &str, #[case] password: &str) {
        let err = auth().sign_up(email, password).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn a_new_login_closes_the_previous_session() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();

        let first = auth.sign_in("ada@x.com", "hunter22").await.unwrap();
        let second = auth.sign_in("ada@x.com", "hunter22").await.unwrap();

        assert!(auth.session(&first.session_token).await.unwrap().is_none());
        assert!(auth.session(&second.session_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn verifying_leaves_sessions_alone() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();
        let session = auth.sign_in("ada@x.com", "hunter22").await.unwrap();

        auth.verify("ada@x.com", "hunter22").await.unwrap();
        assert!(auth.session(&session.session_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sign_out_ends_the_session() {
        let auth = auth();
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();
        let session = auth.sign_in("ada@x.com", "hunter22").await.unwrap();

        auth.sign_out(&session.session_token).await.unwrap();
        assert!(auth.session(&session.session_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_not_honoured() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let auth = StoreAuth::new(store, -1);
        auth.sign_up("ada@x.com", "hunter22").await.unwrap();
        let session = auth.sign_in("ada@x.com", "hunter22").await.unwrap();

        assert!(auth.session(&session.session_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn garbage_tokens_resolve_to_nothing() {
        assert!(auth().session("not base64 at all!").await.unwrap().is_none());
    }
}
