//! Driven port for session and authentication operations.
//!
//! The identity provider owns accounts; this port exposes the handful of
//! operations the client needs (sign-up, password sign-in, sign-out, the
//! current session, and an auth-change feed).

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// Email/password pair for sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Registration payload for sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Display name stored in the profile metadata.
    pub full_name: String,
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Profile attributes of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Stable account identifier.
    pub id: Uuid,
    /// Account email address.
    pub email: String,
    /// Display name from profile metadata, when set.
    pub full_name: Option<String>,
}

impl UserProfile {
    /// Name shown in the dashboard header: the profile full name, else the
    /// local part of the email, else a neutral placeholder.
    ///
    /// # Examples
    /// ```
    /// use client::domain::ports::UserProfile;
    /// use uuid::Uuid;
    ///
    /// let profile = UserProfile {
    ///     id: Uuid::nil(),
    ///     email: "jordan@example.com".to_owned(),
    ///     full_name: None,
    /// };
    /// assert_eq!(profile.display_name(), "jordan");
    /// ```
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.full_name
            && !name.trim().is_empty()
        {
            return name.clone();
        }
        match self.email.split_once('@') {
            Some((local, _)) if !local.is_empty() => local.to_owned(),
            _ => "User".to_owned(),
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user profile.
    pub user: UserProfile,
    /// Bearer token for subsequent record and storage calls.
    pub access_token: String,
}

/// Auth lifecycle event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChange {
    /// A session was established.
    SignedIn(Session),
    /// The session ended.
    SignedOut,
}

/// Receiving side of the auth-change feed. Dropping it unsubscribes.
#[derive(Debug)]
pub struct AuthChangeListener {
    receiver: broadcast::Receiver<AuthChange>,
}

impl AuthChangeListener {
    /// Wrap a broadcast receiver; used by adapters and fixtures.
    pub fn new(receiver: broadcast::Receiver<AuthChange>) -> Self {
        Self { receiver }
    }

    /// Wait for the next auth change; `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<AuthChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                // A lagged subscriber only missed intermediate states; keep
                // reading so it lands on the newest one.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Errors surfaced by session adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionServiceError {
    /// The email/password pair did not match an account.
    #[error("invalid login credentials")]
    InvalidCredentials,
    /// Transport failed before a response arrived.
    #[error("session transport failed: {message}")]
    Transport { message: String },
    /// The call exceeded its deadline.
    #[error("session request timeout: {message}")]
    Timeout { message: String },
    /// The identity provider rejected the request.
    #[error("session request rejected: {message}")]
    Rejected { message: String },
    /// The response could not be decoded.
    #[error("session response decode failed: {message}")]
    Decode { message: String },
}

impl SessionServiceError {
    /// Build a [`SessionServiceError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`SessionServiceError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build a [`SessionServiceError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Build a [`SessionServiceError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for identity-provider session operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Register a new account and return its initial session.
    async fn sign_up(&self, account: &NewAccount) -> Result<Session, SessionServiceError>;

    /// Exchange credentials for a session.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SessionServiceError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), SessionServiceError>;

    /// The session restored from a previous run, if any.
    async fn current_session(&self) -> Result<Option<Session>, SessionServiceError>;

    /// Subscribe to auth changes emitted from now on.
    fn subscribe_auth_changes(&self) -> AuthChangeListener;
}

/// In-memory fixture: one hard-wired account, no persistence.
///
/// `agent@example.com` / `password` signs in successfully; anything else is
/// rejected as invalid credentials.
#[derive(Debug)]
pub struct FixtureSessionService {
    changes: broadcast::Sender<AuthChange>,
}

impl FixtureSessionService {
    fn fixture_session() -> Session {
        Session {
            user: UserProfile {
                id: Uuid::nil(),
                email: "agent@example.com".to_owned(),
                full_name: Some("Fixture Agent".to_owned()),
            },
            access_token: "fixture-token".to_owned(),
        }
    }
}

impl Default for FixtureSessionService {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self { changes }
    }
}

#[async_trait]
impl SessionService for FixtureSessionService {
    async fn sign_up(&self, account: &NewAccount) -> Result<Session, SessionServiceError> {
        let session = Session {
            user: UserProfile {
                id: Uuid::new_v4(),
                email: account.email.clone(),
                full_name: Some(account.full_name.clone()),
            },
            access_token: "fixture-token".to_owned(),
        };
        let _ = self.changes.send(AuthChange::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SessionServiceError> {
        if credentials.email == "agent@example.com" && credentials.password == "password" {
            let session = Self::fixture_session();
            let _ = self.changes.send(AuthChange::SignedIn(session.clone()));
            Ok(session)
        } else {
            Err(SessionServiceError::InvalidCredentials)
        }
    }

    async fn sign_out(&self) -> Result<(), SessionServiceError> {
        let _ = self.changes.send(AuthChange::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, SessionServiceError> {
        Ok(None)
    }

    fn subscribe_auth_changes(&self) -> AuthChangeListener {
        AuthChangeListener::new(self.changes.subscribe())
    }
}
