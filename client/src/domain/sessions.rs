//! Session management service: sign-up, sign-in, sign-out.
//!
//! Sign-in and sign-out run through the retrying executor because mobile
//! connectivity makes their failures overwhelmingly transient; sign-up does
//! not, since a duplicate-account rejection should surface immediately.
//! Terminal failures map to user-presentable text here — the raw provider
//! descriptors go to the log only.

use std::sync::Arc;

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{
    AuthChangeListener, Credentials, NewAccount, Session, SessionService, SessionServiceError,
};
use crate::domain::retry::{AttemptGauge, RetryPolicy, RetryingExecutor};

const MIN_PASSWORD_LENGTH: usize = 6;

const INVALID_CREDENTIALS_TEXT: &str = "Invalid email or password. Please check your credentials \
     and try again, or sign up if you don't have an account.";
const CONNECTIVITY_TEXT: &str = "Network connection failed. Please check your internet \
     connection and try again.";

/// Driving service for authentication flows.
pub struct SessionManager<S> {
    sessions: Arc<S>,
    executor: RetryingExecutor,
}

impl<S> SessionManager<S> {
    /// Build a manager with the default retry policy.
    pub fn new(sessions: Arc<S>) -> Self {
        Self::with_executor(sessions, RetryingExecutor::new(RetryPolicy::default()))
    }

    /// Build a manager with an explicit executor (tests inject a
    /// non-sleeping one).
    pub fn with_executor(sessions: Arc<S>, executor: RetryingExecutor) -> Self {
        Self { sessions, executor }
    }

    /// Observable attempt counter for sign-in feedback.
    pub fn attempt_gauge(&self) -> AttemptGauge {
        self.executor.gauge()
    }
}

impl<S> SessionManager<S>
where
    S: SessionService,
{
    /// Register a new account.
    pub async fn sign_up(&self, account: NewAccount) -> Result<Session, Error> {
        let mut violations = Vec::new();
        if account.full_name.trim().is_empty() {
            violations.push("Full name is required".to_owned());
        }
        if account.email.trim().is_empty() || !account.email.contains('@') {
            violations.push("A valid email address is required".to_owned());
        }
        if account.password.len() < MIN_PASSWORD_LENGTH {
            violations.push(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
        if !violations.is_empty() {
            return Err(Error::invalid_request(violations.join(". "))
                .with_details(json!({ "violations": violations })));
        }

        self.sessions.sign_up(&account).await.map_err(|error| {
            tracing::error!(%error, email = %account.email, "sign-up failed");
            match error {
                SessionServiceError::Rejected { message } => {
                    Error::invalid_request(format!("Signup error: {message}"))
                }
                other => Error::service_unavailable(format!(
                    "An error occurred during signup. Please try again. ({other})"
                )),
            }
        })
    }

    /// Exchange credentials for a session, retrying transient failures.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<Session, Error> {
        let result = self
            .executor
            .execute(|| self.sessions.sign_in(&credentials))
            .await;

        result.map_err(|error| {
            tracing::error!(%error, email = %credentials.email, "sign-in failed after retries");
            match &error {
                SessionServiceError::InvalidCredentials => {
                    Error::unauthorized(INVALID_CREDENTIALS_TEXT)
                }
                _ if error.to_string().to_lowercase().contains("load failed") => {
                    Error::service_unavailable(CONNECTIVITY_TEXT)
                }
                other => Error::service_unavailable(format!(
                    "Login error: {other}. Please check your internet connection and try again."
                )),
            }
        })
    }

    /// End the current session, retrying transient failures.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let result = self.executor.execute(|| self.sessions.sign_out()).await;

        result.map_err(|error| {
            tracing::error!(%error, "sign-out failed after retries");
            if error.to_string().to_lowercase().contains("load failed") {
                Error::service_unavailable(CONNECTIVITY_TEXT)
            } else {
                Error::service_unavailable(format!(
                    "Logout error: {error}. Please check your internet connection and try again."
                ))
            }
        })
    }

    /// The session restored from a previous run, if any.
    pub async fn current_session(&self) -> Result<Option<Session>, Error> {
        self.sessions.current_session().await.map_err(|error| {
            tracing::warn!(%error, "session restore failed");
            Error::service_unavailable("Could not restore your session. Please log in again.")
        })
    }

    /// Subscribe to auth changes emitted from now on.
    pub fn subscribe_auth_changes(&self) -> AuthChangeListener {
        self.sessions.subscribe_auth_changes()
    }
}
