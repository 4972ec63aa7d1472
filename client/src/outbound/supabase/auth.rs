//! Auth-API adapter for the session service port.
//!
//! Besides implementing the port, this adapter keeps the signed-in session
//! in memory, deposits its access token on the shared transport (so record
//! and storage calls run as the user), and feeds the auth-change broadcast.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tokio::sync::broadcast;

use crate::domain::ports::{
    AuthChange, AuthChangeListener, Credentials, NewAccount, Session, SessionService,
    SessionServiceError,
};

use super::dto::{AuthSessionDto, PasswordGrantRequestDto, SignUpMetadataDto, SignUpRequestDto};
use super::{RequestFailure, SupabaseTransport, status_message};

const SIGN_UP_PATH: &str = "auth/v1/signup";
const TOKEN_PATH: &str = "auth/v1/token";
const SIGN_OUT_PATH: &str = "auth/v1/logout";
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Session service backed by the hosted auth surface.
pub struct SupabaseSessionService {
    transport: Arc<SupabaseTransport>,
    session: Mutex<Option<Session>>,
    changes: broadcast::Sender<AuthChange>,
}

impl SupabaseSessionService {
    /// Build the adapter over a shared transport.
    pub fn new(transport: Arc<SupabaseTransport>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            transport,
            session: Mutex::new(None),
            changes,
        }
    }

    fn store_session(&self, session: &Session) {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(session.clone());
        self.transport
            .set_access_token(Some(session.access_token.clone()));
        let _ = self.changes.send(AuthChange::SignedIn(session.clone()));
    }

    fn clear_session(&self) {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        self.transport.set_access_token(None);
        let _ = self.changes.send(AuthChange::SignedOut);
    }

    fn decode_session(body: &[u8]) -> Result<Session, SessionServiceError> {
        let dto: AuthSessionDto = serde_json::from_slice(body)
            .map_err(|err| SessionServiceError::decode(err.to_string()))?;
        dto.into_domain().map_err(SessionServiceError::decode)
    }
}

#[async_trait]
impl SessionService for SupabaseSessionService {
    async fn sign_up(&self, account: &NewAccount) -> Result<Session, SessionServiceError> {
        let request = self
            .transport
            .request(Method::POST, SIGN_UP_PATH)
            .map_err(map_failure)?
            .json(&SignUpRequestDto {
                email: &account.email,
                password: &account.password,
                data: SignUpMetadataDto {
                    full_name: &account.full_name,
                },
            });
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        let session = Self::decode_session(&body)?;
        self.store_session(&session);
        Ok(session)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SessionServiceError> {
        let request = self
            .transport
            .request(Method::POST, TOKEN_PATH)
            .map_err(map_failure)?
            .query(&[("grant_type", "password")])
            .json(&PasswordGrantRequestDto {
                email: &credentials.email,
                password: &credentials.password,
            });
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        let session = Self::decode_session(&body)?;
        self.store_session(&session);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), SessionServiceError> {
        let request = self
            .transport
            .request(Method::POST, SIGN_OUT_PATH)
            .map_err(map_failure)?;
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        self.clear_session();
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, SessionServiceError> {
        let guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn subscribe_auth_changes(&self) -> AuthChangeListener {
        AuthChangeListener::new(self.changes.subscribe())
    }
}

fn map_failure(failure: RequestFailure) -> SessionServiceError {
    match failure {
        RequestFailure::Timeout { message } => SessionServiceError::timeout(message),
        RequestFailure::Transport { message } => SessionServiceError::transport(message),
    }
}

fn map_status(status: StatusCode, body: &[u8]) -> SessionServiceError {
    let message = status_message(status, body);
    if message.to_lowercase().contains("invalid login credentials") {
        return SessionServiceError::InvalidCredentials;
    }
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SessionServiceError::timeout(message)
        }
        _ if status.is_client_error() => SessionServiceError::rejected(message),
        _ => SessionServiceError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Mapping coverage for non-network adapter helpers.

    use rstest::rstest;

    use super::*;

    #[test]
    fn invalid_credentials_are_detected_from_the_descriptor() {
        let body = br#"{ "error_description": "Invalid login credentials" }"#;
        let error = map_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(error, SessionServiceError::InvalidCredentials);
    }

    #[rstest]
    #[case::other_client_error(StatusCode::UNPROCESSABLE_ENTITY, "Rejected")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn other_statuses_map_by_family(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status(status, br#"{ "msg": "something else" }"#);
        let matched = match expected {
            "Rejected" => matches!(error, SessionServiceError::Rejected { .. }),
            "Timeout" => matches!(error, SessionServiceError::Timeout { .. }),
            "Transport" => matches!(error, SessionServiceError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn session_decode_failure_is_reported_as_decode() {
        let error =
            SupabaseSessionService::decode_session(b"not json").expect_err("decode must fail");
        assert!(matches!(error, SessionServiceError::Decode { .. }));
    }
}
