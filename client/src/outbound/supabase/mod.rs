//! Adapters for the hosted backend platform (Supabase).
//!
//! The platform exposes three HTTP surfaces under one base URL: the record
//! API (`rest/v1`), the auth API (`auth/v1`), and blob storage
//! (`storage/v1`). [`SupabaseTransport`] owns what is common to all of
//! them — the HTTP client, endpoint construction, the key/token headers —
//! while each adapter owns its own wire DTOs and error mapping.

mod auth;
mod dto;
mod goals;
mod storage;
mod transactions;

pub use auth::SupabaseSessionService;
pub use goals::SupabaseGoalStore;
pub use storage::SupabaseImageStore;
pub use transactions::SupabaseTransactionStore;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};

use dto::ErrorDescriptorDto;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BASE_URL_VAR: &str = "SUPABASE_URL";
const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://abc.supabase.co/`.
    pub base_url: Url,
    /// Publishable (anonymous) API key.
    pub anon_key: String,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    /// Build a configuration with the default request timeout.
    pub fn new(base_url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            base_url,
            anon_key: anon_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read the configuration from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self, SupabaseConfigError> {
        let raw_url = std::env::var(BASE_URL_VAR)
            .map_err(|_| SupabaseConfigError::missing_variable(BASE_URL_VAR))?;
        let anon_key = std::env::var(ANON_KEY_VAR)
            .map_err(|_| SupabaseConfigError::missing_variable(ANON_KEY_VAR))?;
        let base_url =
            Url::parse(&raw_url).map_err(|err| SupabaseConfigError::InvalidUrl {
                message: err.to_string(),
            })?;
        Ok(Self::new(base_url, anon_key))
    }
}

/// Errors raised while constructing the backend connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupabaseConfigError {
    /// A required environment variable is absent.
    #[error("missing environment variable {name}")]
    MissingVariable { name: String },
    /// The base URL does not parse.
    #[error("invalid backend url: {message}")]
    InvalidUrl { message: String },
    /// The HTTP client could not be constructed.
    #[error("http client construction failed: {message}")]
    Client { message: String },
}

impl SupabaseConfigError {
    fn missing_variable(name: &str) -> Self {
        Self::MissingVariable {
            name: name.to_owned(),
        }
    }
}

/// Transport-level failure before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestFailure {
    /// Connection-level failure.
    Transport { message: String },
    /// The request exceeded the client timeout.
    Timeout { message: String },
}

/// Shared HTTP plumbing for the backend surfaces.
///
/// The auth adapter deposits the session access token here so record and
/// storage requests run with the signed-in identity; they fall back to the
/// anonymous key when no session exists.
pub struct SupabaseTransport {
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Mutex<Option<String>>,
}

impl SupabaseTransport {
    /// Build the transport, constructing the underlying HTTP client.
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseConfigError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SupabaseConfigError::Client {
                message: err.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
            anon_key: config.anon_key,
            access_token: Mutex::new(None),
        })
    }

    /// Project base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn set_access_token(&self, token: Option<String>) {
        let mut guard = self
            .access_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = token;
    }

    fn bearer(&self) -> String {
        let guard = self
            .access_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone().unwrap_or_else(|| self.anon_key.clone())
    }

    /// Start an authorised request against a base-relative path.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, RequestFailure> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| RequestFailure::Transport {
                message: format!("invalid endpoint {path}: {err}"),
            })?;
        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(self.bearer()))
    }

    /// Execute a request, separating transport failures from HTTP statuses.
    ///
    /// Error statuses are returned as data so each adapter can map them
    /// into its own port error family.
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), RequestFailure> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }
}

fn map_transport_error(error: reqwest::Error) -> RequestFailure {
    if error.is_timeout() {
        RequestFailure::Timeout {
            message: error.to_string(),
        }
    } else {
        RequestFailure::Transport {
            message: error.to_string(),
        }
    }
}

/// Render an error status into a port-error message, logging the full
/// descriptor when the body carries one.
///
/// Backend error descriptors expose `{message, details?, hint?, code?}`;
/// only the message reaches the returned string — details, hints, and
/// codes are diagnostics and stay in the log.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(descriptor) = serde_json::from_slice::<ErrorDescriptorDto>(body) {
        tracing::error!(
            status = status.as_u16(),
            message = descriptor.message.as_deref(),
            details = descriptor.details.as_deref(),
            hint = descriptor.hint.as_deref(),
            code = descriptor.code.as_deref(),
            "backend returned an error descriptor"
        );
        if let Some(message) = descriptor.message {
            return format!("status {}: {message}", status.as_u16());
        }
    }

    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
