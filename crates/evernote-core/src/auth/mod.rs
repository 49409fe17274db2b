//! OAuth 1.0a delegated authorization.
//!
//! The handshake requests a temporary credential, sends the user to the
//! consent page, waits for the browser redirect on a short-lived local
//! listener, then exchanges the verifier for a durable credential that names
//! the account's note store endpoint.
//!
//! ```text
//! Idle -> RequestingCredential -> AwaitingRedirect -> Exchanging -> Complete
//!              |                        |                  |
//!              +--> Failed              +--> TimedOut      +--> Failed
//!                                       +--> Failed (mismatch)
//! ```

pub mod browser;
pub mod callback;
pub mod handshake;
pub mod provider;

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use browser::{is_launchable_url, open_in_browser, BrowserLauncher, SystemBrowser};
pub use callback::CallbackListener;
pub use handshake::Handshake;
pub use provider::EvernoteOAuth;

/// Consumer key and secret issued to the application.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub id: String,
    pub secret: String,
}

impl ClientCredentials {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Request token issued at the start of a handshake. The secret may be empty.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredential {
    pub token: String,
    pub secret: String,
}

impl std::fmt::Debug for TemporaryCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredential")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Query parameters delivered by the browser redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationRedirect {
    pub token: String,
    pub verifier: String,
}

impl std::fmt::Debug for AuthorizationRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationRedirect").finish_non_exhaustive()
    }
}

/// Long-lived access credential plus the account metadata returned with it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableCredential {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_api_url_prefix: Option<String>,
}

impl DurableCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: None,
            token_type: None,
            expires_at: None,
            note_store_url: None,
            user_id: None,
            web_api_url_prefix: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

impl std::fmt::Debug for DurableCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableCredential")
            .field("expires_at", &self.expires_at)
            .field("note_store_url", &self.note_store_url)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Where the callback listener binds and how long the handshake waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeConfig {
    pub listen_addr: SocketAddr,
    pub callback_path: String,
    pub redirect_host: String,
    pub timeout: Duration,
}

impl HandshakeConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// URL registered with the provider for the browser redirect.
    pub fn redirect_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.redirect_host,
            self.listen_addr.port(),
            self.callback_path
        )
    }
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], Self::DEFAULT_PORT)),
            callback_path: "/callback".to_string(),
            redirect_host: "localhost".to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// The OAuth endpoints of an authorization server.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Obtain a request token bound to `redirect_url`.
    async fn request_temporary_credential(
        &self,
        client: &ClientCredentials,
        redirect_url: &str,
    ) -> Result<TemporaryCredential>;

    /// Consent page the user visits to approve access.
    fn authorization_url(&self, temporary: &TemporaryCredential) -> String;

    /// Trade the approved request token and verifier for an access credential.
    async fn exchange(
        &self,
        client: &ClientCredentials,
        temporary: &TemporaryCredential,
        verifier: &str,
    ) -> Result<DurableCredential>;
}
