//! The authorization handshake driver.

use std::fmt;

use super::browser::{open_in_browser, BrowserLauncher};
use super::callback::CallbackListener;
use super::{AuthProvider, ClientCredentials, DurableCredential, HandshakeConfig};
use crate::error::{EvernoteError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    RequestingCredential,
    AwaitingRedirect,
    Exchanging,
    Complete,
    Failed,
    TimedOut,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::RequestingCredential => "requesting_credential",
            Phase::AwaitingRedirect => "awaiting_redirect",
            Phase::Exchanging => "exchanging",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
            Phase::TimedOut => "timed_out",
        };
        f.write_str(name)
    }
}

fn transition(from: Phase, to: Phase) -> Phase {
    tracing::debug!(from = %from, to = %to, "handshake transition");
    to
}

/// Runs one OAuth 1.0a handshake per `authorize` call. No retries; each
/// call requests a fresh temporary credential.
pub struct Handshake<P, B> {
    provider: P,
    browser: B,
    config: HandshakeConfig,
}

impl<P: AuthProvider, B: BrowserLauncher> Handshake<P, B> {
    pub fn new(provider: P, browser: B) -> Self {
        Self::with_config(provider, browser, HandshakeConfig::default())
    }

    pub fn with_config(provider: P, browser: B, config: HandshakeConfig) -> Self {
        Self {
            provider,
            browser,
            config,
        }
    }

    /// Obtain a durable credential for `client_id`.
    ///
    /// `on_url` receives the consent URL once the listener is up, so the
    /// caller can print it for manual use. The listener is stopped before
    /// this returns, whatever the outcome.
    pub async fn authorize<F>(
        &self,
        client_id: &str,
        client_secret: &str,
        on_url: F,
    ) -> Result<DurableCredential>
    where
        F: FnOnce(&str),
    {
        let client = ClientCredentials::new(client_id, client_secret);
        let mut phase = transition(Phase::Idle, Phase::RequestingCredential);

        let temporary = match self
            .provider
            .request_temporary_credential(&client, &self.config.redirect_url())
            .await
        {
            Ok(temporary) => temporary,
            Err(err) => {
                transition(phase, Phase::Failed);
                return Err(as_handshake_error(err));
            }
        };
        let auth_url = self.provider.authorization_url(&temporary);

        let mut listener = match CallbackListener::bind(&self.config).await {
            Ok(listener) => listener,
            Err(err) => {
                transition(phase, Phase::Failed);
                return Err(err);
            }
        };
        phase = transition(phase, Phase::AwaitingRedirect);

        on_url(&auth_url);
        open_in_browser(&self.browser, &auth_url);

        let redirect = listener.wait(self.config.timeout).await;
        listener.shutdown().await;

        let redirect = match redirect {
            Ok(redirect) => redirect,
            Err(err @ EvernoteError::HandshakeTimeout { .. }) => {
                transition(phase, Phase::TimedOut);
                return Err(err);
            }
            Err(err) => {
                transition(phase, Phase::Failed);
                return Err(err);
            }
        };

        if redirect.token != temporary.token {
            transition(phase, Phase::Failed);
            return Err(EvernoteError::Handshake(
                "token mismatch: the redirect does not belong to this authorization request"
                    .to_string(),
            ));
        }

        phase = transition(phase, Phase::Exchanging);
        match self
            .provider
            .exchange(&client, &temporary, &redirect.verifier)
            .await
        {
            Ok(credential) => {
                transition(phase, Phase::Complete);
                Ok(credential)
            }
            Err(err) => {
                transition(phase, Phase::Failed);
                Err(as_handshake_error(err))
            }
        }
    }
}

/// Provider failures surface as handshake errors regardless of their layer.
fn as_handshake_error(err: EvernoteError) -> EvernoteError {
    match err {
        EvernoteError::Handshake(_) | EvernoteError::HandshakeTimeout { .. } => err,
        other => EvernoteError::Handshake(other.to_string()),
    }
}
