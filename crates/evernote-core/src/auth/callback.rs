//! Short-lived local HTTP listener for the OAuth redirect.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{AuthorizationRedirect, HandshakeConfig};
use crate::error::{EvernoteError, Result};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><head><title>evernote-cli</title></head>\
<body><h1>Authorization complete</h1><p>You can close this window and return to the terminal.</p></body></html>";

const INCOMPLETE_PAGE: &str = "<!DOCTYPE html><html><head><title>evernote-cli</title></head>\
<body><h1>Authorization incomplete</h1><p>The redirect was missing oauth_token or oauth_verifier.</p></body></html>";

#[derive(Debug, Deserialize)]
struct CallbackParams {
    oauth_token: Option<String>,
    oauth_verifier: Option<String>,
}

struct CallbackState {
    redirect_tx: mpsc::Sender<AuthorizationRedirect>,
}

async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let token = params.oauth_token.filter(|value| !value.is_empty());
    let verifier = params.oauth_verifier.filter(|value| !value.is_empty());
    match (token, verifier) {
        (Some(token), Some(verifier)) => {
            // Capacity 1: the first complete redirect is kept, later ones dropped.
            if state
                .redirect_tx
                .try_send(AuthorizationRedirect { token, verifier })
                .is_err()
            {
                tracing::debug!("ignoring additional authorization redirect");
            } else {
                tracing::debug!("authorization redirect received");
            }
            (StatusCode::OK, Html(SUCCESS_PAGE))
        }
        _ => {
            tracing::debug!("authorization redirect missing token or verifier");
            (StatusCode::BAD_REQUEST, Html(INCOMPLETE_PAGE))
        }
    }
}

/// Serves the callback route on a background task until shut down.
pub struct CallbackListener {
    local_addr: SocketAddr,
    redirect_rx: mpsc::Receiver<AuthorizationRedirect>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl CallbackListener {
    /// Bind the listen address and start serving `config.callback_path`.
    pub async fn bind(config: &HandshakeConfig) -> Result<Self> {
        let (redirect_tx, redirect_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = Arc::new(CallbackState { redirect_tx });
        let app = Router::new()
            .route(&config.callback_path, get(handle_callback))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(config.listen_addr)
            .await
            .map_err(|e| {
                EvernoteError::Handshake(format!(
                    "could not listen on {} for the browser redirect: {}",
                    config.listen_addr, e
                ))
            })?;
        let local_addr = listener.local_addr()?;
        tracing::debug!(addr = %local_addr, path = %config.callback_path, "callback listener started");

        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(err) = result {
                tracing::warn!(error = %err, "callback listener failed");
            }
        });

        Ok(Self {
            local_addr,
            redirect_rx,
            shutdown_tx: Some(shutdown_tx),
            server: Some(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the first complete redirect, up to `timeout`.
    pub async fn wait(&mut self, timeout: Duration) -> Result<AuthorizationRedirect> {
        match tokio::time::timeout(timeout, self.redirect_rx.recv()).await {
            Ok(Some(redirect)) => Ok(redirect),
            Ok(None) => Err(EvernoteError::Handshake(
                "callback listener stopped before a redirect arrived".to_string(),
            )),
            Err(_) => Err(EvernoteError::HandshakeTimeout {
                seconds: timeout.as_secs(),
            }),
        }
    }

    /// Stop serving and release the port. Waits up to five seconds for open
    /// connections to finish, then aborts the server task.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let Some(mut server) = self.server.take() else {
            return;
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            tracing::debug!("callback listener did not drain in time, aborting");
            server.abort();
            let _ = server.await;
        }
        tracing::debug!(addr = %self.local_addr, "callback listener stopped");
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral_config() -> HandshakeConfig {
        HandshakeConfig {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..HandshakeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_redirect_wins() {
        let mut listener = CallbackListener::bind(&ephemeral_config()).await.unwrap();
        let base = format!("http://{}/callback", listener.local_addr());
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base}?oauth_token=t1&oauth_verifier=v1"))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        let second = client
            .get(format!("{base}?oauth_token=t2&oauth_verifier=v2"))
            .send()
            .await
            .unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::OK);

        let redirect = listener.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(redirect.token, "t1");
        assert_eq!(redirect.verifier, "v1");
        listener.shutdown().await;
    }

    #[tokio::test]
    async fn test_incomplete_redirect_rejected() {
        let mut listener = CallbackListener::bind(&ephemeral_config()).await.unwrap();
        let url = format!("http://{}/callback?oauth_token=t1", listener.local_addr());

        let response = reqwest::get(url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let err = listener.wait(Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, EvernoteError::HandshakeTimeout { .. }));
        listener.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_port() {
        let listener = CallbackListener::bind(&ephemeral_config()).await.unwrap();
        let addr = listener.local_addr();
        listener.shutdown().await;

        let rebound = tokio::net::TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
    }
}
