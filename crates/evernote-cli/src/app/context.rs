//! Application context for the Evernote CLI.
//!
//! Bundles the parsed arguments with the lazily loaded config so handlers
//! take a single parameter.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use once_cell::unsync::OnceCell;

use evernote_core::auth::DurableCredential;
use evernote_core::store::{user_store, ThriftNoteStore};

use crate::cli::Cli;
use crate::config::EvernoteConfig;
use crate::errors::CliError;
use crate::ui::UiContext;

use super::resolver::{load_config, resolve_config_path};

const REAUTH_HINT: &str = "Hint: Run `evernote-cli auth` to authorize again.";

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: OnceCell<PathBuf>,
    config: OnceCell<EvernoteConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config_path: OnceCell::new(),
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// UI context for the current flags and terminal.
    pub fn ui_context(&self) -> UiContext {
        UiContext::from_env(self.cli.json, self.cli.no_color, self.cli.ascii)
    }

    pub fn config_path(&self) -> anyhow::Result<&Path> {
        self.config_path
            .get_or_try_init(|| resolve_config_path(self.cli))
            .map(PathBuf::as_path)
    }

    /// Get the config, loading it on first use.
    pub fn config(&self) -> anyhow::Result<&EvernoteConfig> {
        self.config
            .get_or_try_init(|| load_config(self.config_path()?))
    }

    /// The stored credential, rejected if absent or expired.
    pub fn credential(&self) -> anyhow::Result<&DurableCredential> {
        let credential = self.config()?.credential.as_ref().ok_or_else(|| {
            CliError::auth_failed_with_hint("Not authorized yet", REAUTH_HINT)
        })?;
        if credential.is_expired(Utc::now()) {
            return Err(
                CliError::auth_failed_with_hint("Stored authorization has expired", REAUTH_HINT)
                    .into(),
            );
        }
        Ok(credential)
    }

    /// Client for the account's note store.
    ///
    /// Credentials saved without a note store URL are resolved through the UserStore.
    pub async fn note_store(&self) -> anyhow::Result<ThriftNoteStore> {
        let credential = self.credential()?;
        let client = reqwest::Client::new();
        let url = match &credential.note_store_url {
            Some(url) => url.clone(),
            None => {
                let service_url = &self.config()?.service.url;
                tracing::info!("looking up note store URL");
                user_store::note_store_url(&client, service_url, &credential.token)
                    .await
                    .context("Failed to look up note store")?
            }
        };
        tracing::debug!(%url, "using note store");
        Ok(ThriftNoteStore::with_client(url, credential.token.clone(), client))
    }
}
