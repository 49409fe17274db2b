use std::path::Path;

use evernote_core::auth::{ClientCredentials, DurableCredential, EvernoteOAuth, Handshake, SystemBrowser};

use crate::app::{missing_config_message, AppContext};
use crate::cli::AuthArgs;
use crate::config::{read_config, service_url_for, write_config, EvernoteConfig};
use crate::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET};
use crate::errors::CliError;
use crate::output::print_json;
use crate::ui::{print, receipt, Spinner, UiContext};

/// Consumer credentials from `EVERNOTE_CLIENT_ID` / `EVERNOTE_CLIENT_SECRET`,
/// when both are set.
pub fn client_from_env() -> Option<ClientCredentials> {
    let read = |name: &str| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    Some(ClientCredentials::new(read(ENV_CLIENT_ID)?, read(ENV_CLIENT_SECRET)?))
}

/// Run the browser handshake against `service_url`.
///
/// The consent URL is printed to stderr so it can be opened by hand when no
/// browser starts.
pub async fn run_handshake(
    ui: &UiContext,
    client: &ClientCredentials,
    service_url: &str,
) -> anyhow::Result<DurableCredential> {
    let handshake = Handshake::new(EvernoteOAuth::new(service_url), SystemBrowser);
    let spinner = Spinner::new(ui, "Waiting for authorization in your browser");

    tracing::info!(service_url, "starting authorization");
    let result = handshake
        .authorize(&client.id, &client.secret, |url| {
            spinner.println("Open this URL to authorize evernote-cli:");
            spinner.println(&format!("  {}", url));
            spinner.start();
        })
        .await;
    spinner.clear();

    Ok(result?)
}

/// Print the outcome of a successful authorization.
pub fn print_authorized(ui: &UiContext, path: &Path, config: &EvernoteConfig) -> anyhow::Result<()> {
    let credential = config.credential.as_ref();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({
            "config": path,
            "service_url": config.service.url,
            "note_store_url": credential.and_then(|c| c.note_store_url.as_deref()),
            "expires_at": credential.and_then(|c| c.expires_at),
        }));
    }

    let config_path = path.display().to_string();
    let expires = credential
        .and_then(|c| c.expires_at)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let note_store = credential
        .and_then(|c| c.note_store_url.clone())
        .unwrap_or_else(|| "(looked up on first use)".to_string());
    print(
        ui,
        &receipt(
            ui,
            "Authorized",
            &[
                ("Config", &config_path),
                ("Service", &config.service.url),
                ("Note store", &note_store),
                ("Expires", &expires),
            ],
        ),
    );
    Ok(())
}

pub async fn handle_auth(ctx: &AppContext<'_>, args: &AuthArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context();
    let path = ctx.config_path()?.to_path_buf();
    let stored = if path.exists() {
        Some(read_config(&path)?)
    } else {
        None
    };

    let client = match (client_from_env(), &stored) {
        (Some(client), _) => client,
        (None, Some(config)) => config.client_credentials(),
        (None, None) => {
            return Err(CliError::not_found(
                missing_config_message(&path),
                "Hint: Run `evernote-cli init`, or set EVERNOTE_CLIENT_ID and EVERNOTE_CLIENT_SECRET.",
            )
            .into())
        }
    };
    let service_url = match (&stored, args.sandbox) {
        (Some(config), false) => config.service.url.clone(),
        _ => service_url_for(args.sandbox).to_string(),
    };

    let credential = run_handshake(&ui, &client, &service_url).await?;

    let mut config = stored.unwrap_or_else(|| {
        EvernoteConfig::new(client.id.clone(), client.secret.clone(), service_url.clone())
    });
    config.service.url = service_url;
    config.credential = Some(credential);
    write_config(&path, &config)?;

    print_authorized(&ui, &path, &config)
}
