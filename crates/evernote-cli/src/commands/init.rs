use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use evernote_core::auth::ClientCredentials;

use crate::app::AppContext;
use crate::cli::AuthArgs;
use crate::config::{service_url_for, write_config, EvernoteConfig};
use crate::errors::CliError;
use crate::ui::{hint, print, UiContext};

use super::auth::{client_from_env, print_authorized, run_handshake};

fn prompt_client(ui: &UiContext) -> anyhow::Result<ClientCredentials> {
    if !ui.is_interactive() {
        return Err(CliError::invalid_input(
            "No consumer key available\nHint: Set EVERNOTE_CLIENT_ID and EVERNOTE_CLIENT_SECRET, or run `evernote-cli init` in a terminal.",
        )
        .into());
    }

    let theme = ColorfulTheme::default();
    let id: String = Input::with_theme(&theme)
        .with_prompt("Consumer key")
        .interact_text()?;
    let secret = Password::with_theme(&theme)
        .with_prompt("Consumer secret")
        .interact()?;
    Ok(ClientCredentials::new(id.trim(), secret.trim()))
}

pub async fn handle_init(ctx: &AppContext<'_>, args: &AuthArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context();
    let path = ctx.config_path()?.to_path_buf();

    if path.exists() && ui.is_interactive() {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} already exists. Replace it?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            print(&ui, &hint(&ui, "run `evernote-cli auth` to refresh the token only"));
            return Ok(());
        }
    }

    let client = match client_from_env() {
        Some(client) => client,
        None => prompt_client(&ui)?,
    };
    let service_url = service_url_for(args.sandbox).to_string();

    let credential = run_handshake(&ui, &client, &service_url).await?;

    let mut config = EvernoteConfig::new(client.id, client.secret, service_url);
    config.credential = Some(credential);
    write_config(&path, &config)?;

    print_authorized(&ui, &path, &config)
}
