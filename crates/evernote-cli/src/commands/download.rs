use std::path::{Path, PathBuf};

use anyhow::Context;

use evernote_core::fs::write_file_atomic;
use evernote_core::store::{NoteStore, Resource, ResourceFetch};

use crate::app::AppContext;
use crate::cli::DownloadArgs;
use crate::output::print_json;
use crate::ui::{format_bytes, print, receipt};

/// Result of a completed download.
#[derive(Debug, serde::Serialize)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: usize,
    pub mime: Option<String>,
}

/// Local file name for a resource: the last segment of its stored file
/// name, or the resource GUID when there is none.
pub fn default_output_name(resource: &Resource, guid: &str) -> String {
    resource
        .file_name()
        .and_then(|name| name.rsplit(|c| c == '/' || c == '\\').next())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(guid)
        .to_string()
}

pub async fn download_resource(
    store: &dyn NoteStore,
    guid: &str,
    output: Option<&Path>,
) -> anyhow::Result<Downloaded> {
    let resource = store
        .get_resource(guid, ResourceFetch::download())
        .await
        .context("Failed to get resource")?;

    let body = resource
        .body()
        .filter(|body| !body.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Resource {} has no data", guid))?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_output_name(&resource, guid)),
    };
    write_file_atomic(&path, body, false)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = body.len(), "resource saved");

    Ok(Downloaded {
        path,
        bytes: body.len(),
        mime: resource.mime.clone(),
    })
}

pub async fn handle_download(ctx: &AppContext<'_>, args: &DownloadArgs) -> anyhow::Result<()> {
    let store = ctx.note_store().await?;
    let downloaded = download_resource(&store, &args.guid, args.output.as_deref()).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        return print_json(&downloaded);
    }
    let path = downloaded.path.display().to_string();
    let size = format_bytes(downloaded.bytes as u64);
    let mime = downloaded.mime.as_deref().unwrap_or("unknown");
    print(
        &ui,
        &receipt(&ui, "Downloaded", &[("Path", &path), ("Size", &size), ("MIME", mime)]),
    );
    Ok(())
}
