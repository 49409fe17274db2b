//! Guarded browser handoff.

use url::Url;

/// Something that can show a URL to the user.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

/// Only absolute `http`/`https` URLs with a host may be handed to the
/// platform opener; anything else could run a local program or file.
pub fn is_launchable_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Launch `url` if it passes the guard. Returns whether a launch was
/// attempted and succeeded. Failures are logged, never raised: the caller
/// prints the URL for manual use either way.
pub fn open_in_browser(launcher: &dyn BrowserLauncher, url: &str) -> bool {
    if !is_launchable_url(url) {
        tracing::warn!("refusing to open non-web URL in browser");
        return false;
    }
    match launcher.launch(url) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to open browser");
            false
        }
    }
}
