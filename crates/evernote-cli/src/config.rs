use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use evernote_core::auth::{ClientCredentials, DurableCredential, EvernoteOAuth};
use evernote_core::fs::write_file_atomic;

#[derive(Debug, Serialize, Deserialize)]
pub struct EvernoteConfig {
    pub client: ClientSection,
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<DurableCredential>,
}

#[derive(Serialize, Deserialize)]
pub struct ClientSection {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for ClientSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSection")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceSection {
    pub url: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            url: EvernoteOAuth::PRODUCTION_URL.to_string(),
        }
    }
}

impl EvernoteConfig {
    pub fn new(client_id: String, client_secret: String, service_url: String) -> Self {
        Self {
            client: ClientSection {
                id: client_id,
                secret: client_secret,
            },
            service: ServiceSection { url: service_url },
            credential: None,
        }
    }

    pub fn client_credentials(&self) -> ClientCredentials {
        ClientCredentials::new(self.client.id.clone(), self.client.secret.clone())
    }
}

/// Service URL for the `--sandbox` flag.
pub fn service_url_for(sandbox: bool) -> &'static str {
    if sandbox {
        EvernoteOAuth::SANDBOX_URL
    } else {
        EvernoteOAuth::PRODUCTION_URL
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<EvernoteConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Write the config atomically, readable by the owner only.
pub fn write_config(path: &Path, config: &EvernoteConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    write_file_atomic(path, contents.as_bytes(), true)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "config written");
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("evernote"));
        }
    }
    Ok(home_dir()?.join(".config").join("evernote"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip_with_credential() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evernote").join("config.toml");

        let mut config = EvernoteConfig::new(
            "key".into(),
            "secret".into(),
            service_url_for(true).to_string(),
        );
        let mut credential = DurableCredential::new("S=s1:U=1");
        credential.note_store_url = Some("https://sandbox.evernote.com/shard/s1/notestore".into());
        credential.expires_at = Some(Utc.with_ymd_and_hms(2027, 10, 16, 0, 0, 0).unwrap());
        config.credential = Some(credential.clone());

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.client.id, "key");
        assert_eq!(loaded.client.secret, "secret");
        assert_eq!(loaded.service.url, "https://sandbox.evernote.com");
        assert_eq!(loaded.credential, Some(credential));
    }

    #[test]
    fn test_config_without_credential_or_service() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nid = \"k\"\nsecret = \"s\"\n").unwrap();

        let loaded = read_config(&path).unwrap();
        assert!(loaded.credential.is_none());
        assert_eq!(loaded.service.url, EvernoteOAuth::PRODUCTION_URL);
    }

    #[test]
    fn test_written_config_omits_missing_credential() {
        let config = EvernoteConfig::new("k".into(), "s".into(), "https://x".into());
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[client]"));
        assert!(!text.contains("[credential]"));
    }

    #[cfg(unix)]
    #[test]
    fn test_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = EvernoteConfig::new("k".into(), "s".into(), "https://x".into());
        write_config(&path, &config).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = EvernoteConfig::new("k".into(), "very-secret".into(), "https://x".into());
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[test]
    fn test_parse_error_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
