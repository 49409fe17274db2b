//! Evernote's OAuth 1.0a endpoints.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::{AuthProvider, ClientCredentials, DurableCredential, TemporaryCredential};
use crate::error::{EvernoteError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Signs requests with the PLAINTEXT method, which is only valid over TLS.
pub struct EvernoteOAuth {
    service_url: String,
    client: reqwest::Client,
}

impl EvernoteOAuth {
    pub const PRODUCTION_URL: &'static str = "https://www.evernote.com";
    pub const SANDBOX_URL: &'static str = "https://sandbox.evernote.com";

    pub fn new(service_url: impl Into<String>) -> Self {
        Self::with_client(service_url, reqwest::Client::new())
    }

    pub fn with_client(service_url: impl Into<String>, client: reqwest::Client) -> Self {
        let service_url = service_url.into().trim_end_matches('/').to_string();
        Self {
            service_url,
            client,
        }
    }

    fn signature(client_secret: &str, token_secret: &str) -> String {
        format!(
            "{}&{}",
            urlencoding::encode(client_secret),
            urlencoding::encode(token_secret)
        )
    }

    fn base_params(client: &ClientCredentials, token_secret: &str) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", client.id.clone()),
            ("oauth_signature", Self::signature(&client.secret, token_secret)),
            ("oauth_signature_method", "PLAINTEXT".to_string()),
            ("oauth_timestamp", Utc::now().timestamp().to_string()),
            ("oauth_nonce", Uuid::new_v4().simple().to_string()),
            ("oauth_version", "1.0".to_string()),
        ]
    }

    async fn get_form(&self, step: &str, params: &[(&'static str, String)]) -> Result<HashMap<String, String>> {
        let url = format!("{}/oauth", self.service_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| EvernoteError::Handshake(format!("{} request failed: {}", step, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EvernoteError::Handshake(format!("{} response unreadable: {}", step, e)))?;
        if !status.is_success() {
            return Err(EvernoteError::Handshake(format!(
                "{} rejected with HTTP {}: {}",
                step,
                status,
                body.trim()
            )));
        }
        Ok(parse_form(&body))
    }
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

fn required(fields: &HashMap<String, String>, key: &str, step: &str) -> Result<String> {
    fields
        .get(key)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| EvernoteError::Handshake(format!("{} response missing {}", step, key)))
}

/// Build a credential from the fields of an access token response.
pub fn credential_from_fields(fields: &HashMap<String, String>) -> Result<DurableCredential> {
    let mut credential = DurableCredential::new(required(fields, "oauth_token", "token exchange")?);
    credential.secret = fields
        .get("oauth_token_secret")
        .filter(|value| !value.is_empty())
        .cloned();
    credential.note_store_url = fields
        .get("edam_noteStoreUrl")
        .filter(|value| !value.is_empty())
        .cloned();
    credential.web_api_url_prefix = fields
        .get("edam_webApiUrlPrefix")
        .filter(|value| !value.is_empty())
        .cloned();
    credential.user_id = fields.get("edam_userId").and_then(|value| value.parse().ok());
    credential.expires_at = fields
        .get("edam_expires")
        .and_then(|value| value.parse::<i64>().ok())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
    Ok(credential)
}

#[async_trait]
impl AuthProvider for EvernoteOAuth {
    async fn request_temporary_credential(
        &self,
        client: &ClientCredentials,
        redirect_url: &str,
    ) -> Result<TemporaryCredential> {
        let mut params = Self::base_params(client, "");
        params.push(("oauth_callback", redirect_url.to_string()));

        let fields = self.get_form("temporary credential", &params).await?;
        let token = required(&fields, "oauth_token", "temporary credential")?;
        let secret = fields.get("oauth_token_secret").cloned().unwrap_or_default();
        Ok(TemporaryCredential { token, secret })
    }

    fn authorization_url(&self, temporary: &TemporaryCredential) -> String {
        format!(
            "{}/OAuth.action?oauth_token={}",
            self.service_url,
            urlencoding::encode(&temporary.token)
        )
    }

    async fn exchange(
        &self,
        client: &ClientCredentials,
        temporary: &TemporaryCredential,
        verifier: &str,
    ) -> Result<DurableCredential> {
        let mut params = Self::base_params(client, &temporary.secret);
        params.push(("oauth_token", temporary.token.clone()));
        params.push(("oauth_verifier", verifier.to_string()));

        let fields = self.get_form("token exchange", &params).await?;
        credential_from_fields(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_signature_encodes_secrets() {
        assert_eq!(EvernoteOAuth::signature("a&b", ""), "a%26b&");
        assert_eq!(EvernoteOAuth::signature("secret", "tok"), "secret&tok");
    }

    #[test]
    fn test_authorization_url() {
        let provider = EvernoteOAuth::new("https://sandbox.evernote.com/");
        let temporary = TemporaryCredential {
            token: "en-abc:123".to_string(),
            secret: String::new(),
        };
        assert_eq!(
            provider.authorization_url(&temporary),
            "https://sandbox.evernote.com/OAuth.action?oauth_token=en-abc%3A123"
        );
    }

    #[test]
    fn test_credential_from_exchange_fields() {
        let fields = parse_form(
            "oauth_token=S%3Ds1%3AU%3D1&oauth_token_secret=&edam_shard=s1&edam_userId=42\
             &edam_expires=1792108800000&edam_noteStoreUrl=https%3A%2F%2Fwww.evernote.com%2Fshard%2Fs1%2Fnotestore\
             &edam_webApiUrlPrefix=https%3A%2F%2Fwww.evernote.com%2Fshard%2Fs1%2F",
        );
        let credential = credential_from_fields(&fields).unwrap();

        assert_eq!(credential.token, "S=s1:U=1");
        assert_eq!(credential.secret, None);
        assert_eq!(credential.user_id, Some(42));
        assert_eq!(
            credential.note_store_url.as_deref(),
            Some("https://www.evernote.com/shard/s1/notestore")
        );
        assert_eq!(
            credential.expires_at.map(|at| at.timestamp_millis()),
            Some(1_792_108_800_000)
        );
        assert!(credential.token_type.is_none());
    }

    #[test]
    fn test_exchange_fields_without_token_fail() {
        let fields = parse_form("oauth_problem=token_rejected");
        let err = credential_from_fields(&fields).unwrap_err();
        assert!(matches!(err, EvernoteError::Handshake(ref m) if m.contains("oauth_token")));
    }
}
