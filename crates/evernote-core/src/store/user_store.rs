//! UserStore lookups.

use super::client::post_thrift;
use super::wire;
use crate::error::Result;

/// Path of the UserStore service relative to the service URL.
pub const USER_STORE_PATH: &str = "/edam/user";

/// Ask the UserStore for the storage endpoint of the account behind `token`.
///
/// Used when a stored credential predates the handshake returning
/// `edam_noteStoreUrl`.
pub async fn note_store_url(
    client: &reqwest::Client,
    service_url: &str,
    token: &str,
) -> Result<String> {
    let url = format!("{}{}", service_url.trim_end_matches('/'), USER_STORE_PATH);
    let body = wire::encode_call("getNoteStoreUrl", 1, |w| w.field_string(1, Some(token)))?;
    let reply = post_thrift(client, &url, "getNoteStoreUrl", body).await?;
    wire::decode_reply(&reply, "getNoteStoreUrl", |r| r.string())
}
