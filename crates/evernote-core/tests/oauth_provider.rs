//! `EvernoteOAuth` against a mock OAuth endpoint.

use evernote_core::auth::{AuthProvider, ClientCredentials, EvernoteOAuth, TemporaryCredential};
use evernote_core::EvernoteError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> ClientCredentials {
    ClientCredentials::new("consumer-key", "consumer&secret")
}

#[tokio::test]
async fn test_temporary_credential_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth"))
        .and(query_param("oauth_consumer_key", "consumer-key"))
        .and(query_param("oauth_signature_method", "PLAINTEXT"))
        .and(query_param("oauth_signature", "consumer%26secret&"))
        .and(query_param("oauth_callback", "http://localhost:8080/callback"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=en-temp-1&oauth_token_secret=&oauth_callback_confirmed=true"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = EvernoteOAuth::new(server.uri());
    let temporary = provider
        .request_temporary_credential(&client(), "http://localhost:8080/callback")
        .await
        .expect("temporary credential");

    assert_eq!(temporary.token, "en-temp-1");
    assert_eq!(temporary.secret, "");
}

#[tokio::test]
async fn test_temporary_credential_missing_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_callback_confirmed=true"))
        .mount(&server)
        .await;

    let provider = EvernoteOAuth::new(server.uri());
    let err = provider
        .request_temporary_credential(&client(), "http://localhost:8080/callback")
        .await
        .unwrap_err();
    assert!(matches!(err, EvernoteError::Handshake(_)));
}

#[tokio::test]
async fn test_rejected_consumer_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid consumer key"))
        .mount(&server)
        .await;

    let provider = EvernoteOAuth::new(server.uri());
    let err = provider
        .request_temporary_credential(&client(), "http://localhost:8080/callback")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_unreachable_service() {
    let provider = EvernoteOAuth::new("http://127.0.0.1:1");
    let err = provider
        .request_temporary_credential(&client(), "http://localhost:8080/callback")
        .await
        .unwrap_err();
    assert!(matches!(err, EvernoteError::Handshake(_)));
}

#[tokio::test]
async fn test_exchange_populates_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth"))
        .and(query_param("oauth_token", "en-temp-1"))
        .and(query_param("oauth_verifier", "verifier-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=S%3Ds1%3AU%3D2a&oauth_token_secret=&edam_shard=s1&edam_userId=42\
             &edam_expires=1792108800000\
             &edam_noteStoreUrl=https%3A%2F%2Fsandbox.evernote.com%2Fshard%2Fs1%2Fnotestore",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let provider = EvernoteOAuth::new(server.uri());
    let temporary = TemporaryCredential {
        token: "en-temp-1".to_string(),
        secret: String::new(),
    };
    let credential = provider
        .exchange(&client(), &temporary, "verifier-1")
        .await
        .expect("exchange");

    assert_eq!(credential.token, "S=s1:U=2a");
    assert_eq!(credential.user_id, Some(42));
    assert_eq!(
        credential.note_store_url.as_deref(),
        Some("https://sandbox.evernote.com/shard/s1/notestore")
    );
    assert!(credential.expires_at.is_some());
}
