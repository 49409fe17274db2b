//! `ThriftNoteStore` and UserStore lookups against a mock EDAM endpoint.

use evernote_core::error::ApiError;
use evernote_core::store::thrift::{ttype, MessageType, Reader, Writer};
use evernote_core::store::{user_store, NoteFetch, NoteStore, ThriftNoteStore};
use evernote_core::EvernoteError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn reply(method: &str, result: impl FnOnce(&mut Writer)) -> Vec<u8> {
    let mut w = Writer::new();
    w.message_begin(method, MessageType::Reply, 1);
    result(&mut w);
    w.field_stop();
    w.finish().unwrap()
}

fn thrift_response(body: Vec<u8>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-thrift")
        .set_body_bytes(body)
}

/// Method name of a Thrift call body.
fn call_name(request: &Request) -> String {
    let (name, kind, _) = Reader::new(&request.body).message_begin().unwrap();
    assert_eq!(kind, MessageType::Call);
    name
}

#[tokio::test]
async fn test_list_notebooks() {
    let server = MockServer::start().await;
    let body = reply("listNotebooks", |w| {
        w.field_begin(ttype::LIST, 0);
        w.list_begin(ttype::STRUCT, 2);
        w.field_string(1, Some("nb-1"));
        w.field_string(2, Some("Inbox"));
        w.field_bool(6, Some(true));
        w.field_stop();
        w.field_string(1, Some("nb-2"));
        w.field_string(2, Some("Work"));
        w.field_string(12, Some("Projects"));
        w.field_stop();
    });
    Mock::given(method("POST"))
        .and(path("/shard/s1/notestore"))
        .and(header("content-type", "application/x-thrift"))
        .respond_with(thrift_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let store = ThriftNoteStore::new(format!("{}/shard/s1/notestore", server.uri()), "token");
    let notebooks = store.list_notebooks().await.expect("notebooks");

    assert_eq!(notebooks.len(), 2);
    assert_eq!(notebooks[0].name.as_deref(), Some("Inbox"));
    assert_eq!(notebooks[0].default_notebook, Some(true));
    assert_eq!(notebooks[1].stack.as_deref(), Some("Projects"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(call_name(&requests[0]), "listNotebooks");
}

#[tokio::test]
async fn test_get_note_sends_token_and_guid() {
    let server = MockServer::start().await;
    let body = reply("getNote", |w| {
        w.field_begin(ttype::STRUCT, 0);
        w.field_string(1, Some("note-1"));
        w.field_string(2, Some("Hello"));
        w.field_string(3, Some("<en-note>hi</en-note>"));
        w.field_i64(6, Some(1_700_000_000_000));
        w.field_stop();
    });
    Mock::given(method("POST"))
        .respond_with(thrift_response(body))
        .mount(&server)
        .await;

    let store = ThriftNoteStore::new(server.uri(), "auth-token");
    let note = store
        .get_note("note-1", NoteFetch::content())
        .await
        .expect("note");
    assert_eq!(note.title.as_deref(), Some("Hello"));
    assert_eq!(note.created, Some(1_700_000_000_000));

    let requests = server.received_requests().await.unwrap();
    let mut r = Reader::new(&requests[0].body);
    r.message_begin().unwrap();
    assert_eq!(r.field_begin().unwrap(), Some((ttype::STRING, 1)));
    assert_eq!(r.string().unwrap(), "auth-token");
    assert_eq!(r.field_begin().unwrap(), Some((ttype::STRING, 2)));
    assert_eq!(r.string().unwrap(), "note-1");
    assert_eq!(r.field_begin().unwrap(), Some((ttype::BOOL, 3)));
    assert!(r.bool().unwrap());
}

#[tokio::test]
async fn test_not_found_exception_maps_to_api_error() {
    let server = MockServer::start().await;
    let body = reply("getNote", |w| {
        w.field_begin(ttype::STRUCT, 3);
        w.field_string(1, Some("Note.guid"));
        w.field_string(2, Some("bad-guid"));
        w.field_stop();
    });
    Mock::given(method("POST"))
        .respond_with(thrift_response(body))
        .mount(&server)
        .await;

    let store = ThriftNoteStore::new(server.uri(), "token");
    let err = store
        .get_note("bad-guid", NoteFetch::content())
        .await
        .unwrap_err();
    assert!(matches!(err, EvernoteError::Api(ApiError::NotFound { .. })));
    assert_eq!(err.to_string(), "not found: Note.guid = bad-guid");
}

#[tokio::test]
async fn test_http_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = ThriftNoteStore::new(server.uri(), "token");
    let err = store.list_tags().await.unwrap_err();
    assert!(matches!(err, EvernoteError::Network(ref m) if m.contains("503")));
}

#[tokio::test]
async fn test_user_store_note_store_url() {
    let server = MockServer::start().await;
    let body = reply("getNoteStoreUrl", |w| {
        w.field_string(0, Some("https://www.evernote.com/shard/s7/notestore"));
    });
    Mock::given(method("POST"))
        .and(path("/edam/user"))
        .respond_with(thrift_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let url = user_store::note_store_url(&reqwest::Client::new(), &server.uri(), "token")
        .await
        .expect("note store url");
    assert_eq!(url, "https://www.evernote.com/shard/s7/notestore");
}
