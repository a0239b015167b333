//! End-to-End Client Tests
//!
//! Runs the blocking client against a wiremock server:
//! - status check and token issuance URLs
//! - Basic auth identity, then token header once a token is held
//! - error normalization from real HTTP responses
//!
//! The client blocks, so each scenario runs inside `spawn_blocking`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use apiutil_client::{
    ApiClient, AuthenticatedClient, ClientOptions, Credentials, EndpointTemplates, Error,
};
use apiutil_common::query;
use apiutil_config::ConfigLoader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Book {
    id: u64,
    title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Endpoint {
    Books,
    Book,
}

fn templates() -> EndpointTemplates<Endpoint> {
    EndpointTemplates::new()
        .with(Endpoint::Books, "books")
        .with(Endpoint::Book, "books/%v")
}

/// Authenticated client for alice on account 42
fn new_auth() -> Arc<AuthenticatedClient> {
    let credentials = Credentials::new("alice", "secret").with_account_id(42);
    let options = ClientOptions::new().with_timeout(Duration::from_secs(5));
    Arc::new(AuthenticatedClient::new(credentials, options).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_check_up_and_down() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/status_check"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.0/status_check"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = ApiClient::new(new_auth(), base_url, "publishing");

        assert!(client.status_check().unwrap());
        assert!(!client.status_check().unwrap());
        assert_eq!(client.response_codes(), &[200, 503]);
    })
    .await
    .unwrap();

    // Status check never carries credentials
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_issuance_then_token_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/publishing/v2.0/token"))
        .and(basic_auth("alice;42", "secret"))
        .respond_with(ResponseTemplate::new(200).insert_header("token", "tok-1"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/books"))
        .and(header("token", "tok-1"))
        .and(basic_auth("alice;42", ""))
        .and(query_param("limit", "0,10"))
        .and(query_param("order_by", "title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "Dune"},
            {"id": 2, "title": "Emma"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let auth = new_auth();
        let mut client = ApiClient::new(auth.clone(), base_url, "publishing");

        client.set_new_api_token().unwrap();
        assert_eq!(auth.auth_token(), "tok-1");

        let templates = templates();
        let books: Vec<Book> = client
            .get(
                &templates.resource(Endpoint::Books),
                &[&query::limit(10, 0), &query::order_by(&["title"], None)],
            )
            .unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[1].title, "Emma");
        assert_eq!(client.last_response_code(), Some(200));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_harvested_from_ordinary_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/books/1"))
        .and(basic_auth("alice;42", "secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("token", "harvested")
                .set_body_json(serde_json::json!({"id": 1, "title": "Dune"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/books/2"))
        .and(header("token", "harvested"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("token", "ignored")
                .set_body_json(serde_json::json!({"id": 2, "title": "Emma"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let auth = new_auth();
        let mut client = ApiClient::new(auth.clone(), base_url, "publishing");
        let templates = templates();

        let _: Book = client
            .get(&templates.resource(Endpoint::Book).qualifier(1), &[])
            .unwrap();
        assert_eq!(auth.auth_token(), "harvested");

        let _: Book = client
            .get(&templates.resource(Endpoint::Book).qualifier(2), &[])
            .unwrap();
        assert_eq!(auth.auth_token(), "harvested");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unset_token_falls_back_to_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/publishing/v2.0/books/3"))
        .and(basic_auth("alice;42", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"deleted": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let auth = new_auth();
        auth.set_auth_token("stale");
        let mut client = ApiClient::new(auth.clone(), base_url, "publishing");

        client.unset_auth_token();
        let result: serde_json::Value = client.delete("books/3", &[]).unwrap();

        assert_eq!(result["deleted"], true);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_sends_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/publishing/v2.0/books"))
        .and(header("content-type", "application/json"))
        .and(header("x-idempotency-key", "k-1"))
        .and(body_json(serde_json::json!({"id": 0, "title": "Ulysses"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 9, "title": "Ulysses"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = ApiClient::new(new_auth(), base_url, "publishing");

        let created: Book = client
            .post(
                "books",
                &Book { id: 0, title: "Ulysses".into() },
                &[&|h: &mut http::HeaderMap| {
                    h.insert("x-idempotency-key", http::HeaderValue::from_static("k-1"));
                }],
            )
            .unwrap();

        assert_eq!(created.id, 9);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_normalization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/publishing/v2.0/books/4"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "Code": 422,
            "Type": "ValidationError",
            "errors": [{"Info": "title is required", "Type": "required"}],
            "CombinedInfo": "title is required"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/books/5"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/books/6"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = ApiClient::new(new_auth(), base_url, "publishing");

        let err = client
            .put::<_, Book, _>("books/4", &serde_json::json!({"title": ""}), &[])
            .unwrap_err();
        match err {
            Error::Api { code, kind, errors, .. } => {
                assert_eq!(code, 422);
                assert_eq!(kind, "ValidationError");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected structured error, got {other:?}"),
        }

        let err = client.get::<Book, _>("books/5", &[]).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(401)));

        let err = client.get::<Book, _>("books/6", &[]).unwrap_err();
        assert!(matches!(err, Error::ResponseNotOk(500)));

        assert_eq!(client.response_codes(), &[422, 401, 500]);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_raw_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishing/v2.0/exports/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("id;title\n1;Dune\n"))
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = ApiClient::new(new_auth(), base_url, "publishing");

        let response = client.get_with_raw_response("exports/1").unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_slice(), b"id;title\n1;Dune\n");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_from_config_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/status_check"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "[api]\nbase_url = \"{}/\"\nname = \"publishing\"\n\n[http]\ntimeout_secs = 5\n",
        mock_server.uri()
    )
    .unwrap();

    let config_path = file.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        let config = ConfigLoader::with_path(config_path).load().unwrap();
        let mut client = ApiClient::from_config(&config).unwrap();

        assert!(client.status_check().unwrap());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_host_records_zero() {
    tokio::task::spawn_blocking(|| {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);
        let mut client = ApiClient::new(new_auth(), base_url, "publishing");

        let err = client.status_check().unwrap_err();
        assert!(err.is_transport());
        assert_eq!(client.response_codes(), &[0]);
    })
    .await
    .unwrap();
}
