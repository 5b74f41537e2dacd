use crate::client::{
    ClientConfig, ClientError, ErrorKind, ExpenseSettlementClient, MemoryTokenStorage, RequestOptions, TokenStorage,
};
use crate::core::models::{ExpenseCreate, UserLogin};
use crate::tests::memory_client;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "email": "alice@example.com",
        "username": "alice",
        "full_name": null,
        "is_active": true,
        "created_at": "2024-06-01T12:34:56.123456"
    })
}

fn credentials() -> UserLogin {
    UserLogin {
        email: "alice@example.com".to_string(),
        password: "password123".to_string(),
    }
}

async fn start() -> MockServer {
    let _ = env_logger::try_init();
    MockServer::start().await
}

#[tokio::test]
async fn test_login_stores_token_and_later_calls_send_it() {
    let server = start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "alice@example.com", "password": "password123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok", "token_type": "bearer"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(7)))
        .expect(1)
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    assert!(!client.is_authenticated());

    let token = client.login(&credentials()).await.unwrap();
    assert_eq!(token.access_token, "tok");
    assert_eq!(client.get_token().as_deref(), Some("tok"));

    let me = client.get_current_user().await.unwrap();
    assert_eq!(me.id, 7);
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn test_requests_declare_json_content_type() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/3"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    assert_eq!(client.get_user(3).await.unwrap().id, 3);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_response_clears_token() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    client.set_token("stale");

    let err = client.get_current_user().await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.detail(), Some("Could not validate credentials"));
    assert_eq!(err.to_string(), "Authentication failed");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_non_401_errors_keep_token() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/5"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "You are not a member of this group"})))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    client.set_token("tok");

    let err = client.get_group(5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.detail(), Some("You are not a member of this group"));
    assert_eq!(client.get_token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let server = start().await;
    let cases = [
        (400, ErrorKind::Validation),
        (404, ErrorKind::NotFound),
        (409, ErrorKind::Api),
        (500, ErrorKind::Api),
    ];
    for (status, _) in cases {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/users/{status}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"detail": format!("failed with {status}")})))
            .mount(&server)
            .await;
    }

    let client = memory_client(&server.uri());
    for (status, kind) in cases {
        let err = client.get_user(i64::from(status)).await.unwrap_err();
        assert_eq!(err.kind(), kind, "status {status}");
        assert_eq!(err.status_code(), Some(status));
        assert_eq!(err.detail(), Some(format!("failed with {status}").as_str()));
    }
}

#[tokio::test]
async fn test_generic_error_uses_reason_phrase() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    let err = client.get_my_groups().await.unwrap_err();
    match &err {
        ClientError::Api {
            status_code,
            status_text,
            detail,
        } => {
            assert_eq!(*status_code, 503);
            assert_eq!(status_text, "Service Unavailable");
            assert_eq!(detail.as_deref(), Some("Service Unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "API request failed: Service Unavailable");
}

#[tokio::test]
async fn test_json_error_without_detail_falls_back_to_reason_phrase() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/2"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/expenses"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": [{"loc": ["body", "amount"], "msg": "bad"}]})),
        )
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    assert_eq!(client.get_group(1).await.unwrap_err().detail(), Some("Not Found"));
    assert_eq!(client.get_group(2).await.unwrap_err().detail(), Some("Not Found"));

    let err = client
        .create_expense(&ExpenseCreate {
            group_id: 1,
            paid_by_user_id: 1,
            amount: -1.0,
            description: None,
            metadata: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(422));
    let detail: Value = serde_json::from_str(err.detail().unwrap()).unwrap();
    assert_eq!(detail[0]["msg"], "bad");
}

#[tokio::test]
async fn test_request_value_returns_body_as_sent() {
    let server = start().await;
    let body = json!({"anything": [1, 2, {"nested": true}], "detail": null});
    Mock::given(method("PATCH"))
        .and(path("/api/v1/custom"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{oops", "application/json"))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    let mut headers = HeaderMap::new();
    headers.insert("x-trace", HeaderValue::from_static("abc"));
    let options = RequestOptions {
        headers,
        ..RequestOptions::new(Method::PATCH)
    };
    assert_eq!(client.request_value("/custom", options).await.unwrap(), body);

    let plain = client
        .request_value("/plain", RequestOptions::new(Method::GET))
        .await
        .unwrap();
    assert_eq!(plain, Value::String("pong".to_string()));

    let broken = client
        .request_value("/broken", RequestOptions::new(Method::GET))
        .await
        .unwrap();
    assert_eq!(broken, json!({}));
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "not-a-number"})))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    let err = client.get_my_profile().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_base_url_trailing_slash_and_custom_prefix() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/v2/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1)))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
    let client = ExpenseSettlementClient::new(
        ClientConfig::new(format!("{}/", server.uri()))
            .api_prefix("/v2")
            .token_storage(storage),
    )
    .unwrap();
    assert_eq!(client.base_url(), server.uri());
    assert_eq!(client.get_user(1).await.unwrap().id, 1);
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let err = ExpenseSettlementClient::new(ClientConfig::new("not a url")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidBaseUrl);
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = memory_client(&format!("http://{addr}"));
    let err = client.get_my_groups().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

/// A store whose medium is broken: it never holds anything.
struct BrokenStorage;

impl TokenStorage for BrokenStorage {
    fn get_token(&self) -> Option<String> {
        None
    }

    fn set_token(&self, _token: &str) {}

    fn clear_token(&self) {}
}

#[tokio::test]
async fn test_broken_token_storage_keeps_client_usable() {
    let server = start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok", "token_type": "bearer"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1)))
        .mount(&server)
        .await;

    let storage: Arc<dyn TokenStorage> = Arc::new(BrokenStorage);
    let client = ExpenseSettlementClient::new(ClientConfig::new(server.uri()).token_storage(storage)).unwrap();

    client.login(&credentials()).await.unwrap();
    assert!(!client.is_authenticated());
    assert_eq!(client.get_user(1).await.unwrap().id, 1);
    client.clear_token();
}

#[tokio::test]
async fn test_blank_token_is_not_sent() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1)))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    client.set_token("   ");
    assert!(!client.is_authenticated());
    assert_eq!(client.get_token(), None);

    client.get_user(1).await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_nonstandard_status_falls_back_to_numeric_text() {
    let server = start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .respond_with(ResponseTemplate::new(599).set_body_string("odd"))
        .mount(&server)
        .await;

    let client = memory_client(&server.uri());
    let err = client.get_my_groups().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status_code(), Some(599));
    assert_eq!(err.detail(), Some("599"));
    assert_eq!(err.to_string(), "API request failed: 599");
}
