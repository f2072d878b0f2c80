use qick_core::api::client::{ClientSettings, HttpClient};
use qick_core::api::interceptors::{Interceptor, OutgoingRequest};
use qick_core::api::models::UserProfile;
use qick_core::api::normalizer::{MSG_NETWORK, MSG_TOKEN_EXPIRED, MSG_UNAUTHORIZED};
use qick_core::api::request::{MultipartBody, Payload, RequestOptions};
use qick_core::error::{ApiError, ErrorKind};
use qick_core::store::facility::FacilityState;
use qick_core::store::{RootState, Store};
use qick_core::store::session::{AuthPayload, SessionAction};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in_store() -> Store {
    let store = Store::default();
    store.dispatch(SessionAction::LoginSuccess(AuthPayload {
        user_data: UserProfile {
            id: "u1".to_string(),
            ..Default::default()
        },
        token: "t1".to_string(),
        refresh_token: Some("r1".to_string()),
    }));
    store
}

// the default facility date follows the clock; take it from `state`
fn initial_state_like(state: &RootState) -> RootState {
    RootState {
        facility: FacilityState {
            selected_date: state.facility.selected_date.clone(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn client_for(server: &MockServer, store: &Store) -> HttpClient {
    HttpClient::for_store(ClientSettings::new(&server.uri()), store).expect("client build")
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind temp port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Records whether the session was still signed in when the error hook ran.
struct SessionWitness {
    store: Store,
    seen: Arc<Mutex<Option<bool>>>,
}

impl Interceptor for SessionWitness {
    fn on_error(&self, _request: &OutgoingRequest, _error: &ApiError) {
        let authenticated = self.store.session().is_authenticated;
        *self.seen.lock().expect("witness lock") = Some(authenticated);
    }
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "u1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in_store();
    let body: Value = client_for(&server, &store)
        .fetch("/auth/profile", None, None)
        .await
        .expect("profile response");
    assert_eq!(body["user"]["id"], "u1");
}

#[tokio::test]
async fn test_anonymous_requests_have_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facilities"))
        .and(query_param("sport", "padel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = Store::default();
    let body: Value = client_for(&server, &store)
        .fetch(
            "/facilities",
            Some(vec![("sport".to_string(), "padel".to_string())]),
            None,
        )
        .await
        .expect("facility list");
    assert_eq!(body, json!([]));

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_unauthorized_resets_store_before_error_returns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;

    let store = signed_in_store();
    let seen = Arc::new(Mutex::new(None));
    let client = client_for(&server, &store).with_interceptor(SessionWitness {
        store: store.clone(),
        seen: seen.clone(),
    });

    let err = client
        .fetch::<Value>("/auth/profile", None, None)
        .await
        .expect_err("401 should fail");

    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, MSG_UNAUTHORIZED);
    assert_eq!(*seen.lock().expect("witness lock"), Some(false));
    let state = store.state();
    assert_eq!(state, initial_state_like(&state));
}

#[tokio::test]
async fn test_token_expired_status_also_forces_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(498))
        .mount(&server)
        .await;

    let store = signed_in_store();
    let err = client_for(&server, &store)
        .create::<Value>("/bookings", Some(json!({"court": "c1"}).into()), None)
        .await
        .expect_err("498 should fail");

    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.message, MSG_TOKEN_EXPIRED);
    assert!(!store.session().is_authenticated);
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/bookings/b1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = signed_in_store();
    let err = client_for(&server, &store)
        .delete::<Value>("/bookings/b1", None)
        .await
        .expect_err("403 should fail");

    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert!(store.session().is_authenticated);
}

#[tokio::test]
async fn test_validation_message_comes_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let store = Store::default();
    let err = client_for(&server, &store)
        .create::<Value>("/auth/signup", Some(json!({"email": "a@b.co"}).into()), None)
        .await
        .expect_err("400 should fail");

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Email already registered");
    assert_eq!(err.body, Some(json!({"message": "Email already registered"})));
}

#[tokio::test]
async fn test_json_payload_sets_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/bookings/b1"))
        .and(header("content-type", "application/json"))
        .and(header("x-trace", "abc"))
        .and(body_json(json!({"notes": "bring balls"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::default();
    let options = RequestOptions::default().header("X-Trace", "abc");
    let body: Value = client_for(&server, &store)
        .replace(
            "/bookings/b1",
            Some(Payload::json(&json!({"notes": "bring balls"})).expect("encodable")),
            Some(options),
        )
        .await
        .expect("update response");
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_multipart_payload_sets_form_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/auth/profile"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "u1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in_store();
    let form = MultipartBody::new()
        .text("firstName", "Ana")
        .file("avatar", "me.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]);
    let _: Value = client_for(&server, &store)
        .partial_update("/auth/profile", Some(form.into()), None)
        .await
        .expect("upload response");

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"firstName\""));
    assert!(body.contains("filename=\"me.png\""));
}

#[tokio::test]
async fn test_empty_success_body_decodes_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/bookings/b1/players/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = Store::default();
    let body: Option<Value> = client_for(&server, &store)
        .delete("/bookings/b1/players/p1", None)
        .await
        .expect("empty response");
    assert_eq!(body, None);
}

#[tokio::test]
async fn test_undecodable_success_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let store = Store::default();
    let err = client_for(&server, &store)
        .fetch::<Value>("/auth/profile", None, None)
        .await
        .expect_err("html is not json");
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let store = signed_in_store();
    let client = HttpClient::for_store(
        ClientSettings::new(&format!("http://127.0.0.1:{}", free_port())),
        &store,
    )
    .expect("client build");

    let err = client
        .fetch::<Value>("/auth/profile", None, None)
        .await
        .expect_err("nothing listens");
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, MSG_NETWORK);
    assert_eq!(err.status, None);
    assert!(store.session().is_authenticated);
}

#[tokio::test]
async fn test_slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": {"id": "u1"}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = signed_in_store();
    let options = RequestOptions::default().timeout(Duration::from_millis(100));
    let err = client_for(&server, &store)
        .fetch::<Value>("/auth/profile", None, Some(options))
        .await
        .expect_err("response arrives after the timeout");

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, MSG_NETWORK);
    assert_eq!(err.status, None);
    assert!(store.session().is_authenticated);
    assert_eq!(store.bearer_token().as_deref(), Some("t1"));
}

#[tokio::test]
async fn test_api_prefix_is_inserted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = ClientSettings::new(&format!("{}/", server.uri()));
    settings.api_prefix = "/api/v1".to_string();
    let client = HttpClient::new(settings).expect("client build");

    let _: Value = client
        .fetch("auth/profile", None, None)
        .await
        .expect("prefixed response");
}
