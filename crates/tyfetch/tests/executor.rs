//! Executor tests against the scripted fake transport

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tyfetch::{
    CancellationToken, ErrorKind, HttpError, HttpMethod, RequestExecutor, RequestOptions,
    ResolvedRequest, Response, Transport, TransportError, TransportResponse,
};
use tyfetch_fake_transport::FakeTransport;

const BASE_URL: &str = "https://api.example.com/v1/";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Thing {
    id: u64,
    name: String,
}

fn client(fake: &FakeTransport) -> RequestExecutor<FakeTransport> {
    RequestExecutor::with_transport(BASE_URL, fake.clone()).expect("valid base url")
}

// === Request construction ===

#[tokio::test]
async fn test_get_resolves_to_exact_object() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({"id": 1, "name": "x"}));

    let thing: Thing = client(&fake)
        .get("/thing", RequestOptions::new())
        .await
        .expect("GET should succeed");

    assert_eq!(
        thing,
        Thing {
            id: 1,
            name: "x".to_string()
        }
    );

    let request = fake.last_request().expect("request recorded");
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url.as_str(), "https://api.example.com/thing");
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_body_verbs_send_canonical_json() {
    let fake = FakeTransport::new();
    fake.respond_json(201, json!({}))
        .respond_json(200, json!({}))
        .respond_json(200, json!({}));
    let client = client(&fake);

    let body = json!({"name": "widget", "tags": ["a", "b"], "price": 9.5, "gift": null});
    let expected = serde_json::to_string(&body).expect("serializable");

    let _: Value = client
        .post("items", &body, RequestOptions::new())
        .await
        .expect("POST should succeed");
    let _: Value = client
        .put("items/1", &body, RequestOptions::new())
        .await
        .expect("PUT should succeed");
    let _: Value = client
        .patch("items/1", &body, RequestOptions::new())
        .await
        .expect("PATCH should succeed");

    let requests = fake.requests();
    let methods: Vec<_> = requests.iter().map(|r| r.method).collect();
    assert_eq!(
        methods,
        vec![HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch]
    );

    for request in &requests {
        assert_eq!(request.body.as_deref(), Some(expected.as_str()));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }
    assert_eq!(
        requests[1].url.as_str(),
        "https://api.example.com/v1/items/1"
    );
}

#[tokio::test]
async fn test_typed_body_is_serialized() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({"id": 7, "name": "made"}));

    let payload = Thing {
        id: 7,
        name: "made".to_string(),
    };
    let created: Thing = client(&fake)
        .post("things", &payload, RequestOptions::new())
        .await
        .expect("POST should succeed");
    assert_eq!(created, payload);

    let request = fake.last_request().expect("request recorded");
    let sent: Thing =
        serde_json::from_str(request.body.as_deref().expect("body present")).expect("valid json");
    assert_eq!(sent, payload);
}

#[tokio::test]
async fn test_query_parameters_in_canonical_form() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!([]));

    let _: Vec<Thing> = client(&fake)
        .get(
            "/things",
            RequestOptions::new().query("count", 3).query("active", true),
        )
        .await
        .expect("GET should succeed");

    let request = fake.last_request().expect("request recorded");
    assert_eq!(
        request.url.as_str(),
        "https://api.example.com/things?count=3&active=true"
    );
}

#[tokio::test]
async fn test_identical_inputs_yield_identical_urls() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({})).respond_json(200, json!({}));
    let client = client(&fake);

    let options = RequestOptions::new()
        .query("b", "2")
        .query("a", 1)
        .query("b", false);
    let _: Value = client
        .get("search", options.clone())
        .await
        .expect("GET should succeed");
    let _: Value = client
        .get("search", options)
        .await
        .expect("GET should succeed");

    let requests = fake.requests();
    assert_eq!(requests[0].url.as_str(), requests[1].url.as_str());
    assert_eq!(requests[0].url.query(), Some("b=2&a=1&b=false"));
}

#[tokio::test]
async fn test_header_override() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({}));

    let _: Value = client(&fake)
        .post(
            "notes",
            &json!("plain"),
            RequestOptions::new()
                .header("Content-Type", "text/plain")
                .header("X-Request-Id", "42"),
        )
        .await
        .expect("POST should succeed");

    let request = fake.last_request().expect("request recorded");
    assert_eq!(request.header("Content-Type"), Some("text/plain"));
    assert_eq!(request.header("X-Request-Id"), Some("42"));
    assert_eq!(request.headers.len(), 2);
}

#[tokio::test]
async fn test_delete_without_body() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({"deleted": true}));

    let result: Value = client(&fake)
        .delete("things/1", RequestOptions::new())
        .await
        .expect("DELETE should succeed");
    assert_eq!(result, json!({"deleted": true}));

    let request = fake.last_request().expect("request recorded");
    assert_eq!(request.method, HttpMethod::Delete);
    assert!(request.body.is_none());
}

// === Error classification ===

#[tokio::test]
async fn test_404_without_reason_phrase() {
    let fake = FakeTransport::new();
    fake.respond_status(404);

    let result: Response<Thing> = client(&fake).get("/missing", RequestOptions::new()).await;

    if let Err(HttpError::Status { status, message }) = result {
        assert_eq!(status, 404);
        assert_eq!(message, "Client error: 404");
    } else {
        panic!("Expected HttpError::Status");
    }
}

#[tokio::test]
async fn test_503_server_error() {
    let fake = FakeTransport::new();
    fake.respond_status(503);

    let result: Response<Thing> = client(&fake).get("/busy", RequestOptions::new()).await;

    if let Err(HttpError::Status { status, message }) = result {
        assert_eq!(status, 503);
        assert_eq!(message, "Server error: 503");
    } else {
        panic!("Expected HttpError::Status");
    }
}

#[tokio::test]
async fn test_reason_phrase_is_used_when_supplied() {
    let fake = FakeTransport::new();
    fake.respond_raw(TransportResponse::new(409, "").with_status_text("Conflict"));

    let result: Response<Value> = client(&fake)
        .put("things/1", &json!({}), RequestOptions::new())
        .await;

    assert!(matches!(
        result,
        Err(HttpError::Status { status: 409, message }) if message == "Conflict"
    ));
}

#[tokio::test]
async fn test_redirect_status_is_http_error() {
    let fake = FakeTransport::new();
    fake.respond_status(304);

    let result: Response<Value> = client(&fake).get("/cached", RequestOptions::new()).await;

    assert!(matches!(
        result,
        Err(HttpError::Status { status: 304, message }) if message == "HTTP error: 304"
    ));
}

#[tokio::test]
async fn test_network_failure() {
    let fake = FakeTransport::new();
    fake.fail(TransportError::Unreachable("dns lookup failed".to_string()));

    let result: Response<Thing> = client(&fake).get("/thing", RequestOptions::new()).await;

    let err = result.expect_err("network failure");
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.to_string(), "Network error occurred");
}

#[tokio::test]
async fn test_transport_timeout_message_is_kept() {
    let fake = FakeTransport::new();
    fake.fail(TransportError::Cancelled(Some("deadline of 5s exceeded".to_string())));

    let result: Response<Thing> = client(&fake).get("/thing", RequestOptions::new()).await;

    assert!(matches!(
        result,
        Err(HttpError::Timeout(message)) if message == "deadline of 5s exceeded"
    ));
}

#[tokio::test]
async fn test_malformed_json_passes_through_unclassified() {
    let fake = FakeTransport::new();
    fake.respond_raw(TransportResponse::new(200, "{\"id\": 1,"));

    let result: Response<Thing> = client(&fake).get("/thing", RequestOptions::new()).await;

    let err = result.expect_err("parse failure");
    assert_eq!(err.kind(), ErrorKind::Unclassified);
    assert!(matches!(err, HttpError::Deserialization(_)));
}

#[tokio::test]
async fn test_shape_mismatch_is_unclassified() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({"id": "not a number"}));

    let result: Response<Thing> = client(&fake).get("/thing", RequestOptions::new()).await;
    assert!(matches!(result, Err(HttpError::Deserialization(_))));
}

// === Cancellation ===

#[tokio::test]
async fn test_cancel_before_transport_resolves() {
    let fake = FakeTransport::new();
    fake.hang();
    let client = client(&fake);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result: Response<Thing> = client
        .get("/slow", RequestOptions::new().cancellation(token))
        .await;

    assert!(matches!(
        result,
        Err(HttpError::Timeout(message)) if message == "Request timed out"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_delayed_response() {
    let fake = FakeTransport::new();
    fake.respond_after(
        Duration::from_secs(60),
        TransportResponse::new(200, r#"{"id": 1, "name": "late"}"#),
    );
    let client = client(&fake);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let result: Response<Thing> = client
        .get("/slow", RequestOptions::new().cancellation(token))
        .await;

    assert_eq!(result.map_err(|e| e.kind()).err(), Some(ErrorKind::Timeout));
}

/// Never completes and never looks at its token
#[derive(Debug)]
struct DeafTransport;

#[async_trait]
impl Transport for DeafTransport {
    async fn send(
        &self,
        _request: ResolvedRequest,
        _cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancel_cuts_off_transport_ignoring_token() {
    let client = RequestExecutor::with_transport(BASE_URL, DeafTransport).expect("valid base url");

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result: Response<Value> = client
        .get("/never", RequestOptions::new().cancellation(token))
        .await;

    assert!(matches!(result, Err(HttpError::Timeout(_))));
}

// === Concurrency ===

#[tokio::test]
async fn test_concurrent_calls_share_executor() {
    let fake = FakeTransport::new();
    fake.hang().respond_json(200, json!({"id": 2, "name": "fast"}));
    let client = Arc::new(client(&fake));

    let token = CancellationToken::new();
    let slow = {
        let client = Arc::clone(&client);
        let token = token.clone();
        tokio::spawn(async move {
            client
                .get::<Thing>("/slow", RequestOptions::new().cancellation(token))
                .await
        })
    };

    // Let the slow call claim the hanging outcome first
    while fake.pending() == 2 {
        tokio::task::yield_now().await;
    }

    let fast: Thing = client
        .get("/fast", RequestOptions::new())
        .await
        .expect("fast call is not blocked by the slow one");
    assert_eq!(fast.name, "fast");

    token.cancel();
    let slow = slow.await.expect("task completes");
    assert!(matches!(slow, Err(HttpError::Timeout(_))));
}

#[tokio::test]
async fn test_shared_transport_behind_arc() {
    let fake = FakeTransport::new();
    fake.respond_json(200, json!({"id": 3, "name": "arc"}));

    let transport: Arc<dyn Transport> = Arc::new(fake.clone());
    let client = RequestExecutor::with_transport(BASE_URL, transport).expect("valid base url");

    let thing: Thing = client
        .get("/arc", RequestOptions::new())
        .await
        .expect("GET should succeed");
    assert_eq!(thing.id, 3);
}
