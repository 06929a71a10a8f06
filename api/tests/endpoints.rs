//! Endpoint-level tests: the full platform wired against the in-memory
//! infrastructure, driven through HTTP.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use openquote_api::{build_router, ApiState, VIEWER_SESSION_HEADER};
use quote_common::Email;
use quote_core::{ClientRecord, EntityId};
use quote_gateway::GatewayConfig;

fn server() -> (TestServer, ApiState) {
    let state = ApiState::in_memory(
        "http://localhost:8080",
        GatewayConfig {
            operator_domains: vec!["openquote.cl".into()],
            ..GatewayConfig::default()
        },
    );
    state.registry.upsert(ClientRecord {
        id: EntityId::from_string("client-1"),
        legal_name: "ClientCo SpA".into(),
        tax_id: "76.123.456-7".into(),
        contact_emails: vec![Email::parse("buyer@clientco.com").unwrap()],
        active: true,
    });

    let server = TestServer::new(build_router(state.clone())).unwrap();
    (server, state)
}

fn quote_body() -> Value {
    json!({
        "client_id": "client-1",
        "items": [
            {
                "part_number": "PN-001",
                "name": "Widget",
                "quantity": 1,
                "unit_price": "100",
            }
        ],
        "terms": "Net 30",
        "validity_days": 30,
        "submit": true,
    })
}

async fn create_quote(server: &TestServer) -> Value {
    let response = server.post("/api/v1/quotes").json(&quote_body()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (server, _) = server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn quote_creation_returns_computed_totals() {
    let (server, _) = server();

    let quote = create_quote(&server).await;
    assert_eq!(quote["folio"], "Q-1000");
    assert_eq!(quote["version"], 1);
    assert_eq!(quote["status"], "open");
    assert_eq!(quote["subtotal"], "100");
    assert_eq!(quote["tax"], "19");
    assert_eq!(quote["total"], "119");
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
    let (server, _) = server();

    let mut body = quote_body();
    body["items"] = json!([]);
    let response = server.post("/api/v1/quotes").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope = response.json::<Value>();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"]["code"], "validation_error");
}

#[tokio::test]
async fn folio_lookup_tracks_the_latest_revision() {
    let (server, _) = server();
    let quote = create_quote(&server).await;
    let id = quote["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/v1/quotes/{id}/revisions"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/api/v1/verify/folio/Q-1000").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["version"], 2);

    // the distributed v1 artifact remains stably referenceable
    let response = server.get(&format!("/api/v1/verify/id/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["version"], 1);
}

#[tokio::test]
async fn verification_misses_are_uniform() {
    let (server, _) = server();

    for path in ["/api/v1/verify/folio/Q-9999", "/api/v1/verify/id/unknown"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let envelope = response.json::<Value>();
        assert_eq!(envelope["error"]["code"], "not_registered");
        assert_eq!(envelope["error"]["message"], "not registered");
    }
}

#[tokio::test]
async fn illegal_transitions_conflict_and_leave_status_unchanged() {
    let (server, _) = server();
    let quote = create_quote(&server).await;
    let id = quote["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/v1/quotes/{id}/status"))
        .json(&json!({"status": "accepted"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post(&format!("/api/v1/quotes/{id}/status"))
        .json(&json!({"status": "open"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "invalid_state_transition"
    );

    let response = server.get(&format!("/api/v1/verify/id/{id}")).await;
    assert_eq!(response.json::<Value>()["data"]["status"], "accepted");
}

#[tokio::test]
async fn consumer_addresses_are_denied_opaquely() {
    let (server, _) = server();

    let response = server
        .post("/api/v1/access/request")
        .json(&json!({
            "email": "user@gmail.com",
            "resource": "/api/v1/documents/folio/Q-1000",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let envelope = response.json::<Value>();
    assert_eq!(envelope["error"]["code"], "access_denied");
    assert_eq!(envelope["error"]["message"], "access denied");
}

#[tokio::test]
async fn gated_document_flow_end_to_end() {
    let (server, _) = server();
    create_quote(&server).await;
    let resource = "/api/v1/documents/folio/Q-1000";

    // no session header at all
    let response = server.get(resource).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // request access as a registered client contact
    let response = server
        .post("/api/v1/access/request")
        .json(&json!({"email": "buyer@clientco.com", "resource": resource}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let grant = response.json::<Value>()["data"].clone();
    assert_eq!(grant["destination"], resource);

    // redeem the one-time credential
    let token = grant["token"].as_str().unwrap();
    let response = server
        .post("/api/v1/access/redeem")
        .json(&json!({"token": token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let session_id = response.json::<Value>()["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    // a second redemption of the same token fails
    let response = server
        .post("/api/v1/access/redeem")
        .json(&json!({"token": token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // the session opens exactly the granted resource
    let response = server
        .get(resource)
        .add_header(
            HeaderName::from_static(VIEWER_SESSION_HEADER),
            HeaderValue::from_str(&session_id).unwrap(),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let document = response.json::<Value>()["data"].clone();
    assert_eq!(document["folio"], "Q-1000");
    assert!(document["artifact"]
        .as_str()
        .unwrap()
        .contains("QUOTE Q-1000 rev 1"));
    assert!(!document["verification_code"].as_str().unwrap().is_empty());

    // but not a sibling resource
    let response = server
        .get("/api/v1/documents/folio/Q-1001")
        .add_header(
            HeaderName::from_static(VIEWER_SESSION_HEADER),
            HeaderValue::from_str(&session_id).unwrap(),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // logout closes the door
    let response = server
        .post("/api/v1/access/logout")
        .json(&json!({"session_id": session_id}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(resource)
        .add_header(
            HeaderName::from_static(VIEWER_SESSION_HEADER),
            HeaderValue::from_str(&session_id).unwrap(),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registry_outage_reads_as_try_again_later() {
    let (server, state) = server();
    state.registry.set_available(false);

    let response = server
        .post("/api/v1/access/request")
        .json(&json!({
            "email": "buyer@clientco.com",
            "resource": "/api/v1/documents/folio/Q-1000",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let envelope = response.json::<Value>();
    assert_eq!(envelope["error"]["code"], "transient_error");
    assert_eq!(envelope["error"]["message"], "try again later");
}
