// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CertifiedUserView, CertifiedUsersResponse, CertifyRequest, CertifyResponse,
        ConnectRequest, ConnectResponse, DisconnectResponse, IdentityKey, InitiatePaymentRequest,
        InitiatePaymentResponse, MessageResponse, SessionStatusResponse,
        StoreCertificationRequest,
    },
    state::AppState,
};

pub mod certified_users;
pub mod certify;
pub mod extract;
pub mod health;
pub mod payment;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/wallet/connect", post(session::connect))
        .route("/wallet/status", get(session::status))
        .route("/wallet/disconnect", post(session::disconnect))
        .route("/certify", post(certify::certify))
        .route("/store-certification", post(certify::store_certification))
        .route(
            "/certified-users",
            get(certified_users::list_certified_users),
        )
        .route(
            "/certified-users/search",
            get(certified_users::search_certified_users),
        )
        .route("/initiate-payment", post(payment::initiate_payment));

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::index,
        health::health,
        session::connect,
        session::status,
        session::disconnect,
        certify::certify,
        certify::store_certification,
        certified_users::list_certified_users,
        certified_users::search_certified_users,
        payment::initiate_payment
    ),
    components(
        schemas(
            IdentityKey,
            CertifiedUserView,
            CertifiedUsersResponse,
            CertifyRequest,
            CertifyResponse,
            StoreCertificationRequest,
            MessageResponse,
            ConnectRequest,
            ConnectResponse,
            SessionStatusResponse,
            DisconnectResponse,
            InitiatePaymentRequest,
            InitiatePaymentResponse,
            health::HealthResponse,
            health::ServiceIndex
        )
    ),
    tags(
        (name = "Health", description = "Liveness and service index"),
        (name = "Wallet", description = "Wallet session management"),
        (name = "Certification", description = "Identity certification and directory"),
        (name = "Payments", description = "Payments between certified users")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::test_support::TestApp;

    async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, Response) {
        let response = app.router().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(session) = session {
            builder = builder.header("X-Session-Id", session);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with_session(uri: &str, session: &str) -> Request<Body> {
        Request::get(uri)
            .header("X-Session-Id", session)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn connect_certify_list_disconnect() {
        let app = TestApp::new();

        let (status, response) = call(
            &app,
            post_json("/api/wallet/connect", None, json!({ "identityKey": "02alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let connected = body_json(response).await;
        let session_id = connected["sessionId"].as_str().unwrap().to_string();

        let (status, response) = call(
            &app,
            post_json("/api/certify", Some(&session_id), json!({ "alias": "Alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let certified = body_json(response).await;
        assert_eq!(certified["success"], true);
        assert_eq!(certified["alias"], "Alice");

        let (_, response) = call(
            &app,
            Request::get("/api/certified-users").body(Body::empty()).unwrap(),
        )
        .await;
        let listed = body_json(response).await;
        assert_eq!(listed["users"].as_array().unwrap().len(), 1);
        assert_eq!(listed["users"][0]["alias"], "Alice");
        assert_eq!(listed["users"][0]["identityKey"], certified["identityKey"]);

        let (status, response) = call(
            &app,
            post_json("/api/wallet/disconnect", Some(&session_id), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await["disconnected"], true);

        let (_, response) = call(&app, get_with_session("/api/wallet/status", &session_id)).await;
        let status_body = body_json(response).await;
        assert_eq!(status_body["connected"], false);
    }

    #[tokio::test]
    async fn payment_without_session_is_401_envelope() {
        let app = TestApp::new();

        let (status, response) = call(
            &app,
            post_json("/api/initiate-payment", None, json!({ "recipient": "02bob", "amount": 10 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("session"));
    }

    #[tokio::test]
    async fn malformed_json_is_400_envelope() {
        let app = TestApp::new();
        let request = Request::post("/api/wallet/connect")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, response) = call(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn malformed_query_is_400_envelope() {
        let app = TestApp::new();
        let request = Request::get("/api/certified-users/search?q=a&q=b")
            .body(Body::empty())
            .unwrap();

        let (status, response) = call(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("q"));
    }

    #[tokio::test]
    async fn certify_accepts_bare_post() {
        let app = TestApp::new();
        let request = Request::post("/api/certify").body(Body::empty()).unwrap();

        let (status, response) = call(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body_json(response).await.get("alias").is_none());
    }

    #[tokio::test]
    async fn health_and_request_id_headers() {
        let app = TestApp::new();

        let (status, response) = call(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["activeSessions"], 0);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"].get("/api/initiate-payment").is_some());
        assert!(doc["paths"].get("/api/certified-users/search").is_some());
    }
}
