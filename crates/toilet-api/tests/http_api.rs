//! Drives the full router in-process: JSON in, JSON and status codes out.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use toilet_api::{AppStateInner, Authenticator, HashCost, ToiletService, router};
use toilet_db::MemoryStore;

struct TestApp {
    router: Router,
    authenticator: Arc<Authenticator>,
}

fn test_app() -> TestApp {
    let cheap = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    let authenticator = Arc::new(Authenticator::new("integration-secret", cheap).unwrap());
    let service = ToiletService::new(Arc::new(MemoryStore::new()), authenticator.clone());
    let state = AppStateInner::new(service, authenticator.clone());

    TestApp {
        router: router(state),
        authenticator,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, username: &str, password: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/user/create",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn add_toilet(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/toilet/add",
                Some(token),
                Some(json!({ "name": name, "point": "1.0,2.0" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

#[tokio::test]
async fn register_hides_password_hash() {
    let app = test_app();
    let body = app.register("alice", "pw1").await;

    assert_eq!(body["username"], "alice");
    assert_eq!(body["toilets_found"], 0);
    assert!(body["id"].as_i64().unwrap() > 0);
    let fields: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
    assert_eq!(fields.len(), 3);
}

#[tokio::test]
async fn duplicate_registration_is_409() {
    let app = test_app();
    app.register("alice", "pw1").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/user/create",
            None,
            Some(json!({ "username": "alice", "password": "pw2" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn empty_credentials_are_400() {
    let app = test_app();
    let (status, body) = app
        .call(
            Method::POST,
            "/user/create",
            None,
            Some(json!({ "username": "", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn malformed_json_is_400_with_json_body() {
    let app = test_app();
    let (status, body) = app
        .call(
            Method::POST,
            "/review/add",
            Some(&app.authenticator.issue_token(1).unwrap()),
            Some(json!({ "toilet_id": "one", "score": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["message"], "request body has missing or invalid fields");
}

#[tokio::test]
async fn unparseable_json_gets_a_fixed_message() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/user/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "request body is not valid JSON");
}

#[tokio::test]
async fn wrong_method_on_protected_route_is_405() {
    let app = test_app();
    let (status, _) = app.call(Method::GET, "/toilet/add", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = app.call(Method::GET, "/toilet/delete", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn login_token_embeds_user_id() {
    let app = test_app();
    let user = app.register("alice", "pw1").await;
    let token = app.login("alice", "pw1").await;

    let identity = app.authenticator.validate_token(&token).unwrap();
    assert_eq!(identity.user_id(), user["id"].as_i64().unwrap());
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let app = test_app();
    app.register("alice", "pw1").await;

    let (unknown_status, unknown_body) = app
        .call(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "username": "nobody", "password": "pw1" })),
        )
        .await;
    let (wrong_status, wrong_body) = app
        .call(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "bad" })),
        )
        .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app();
    let body = json!({ "name": "Park", "point": "1,2" });

    let (status, _) = app
        .call(Method::POST, "/toilet/add", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::POST, "/toilet/add", Some("not.a.jwt"), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = app
        .authenticator
        .issue_token_at(1, chrono::Utc::now() - chrono::Duration::hours(100))
        .unwrap();
    let (status, body) = app
        .call(Method::POST, "/toilet/add", Some(&expired), Some(body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app
        .call(Method::DELETE, "/toilet/delete", None, Some(json!({ "id": 1 })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn client_supplied_founder_is_ignored() {
    let app = test_app();
    let alice = app.register("alice", "pw").await;
    let bob = app.register("bob", "pw").await;
    let token = app.login("alice", "pw").await;

    let (status, created) = app
        .call(
            Method::POST,
            "/toilet/add",
            Some(&token),
            Some(json!({
                "name": "Park",
                "point": "1.0,2.0",
                "type": "public",
                "founder_id": bob["id"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["founder_id"], alice["id"]);
    assert_eq!(created["name"], "Park");
    assert_eq!(created["point"], "1.0,2.0");

    let (status, listed) = app.call(Method::GET, "/toilets", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed[0]["founder_id"], alice["id"]);
    assert_eq!(listed[0]["type"], "public");
}

#[tokio::test]
async fn delete_is_founder_only_and_once() {
    let app = test_app();
    app.register("alice", "pw").await;
    app.register("bob", "pw").await;
    let alice = app.login("alice", "pw").await;
    let bob = app.login("bob", "pw").await;
    let toilet = app.add_toilet(&alice, "Park").await;
    let target = json!({ "id": toilet["id"] });

    let (status, body) = app
        .call(Method::DELETE, "/toilet/delete", Some(&bob), Some(target.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_authorized_or_missing");

    let (_, listed) = app.call(Method::GET, "/toilets", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(Method::DELETE, "/toilet/delete", Some(&alice), Some(target.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "deleted" }));

    let (status, _) = app
        .call(Method::POST, "/toilet/delete", Some(&alice), Some(target))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn out_of_range_score_is_400() {
    let app = test_app();
    app.register("alice", "pw").await;
    let token = app.login("alice", "pw").await;
    let toilet = app.add_toilet(&token, "Park").await;

    for score in [0.0, 5.1, -2.0] {
        let (status, _) = app
            .call(
                Method::POST,
                "/review/add",
                Some(&token),
                Some(json!({
                    "toilet_id": toilet["id"],
                    "title": "t",
                    "review_text": "x",
                    "score": score,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let uri = format!("/toilet/{}/reviews", toilet["id"]);
    let (_, reviews) = app.call(Method::GET, &uri, None, None).await;
    assert!(reviews.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_toilet_id_in_path_is_400() {
    let app = test_app();
    let (status, body) = app
        .call(Method::GET, "/toilet/abc/reviews", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = app.call(Method::GET, "/toilet/77/reviews", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn alice_registers_adds_and_reviews() {
    let app = test_app();
    let alice = app.register("alice", "pw1").await;
    let token = app.login("alice", "pw1").await;

    let toilet = app.add_toilet(&token, "Park").await;
    assert_eq!(toilet["founder_id"], alice["id"]);

    let (status, body) = app
        .call(
            Method::POST,
            "/review/add",
            Some(&token),
            Some(json!({
                "toilet_id": toilet["id"],
                "title": "Spotless",
                "review_text": "Even had soap",
                "score": 4.5,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let uri = format!("/toilet/{}/reviews", toilet["id"]);
    let (status, reviews) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = reviews.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["title"], "Spotless");
    assert_eq!(reviews[0]["score"], 4.5);
    assert_eq!(reviews[0]["user_id"], alice["id"]);
    assert_eq!(reviews[0]["username"], "alice");
    assert!(reviews[0]["created_at"].is_string());
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
