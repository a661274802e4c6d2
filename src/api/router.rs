use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::hooks;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .nest("/hooks", hooks::create_hooks_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::HOOK_SECRET_HEADER;
    use crate::domain::actor::{Actor, ActorId};
    use crate::domain::credentials::MockSecretProvider;
    use crate::domain::invitation::InvitationKey;
    use crate::domain::member::{Member, MemberId, Role, RoleSet, TeamId};
    use crate::domain::storage::Storage;
    use crate::infrastructure::account::AccountService;
    use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
    use crate::infrastructure::invitation::InvitationService;
    use crate::infrastructure::storage::InMemoryDocumentStore;

    const HOOK_SECRET: &str = "hook-test-secret";

    struct TestApp {
        router: Router,
        jwt: JwtService,
        store: InMemoryDocumentStore,
    }

    impl TestApp {
        fn bearer(&self, actor: &str) -> String {
            let token = self.jwt.generate(&ActorId::new(actor).unwrap()).unwrap();
            format!("Bearer {}", token)
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
            };
            (status, body)
        }

        async fn post(&self, uri: &str, actor: Option<&str>, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
            let mut builder = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(actor) = actor {
                builder = builder.header(header::AUTHORIZATION, self.bearer(actor));
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }
    }

    async fn test_app(hook_secret: Option<&str>) -> TestApp {
        let team = TeamId::new("T1").unwrap();
        let store = InMemoryDocumentStore::with_members(vec![
            Member::new(
                MemberId::new("MA").unwrap(),
                RoleSet::new().with(Role::coach([team.clone()])),
            ),
            Member::new(
                MemberId::new("M123").unwrap(),
                RoleSet::new().with(Role::player([team])),
            ),
        ]);

        let mut a = Actor::new(ActorId::new("A").unwrap());
        a.link_member(MemberId::new("MA").unwrap()).unwrap();
        Storage::<Actor>::create(&store, a).await.unwrap();
        Storage::<Actor>::create(&store, Actor::new(ActorId::new("B").unwrap()))
            .await
            .unwrap();

        let key = InvitationKey::generate();
        let mut secrets = MockSecretProvider::new();
        secrets
            .expect_invitation_key()
            .returning(move || Ok(key.clone()));

        let shared = Arc::new(store.clone());
        let jwt = JwtService::new(JwtConfig::new("router-test-secret", 1));
        let state = AppState {
            invitation_service: Arc::new(InvitationService::new(
                shared.clone(),
                shared.clone(),
                shared.clone(),
                Arc::new(secrets),
            )),
            account_service: Arc::new(AccountService::new(shared.clone())),
            jwt_service: Arc::new(jwt.clone()),
            members: shared,
            hook_secret: hook_secret.map(Arc::from),
        };

        TestApp {
            router: create_router_with_state(state),
            jwt,
            store,
        }
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app(None).await;

        for uri in ["/health", "/live", "/ready"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, _) = app.send(request).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_issue_and_redeem_over_http() {
        let app = test_app(None).await;

        let (status, body) = app
            .post("/v1/invitations", Some("A"), serde_json::json!({"target_member_id": "M123"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], false);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = app
            .post("/v1/invitations/redeem", Some("B"), serde_json::json!({"token": token}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"error": false}));

        let member: Member = app
            .store
            .get(&MemberId::new("M123").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.linked_actor_id().unwrap().as_str(), "B");

        let (status, body) = app
            .post("/v1/invitations/redeem", Some("B"), serde_json::json!({"token": token}))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let app = test_app(None).await;

        let (status, body) = app
            .post("/v1/invitations", None, serde_json::json!({"target_member_id": "M123"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], true);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/invitations/redeem")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::from(r#"{"token": "x"}"#))
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let app = test_app(None).await;

        let (status, body) = app
            .post("/v1/invitations", Some("A"), serde_json::json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");

        let (status, body) = app
            .post("/v1/invitations", Some("B"), serde_json::json!({"target_member_id": "M123"}))
            .await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], true);

        let (status, body) = app
            .post("/v1/invitations/redeem", Some("B"), serde_json::json!({"token": "AAAA"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_token");
        assert_eq!(body["reason"], "invalid invitation token");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test_app(None).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/invitations")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, app.bearer("A"))
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], true);
    }

    fn hook_request(method: Method, uri: &str, secret: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(secret) = secret {
            builder = builder.header(HOOK_SECRET_HEADER, secret);
        }
        builder.body(body).unwrap()
    }

    #[tokio::test]
    async fn test_account_hooks() {
        let app = test_app(Some(HOOK_SECRET)).await;

        let (status, _) = app
            .send(hook_request(
                Method::POST,
                "/hooks/accounts",
                Some(HOOK_SECRET),
                Body::from(r#"{"actor_id": "C"}"#),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(Storage::<Actor>::get(&app.store, &ActorId::new("C").unwrap())
            .await
            .unwrap()
            .is_some());

        let (status, _) = app
            .send(hook_request(
                Method::DELETE,
                "/hooks/accounts/C",
                Some(HOOK_SECRET),
                Body::empty(),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(Storage::<Actor>::get(&app.store, &ActorId::new("C").unwrap())
            .await
            .unwrap()
            .is_none());

        let (status, _) = app
            .send(hook_request(
                Method::DELETE,
                "/hooks/accounts/C",
                Some(HOOK_SECRET),
                Body::empty(),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_account_hooks_require_secret() {
        let app = test_app(Some(HOOK_SECRET)).await;

        let (status, _) = app
            .send(hook_request(
                Method::POST,
                "/hooks/accounts",
                Some("wrong"),
                Body::from(r#"{"actor_id": "C"}"#),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send(hook_request(
                Method::POST,
                "/hooks/accounts",
                None,
                Body::from(r#"{"actor_id": "C"}"#),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_account_hooks_disabled_without_secret() {
        let app = test_app(None).await;

        let (status, _) = app
            .send(hook_request(
                Method::POST,
                "/hooks/accounts",
                Some(HOOK_SECRET),
                Body::from(r#"{"actor_id": "C"}"#),
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
