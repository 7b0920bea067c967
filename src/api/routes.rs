//! Application routes
//!
//! Public:
//! - GET /login, GET /callback, GET /logout - OAuth login round-trip
//! - GET /docs, GET /docs/openapi.json - API documentation
//!
//! Behind the session gate:
//! - GET /hello
//! - /data/users, /data/messages - generic CRUD over the in-memory stores

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use super::crud::list_crud;
use crate::auth::{self, OAuthClient, SessionGate, SessionStore};
use crate::config::{AppConfig, OAuthSettings};
use crate::docs::{self, ApiDocs};
use crate::health::HealthRegistry;
use crate::metrics::Metrics;
use crate::models::{seed_messages, seed_users, Entity, Message, User};
use crate::store::EntityStore;

pub const DATA_PREFIX: &str = "/data";

/// Everything the handlers share, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<EntityStore<User>>,
    pub messages: Arc<EntityStore<Message>>,
    pub sessions: Arc<SessionStore>,
    pub oauth: OAuthSettings,
    pub oauth_client: Arc<dyn OAuthClient>,
    pub metrics: Arc<Metrics>,
    pub docs: Arc<ApiDocs>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        oauth_client: Arc<dyn OAuthClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let users = Arc::new(EntityStore::with_seed(seed_users()));
        let messages = Arc::new(EntityStore::with_seed(seed_messages()));

        metrics.set_store_size(User::COLLECTION, users.len());
        metrics.set_store_size(Message::COLLECTION, messages.len());

        let docs = ApiDocs::new(&config.docs)
            .with_oauth(&config.oauth)
            .with_hello()
            .with_crud::<User>(DATA_PREFIX)
            .with_crud::<Message>(DATA_PREFIX);

        Self {
            users,
            messages,
            sessions: Arc::new(SessionStore::from_settings(&config.oauth)),
            oauth: config.oauth.clone(),
            oauth_client,
            metrics,
            docs: Arc::new(docs),
        }
    }

    /// Components reported on /health
    pub fn health(&self) -> HealthRegistry {
        HealthRegistry::new()
            .register(self.users.clone())
            .register(self.messages.clone())
            .register(self.sessions.clone())
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.oauth.clone()))
        .app_data(web::Data::new(state.sessions.clone()))
        .app_data(web::Data::from(state.oauth_client.clone()))
        .app_data(web::Data::new(state.metrics.clone()))
        .app_data(web::Data::from(state.docs.clone()))
        .route("/login", web::get().to(auth::handlers::login))
        .route("/callback", web::get().to(auth::handlers::callback))
        .route("/logout", web::get().to(auth::handlers::logout))
        .service(docs::scope())
        .service(
            web::scope("")
                .wrap(SessionGate::new(
                    state.sessions.clone(),
                    &state.oauth.cookie_name,
                    state.oauth.enabled,
                ))
                .route("/hello", web::get().to(hello))
                .service(
                    web::scope(DATA_PREFIX)
                        .service(list_crud(state.users.clone()))
                        .service(list_crud(state.messages.clone())),
                ),
        );
}

async fn hello() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::TokenResponse;
    use crate::auth::AuthError;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NoProvider;

    #[async_trait]
    impl OAuthClient for NoProvider {
        async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, AuthError> {
            Err(AuthError::TokenExchange("no provider in tests".to_string()))
        }
    }

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.oauth.client_id = "client-123".to_string();
        AppState::new(
            &config,
            Arc::new(NoProvider),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = $state.clone();
            test::init_service(App::new().configure(move |cfg| configure(cfg, &state))).await
        }};
    }

    #[actix_web::test]
    async fn test_user_scenario() {
        let state = test_state();
        let session = state.sessions.create("token");
        let cookie = Cookie::new(state.oauth.cookie_name.clone(), session.id.clone());
        let app = app!(state);

        let get = |uri: &str| {
            test::TestRequest::get()
                .uri(uri)
                .cookie(cookie.clone())
                .to_request()
        };

        let resp = test::call_service(&app, get("/data/users/1")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "id": 1, "name": "John" }));

        let missing = test::call_service(&app, get("/data/users/2")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let malformed = test::call_service(&app, get("/data/users/abc")).await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let create = test::TestRequest::post()
            .uri("/data/users")
            .cookie(cookie.clone())
            .set_json(json!({ "id": 2, "name": "Jane" }))
            .to_request();
        assert_eq!(test::call_service(&app, create).await.status(), StatusCode::NO_CONTENT);

        let all: Value = test::call_and_read_body_json(&app, get("/data/users")).await;
        assert_eq!(all, json!([{ "id": 1, "name": "John" }, { "id": 2, "name": "Jane" }]));

        let delete = test::TestRequest::delete()
            .uri("/data/users/1")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, delete).await.status(), StatusCode::NO_CONTENT);
        let deleted = test::call_service(&app, get("/data/users/1")).await;
        assert_eq!(deleted.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_stores_are_independent() {
        let state = test_state();
        let session = state.sessions.create("token");
        let cookie = Cookie::new(state.oauth.cookie_name.clone(), session.id.clone());
        let app = app!(state);

        let req = test::TestRequest::delete()
            .uri("/data/messages/1")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        assert!(state.messages.is_empty());
        assert_eq!(state.users.len(), 1);
    }

    #[actix_web::test]
    async fn test_seeded_messages() {
        let state = test_state();
        let session = state.sessions.create("token");
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/data/messages")
            .cookie(Cookie::new(state.oauth.cookie_name.clone(), session.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([{ "id": 1, "text": "Hello World" }]));
    }

    #[actix_web::test]
    async fn test_protected_routes_require_session() {
        let state = test_state();
        let app = app!(state);

        for uri in ["/hello", "/data/users", "/data/users/1", "/data/messages"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }

        let req = test::TestRequest::post()
            .uri("/data/users")
            .set_json(json!({ "id": 5, "name": "Eve" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.users.len(), 1);
    }

    #[actix_web::test]
    async fn test_hello_with_session() {
        let state = test_state();
        let session = state.sessions.create("token");
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/hello")
            .cookie(Cookie::new(state.oauth.cookie_name.clone(), session.id))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "Hello");
    }

    #[actix_web::test]
    async fn test_public_routes_skip_gate() {
        let state = test_state();
        let app = app!(state);

        let docs = test::TestRequest::get().uri("/docs/openapi.json").to_request();
        assert_eq!(test::call_service(&app, docs).await.status(), StatusCode::OK);

        let login = test::TestRequest::get().uri("/login").to_request();
        assert_eq!(test::call_service(&app, login).await.status(), StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn test_oauth_disabled_opens_data_routes() {
        let mut config = AppConfig::default();
        config.oauth.enabled = false;
        let metrics = Arc::new(Metrics::new().unwrap());
        let state = AppState::new(&config, Arc::new(NoProvider), metrics);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/data/users/1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_health_covers_every_store() {
        let report = test_state().health().check();
        let names: Vec<&str> = report.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["users", "messages", "sessions"]);
    }
}
