//! Session gate for protected routes
//!
//! Wraps a scope so that only requests carrying a live session cookie reach
//! the inner service. The resolved [`Session`] is attached to the request
//! extensions; everything else is answered with an empty `401`.
//!
//! ```rust,ignore
//! web::scope("")
//!     .wrap(SessionGate::new(sessions, "ess_session", true))
//!     .route("/hello", web::get().to(hello))
//! ```

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use super::error::AuthError;
use super::session::{Session, SessionStore};

/// Session gate middleware factory
pub struct SessionGate {
    sessions: Arc<SessionStore>,
    cookie_name: Rc<str>,
    enabled: bool,
}

impl SessionGate {
    /// With `enabled == false` the gate admits every request
    pub fn new(sessions: Arc<SessionStore>, cookie_name: &str, enabled: bool) -> Self {
        Self {
            sessions,
            cookie_name: Rc::from(cookie_name),
            enabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service: Rc::new(service),
            sessions: self.sessions.clone(),
            cookie_name: self.cookie_name.clone(),
            enabled: self.enabled,
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
    sessions: Arc<SessionStore>,
    cookie_name: Rc<str>,
    enabled: bool,
}

impl<S> SessionGateService<S> {
    fn resolve(&self, req: &ServiceRequest) -> Option<Session> {
        let cookie = req.cookie(&self.cookie_name)?;
        self.sessions.get(cookie.value())
    }
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if !self.enabled {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        }

        match self.resolve(&req) {
            Some(session) => {
                req.extensions_mut().insert(session);
                Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) })
            }
            None => {
                tracing::debug!(path = %req.path(), "Rejected request without a live session");
                let response = AuthError::Unauthenticated.error_response().map_into_right_body();
                let (req, _payload) = req.into_parts();
                Box::pin(async move { Ok(ServiceResponse::new(req, response)) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    const COOKIE: &str = "ess_session";

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Session>() {
            Some(session) => HttpResponse::Ok().body(session.access_token.clone()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_missing_cookie_rejected() {
        let sessions = Arc::new(SessionStore::new(60, 60));
        let app = test::init_service(
            App::new()
                .wrap(SessionGate::new(sessions, COOKIE, true))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_session_rejected() {
        let sessions = Arc::new(SessionStore::new(60, 60));
        let app = test::init_service(
            App::new()
                .wrap(SessionGate::new(sessions, COOKIE, true))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(COOKIE, "forged"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_live_session_admitted() {
        let sessions = Arc::new(SessionStore::new(60, 60));
        let session = sessions.create("token-xyz");
        let app = test::init_service(
            App::new()
                .wrap(SessionGate::new(sessions, COOKIE, true))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(COOKIE, session.id))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "token-xyz");
    }

    #[actix_web::test]
    async fn test_disabled_gate_admits_everyone() {
        let sessions = Arc::new(SessionStore::new(60, 60));
        let app = test::init_service(
            App::new()
                .wrap(SessionGate::new(sessions, COOKIE, false))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let body =
            test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body, "anonymous");
    }
}
