//! OAuth login handlers
//!
//! - GET /login    - redirect to the provider's authorize endpoint
//! - GET /callback - exchange the code, open a session, redirect to /hello
//! - GET /logout   - drop the session and clear its cookie

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use super::error::AuthError;
use super::oauth::{authorize_url, OAuthClient};
use super::session::{Session, SessionStore};
use crate::config::OAuthSettings;
use crate::metrics::Metrics;

const AFTER_LOGIN: &str = "/hello";

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// GET /login
pub async fn login(
    settings: web::Data<OAuthSettings>,
    sessions: web::Data<Arc<SessionStore>>,
) -> Result<HttpResponse, AuthError> {
    if !settings.enabled {
        return Ok(redirect(AFTER_LOGIN));
    }

    let state = sessions.issue_state();
    let url = authorize_url(&settings, &state)?;

    tracing::debug!(provider = %settings.provider_name, "Redirecting to provider for login");
    Ok(redirect(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /callback
pub async fn callback(
    query: web::Query<CallbackQuery>,
    settings: web::Data<OAuthSettings>,
    sessions: web::Data<Arc<SessionStore>>,
    client: web::Data<dyn OAuthClient>,
    metrics: web::Data<Arc<Metrics>>,
) -> Result<HttpResponse, AuthError> {
    let result = complete_login(&query, &sessions, client.get_ref()).await;

    match &result {
        Ok(session) => {
            metrics.record_login("success");
            tracing::info!(session_id = %session.id, "Login completed");
        }
        Err(e) => {
            metrics.record_login(e.outcome());
            tracing::warn!(error = %e, "Login callback rejected");
        }
    }
    let session = result?;
    metrics.set_active_sessions(sessions.active_count());

    let cookie = Cookie::build(settings.cookie_name.clone(), session.id)
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(sessions.session_ttl().num_seconds()))
        .finish();

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, AFTER_LOGIN))
        .cookie(cookie)
        .finish())
}

/// GET /logout
pub async fn logout(
    req: HttpRequest,
    settings: web::Data<OAuthSettings>,
    sessions: web::Data<Arc<SessionStore>>,
    metrics: web::Data<Arc<Metrics>>,
) -> HttpResponse {
    if let Some(cookie) = req.cookie(&settings.cookie_name) {
        if sessions.revoke(cookie.value()) {
            tracing::info!(session_id = %cookie.value(), "Session closed");
        }
    }
    metrics.set_active_sessions(sessions.active_count());

    let mut removal = Cookie::build(settings.cookie_name.clone(), "")
        .path("/")
        .finish();
    removal.make_removal();

    HttpResponse::NoContent().cookie(removal).finish()
}

async fn complete_login(
    query: &CallbackQuery,
    sessions: &SessionStore,
    client: &dyn OAuthClient,
) -> Result<Session, AuthError> {
    if let Some(error) = &query.error {
        return Err(AuthError::ProviderDenied(error.clone()));
    }

    let state = query
        .state
        .as_deref()
        .ok_or(AuthError::MissingParameter("state"))?;
    let code = query
        .code
        .as_deref()
        .ok_or(AuthError::MissingParameter("code"))?;

    if !sessions.consume_state(state) {
        return Err(AuthError::UnknownState);
    }

    let token = client.exchange_code(code).await?;
    Ok(sessions.create(token.access_token))
}
