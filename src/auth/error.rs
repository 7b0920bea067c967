use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

// ============================================================================
// Auth Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Provider denied authorization: {0}")]
    ProviderDenied(String),

    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown or expired login state")]
    UnknownState,

    #[error("Invalid authorize URL: {0}")]
    InvalidAuthorizeUrl(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Authentication required")]
    Unauthenticated,
}

impl AuthError {
    /// Label used for the `oauth_logins_total` metric
    pub fn outcome(&self) -> &'static str {
        match self {
            AuthError::ProviderDenied(_) => "denied",
            AuthError::MissingParameter(_) | AuthError::UnknownState => "invalid_request",
            AuthError::InvalidAuthorizeUrl(_) => "misconfigured",
            AuthError::TokenExchange(_) => "exchange_failed",
            AuthError::Unauthenticated => "unauthenticated",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::ProviderDenied(_) => "access_denied",
            AuthError::MissingParameter(_) => "invalid_request",
            AuthError::UnknownState => "invalid_state",
            AuthError::InvalidAuthorizeUrl(_) => "server_error",
            AuthError::TokenExchange(_) => "token_exchange_failed",
            AuthError::Unauthenticated => "unauthorized",
        }
    }
}

/// Error response body for login failures
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub message: String,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ProviderDenied(_) | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::MissingParameter(_) | AuthError::UnknownState => StatusCode::BAD_REQUEST,
            AuthError::InvalidAuthorizeUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenExchange(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // protected routes answer 401 with an empty body
        if matches!(self, AuthError::Unauthenticated) {
            return HttpResponse::build(self.status_code()).finish();
        }

        HttpResponse::build(self.status_code()).json(AuthErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        })
    }
}
