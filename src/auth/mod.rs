// ============================================================================
// Auth - OAuth2 Login and Cookie Sessions
// ============================================================================
//
// - /login redirects to the provider's authorize endpoint
// - /callback exchanges the code and opens a session
// - SessionGate keeps every protected route behind a live session cookie
//
// ============================================================================

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod oauth;
pub mod session;

pub use error::AuthError;
pub use middleware::SessionGate;
pub use oauth::{HttpOAuthClient, OAuthClient};
pub use session::SessionStore;
