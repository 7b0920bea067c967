use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::{OAuthSettings, MAX_TTL_SECS};

// ============================================================================
// Session Store
// ============================================================================
//
// In-memory sessions keyed by an opaque id carried in a cookie, plus the
// OAuth `state` values handed out by /login and not yet seen at /callback.
// Nothing here survives a restart.
//
// ============================================================================

#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// access tokens stay out of logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    pending_states: Mutex<HashMap<String, DateTime<Utc>>>,
    session_ttl: Duration,
    state_ttl: Duration,
}

impl SessionStore {
    pub fn new(session_ttl_secs: u64, state_ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            pending_states: Mutex::new(HashMap::new()),
            session_ttl: bounded_ttl(session_ttl_secs),
            state_ttl: bounded_ttl(state_ttl_secs),
        }
    }

    /// Lifetime of a new session, also used for the cookie's max-age
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn from_settings(settings: &OAuthSettings) -> Self {
        Self::new(settings.session_ttl_secs, settings.state_ttl_secs)
    }

    /// Issue a fresh OAuth `state` for a login round-trip
    pub fn issue_state(&self) -> String {
        let state = Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        let mut pending = self.pending_states.lock();
        pending.retain(|_, expires_at| *expires_at > now);
        pending.insert(state.clone(), expiry(now, self.state_ttl));

        state
    }

    /// Consume a `state`; true only for a known, unexpired value.
    /// Each state is accepted at most once.
    pub fn consume_state(&self, state: &str) -> bool {
        let now = Utc::now();
        match self.pending_states.lock().remove(state) {
            Some(expires_at) => expires_at > now,
            None => false,
        }
    }

    /// Open a session for a freshly obtained access token
    pub fn create(&self, access_token: impl Into<String>) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            access_token: access_token.into(),
            created_at: now,
            expires_at: expiry(now, self.session_ttl),
        };

        {
            let mut sessions = self.sessions.write();
            sessions.retain(|_, existing| !existing.is_expired(now));
            sessions.insert(session.id.clone(), session.clone());
        }

        tracing::debug!(
            session_id = %session.id,
            expires_at = %session.expires_at,
            "Session opened"
        );
        session
    }

    /// Live session for `id`. Expired sessions are dropped on lookup.
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(id) {
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().remove(id);
        tracing::debug!(session_id = %id, "Session expired");
        None
    }

    pub fn revoke(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn active_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .filter(|session| !session.is_expired(now))
            .count()
    }
}

// TTLs are clamped to MAX_TTL_SECS; expiries saturate instead of overflowing
fn bounded_ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
