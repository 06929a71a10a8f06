//! Viewer Session Management
//!
//! Tracks each viewer through the access lifecycle:
//! `Unauthenticated → PendingVerification → Authenticated { scope }`,
//! returning to `Unauthenticated` on expiry or logout.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use quote_common::Email;

use crate::AccessState;

/// One viewer's session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSession {
    pub id: String,
    pub email: Email,
    pub state: AccessState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ViewerSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session manager
pub struct SessionManager {
    sessions: dashmap::DashMap<String, ViewerSession>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: dashmap::DashMap::new(),
            ttl,
        }
    }

    /// Open a pending session for an accepted email.
    pub fn start_pending(&self, email: Email) -> ViewerSession {
        let now = Utc::now();
        let session = ViewerSession {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            state: AccessState::PendingVerification,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Promote a pending session to `Authenticated` with the credential's
    /// scope. Returns `None` when the session is gone, expired, or not
    /// pending.
    pub fn authenticate(&self, session_id: &str, scope: String) -> Option<ViewerSession> {
        let mut entry = self.sessions.get_mut(session_id)?;
        if entry.is_expired(Utc::now()) || entry.state != AccessState::PendingVerification {
            return None;
        }

        let now = Utc::now();
        entry.state = AccessState::Authenticated { scope };
        entry.expires_at = now + self.ttl;
        Some(entry.clone())
    }

    /// Whether this session may read the resource at `path`.
    ///
    /// True only for a live `Authenticated` session whose scope equals the
    /// path exactly; a credential's scope is never widened after issuance.
    pub fn authorizes(&self, session_id: &str, path: &str) -> bool {
        match self.sessions.get(session_id) {
            Some(session) => {
                !session.is_expired(Utc::now())
                    && matches!(
                        &session.state,
                        AccessState::Authenticated { scope } if scope == path
                    )
            }
            None => false,
        }
    }

    /// Explicit logout: the viewer returns to `Unauthenticated`.
    pub fn logout(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drop expired sessions. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let count = expired.len();
        for id in expired {
            self.sessions.remove(&id);
        }
        count
    }

    pub fn get(&self, session_id: &str) -> Option<ViewerSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "/api/v1/documents/folio/Q-1000";

    fn manager() -> SessionManager {
        SessionManager::new(Duration::minutes(15))
    }

    fn email() -> Email {
        Email::parse("buyer@clientco.com").unwrap()
    }

    #[test]
    fn pending_session_authenticates_once_redeemed() {
        let manager = manager();
        let session = manager.start_pending(email());
        assert_eq!(session.state, AccessState::PendingVerification);
        assert!(!manager.authorizes(&session.id, SCOPE));

        let authed = manager.authenticate(&session.id, SCOPE.into()).unwrap();
        assert_eq!(
            authed.state,
            AccessState::Authenticated {
                scope: SCOPE.into()
            }
        );
        assert!(manager.authorizes(&session.id, SCOPE));
    }

    #[test]
    fn scope_must_match_exactly() {
        let manager = manager();
        let session = manager.start_pending(email());
        manager.authenticate(&session.id, SCOPE.into()).unwrap();

        assert!(!manager.authorizes(&session.id, "/api/v1/documents/folio/Q-1001"));
        assert!(!manager.authorizes(&session.id, "/api/v1/documents"));
    }

    #[test]
    fn authenticate_requires_a_pending_session() {
        let manager = manager();
        assert!(manager.authenticate("missing", SCOPE.into()).is_none());

        let session = manager.start_pending(email());
        manager.authenticate(&session.id, SCOPE.into()).unwrap();
        // a second redemption attempt against the same session
        assert!(manager.authenticate(&session.id, SCOPE.into()).is_none());
    }

    #[test]
    fn logout_returns_to_unauthenticated() {
        let manager = manager();
        let session = manager.start_pending(email());
        manager.authenticate(&session.id, SCOPE.into()).unwrap();

        assert!(manager.logout(&session.id));
        assert!(!manager.authorizes(&session.id, SCOPE));
        assert!(!manager.logout(&session.id));
    }

    #[test]
    fn expired_sessions_neither_authorize_nor_authenticate() {
        let manager = SessionManager::new(Duration::minutes(-1));
        let session = manager.start_pending(email());

        assert!(manager.authenticate(&session.id, SCOPE.into()).is_none());
        assert!(!manager.authorizes(&session.id, SCOPE));
        assert_eq!(manager.cleanup_expired(), 1);
        assert!(manager.get(&session.id).is_none());
    }
}
