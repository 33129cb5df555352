//! Server-side sessions.
//!
//! The browser only holds an opaque id in the [`SESSION_COOKIE`] cookie; the
//! username lives in the [`SessionStore`]. Expired sessions are dropped when
//! they are looked up and whenever a new session is opened.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "spendbook_session";

#[derive(Debug, Clone)]
struct Session {
    username: String,
    created_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a session for `username` and return its id.
    pub async fn create(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| session.created_at.elapsed() < self.ttl);
        if sessions.len() < before {
            tracing::debug!("dropped {} expired sessions", before - sessions.len());
        }

        sessions.insert(
            id,
            Session {
                username: username.to_string(),
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Username bound to the session id, if the session is still alive.
    pub async fn username(&self, id: Uuid) -> Option<String> {
        {
            let sessions = self.sessions.read().await;
            let session = sessions.get(&id)?;
            if session.created_at.elapsed() < self.ttl {
                return Some(session.username.clone());
            }
        }

        tracing::debug!("session {id} expired");
        self.sessions.write().await.remove(&id);
        None
    }

    pub async fn remove(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

    /// Session id carried by the request cookies.
    pub fn id_from(jar: &CookieJar) -> Option<Uuid> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    }

    /// Username of the session carried by the request cookies.
    pub async fn resolve(&self, jar: &CookieJar) -> Option<String> {
        let id = Self::id_from(jar)?;
        self.username(id).await
    }
}

pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
