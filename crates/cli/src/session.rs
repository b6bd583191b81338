use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use medchat_protocol::Notice;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) const SESSION_COOKIE: &str = "medchat_session";

/// Upper bound on live sessions. Past it the oldest anonymous session is
/// evicted first, then the oldest signed-in one.
pub(crate) const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Default)]
struct SessionData {
    user: Option<String>,
    notices: Vec<Notice>,
    created: u64,
}

impl SessionData {
    fn is_idle(&self) -> bool {
        self.user.is_none() && self.notices.is_empty()
    }
}

#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<String, SessionData>,
    next_seq: u64,
}

impl SessionTable {
    fn evict_oldest(&mut self) {
        let oldest = |anonymous_only: bool| {
            self.entries
                .iter()
                .filter(|(_, data)| !anonymous_only || data.user.is_none())
                .min_by_key(|(_, data)| data.created)
                .map(|(id, _)| id.clone())
        };
        let victim = oldest(true).or_else(|| oldest(false));
        if let Some(id) = victim {
            self.entries.remove(&id);
        }
    }
}

/// Server-side session table keyed by a random cookie value.
///
/// Sessions with neither a user nor pending notices are dropped as soon as
/// their notices are read, so the table only holds state someone can still
/// observe.
#[derive(Debug)]
pub struct SessionStore {
    table: Mutex<SessionTable>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

/// A session resolved for one request. `is_new` means the cookie still has
/// to be sent to the client.
#[derive(Debug, Clone)]
pub(crate) struct SessionHandle {
    pub id: String,
    pub is_new: bool,
}

impl SessionHandle {
    /// Attach the session cookie to `response` when it was just created.
    pub fn attach(&self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::default(),
            capacity: capacity.max(1),
        }
    }

    /// Existing session named by the request cookie, if the server knows it.
    pub(crate) fn existing(&self, headers: &HeaderMap) -> Option<SessionHandle> {
        let id = session_id_from_headers(headers)?;
        self.lock()
            .entries
            .contains_key(&id)
            .then_some(SessionHandle { id, is_new: false })
    }

    /// Existing session or a freshly minted one.
    pub(crate) fn open(&self, headers: &HeaderMap) -> Result<SessionHandle, getrandom::Error> {
        if let Some(handle) = self.existing(headers) {
            return Ok(handle);
        }
        let id = new_session_id()?;
        let mut table = self.lock();
        while table.entries.len() >= self.capacity {
            table.evict_oldest();
        }
        let created = table.next_seq;
        table.next_seq += 1;
        table.entries.insert(
            id.clone(),
            SessionData {
                created,
                ..SessionData::default()
            },
        );
        Ok(SessionHandle { id, is_new: true })
    }

    pub(crate) fn flash(&self, id: &str, notice: Notice) {
        if let Some(session) = self.lock().entries.get_mut(id) {
            session.notices.push(notice);
        }
    }

    /// Pending notices for the session, removed as they are returned. An
    /// anonymous session has nothing left afterwards and is dropped.
    pub(crate) fn take_notices(&self, id: &str) -> Vec<Notice> {
        let mut table = self.lock();
        let Some(session) = table.entries.get_mut(id) else {
            return Vec::new();
        };
        let notices = std::mem::take(&mut session.notices);
        if session.is_idle() {
            table.entries.remove(id);
        }
        notices
    }

    pub(crate) fn set_user(&self, id: &str, user: &str) {
        if let Some(session) = self.lock().entries.get_mut(id) {
            session.user = Some(user.to_string());
        }
    }

    pub(crate) fn user(&self, id: &str) -> Option<String> {
        self.lock()
            .entries
            .get(id)
            .and_then(|session| session.user.clone())
    }

    /// Drop the signed-in user and any pending notices.
    pub(crate) fn clear(&self, id: &str) {
        if let Some(session) = self.lock().entries.get_mut(id) {
            session.user = None;
            session.notices.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, SessionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn new_session_id() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)?;
    let mut id = String::with_capacity(32);
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    Ok(id)
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn cookie_parsing_finds_session_among_others() {
        let headers = headers_with_cookie("theme=dark; medchat_session=abc123 ; other=1");
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc123"));
        assert!(session_id_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn unknown_cookie_gets_a_new_session() {
        let store = SessionStore::new();
        let handle = store.open(&headers_with_cookie("medchat_session=stale")).unwrap();
        assert!(handle.is_new);
        assert_ne!(handle.id, "stale");
        assert_eq!(handle.id.len(), 32);

        let again = store
            .open(&headers_with_cookie(&format!("medchat_session={}", handle.id)))
            .unwrap();
        assert!(!again.is_new);
        assert_eq!(again.id, handle.id);
    }

    #[test]
    fn notices_are_consumed_once_and_cleared_on_logout() {
        let store = SessionStore::new();
        let handle = store.open(&HeaderMap::new()).unwrap();

        store.flash(&handle.id, Notice::success("hello"));
        store.set_user(&handle.id, "alice");
        assert_eq!(store.take_notices(&handle.id), vec![Notice::success("hello")]);
        assert!(store.take_notices(&handle.id).is_empty());

        store.flash(&handle.id, Notice::error("pending"));
        store.clear(&handle.id);
        assert!(store.user(&handle.id).is_none());
        assert!(store.take_notices(&handle.id).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn reading_notices_drops_anonymous_session_only() {
        let store = SessionStore::new();
        let anonymous = store.open(&HeaderMap::new()).unwrap();
        let signed_in = store.open(&HeaderMap::new()).unwrap();
        store.flash(&anonymous.id, Notice::error("Invalid username or password."));
        store.set_user(&signed_in.id, "alice");
        store.flash(&signed_in.id, Notice::success("Login successful!"));

        assert_eq!(store.take_notices(&anonymous.id).len(), 1);
        assert_eq!(store.take_notices(&signed_in.id).len(), 1);

        assert_eq!(store.len(), 1);
        assert_eq!(store.user(&signed_in.id).as_deref(), Some("alice"));
    }

    #[test]
    fn full_table_evicts_oldest_anonymous_first() {
        let store = SessionStore::with_capacity(3);
        let alice = store.open(&HeaderMap::new()).unwrap();
        store.set_user(&alice.id, "alice");
        let first_anon = store.open(&HeaderMap::new()).unwrap();
        let second_anon = store.open(&HeaderMap::new()).unwrap();

        let newest = store.open(&HeaderMap::new()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.user(&alice.id).as_deref(), Some("alice"));
        let cookie = |id: &str| headers_with_cookie(&format!("medchat_session={id}"));
        assert!(store.existing(&cookie(&first_anon.id)).is_none());
        assert!(store.existing(&cookie(&second_anon.id)).is_some());
        assert!(store.existing(&cookie(&newest.id)).is_some());
    }
}
