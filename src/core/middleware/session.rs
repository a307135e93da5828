//! Session load and commit.
//!
//! Loads the session named by the request cookie before the handler runs
//! and writes it back afterwards, including when the handler answered with
//! an error status.

use crate::config::Result;
use crate::core::pipeline::response::server_error;
use crate::core::pipeline::{Handler, Middleware, Request, Response, read_cookie};
use crate::core::unix_now;
use crate::security::session::{CommitPlan, Session, SessionStore, Status, store_key};
use async_trait::async_trait;
use http::header::{CACHE_CONTROL, HeaderValue, SET_COOKIE, VARY};
use std::sync::Arc;
use tracing::debug;

pub const SESSION_COOKIE_NAME: &str = "session";

#[must_use]
pub fn format_set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age={max_age}")
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    lifetime_secs: u64,
    secure: bool,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, lifetime_secs: u64, secure: bool) -> Self {
        Self {
            store,
            lifetime_secs,
            secure,
        }
    }

    /// Loads the session for the request's cookie, or a fresh one.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn load(&self, req: &Request) -> Result<Session> {
        let Some(token) = read_cookie(req.headers(), SESSION_COOKIE_NAME) else {
            return Ok(Session::fresh(self.lifetime_secs));
        };
        match self.store.find(&store_key(token)).await? {
            Some(record) => Ok(Session::loaded(token.to_string(), record)),
            None => {
                debug!("session cookie without live record, starting fresh");
                Ok(Session::fresh(self.lifetime_secs))
            }
        }
    }

    /// Persists the session and returns the `Set-Cookie` value to send, if any.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn commit(&self, session: &Session) -> Result<Option<String>> {
        let CommitPlan {
            status,
            token,
            retired,
            record,
        } = session.prepare_commit();

        match status {
            Status::Unmodified => Ok(None),
            Status::Modified => {
                let Some(token) = token else {
                    return Ok(None);
                };
                if let Some(old) = retired {
                    self.store.delete(&store_key(&old)).await?;
                }
                let max_age = record.deadline.saturating_sub(unix_now());
                self.store.commit(&store_key(&token), record).await?;
                Ok(Some(format_set_cookie(
                    SESSION_COOKIE_NAME,
                    &token,
                    max_age,
                    self.secure,
                )))
            }
            Status::Destroyed => {
                for old in [token, retired].into_iter().flatten() {
                    self.store.delete(&store_key(&old)).await?;
                }
                Ok(Some(format_set_cookie(
                    SESSION_COOKIE_NAME,
                    "",
                    0,
                    self.secure,
                )))
            }
        }
    }
}

#[async_trait]
impl Middleware for SessionManager {
    async fn handle(&self, mut req: Request, next: Arc<dyn Handler>) -> Response {
        let method = req.method().clone();
        let uri = req.uri().clone();

        let session = match self.load(&req).await {
            Ok(session) => session,
            Err(e) => return server_error(&method, &uri, &e),
        };
        req.extensions_mut().insert(session.clone());

        let mut resp = next.call(req).await;

        match self.commit(&session).await {
            Ok(Some(cookie)) => {
                let Ok(value) = HeaderValue::try_from(cookie) else {
                    return server_error(&method, &uri, &"session cookie not encodable");
                };
                let headers = resp.headers_mut();
                headers.append(SET_COOKIE, value);
                headers.append(VARY, HeaderValue::from_static("Cookie"));
                headers.append(
                    CACHE_CONTROL,
                    HeaderValue::from_static(r#"no-cache="Set-Cookie""#),
                );
                resp
            }
            Ok(None) => resp,
            Err(e) => server_error(&method, &uri, &e),
        }
    }
}
