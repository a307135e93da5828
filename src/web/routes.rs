//! Route table and middleware chains.

use super::handlers::{self, AppState};
use crate::config::Result;
use crate::core::middleware::{
    Authenticate, CsrfGuard, LogRequest, RecoverPanic, RequireAuthentication, SecureHeaders,
    SessionManager,
};
use crate::core::pipeline::response::from_error;
use crate::core::pipeline::{Chain, Handler, Request, Response, Router};
use async_trait::async_trait;
use http::Method;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Home,
    SnippetView,
    SnippetCreate,
    SnippetCreatePost,
    UserSignup,
    UserSignupPost,
    UserLogin,
    UserLoginPost,
    UserLogoutPost,
    StaticAsset,
    Ping,
}

struct Endpoint {
    state: Arc<AppState>,
    action: Action,
}

impl Endpoint {
    async fn run(&self, req: Request) -> Result<Response> {
        let state = self.state.as_ref();
        match self.action {
            Action::Home => handlers::home(state, req).await,
            Action::SnippetView => handlers::snippet_view(state, req).await,
            Action::SnippetCreate => handlers::snippet_create(state, req).await,
            Action::SnippetCreatePost => handlers::snippet_create_post(state, req).await,
            Action::UserSignup => handlers::user_signup(state, req).await,
            Action::UserSignupPost => handlers::user_signup_post(state, req).await,
            Action::UserLogin => handlers::user_login(state, req).await,
            Action::UserLoginPost => handlers::user_login_post(state, req).await,
            Action::UserLogoutPost => handlers::user_logout_post(state, req).await,
            Action::StaticAsset => handlers::static_asset(state, req).await,
            Action::Ping => handlers::ping(state, req).await,
        }
    }
}

#[async_trait]
impl Handler for Endpoint {
    async fn call(&self, req: Request) -> Response {
        let method = req.method().clone();
        let uri = req.uri().clone();
        match self.run(req).await {
            Ok(resp) => resp,
            Err(e) => from_error(&method, &uri, &e),
        }
    }
}

/// Builds the full handler tree.
///
/// The standard chain wraps the router; `dynamic` and `protected` wrap
/// individual routes.
#[must_use]
pub fn build(state: Arc<AppState>, sessions: SessionManager) -> Arc<dyn Handler> {
    let endpoint = |action| -> Arc<dyn Handler> {
        Arc::new(Endpoint {
            state: state.clone(),
            action,
        })
    };

    let dynamic = Chain::new()
        .append(sessions)
        .append(CsrfGuard::new(state.config.cookie_secure))
        .append(Authenticate::new(state.users.clone()));
    let protected = dynamic.append(RequireAuthentication);

    let router = Router::new()
        .route(Method::GET, "/static/{file}", endpoint(Action::StaticAsset))
        .route(Method::GET, "/ping", endpoint(Action::Ping))
        .route(Method::GET, "/", dynamic.then(endpoint(Action::Home)))
        .route(
            Method::GET,
            "/snippet/view/{id}",
            dynamic.then(endpoint(Action::SnippetView)),
        )
        .route(
            Method::GET,
            "/user/signup",
            dynamic.then(endpoint(Action::UserSignup)),
        )
        .route(
            Method::POST,
            "/user/signup",
            dynamic.then(endpoint(Action::UserSignupPost)),
        )
        .route(
            Method::GET,
            "/user/login",
            dynamic.then(endpoint(Action::UserLogin)),
        )
        .route(
            Method::POST,
            "/user/login",
            dynamic.then(endpoint(Action::UserLoginPost)),
        )
        .route(
            Method::GET,
            "/snippet/create",
            protected.then(endpoint(Action::SnippetCreate)),
        )
        .route(
            Method::POST,
            "/snippet/create",
            protected.then(endpoint(Action::SnippetCreatePost)),
        )
        .route(
            Method::POST,
            "/user/logout",
            protected.then(endpoint(Action::UserLogoutPost)),
        );

    let standard = Chain::new()
        .append(RecoverPanic)
        .append(LogRequest)
        .append(SecureHeaders);
    standard.then(Arc::new(router))
}
