//! Route handlers.
//!
//! Handlers return `Result<Response>`; storage and template errors bubble to
//! the central responder while validation failures re-render with 422.

use super::forms::{
    BAD_CREDENTIALS, EMAIL_IN_USE, SnippetCreateForm, UserLoginForm, UserSignupForm,
};
use super::templates::{TemplateCache, TemplateData, current_year, static_file};
use crate::config::{AppError, Config, Result};
use crate::core::pipeline::response::{html, not_found, redirect, text};
use crate::core::pipeline::{FormValues, Params, Request, Response};
use crate::models::{SnippetStore, UserStore};
use crate::security::auth::{AUTHENTICATED_USER_ID, AuthStatus};
use crate::security::csrf::CsrfToken;
use crate::security::session::Session;
use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use std::sync::Arc;
use tracing::info;

const FLASH: &str = "flash";

/// Shared dependencies of every handler.
pub struct AppState {
    pub config: Arc<Config>,
    pub snippets: Arc<dyn SnippetStore>,
    pub users: Arc<dyn UserStore>,
    pub templates: TemplateCache,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        snippets: Arc<dyn SnippetStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let templates = TemplateCache::new(&config.app_name);
        Self {
            config,
            snippets,
            users,
            templates,
        }
    }

    /// Common template data. Pops the flash message from the session.
    fn template_data(&self, req: &Request) -> Result<TemplateData> {
        let session = Session::from_request(req)?;
        Ok(TemplateData {
            current_year: current_year(),
            flash: session.pop_string(FLASH),
            is_authenticated: AuthStatus::of(req).is_authenticated(),
            csrf_token: req
                .extensions()
                .get::<CsrfToken>()
                .map(|t| t.0.clone())
                .unwrap_or_default(),
            ..TemplateData::default()
        })
    }

    /// Renders fully before any status is chosen, so a template failure
    /// still yields a clean 500.
    fn render(&self, status: StatusCode, page: &str, data: &TemplateData) -> Result<Response> {
        let body = self.templates.render(page, data)?;
        Ok(html(status, body))
    }
}

pub async fn home(state: &AppState, req: Request) -> Result<Response> {
    let snippets = state.snippets.latest().await?;
    let data = TemplateData {
        snippets,
        ..state.template_data(&req)?
    };
    state.render(StatusCode::OK, "home.html", &data)
}

pub async fn snippet_view(state: &AppState, req: Request) -> Result<Response> {
    let id = Params::of(&req)
        .get("id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or(AppError::NoRecord)?;

    let snippet = state.snippets.get(id).await?;
    let data = TemplateData {
        snippet: Some(snippet),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::OK, "view.html", &data)
}

pub async fn snippet_create(state: &AppState, req: Request) -> Result<Response> {
    let data = TemplateData {
        form: Some(SnippetCreateForm::default().view()),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::OK, "create.html", &data)
}

pub async fn snippet_create_post(state: &AppState, req: Request) -> Result<Response> {
    let mut form = SnippetCreateForm::from_values(&FormValues::parse(req.body()))?;
    form.validate();

    if !form.validator.valid() {
        let data = TemplateData {
            form: Some(form.view()),
            ..state.template_data(&req)?
        };
        return state.render(StatusCode::UNPROCESSABLE_ENTITY, "create.html", &data);
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;
    info!(id, "snippet created");

    Session::from_request(&req)?.put(FLASH, "Snippet successfully created!");
    Ok(redirect(&format!("/snippet/view/{id}")))
}

pub async fn user_signup(state: &AppState, req: Request) -> Result<Response> {
    let data = TemplateData {
        form: Some(UserSignupForm::default().view()),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::OK, "signup.html", &data)
}

pub async fn user_signup_post(state: &AppState, req: Request) -> Result<Response> {
    let mut form = UserSignupForm::from_values(&FormValues::parse(req.body()));
    form.validate();

    if form.validator.valid() {
        match state
            .users
            .insert(&form.name, &form.email, &form.password)
            .await
        {
            Ok(()) => {
                Session::from_request(&req)?
                    .put(FLASH, "Your sign-up was successful. Please log in.");
                return Ok(redirect("/user/login"));
            }
            Err(AppError::DuplicateEmail) => {
                form.validator.add_field_error("email", EMAIL_IN_USE);
            }
            Err(e) => return Err(e),
        }
    }

    let data = TemplateData {
        form: Some(form.view()),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::UNPROCESSABLE_ENTITY, "signup.html", &data)
}

pub async fn user_login(state: &AppState, req: Request) -> Result<Response> {
    let data = TemplateData {
        form: Some(UserLoginForm::default().view()),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::OK, "login.html", &data)
}

pub async fn user_login_post(state: &AppState, req: Request) -> Result<Response> {
    let mut form = UserLoginForm::from_values(&FormValues::parse(req.body()));
    form.validate();

    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(id) => {
                let session = Session::from_request(&req)?;
                session.renew_token();
                session.put(AUTHENTICATED_USER_ID, id);
                info!(user_id = id, "user logged in");
                return Ok(redirect("/snippet/create"));
            }
            Err(AppError::InvalidCredentials) => {
                form.validator.add_non_field_error(BAD_CREDENTIALS);
            }
            Err(e) => return Err(e),
        }
    }

    let data = TemplateData {
        form: Some(form.view()),
        ..state.template_data(&req)?
    };
    state.render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data)
}

pub async fn user_logout_post(_state: &AppState, req: Request) -> Result<Response> {
    let session = Session::from_request(&req)?;
    session.renew_token();
    session.remove(AUTHENTICATED_USER_ID);
    session.put(FLASH, "You've been logged out successfully!");
    Ok(redirect("/"))
}

pub async fn static_asset(_state: &AppState, req: Request) -> Result<Response> {
    let params = Params::of(&req);
    let Some((content_type, body)) = params.get("file").and_then(static_file) else {
        return Ok(not_found());
    };
    let mut resp = Response::new(Bytes::from_static(body.as_bytes()));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    Ok(resp)
}

pub async fn ping(_state: &AppState, _req: Request) -> Result<Response> {
    Ok(text(StatusCode::OK, "OK"))
}
