//! HTML page rendering.
//!
//! Pages are embedded at build time and composed with the base layout once,
//! when the cache is created. Rendering replaces `{{key}}` placeholders with
//! escaped values from a `TemplateData` bag; an unknown key is an error.

use super::forms::FormView;
use crate::config::{AppError, Result};
use crate::core::unix_now;
use crate::models::Snippet;
use std::collections::HashMap;
use std::fmt::Write;

const BASE: &str = include_str!("../../ui/html/base.html");
const NAV: &str = include_str!("../../ui/html/partials/nav.html");

const PAGES: [(&str, &str, &str); 5] = [
    ("home.html", "Home", include_str!("../../ui/html/pages/home.html")),
    (
        "view.html",
        "Snippet #{{snippet.id}}",
        include_str!("../../ui/html/pages/view.html"),
    ),
    (
        "create.html",
        "Create a New Snippet",
        include_str!("../../ui/html/pages/create.html"),
    ),
    ("signup.html", "Signup", include_str!("../../ui/html/pages/signup.html")),
    ("login.html", "Login", include_str!("../../ui/html/pages/login.html")),
];

const STATIC_FILES: [(&str, &str, &str); 1] = [(
    "main.css",
    "text/css; charset=utf-8",
    include_str!("../../ui/static/main.css"),
)];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Looks up an embedded static asset. Returns `(content_type, body)`.
#[must_use]
pub fn static_file(name: &str) -> Option<(&'static str, &'static str)> {
    STATIC_FILES
        .iter()
        .find(|(file, _, _)| *file == name)
        .map(|(_, content_type, body)| (*content_type, *body))
}

/// Values available to page templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: u64,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub form: Option<FormView>,
    pub flash: String,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

/// Parsed-once page set shared by all requests.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    app_name: String,
    pages: HashMap<&'static str, String>,
}

impl TemplateCache {
    #[must_use]
    pub fn new(app_name: &str) -> Self {
        let pages = PAGES
            .iter()
            .map(|(name, title, body)| {
                let composed = BASE
                    .replace("{{page_title}}", title)
                    .replace("{{main}}", body.trim_end());
                (*name, composed)
            })
            .collect();
        Self {
            app_name: app_name.to_string(),
            pages,
        }
    }

    /// Renders `page` with `data`.
    ///
    /// # Errors
    ///
    /// `AppError::TemplateMissing` for an unknown page,
    /// `AppError::TemplatePlaceholder` for an unresolvable key.
    pub fn render(&self, page: &str, data: &TemplateData) -> Result<String> {
        let source = self
            .pages
            .get(page)
            .ok_or_else(|| AppError::TemplateMissing(page.to_string()))?;
        substitute(source, page, |key| self.resolve(key, data))
    }

    fn resolve(&self, key: &str, data: &TemplateData) -> Option<String> {
        if let Some(field) = key.strip_prefix("snippet.") {
            return data.snippet.as_ref().and_then(|s| snippet_field(s, field));
        }
        if let Some(rest) = key.strip_prefix("form.") {
            return Some(form_field(data.form.as_ref(), rest));
        }
        match key {
            "app_name" => Some(escape(&self.app_name)),
            "current_year" => Some(data.current_year.to_string()),
            "csrf_token" => Some(escape(&data.csrf_token)),
            "flash" if data.flash.is_empty() => Some(String::new()),
            "flash" => Some(format!("<div class='flash'>{}</div>", escape(&data.flash))),
            "snippets" => Some(snippet_table(&data.snippets)),
            "nav" => substitute(NAV.trim_end(), "nav", |k| nav_field(k, data)).ok(),
            _ => None,
        }
    }
}

fn substitute(
    source: &str,
    page: &str,
    mut resolve: impl FnMut(&str) -> Option<String>,
) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(AppError::TemplatePlaceholder {
                page: page.to_string(),
                key: after.to_string(),
            });
        };
        let key = after[..end].trim();
        let value = resolve(key).ok_or_else(|| AppError::TemplatePlaceholder {
            page: page.to_string(),
            key: key.to_string(),
        })?;
        out.push_str(&value);
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

fn nav_field(key: &str, data: &TemplateData) -> Option<String> {
    match key {
        "nav.create" if data.is_authenticated => {
            Some("<a href='/snippet/create'>Create snippet</a>".to_string())
        }
        "nav.create" => Some(String::new()),
        "nav.account" if data.is_authenticated => Some(format!(
            "<form action='/user/logout' method='POST'>\
             <input type='hidden' name='csrf_token' value='{}'>\
             <button>Logout</button></form>",
            escape(&data.csrf_token)
        )),
        "nav.account" => Some(
            "<a href='/user/signup'>Signup</a>\n                <a href='/user/login'>Login</a>"
                .to_string(),
        ),
        _ => None,
    }
}

fn snippet_field(snippet: &Snippet, field: &str) -> Option<String> {
    match field {
        "id" => Some(snippet.id.to_string()),
        "title" => Some(escape(&snippet.title)),
        "content" => Some(escape(&snippet.content)),
        "created" => Some(human_date(snippet.created)),
        "expires" => Some(human_date(snippet.expires)),
        _ => None,
    }
}

fn form_field(form: Option<&FormView>, key: &str) -> String {
    let Some(form) = form else {
        return String::new();
    };
    if let Some(name) = key.strip_prefix("value.") {
        return form.values.get(name).map(|v| escape(v)).unwrap_or_default();
    }
    if let Some(name) = key.strip_prefix("error.") {
        return form
            .field_errors
            .get(name)
            .map(|msg| format!("<label class='error'>{}</label>", escape(msg)))
            .unwrap_or_default();
    }
    if let Some(choice) = key.strip_prefix("checked.") {
        let checked = choice
            .split_once('.')
            .is_some_and(|(name, value)| form.values.get(name).is_some_and(|v| v == value));
        return if checked { "checked".to_string() } else { String::new() };
    }
    if key == "non_field_errors" {
        return form
            .non_field_errors
            .iter()
            .fold(String::new(), |mut out, msg| {
                let _ = write!(out, "<div class='error'>{}</div>", escape(msg));
                out
            });
    }
    String::new()
}

fn snippet_table(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return "<p>There's nothing to see here... yet!</p>".to_string();
    }
    let mut html = String::from("<table>\n<tr><th>Title</th><th>Created</th><th>ID</th></tr>\n");
    for s in snippets {
        let _ = writeln!(
            html,
            "<tr><td><a href='/snippet/view/{id}'>{title}</a></td><td>{created}</td><td>#{id}</td></tr>",
            id = s.id,
            title = escape(&s.title),
            created = human_date(s.created),
        );
    }
    html.push_str("</table>");
    html
}

/// Escapes text for HTML element and attribute context.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats Unix seconds as `02 Jan 2006 at 15:04` UTC. Zero renders empty.
#[must_use]
pub fn human_date(ts: u64) -> String {
    if ts == 0 {
        return String::new();
    }
    let (year, month, day) = date_from_days(ts / 86400);
    let seconds = ts % 86400;
    let hour = seconds / 3600;
    let minute = (seconds % 3600) / 60;
    let month_name = MONTHS[usize::from(month - 1)];
    format!("{day:02} {month_name} {year} at {hour:02}:{minute:02}")
}

/// Calendar year for Unix seconds, UTC.
#[must_use]
pub fn year_of(ts: u64) -> u64 {
    date_from_days(ts / 86400).0
}

#[must_use]
pub fn current_year() -> u64 {
    year_of(unix_now())
}

/// Civil (proleptic Gregorian) date for a count of days since 1970-01-01,
/// counted in 400-year eras starting on 0000-03-01.
fn date_from_days(days: u64) -> (u64, u8, u8) {
    const DAYS_PER_ERA: u64 = 146_097;
    const EPOCH_SHIFT: u64 = 719_468;

    let shifted = days + EPOCH_SHIFT;
    let era = shifted / DAYS_PER_ERA;
    let day_of_era = shifted % DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    // Months counted from March, so February's leap day falls at year end.
    let march_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * march_month + 2) / 5 + 1;
    let month = if march_month < 10 {
        march_month + 3
    } else {
        march_month - 9
    };
    let year = era * 400 + year_of_era + u64::from(month <= 2);

    (
        year,
        u8::try_from(month).unwrap_or(1),
        u8::try_from(day).unwrap_or(1),
    )
}
