//! Web layer.
//!
//! Forms and validation, template rendering, handlers and the route table.

pub mod forms;
pub mod handlers;
pub mod routes;
pub mod templates;
pub mod validator;

pub use handlers::AppState;
pub use templates::{TemplateCache, TemplateData};
