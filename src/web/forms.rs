//! Typed forms for each mutating endpoint.
//!
//! Each form embeds a `Validator` by value and knows its own rules.

use super::validator::{EMAIL_RX, Validator, matches, max_chars, min_chars, not_blank, permitted_value};
use crate::config::Result;
use crate::core::pipeline::FormValues;
use std::collections::HashMap;

pub const BLANK: &str = "This field cannot be blank";
pub const INVALID_EMAIL: &str = "This field must be a valid email address";
pub const EMAIL_IN_USE: &str = "Email address is already in use";
pub const BAD_CREDENTIALS: &str = "Email or password is incorrect";

const PERMITTED_EXPIRES: [i64; 3] = [1, 7, 365];

/// Values and errors a template needs to redisplay a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub values: HashMap<String, String>,
    pub field_errors: HashMap<String, String>,
    pub non_field_errors: Vec<String>,
}

impl FormView {
    fn new(validator: &Validator, values: &[(&str, String)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            field_errors: validator.field_errors.clone(),
            non_field_errors: validator.non_field_errors.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetCreateForm {
    pub title: String,
    pub content: String,
    pub expires: i64,
    pub validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::default(),
        }
    }
}

impl SnippetCreateForm {
    /// Decodes the submission. A missing `expires` decodes to 0.
    ///
    /// # Errors
    ///
    /// `AppError::BadRequest` if `expires` is present but not an integer.
    pub fn from_values(values: &FormValues) -> Result<Self> {
        Ok(Self {
            title: values.get("title").to_string(),
            content: values.get("content").to_string(),
            expires: values.get_int("expires", 0)?,
            validator: Validator::default(),
        })
    }

    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        FormView::new(
            &self.validator,
            &[
                ("title", self.title.clone()),
                ("content", self.content.clone()),
                ("expires", self.expires.to_string()),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub validator: Validator,
}

impl UserSignupForm {
    #[must_use]
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            name: values.get("name").to_string(),
            email: values.get("email").to_string(),
            password: values.get("password").to_string(),
            validator: Validator::default(),
        }
    }

    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, &EMAIL_RX), "email", INVALID_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );
    }

    /// The password is never echoed back.
    #[must_use]
    pub fn view(&self) -> FormView {
        FormView::new(
            &self.validator,
            &[("name", self.name.clone()), ("email", self.email.clone())],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserLoginForm {
    pub email: String,
    pub password: String,
    pub validator: Validator,
}

impl UserLoginForm {
    #[must_use]
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            email: values.get("email").to_string(),
            password: values.get("password").to_string(),
            validator: Validator::default(),
        }
    }

    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, &EMAIL_RX), "email", INVALID_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        FormView::new(&self.validator, &[("email", self.email.clone())])
    }
}
