// Form payloads and their validation errors

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("static regex"));

/// Field name to messages, rendered next to the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

/// Run the derived validators and gather their messages per field.
fn collect_errors<T: Validate>(form: &T) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors.into(),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub text: String,
    /// Group id as submitted by the select box; empty means no group.
    #[serde(default)]
    pub group: Option<String>,
}

impl PostForm {
    pub fn normalized(mut self) -> Self {
        self.text = self.text.trim().to_string();
        self.group = self
            .group
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        self
    }

    pub fn field_errors(&self) -> FormErrors {
        collect_errors(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn normalized(mut self) -> Self {
        self.text = self.text.trim().to_string();
        self
    }

    pub fn field_errors(&self) -> FormErrors {
        collect_errors(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 150, message = "Enter a username of at most 150 characters."))]
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.full_name = self
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    pub fn field_errors(&self) -> FormErrors {
        let mut errors = collect_errors(self);
        if !self.username.is_empty() && !USERNAME_RE.is_match(&self.username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn field_errors(&self) -> FormErrors {
        collect_errors(self)
    }
}
