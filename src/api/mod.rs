//! HTTP handlers for the signup form and the administrative views.
//!
//! Every view is returned as a JSON [`Page`] that a template can render: the
//! view data, any one-shot flash messages, and where the client should go next.

mod maintenance;
mod members;
mod signup;

pub use maintenance::*;
pub use members::*;
pub use signup::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{Member, MemberCounts, MemberForm};
use crate::validation::FieldErrors;

/// Notice shown when the store rejects a write the validator let through.
pub const ALREADY_USED_NOTICE: &str =
    "This name, email or bos number has already been used to sign up.";

/// Page response envelope.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub data: T,
    pub flash: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl<T: Serialize> Page<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            data,
            flash: Vec::new(),
            redirect: None,
        }
    }

    /// The page is redisplayed with the submitted data so the user can fix it.
    pub fn rejected(status: StatusCode, data: T) -> Self {
        Self {
            status,
            success: false,
            ..Self::ok(data)
        }
    }

    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flash.push(message.into());
        self
    }

    pub fn redirect_to(mut self, location: &str) -> Self {
        self.redirect = Some(location.to_string());
        self
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type for page handlers.
pub type PageResult<T> = Result<Page<T>, crate::errors::AppError>;

/// Signup/edit form contents plus per-field errors.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub form: MemberForm,
    pub errors: FieldErrors,
}

impl FormPage {
    pub fn new(form: MemberForm) -> Self {
        Self {
            form,
            errors: FieldErrors::default(),
        }
    }

    pub fn with_errors(form: MemberForm, errors: FieldErrors) -> Self {
        Self { form, errors }
    }
}

/// Member list with summary counts.
#[derive(Debug, Serialize)]
pub struct ListPage {
    pub members: Vec<Member>,
    pub count: MemberCounts,
}
