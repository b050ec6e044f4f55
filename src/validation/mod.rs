//! Pre-write validation for signup and edit submissions.
//!
//! Every field is checked and all problems are reported together so the form
//! can be redisplayed with each one annotated. Uniqueness is checked only for
//! values that passed their local checks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::db::{MemberFilter, Repository};
use crate::errors::AppError;
use crate::models::{MemberForm, NewMember};

pub const NAME_MAX_LEN: usize = 80;
pub const EMAIL_MAX_LEN: usize = 120;
pub const BOS_MAX_LEN: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is valid")
});

/// Form fields that can carry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Bos,
}

/// A single problem with one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required.")]
    RequiredFieldMissing,
    #[error("Invalid email address.")]
    InvalidEmailFormat,
    #[error("Field cannot be longer than {0} characters.")]
    FieldTooLong(usize),
    #[error("A member with this name already exists")]
    DuplicateName,
    #[error("A member with this email already exists")]
    DuplicateEmail,
    #[error("A member with this BOS number already exists")]
    DuplicateBos,
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            FieldError::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            FieldError::FieldTooLong(_) => "FIELD_TOO_LONG",
            FieldError::DuplicateName => "DUPLICATE_NAME",
            FieldError::DuplicateEmail => "DUPLICATE_EMAIL",
            FieldError::DuplicateBos => "DUPLICATE_BOS",
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// All field errors of one submission, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<FieldError>>);

impl FieldErrors {
    pub fn add(&mut self, field: Field, error: FieldError) {
        self.0.entry(field).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[cfg(test)]
    pub fn get(&self, field: Field) -> &[FieldError] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Why a submission could not be turned into a [`NewMember`].
#[derive(Debug)]
pub enum ValidationFailure {
    /// The input is wrong; redisplay the form.
    Fields(FieldErrors),
    /// The uniqueness lookups themselves failed.
    Store(AppError),
}

impl From<AppError> for ValidationFailure {
    fn from(err: AppError) -> Self {
        ValidationFailure::Store(err)
    }
}

/// Checks form input against the field rules and the current store contents.
pub struct Validator<'a> {
    repo: &'a Repository,
    unique_bos: bool,
}

impl<'a> Validator<'a> {
    pub fn new(repo: &'a Repository, unique_bos: bool) -> Self {
        Self { repo, unique_bos }
    }

    /// Validate `form`. When editing, `excluding` is the id of the record being edited
    /// so it does not collide with itself.
    pub async fn validate(
        &self,
        form: &MemberForm,
        excluding: Option<i64>,
    ) -> Result<NewMember, ValidationFailure> {
        let candidate = clean(form);
        let mut errors = check_fields(&candidate);

        if !errors.has_errors(Field::Name)
            && self
                .repo
                .count_matching(MemberFilter::Name(&candidate.name), excluding)
                .await?
                > 0
        {
            errors.add(Field::Name, FieldError::DuplicateName);
        }

        if !errors.has_errors(Field::Email)
            && self
                .repo
                .count_matching(MemberFilter::Email(&candidate.email), excluding)
                .await?
                > 0
        {
            errors.add(Field::Email, FieldError::DuplicateEmail);
        }

        if self.unique_bos && !errors.has_errors(Field::Bos) {
            if let Some(bos) = candidate.bos.as_deref() {
                if self
                    .repo
                    .count_matching(MemberFilter::Bos(bos), excluding)
                    .await?
                    > 0
                {
                    errors.add(Field::Bos, FieldError::DuplicateBos);
                }
            }
        }

        if errors.is_empty() {
            Ok(candidate)
        } else {
            tracing::debug!(?errors, "Form rejected");
            Err(ValidationFailure::Fields(errors))
        }
    }
}

/// Trim text input and map an empty BOS number to absent.
fn clean(form: &MemberForm) -> NewMember {
    let bos = form.bos.trim();
    NewMember {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        bos: (!bos.is_empty()).then(|| bos.to_string()),
        paid: form.paid,
    }
}

/// Checks that need no store access.
fn check_fields(candidate: &NewMember) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if candidate.name.is_empty() {
        errors.add(Field::Name, FieldError::RequiredFieldMissing);
    } else if candidate.name.chars().count() > NAME_MAX_LEN {
        errors.add(Field::Name, FieldError::FieldTooLong(NAME_MAX_LEN));
    }

    if candidate.email.is_empty() {
        errors.add(Field::Email, FieldError::RequiredFieldMissing);
    } else if candidate.email.chars().count() > EMAIL_MAX_LEN {
        errors.add(Field::Email, FieldError::FieldTooLong(EMAIL_MAX_LEN));
    } else if !is_valid_email(&candidate.email) {
        errors.add(Field::Email, FieldError::InvalidEmailFormat);
    }

    if let Some(bos) = &candidate.bos {
        if bos.chars().count() > BOS_MAX_LEN {
            errors.add(Field::Bos, FieldError::FieldTooLong(BOS_MAX_LEN));
        }
    }

    errors
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
