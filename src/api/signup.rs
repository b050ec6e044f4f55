//! Public signup form.

use axum::{extract::State, http::StatusCode, Form};

use super::{FormPage, Page, PageResult, ALREADY_USED_NOTICE};
use crate::errors::AppError;
use crate::models::MemberForm;
use crate::validation::{ValidationFailure, Validator};
use crate::AppState;

/// GET / - Blank signup form.
pub async fn signup_form(State(state): State<AppState>) -> PageResult<FormPage> {
    Ok(Page::ok(FormPage::new(MemberForm::blank(
        &state.config.email_domain,
    ))))
}

/// POST / - Sign up a new member.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<MemberForm>,
) -> PageResult<FormPage> {
    let validator = Validator::new(&state.repo, state.config.unique_bos);

    let candidate = match validator.validate(&form, None).await {
        Ok(candidate) => candidate,
        Err(ValidationFailure::Fields(errors)) => {
            return Ok(Page::rejected(
                StatusCode::BAD_REQUEST,
                FormPage::with_errors(form, errors),
            ));
        }
        Err(ValidationFailure::Store(e)) => return Err(e),
    };

    match state.repo.insert_member(&candidate).await {
        Ok(member) => {
            tracing::info!(member_id = member.id, "Member signed up");
            let blank = MemberForm::blank(&state.config.email_domain);
            Ok(Page::ok(FormPage::new(blank)).with_flash(format!(
                "'{}' has been signed up. Welcome to {}.",
                member.name, state.config.club_name
            )))
        }
        Err(AppError::ConstraintViolation(detail)) => {
            // Another signup won the race between validation and insert
            tracing::warn!("Signup rejected by store: {}", detail);
            Ok(Page::rejected(StatusCode::CONFLICT, FormPage::new(form))
                .with_flash(ALREADY_USED_NOTICE))
        }
        Err(e) => Err(e),
    }
}
