//! Member list, edit and delete views.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form,
};

use super::{FormPage, ListPage, Page, PageResult, ALREADY_USED_NOTICE};
use crate::errors::AppError;
use crate::models::{Member, MemberChanges, MemberForm};
use crate::validation::{ValidationFailure, Validator};
use crate::AppState;

const LIST_PATH: &str = "/list";

/// GET /list - List all members with summary counts.
pub async fn list_members(State(state): State<AppState>) -> PageResult<ListPage> {
    let members = state.repo.list_members().await?;
    let count = state.repo.counts().await?;

    Ok(Page::ok(ListPage { members, count }))
}

/// GET /edit/{id} - Edit form filled from the stored member.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> PageResult<FormPage> {
    let member = load_member(&state, id).await?;

    Ok(Page::ok(FormPage::new(MemberForm::from(&member))))
}

/// POST /edit/{id} - Update a member.
pub async fn edit_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<MemberForm>,
) -> PageResult<FormPage> {
    load_member(&state, id).await?;

    let validator = Validator::new(&state.repo, state.config.unique_bos);
    let candidate = match validator.validate(&form, Some(id)).await {
        Ok(candidate) => candidate,
        Err(ValidationFailure::Fields(errors)) => {
            return Ok(Page::rejected(
                StatusCode::BAD_REQUEST,
                FormPage::with_errors(form, errors),
            ));
        }
        Err(ValidationFailure::Store(e)) => return Err(e),
    };

    match state
        .repo
        .update_member(id, &MemberChanges::from(candidate))
        .await
    {
        Ok(member) => Ok(Page::ok(FormPage::new(MemberForm::from(&member)))
            .with_flash(format!("Member '{}' has been updated.", member.name))
            .redirect_to(LIST_PATH)),
        Err(AppError::ConstraintViolation(detail)) => {
            tracing::warn!(member_id = id, "Edit rejected by store: {}", detail);
            Ok(Page::rejected(StatusCode::CONFLICT, FormPage::new(form))
                .with_flash(ALREADY_USED_NOTICE))
        }
        Err(e) => Err(e),
    }
}

/// GET|POST /delete/{id} - Delete a member.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> PageResult<Member> {
    let member = state.repo.delete_member(id).await?;

    Ok(Page::ok(member.clone())
        .with_flash(format!("Member '{}' has been deleted.", member.name))
        .redirect_to(LIST_PATH))
}

async fn load_member(state: &AppState, id: i64) -> Result<Member, AppError> {
    state
        .repo
        .get_member(id)
        .await?
        .ok_or_else(|| AppError::member_not_found(id))
}
