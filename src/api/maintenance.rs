//! Bulk maintenance endpoints: email export and table normalization.

use axum::{extract::State, response::Html};

use crate::errors::AppError;
use crate::AppState;

/// GET /emails - Every member's email, one per line, for pasting into a mailing list.
pub async fn export_emails(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let emails = state.repo.list_emails().await?;

    Ok(Html(emails.join("<br/>\n")))
}

/// GET /clean - Normalize names and BOS numbers of every member.
pub async fn clean_members(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let changed = state.repo.normalize_all().await?;
    tracing::info!(changed, "Clean run finished");

    Ok("Database cleaned")
}
