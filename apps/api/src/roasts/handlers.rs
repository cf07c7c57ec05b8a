use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::roasts::models::{CalendarView, EntryPatch, EntrySummary, Mood};
use crate::roasts::validation::{normalize_month, validate_year};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: String,
    pub month: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEntryRequest {
    pub mood: Mood,
    pub note: Option<String>,
    pub occurred_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEntryRequest {
    pub mood: Option<Mood>,
    pub note: Option<String>,
    pub occurred_at: Option<i64>,
}

impl From<UpdateEntryRequest> for EntryPatch {
    fn from(req: UpdateEntryRequest) -> Self {
        EntryPatch {
            mood: req.mood,
            note: req.note,
            occurred_at: req.occurred_at,
        }
    }
}

/// GET /calendar?year=YYYY&month=MM
pub async fn handle_get_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let year = validate_year(&query.year).map_err(AppError::Validation)?;
    let month = normalize_month(&query.month).map_err(AppError::Validation)?;
    let view = state.roasts.get_calendar(&user.id, &year, &month).await?;
    Ok(Json(view))
}

/// POST /calendar
pub async fn handle_create_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntrySummary>), AppError> {
    let Json(req) = payload?;
    let summary = state
        .roasts
        .create_entry(&user.id, req.mood, req.note, req.occurred_at)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// PATCH /calendar/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<Json<EntrySummary>, AppError> {
    let Json(req) = payload?;
    let summary = state.roasts.update_entry(&user.id, &id, req.into()).await?;
    Ok(Json(summary))
}

/// DELETE /calendar/:id
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.roasts.delete_entry(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
