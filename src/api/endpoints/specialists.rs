//! Specialist directory endpoints under `/api/specialists`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Deleted};
use crate::events::{ChangeAction, RosterEntity};
use crate::models::{Specialist, SpecialistInput};
use crate::specialists;

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Specialist>>, ApiError> {
    Ok(Json(specialists::list_specialists(ctx.core.specialists.as_ref())?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Specialist>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(specialists::find_specialist(ctx.core.specialists.as_ref(), id)?))
}

/// `GET /api/specialists/department/:department`
pub async fn by_department(
    State(ctx): State<ApiContext>,
    Path(department): Path<String>,
) -> Result<Json<Vec<Specialist>>, ApiError> {
    Ok(Json(specialists::specialists_by_department(
        ctx.core.specialists.as_ref(),
        &department,
    )?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SpecialistInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Specialist>), ApiError> {
    let Json(input) = payload?;
    let specialist = specialists::add_specialist(ctx.core.specialists.as_ref(), input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Specialist, ChangeAction::Created, specialist.id);
    Ok((StatusCode::CREATED, Json(specialist)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<SpecialistInput>, JsonRejection>,
) -> Result<Json<Specialist>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let specialist = specialists::update_specialist(ctx.core.specialists.as_ref(), id, input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Specialist, ChangeAction::Updated, id);
    Ok(Json(specialist))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Deleted<Specialist>>, ApiError> {
    let id = parse_id(&id)?;
    let specialist = specialists::delete_specialist(ctx.core.specialists.as_ref(), id)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Specialist, ChangeAction::Deleted, id);
    Ok(Json(Deleted { deleted: specialist }))
}
