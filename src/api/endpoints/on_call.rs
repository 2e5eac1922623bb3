//! On-call schedule endpoints under `/api/on-call`.
//!
//! Windows run 08:00 to 08:00. `GET /today` and `GET /date/:date`
//! answer "who is on call" and include specialist details.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Deleted};
use crate::events::{ChangeAction, RosterEntity};
use crate::models::{OnCallEntry, OnCallInput, SpecialistOnCall};
use crate::on_call::{self, TodayOnCall};

pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<SpecialistOnCall>>, ApiError> {
    Ok(Json(on_call::list_on_call(ctx.core.on_call.as_ref())?))
}

/// `GET /api/on-call/today`
pub async fn today(State(ctx): State<ApiContext>) -> Result<Json<TodayOnCall>, ApiError> {
    let now = Local::now().naive_local();
    Ok(Json(on_call::today_on_call(
        ctx.core.on_call.as_ref(),
        ctx.core.specialists.as_ref(),
        now,
    )?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SpecialistOnCall>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(on_call::find_on_call(ctx.core.on_call.as_ref(), id)?))
}

/// `GET /api/on-call/date/:date`: `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`.
pub async fn by_date(
    State(ctx): State<ApiContext>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<OnCallEntry>>, ApiError> {
    let day = on_call::parse_service_day(&raw)?;
    let schedules = on_call::on_call_for_service_day(ctx.core.on_call.as_ref(), day)?;
    Ok(Json(on_call::join_specialists(
        ctx.core.specialists.as_ref(),
        schedules,
    )?))
}

/// `GET /api/on-call/specialist/:specialistId`
pub async fn by_specialist(
    State(ctx): State<ApiContext>,
    Path(specialist_id): Path<String>,
) -> Result<Json<Vec<SpecialistOnCall>>, ApiError> {
    let specialist_id = parse_id(&specialist_id)?;
    Ok(Json(on_call::on_call_by_specialist(
        ctx.core.on_call.as_ref(),
        specialist_id,
    )?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<OnCallInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SpecialistOnCall>), ApiError> {
    let Json(input) = payload?;
    let schedule = on_call::add_on_call(ctx.core.on_call.as_ref(), input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::OnCall, ChangeAction::Created, schedule.id);
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<OnCallInput>, JsonRejection>,
) -> Result<Json<SpecialistOnCall>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let schedule = on_call::update_on_call(ctx.core.on_call.as_ref(), id, input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::OnCall, ChangeAction::Updated, id);
    Ok(Json(schedule))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Deleted<SpecialistOnCall>>, ApiError> {
    let id = parse_id(&id)?;
    let schedule = on_call::delete_on_call(ctx.core.on_call.as_ref(), id)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::OnCall, ChangeAction::Deleted, id);
    Ok(Json(Deleted { deleted: schedule }))
}
