//! ER doctor endpoints under `/api/doctors`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, Deleted};
use crate::doctors;
use crate::events::{ChangeAction, RosterEntity};
use crate::models::{Doctor, DoctorFilter, DoctorInput};

/// `GET /api/doctors?search=`
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<DoctorFilter>, QueryRejection>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let Query(filter) = query?;
    let repo = ctx.core.doctors.as_ref();
    let found = match filter.search.as_deref() {
        Some(term) => doctors::search_doctors(repo, term)?,
        None => doctors::list_doctors(repo)?,
    };
    Ok(Json(found))
}

/// `GET /api/doctors/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(doctors::find_doctor(ctx.core.doctors.as_ref(), id)?))
}

/// `POST /api/doctors`
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let Json(input) = payload?;
    let doctor = doctors::add_doctor(ctx.core.doctors.as_ref(), input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Doctor, ChangeAction::Created, doctor.id);
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// `PUT /api/doctors/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let doctor = doctors::update_doctor(ctx.core.doctors.as_ref(), id, input)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Doctor, ChangeAction::Updated, id);
    Ok(Json(doctor))
}

/// `DELETE /api/doctors/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Deleted<Doctor>>, ApiError> {
    let id = parse_id(&id)?;
    let doctor = doctors::delete_doctor(ctx.core.doctors.as_ref(), id)?;
    ctx.core
        .events()
        .roster_changed(RosterEntity::Doctor, ChangeAction::Deleted, id);
    Ok(Json(Deleted { deleted: doctor }))
}
