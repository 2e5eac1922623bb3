//! SMS endpoints under `/api/sms`. Messages are queued in the
//! in-memory outbox only.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::SmsMessage;
use crate::notifications::sms::{EmergencyReport, SmsStatusReport};
use crate::on_call::today_on_call;
use crate::specialists::find_specialist;

#[derive(Debug, Default, Deserialize)]
pub struct ToggleRequest {
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub specialist_id: u32,
    pub message: String,
}

pub async fn status(State(ctx): State<ApiContext>) -> Result<Json<SmsStatusReport>, ApiError> {
    Ok(Json(ctx.core.read_sms()?.status()))
}

/// `POST /api/sms/toggle`: `{enabled}` sets the flag, an empty body flips it.
pub async fn toggle(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<Json<ToggleResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ToggleRequest::default()
    } else {
        serde_json::from_slice::<ToggleRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid toggle request: {e}")))?
    };
    let enabled = ctx.core.write_sms()?.toggle(request.enabled);
    Ok(Json(ToggleResponse { enabled }))
}

/// `POST /api/sms/emergency`: fan out to every specialist on call now.
pub async fn emergency(
    State(ctx): State<ApiContext>,
    payload: Result<Json<EmergencyRequest>, JsonRejection>,
) -> Result<Json<EmergencyReport>, ApiError> {
    let Json(request) = payload?;
    let roster = today_on_call(
        ctx.core.on_call.as_ref(),
        ctx.core.specialists.as_ref(),
        Local::now().naive_local(),
    )?;
    let recipients: Vec<_> = roster.departments.into_values().flatten().collect();

    let report = ctx
        .core
        .write_sms()?
        .emergency_broadcast(&request.message, &recipients)?;
    Ok(Json(report))
}

/// `POST /api/sms/send`
pub async fn send(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SmsMessage>, ApiError> {
    let Json(request) = payload?;
    let specialist = find_specialist(ctx.core.specialists.as_ref(), request.specialist_id)?;
    let sms = ctx.core.write_sms()?.send(&specialist, &request.message)?;
    Ok(Json(sms))
}

/// `GET /api/sms/messages`: outbox, newest first.
pub async fn messages(State(ctx): State<ApiContext>) -> Result<Json<Vec<SmsMessage>>, ApiError> {
    Ok(Json(ctx.core.read_sms()?.messages()))
}
