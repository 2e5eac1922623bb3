//! Web-push endpoints under `/api/push`. Subscriptions are recorded;
//! nothing is delivered.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::PushSubscription;
use crate::notifications::push::SubscribeRequest;
use crate::notifications::NotifyError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscription: PushSubscription,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

fn vapid_key(ctx: &ApiContext) -> Result<String, ApiError> {
    ctx.core
        .config
        .vapid_public_key
        .clone()
        .ok_or_else(|| NotifyError::PushNotConfigured.into())
}

/// `GET /api/push/vapid-public-key`
pub async fn vapid_public_key(
    State(ctx): State<ApiContext>,
) -> Result<Json<VapidKeyResponse>, ApiError> {
    Ok(Json(VapidKeyResponse {
        public_key: vapid_key(&ctx)?,
    }))
}

/// `POST /api/push/subscribe`: 201 for a new endpoint, 200 for a refresh.
pub async fn subscribe(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscribeResponse>), ApiError> {
    vapid_key(&ctx)?;
    let Json(request) = payload?;
    let (subscription, created) = ctx.core.write_push()?.subscribe(request)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(SubscribeResponse { subscription })))
}

/// `POST /api/push/unsubscribe`
pub async fn unsubscribe(
    State(ctx): State<ApiContext>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let Json(request) = payload?;
    let removed = ctx.core.write_push()?.unsubscribe(&request.endpoint);
    Ok(Json(UnsubscribeResponse { removed }))
}

/// `GET /api/push/subscriptions`
pub async fn subscriptions(State(ctx): State<ApiContext>) -> Result<Json<CountResponse>, ApiError> {
    Ok(Json(CountResponse {
        count: ctx.core.read_push()?.count(),
    }))
}
