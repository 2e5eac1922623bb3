//! Consultation log endpoints under `/api/consultation-logs`.
//!
//! Every successful mutation pushes fresh statistics to SSE clients.

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Local, Utc};

use crate::api::error::ApiError;
use crate::api::types::{parse_date, parse_id, ApiContext, Deleted};
use crate::consultation::export::{self, NameResolver, PdfExport};
use crate::consultation::stats::{response_time_stats, ConsultationStatistics, ResponseTimeStats};
use crate::consultation::{self, DEFAULT_RECENT_DAYS};
use crate::core_state::CoreState;
use crate::models::{ConsultationFilter, ConsultationLog, ConsultationLogInput, Outcome, Shift};

type Logs = Result<Json<Vec<ConsultationLog>>, ApiError>;

/// `GET /api/consultation-logs` with optional combined filter
/// (`shift`, `outcome`, `urgent`, `from`, `to`, `doctor`, `specialist`).
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<ConsultationFilter>, QueryRejection>,
) -> Logs {
    let Query(filter) = query?;
    Ok(Json(consultation::filter_logs(
        ctx.core.consultation_logs.as_ref(),
        &filter,
    )?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ConsultationLog>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(consultation::find_log(
        ctx.core.consultation_logs.as_ref(),
        id,
    )?))
}

pub async fn by_date(State(ctx): State<ApiContext>, Path(date): Path<String>) -> Logs {
    let date = parse_date(&date)?;
    Ok(Json(consultation::logs_by_date(
        ctx.core.consultation_logs.as_ref(),
        date,
    )?))
}

pub async fn by_shift(State(ctx): State<ApiContext>, Path(shift): Path<String>) -> Logs {
    let shift = Shift::from_str(&shift)?;
    Ok(Json(consultation::logs_by_shift(
        ctx.core.consultation_logs.as_ref(),
        shift,
    )?))
}

pub async fn by_doctor(State(ctx): State<ApiContext>, Path(doctor_id): Path<String>) -> Logs {
    let doctor_id = parse_id(&doctor_id)?;
    Ok(Json(consultation::logs_by_er_doctor(
        ctx.core.consultation_logs.as_ref(),
        doctor_id,
    )?))
}

pub async fn by_specialist(
    State(ctx): State<ApiContext>,
    Path(specialist_id): Path<String>,
) -> Logs {
    let specialist_id = parse_id(&specialist_id)?;
    Ok(Json(consultation::logs_by_specialist(
        ctx.core.consultation_logs.as_ref(),
        specialist_id,
    )?))
}

pub async fn by_outcome(State(ctx): State<ApiContext>, Path(outcome): Path<String>) -> Logs {
    let outcome = Outcome::from_str(&outcome)?;
    Ok(Json(consultation::logs_by_outcome(
        ctx.core.consultation_logs.as_ref(),
        outcome,
    )?))
}

/// `GET /api/consultation-logs/filter/urgent`
pub async fn urgent(State(ctx): State<ApiContext>) -> Logs {
    Ok(Json(consultation::urgent_logs(
        ctx.core.consultation_logs.as_ref(),
    )?))
}

/// `GET /api/consultation-logs/filter/recent`
pub async fn recent(State(ctx): State<ApiContext>) -> Logs {
    recent_window(&ctx, DEFAULT_RECENT_DAYS)
}

/// `GET /api/consultation-logs/filter/recent/:days`
pub async fn recent_days(State(ctx): State<ApiContext>, Path(days): Path<String>) -> Logs {
    let days = days
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid number of days: {days}")))?;
    recent_window(&ctx, days)
}

fn recent_window(ctx: &ApiContext, days: u32) -> Logs {
    let today = Local::now().date_naive();
    Ok(Json(consultation::recent_logs(
        ctx.core.consultation_logs.as_ref(),
        days,
        today,
    )?))
}

/// `GET /api/consultation-logs/range/:start/:end` (inclusive)
pub async fn range(
    State(ctx): State<ApiContext>,
    Path((start, end)): Path<(String, String)>,
) -> Logs {
    let (start, end) = (parse_date(&start)?, parse_date(&end)?);
    Ok(Json(consultation::logs_in_range(
        ctx.core.consultation_logs.as_ref(),
        start,
        end,
    )?))
}

/// `GET /api/consultation-logs/search/:term`
pub async fn search(State(ctx): State<ApiContext>, Path(term): Path<String>) -> Logs {
    Ok(Json(consultation::search_logs(
        ctx.core.consultation_logs.as_ref(),
        &term,
    )?))
}

/// `GET /api/consultation-logs/stats/overview`
pub async fn overview(
    State(ctx): State<ApiContext>,
) -> Result<Json<ConsultationStatistics>, ApiError> {
    Ok(Json(ctx.core.statistics()?))
}

/// `GET /api/consultation-logs/stats/response-time`
pub async fn response_time(
    State(ctx): State<ApiContext>,
) -> Result<Json<ResponseTimeStats>, ApiError> {
    let logs = ctx.core.consultation_logs.list()?;
    Ok(Json(response_time_stats(&logs)))
}

fn build_export(core: &CoreState) -> Result<PdfExport, ApiError> {
    let logs = core.consultation_logs.list()?;
    let doctor = |id| core.doctor_name(id);
    let specialist = |id| core.specialist_name(id);
    let names = NameResolver {
        doctor: &doctor,
        specialist: &specialist,
    };
    Ok(export::pdf_payload(&logs, &names, Utc::now()))
}

/// `GET /api/consultation-logs/export/csv`
pub async fn export_csv(State(ctx): State<ApiContext>) -> Result<impl IntoResponse, ApiError> {
    let logs = ctx.core.consultation_logs.list()?;
    let core = &ctx.core;
    let doctor = |id| core.doctor_name(id);
    let specialist = |id| core.specialist_name(id);
    let names = NameResolver {
        doctor: &doctor,
        specialist: &specialist,
    };
    let csv = export::to_csv(&logs, &names);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::csv_filename(Utc::now())
    );
    tracing::info!(rows = logs.len(), "Consultation logs exported as CSV");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// `GET /api/consultation-logs/export/pdf`: table payload for client-side rendering.
pub async fn export_pdf(State(ctx): State<ApiContext>) -> Result<Json<PdfExport>, ApiError> {
    Ok(Json(build_export(&ctx.core)?))
}

/// `GET /api/consultation-logs/export/pdf/file`: server-rendered PDF.
pub async fn export_pdf_file(
    State(ctx): State<ApiContext>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = build_export(&ctx.core)?;
    let filename = export::pdf_filename(payload.generated_at);
    let rows = payload.rows.len();

    let bytes = tokio::task::spawn_blocking(move || export::render_pdf(&payload))
        .await
        .map_err(|e| ApiError::Internal(format!("PDF task failed: {e}")))??;
    tracing::info!(rows, bytes = bytes.len(), "Consultation logs exported as PDF");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ConsultationLogInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ConsultationLog>), ApiError> {
    let Json(input) = payload?;
    let log = consultation::add_log(
        ctx.core.consultation_logs.as_ref(),
        ctx.core.specialists.as_ref(),
        input,
    )?;
    ctx.core.publish_analytics();
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<ConsultationLogInput>, JsonRejection>,
) -> Result<Json<ConsultationLog>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let log = consultation::update_log(ctx.core.consultation_logs.as_ref(), id, input)?;
    ctx.core.publish_analytics();
    Ok(Json(log))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Deleted<ConsultationLog>>, ApiError> {
    let id = parse_id(&id)?;
    let log = consultation::delete_log(ctx.core.consultation_logs.as_ref(), id)?;
    ctx.core.publish_analytics();
    Ok(Json(Deleted { deleted: log }))
}
