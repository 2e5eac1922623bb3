//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//! Layers (outermost first): CORS, `Cache-Control: no-store` default,
//! `ApiContext` extension, audit logger.
//!
//! Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::{
    consultation_logs, doctors, health, on_call, push, sms, specialists,
};
use crate::api::middleware;
use crate::api::sse;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    let cors = cors_layer(ctx.core.config.cors_origin.as_deref());

    let logs = Router::new()
        .route("/", get(consultation_logs::list).post(consultation_logs::create))
        .route(
            "/:id",
            get(consultation_logs::detail)
                .put(consultation_logs::update)
                .delete(consultation_logs::remove),
        )
        .route("/date/:date", get(consultation_logs::by_date))
        .route("/shift/:shift", get(consultation_logs::by_shift))
        .route("/doctor/:doctor_id", get(consultation_logs::by_doctor))
        .route("/specialist/:specialist_id", get(consultation_logs::by_specialist))
        .route("/outcome/:outcome", get(consultation_logs::by_outcome))
        .route("/filter/urgent", get(consultation_logs::urgent))
        .route("/filter/recent", get(consultation_logs::recent))
        .route("/filter/recent/:days", get(consultation_logs::recent_days))
        .route("/range/:start/:end", get(consultation_logs::range))
        .route("/stats/overview", get(consultation_logs::overview))
        .route("/stats/response-time", get(consultation_logs::response_time))
        .route("/search/:term", get(consultation_logs::search))
        .route("/export/csv", get(consultation_logs::export_csv))
        .route("/export/pdf", get(consultation_logs::export_pdf))
        .route("/export/pdf/file", get(consultation_logs::export_pdf_file));

    let specialist_routes = Router::new()
        .route("/", get(specialists::list).post(specialists::create))
        .route(
            "/:id",
            get(specialists::detail)
                .put(specialists::update)
                .delete(specialists::remove),
        )
        .route("/department/:department", get(specialists::by_department));

    let doctor_routes = Router::new()
        .route("/", get(doctors::list).post(doctors::create))
        .route(
            "/:id",
            get(doctors::detail)
                .put(doctors::update)
                .delete(doctors::remove),
        );

    let on_call_routes = Router::new()
        .route("/", get(on_call::list).post(on_call::create))
        .route("/today", get(on_call::today))
        .route(
            "/:id",
            get(on_call::detail)
                .put(on_call::update)
                .delete(on_call::remove),
        )
        .route("/date/:date", get(on_call::by_date))
        .route("/specialist/:specialist_id", get(on_call::by_specialist));

    let sms_routes = Router::new()
        .route("/status", get(sms::status))
        .route("/toggle", post(sms::toggle))
        .route("/emergency", post(sms::emergency))
        .route("/send", post(sms::send))
        .route("/messages", get(sms::messages));

    let push_routes = Router::new()
        .route("/vapid-public-key", get(push::vapid_public_key))
        .route("/subscribe", post(push::subscribe))
        .route("/unsubscribe", post(push::unsubscribe))
        .route("/subscriptions", get(push::subscriptions));

    let api = Router::new()
        .route("/health", get(health::check))
        .route("/sse/events", get(sse::events))
        .route("/sse/status", get(sse::status))
        .nest("/consultation-logs", logs)
        .nest("/specialists", specialist_routes)
        .nest("/doctors", doctor_routes)
        .nest("/on-call", on_call_routes)
        .nest("/sms", sms_routes)
        .nest("/push", push_routes)
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        // Extension must be outside the audit layer so it can read ApiContext
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => cors.allow_origin(value),
        Some(Err(_)) => {
            tracing::warn!("Invalid CORS origin, allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Local;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServerConfig;
    use crate::events::{ChangeAction, RosterEntity, RosterEvent};
    use crate::on_call::service_day;

    fn seeded_core() -> Arc<CoreState> {
        seeded_core_with(ServerConfig::default())
    }

    fn seeded_core_with(config: ServerConfig) -> Arc<CoreState> {
        let today = service_day(Local::now().naive_local());
        Arc::new(CoreState::seeded(config, today).unwrap())
    }

    fn empty_core() -> Arc<CoreState> {
        Arc::new(CoreState::new(ServerConfig::default()))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(core: &Arc<CoreState>, req: Request<Body>) -> Response {
        api_router(core.clone()).oneshot(req).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn vapid_key() -> String {
        let mut bytes = vec![0x04];
        bytes.extend([3u8; 64]);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    // ── Health & middleware ─────────────────────────────────

    #[tokio::test]
    async fn health_reports_version_and_clients() {
        let core = empty_core();
        let response = send(&core, get_req("/api/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
        assert_eq!(json["sseClients"], 0);
    }

    #[tokio::test]
    async fn requests_are_audited() {
        let core = empty_core();
        send(&core, get_req("/api/doctors/9")).await;
        let entries = core.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].method, "GET");
        assert_eq!(entries[0].path, "/api/doctors/9");
        assert_eq!(entries[0].status, 404);
    }

    // ── Consultation logs ───────────────────────────────────

    #[tokio::test]
    async fn list_and_filter_logs() {
        let core = seeded_core();
        let all = body_json(send(&core, get_req("/api/consultation-logs")).await).await;
        assert_eq!(all.as_array().unwrap().len(), 5);

        let urgent =
            body_json(send(&core, get_req("/api/consultation-logs?urgent=true")).await).await;
        assert_eq!(urgent.as_array().unwrap().len(), 2);

        let combined = body_json(
            send(&core, get_req("/api/consultation-logs?urgent=true&shift=night")).await,
        )
        .await;
        assert_eq!(combined.as_array().unwrap().len(), 1);
        assert_eq!(combined[0]["patientId"], "ER-1003");

        let response = send(&core, get_req("/api/consultation-logs?shift=brunch")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_log_is_404_with_json_body() {
        let core = seeded_core();
        let response = send(&core, get_req("/api/consultation-logs/99")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json["error"].as_str().unwrap().contains("99"));

        let response = send(&core, get_req("/api/consultation-logs/abc")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_log_validates_and_assigns_next_id() {
        let core = seeded_core();
        let response = send(
            &core,
            json_req("POST", "/api/consultation-logs", json!({"shift": "night"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["error"],
            "Validation failed: Missing required fields: date, erDoctorId, timeCalled, specialistId, patientId, outcome"
        );

        let body = json!({
            "date": "2025-06-29",
            "shift": "evening",
            "erDoctorId": 2,
            "timeCalled": "17:00",
            "specialistId": 2,
            "arrivalTime": "17:25",
            "patientId": "ER-2000",
            "outcome": "consult_only",
            "urgent": true
        });
        let response = send(&core, json_req("POST", "/api/consultation-logs", body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["id"], 6);
        assert_eq!(created["specialty"], "Neurology");
        assert_eq!(created["responseTime"], "25 min");

        let fetched = body_json(send(&core, get_req("/api/consultation-logs/6")).await).await;
        assert_eq!(fetched["patientId"], "ER-2000");
    }

    #[tokio::test]
    async fn unknown_outcome_in_body_is_400() {
        let core = seeded_core();
        let body = json!({
            "date": "2025-06-29",
            "shift": "night",
            "erDoctorId": 1,
            "timeCalled": "01:00",
            "specialistId": 1,
            "patientId": "ER-3000",
            "outcome": "vanished"
        });
        let response = send(&core, json_req("POST", "/api/consultation-logs", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn update_and_delete_log() {
        let core = seeded_core();
        let response = send(
            &core,
            json_req("PUT", "/api/consultation-logs/1", json!({"outcome": "transferred"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["outcome"], "transferred");
        assert!(updated["updatedAt"].is_string());

        let response = send(
            &core,
            json_req("PUT", "/api/consultation-logs/1", json!({"outcome": "Admitted"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["outcome"], "admitted");

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/consultation-logs/1")
            .body(Body::empty())
            .unwrap();
        let deleted = body_json(send(&core, request).await).await;
        assert_eq!(deleted["deleted"]["id"], 1);

        let response = send(&core, get_req("/api/consultation-logs/1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lookups_by_path_segment() {
        let core = seeded_core();
        let dama = body_json(send(&core, get_req("/api/consultation-logs/outcome/dama")).await).await;
        assert_eq!(dama.as_array().unwrap().len(), 1);

        let night = body_json(send(&core, get_req("/api/consultation-logs/shift/night")).await).await;
        assert_eq!(night.as_array().unwrap().len(), 2);

        let by_doctor =
            body_json(send(&core, get_req("/api/consultation-logs/doctor/1")).await).await;
        assert_eq!(by_doctor.as_array().unwrap().len(), 2);

        let by_specialist =
            body_json(send(&core, get_req("/api/consultation-logs/specialist/1")).await).await;
        assert_eq!(by_specialist.as_array().unwrap().len(), 2);

        let urgent =
            body_json(send(&core, get_req("/api/consultation-logs/filter/urgent")).await).await;
        assert_eq!(urgent.as_array().unwrap().len(), 2);

        let found =
            body_json(send(&core, get_req("/api/consultation-logs/search/er-1003")).await).await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let response = send(&core, get_req("/api/consultation-logs/outcome/vanished")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recent_and_range_windows() {
        let core = seeded_core();
        let recent =
            body_json(send(&core, get_req("/api/consultation-logs/filter/recent")).await).await;
        assert_eq!(recent.as_array().unwrap().len(), 5);

        let response =
            send(&core, get_req("/api/consultation-logs/filter/recent/lots")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &core,
            get_req("/api/consultation-logs/range/2025-06-30/2025-06-01"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &core,
            get_req("/api/consultation-logs/range/2000-01-01/2000-01-31"),
        )
        .await;
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn statistics_endpoints() {
        let core = seeded_core();
        let stats =
            body_json(send(&core, get_req("/api/consultation-logs/stats/overview")).await).await;
        assert_eq!(stats["total"], 5);
        assert_eq!(stats["admitted"], 2);
        assert_eq!(stats["admissionRate"], 40);
        assert_eq!(stats["dama"], 1);
        assert_eq!(stats["averageResponseTime"], 30.0);

        let rt = body_json(
            send(&core, get_req("/api/consultation-logs/stats/response-time")).await,
        )
        .await;
        assert_eq!(rt["count"], 4);
        assert_eq!(rt["min"], 15);
        assert_eq!(rt["max"], 45);
    }

    #[tokio::test]
    async fn csv_export_is_an_attachment() {
        let core = seeded_core();
        let response = send(&core, get_req("/api/consultation-logs/export/csv")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = response
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"consultation-logs-"));
        assert!(disposition.ends_with(".csv\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(csv.trim_end().lines().count(), 6);
        assert!(csv.contains("Sarah Lee"));
        assert!(csv.contains("Daniel Okafor"));
    }

    #[tokio::test]
    async fn pdf_exports() {
        let core = seeded_core();
        let payload =
            body_json(send(&core, get_req("/api/consultation-logs/export/pdf")).await).await;
        assert_eq!(payload["rows"].as_array().unwrap().len(), 5);
        assert_eq!(payload["summary"]["total"], 5);
        assert!(payload["generatedAt"].is_string());

        let response = send(&core, get_req("/api/consultation-logs/export/pdf/file")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/pdf"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn log_mutation_pushes_analytics() {
        let core = seeded_core();
        let mut rx = core.events().subscribe();
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/consultation-logs/2")
            .body(Body::empty())
            .unwrap();
        send(&core, request).await;
        match rx.recv().await.unwrap() {
            RosterEvent::AnalyticsUpdate(stats) => assert_eq!(stats.total, 4),
            other => panic!("unexpected event {}", other.name()),
        }
    }

    // ── Directories ─────────────────────────────────────────

    #[tokio::test]
    async fn specialist_crud_and_department_lookup() {
        let core = seeded_core();
        let cardiology = body_json(
            send(&core, get_req("/api/specialists/department/cardiology")).await,
        )
        .await;
        assert_eq!(cardiology.as_array().unwrap().len(), 1);

        let surgery = body_json(
            send(&core, get_req("/api/specialists/department/General%20Surgery")).await,
        )
        .await;
        assert_eq!(surgery[0]["name"], "Marc Tremblay");

        let response = send(
            &core,
            json_req("POST", "/api/specialists", json!({"name": "Lena Fischer"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let mut rx = core.events().subscribe();
        let response = send(
            &core,
            json_req(
                "POST",
                "/api/specialists",
                json!({"name": "Lena Fischer", "department": "Neurology"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["id"], 5);

        match rx.recv().await.unwrap() {
            RosterEvent::RosterChange(change) => {
                assert_eq!(change.entity, RosterEntity::Specialist);
                assert_eq!(change.action, ChangeAction::Created);
                assert_eq!(change.id, 5);
            }
            other => panic!("unexpected event {}", other.name()),
        }

        let updated = body_json(
            send(
                &core,
                json_req("PUT", "/api/specialists/5", json!({"phone": "555-0299"})),
            )
            .await,
        )
        .await;
        assert_eq!(updated["phone"], "555-0299");
        assert_eq!(updated["department"], "Neurology");
    }

    #[tokio::test]
    async fn doctor_search_and_delete() {
        let core = seeded_core();
        let found = body_json(send(&core, get_req("/api/doctors?search=LEE")).await).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["name"], "Sarah Lee");

        let all = body_json(send(&core, get_req("/api/doctors")).await).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/doctors/3")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&core, request).await.status(), StatusCode::OK);
        let response = send(&core, get_req("/api/doctors/3")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let core = empty_core();
        let request = Request::builder()
            .method("POST")
            .uri("/api/doctors")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(&core, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    // ── On-call ─────────────────────────────────────────────

    #[tokio::test]
    async fn today_groups_by_department() {
        let core = seeded_core();
        let today = body_json(send(&core, get_req("/api/on-call/today")).await).await;
        assert_eq!(today["total"], 4);
        assert_eq!(today["departments"]["Cardiology"][0]["specialistName"], "Daniel Okafor");
    }

    #[tokio::test]
    async fn date_query_applies_rollover_to_date_times() {
        let core = empty_core();
        for (specialist, day) in [(1, "2025-06-28"), (2, "2025-06-29")] {
            let response = send(
                &core,
                json_req(
                    "POST",
                    "/api/on-call",
                    json!({"specialistId": specialist, "startDate": day, "department": "Cardiology"}),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let early =
            body_json(send(&core, get_req("/api/on-call/date/2025-06-29T07:00")).await).await;
        assert_eq!(early.as_array().unwrap().len(), 1);
        assert_eq!(early[0]["startDate"], "2025-06-28");
        assert_eq!(early[0]["specialistName"], "Unknown (#1)");

        let handover =
            body_json(send(&core, get_req("/api/on-call/date/2025-06-29T08:00")).await).await;
        assert_eq!(handover[0]["startDate"], "2025-06-29");

        let plain = body_json(send(&core, get_req("/api/on-call/date/2025-06-29")).await).await;
        assert_eq!(plain[0]["specialistId"], 2);

        let response = send(&core, get_req("/api/on-call/date/yesterday")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn on_call_by_specialist_and_missing_fields() {
        let core = seeded_core();
        let rows = body_json(send(&core, get_req("/api/on-call/specialist/2")).await).await;
        assert_eq!(rows.as_array().unwrap().len(), 2);

        let response = send(
            &core,
            json_req("POST", "/api/on-call", json!({"department": "Cardiology"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Validation failed: Missing required fields: specialistId, startDate"
        );
    }

    // ── SMS & push ──────────────────────────────────────────

    #[tokio::test]
    async fn emergency_sms_reaches_everyone_on_call() {
        let core = seeded_core();
        let report = body_json(
            send(
                &core,
                json_req("POST", "/api/sms/emergency", json!({"message": "Code blue, bay 3"})),
            )
            .await,
        )
        .await;
        assert_eq!(report["sent"], 4);

        let status = body_json(send(&core, get_req("/api/sms/status")).await).await;
        assert_eq!(status["enabled"], true);
        assert_eq!(status["emergencySent"], 4);

        let messages = body_json(send(&core, get_req("/api/sms/messages")).await).await;
        assert_eq!(messages.as_array().unwrap().len(), 4);
        assert_eq!(messages[0]["status"], "queued");
    }

    #[tokio::test]
    async fn disabled_sms_is_503() {
        let core = seeded_core();
        let toggled = body_json(
            send(&core, json_req("POST", "/api/sms/toggle", json!({"enabled": false}))).await,
        )
        .await;
        assert_eq!(toggled["enabled"], false);

        let response = send(
            &core,
            json_req("POST", "/api/sms/send", json!({"specialistId": 1, "message": "hi"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let request = Request::builder()
            .method("POST")
            .uri("/api/sms/toggle")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_json(send(&core, request).await).await["enabled"], true);
    }

    #[tokio::test]
    async fn malformed_toggle_body_leaves_flag_alone() {
        let core = seeded_core();
        let broken = Request::builder()
            .method("POST")
            .uri("/api/sms/toggle")
            .header("Content-Type", "application/json")
            .body(Body::from("{broken"))
            .unwrap();
        assert_eq!(send(&core, broken).await.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &core,
            json_req("POST", "/api/sms/toggle", json!({"enabled": "false"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let status = body_json(send(&core, get_req("/api/sms/status")).await).await;
        assert_eq!(status["enabled"], true);
    }

    #[tokio::test]
    async fn direct_sms_to_unknown_specialist_is_404() {
        let core = seeded_core();
        let response = send(
            &core,
            json_req("POST", "/api/sms/send", json!({"specialistId": 42, "message": "hi"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn push_requires_vapid_key() {
        let core = empty_core();
        let response = send(&core, get_req("/api/push/vapid-public-key")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn push_subscribe_and_unsubscribe() {
        let key = vapid_key();
        let core = seeded_core_with(ServerConfig {
            vapid_public_key: Some(key.clone()),
            ..Default::default()
        });
        let json = body_json(send(&core, get_req("/api/push/vapid-public-key")).await).await;
        assert_eq!(json["publicKey"], key);

        let subscription = json!({
            "endpoint": "https://push.example/sub/1",
            "keys": {"p256dh": key, "auth": URL_SAFE_NO_PAD.encode([1u8; 16])}
        });
        let response = send(&core, json_req("POST", "/api/push/subscribe", subscription)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let count = body_json(send(&core, get_req("/api/push/subscriptions")).await).await;
        assert_eq!(count["count"], 1);

        let removed = body_json(
            send(
                &core,
                json_req(
                    "POST",
                    "/api/push/unsubscribe",
                    json!({"endpoint": "https://push.example/sub/1"}),
                ),
            )
            .await,
        )
        .await;
        assert_eq!(removed["removed"], true);
    }

    // ── SSE ─────────────────────────────────────────────────

    #[tokio::test]
    async fn sse_stream_starts_with_connected_event() {
        let core = empty_core();
        let response = send(&core, get_req("/api/sse/events")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/event-stream"
        );
        assert_eq!(core.events().client_count(), 1);

        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.contains("\"type\":\"connected\""));
        assert!(text.contains("retry: 1000") || text.contains("retry:1000"));

        let status = body_json(send(&core, get_req("/api/sse/status")).await).await;
        assert_eq!(status["clients"], 1);
        assert_eq!(status["reconnectPolicy"]["maxRetries"], 5);

        drop(body);
        assert_eq!(core.events().client_count(), 0);
    }
}
