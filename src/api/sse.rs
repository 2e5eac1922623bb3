//! Server-Sent Events stream.
//!
//! Each connection gets a `connected` event carrying its client id and
//! the reconnection policy, then every event published on the hub. Each
//! event's data is the JSON `{type, data}` object. Lagging clients skip
//! what they missed.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::api::types::ApiContext;
use crate::events::{ReconnectionPolicy, RosterEvent};

fn to_sse(event: &RosterEvent) -> Option<Event> {
    match Event::default().json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!(event = event.name(), error = %e, "Failed to encode SSE event");
            None
        }
    }
}

/// `GET /api/sse/events`
pub async fn events(
    State(ctx): State<ApiContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let policy = ReconnectionPolicy::default();
    let client_id = Uuid::new_v4().to_string();
    let rx = ctx.core.events().subscribe();
    tracing::info!(
        %client_id,
        clients = ctx.core.events().client_count(),
        "SSE client connected"
    );

    let hello = RosterEvent::Connected {
        client_id,
        reconnect_policy: policy,
    };
    let first = to_sse(&hello)
        .map(|e| e.retry(Duration::from_millis(u64::from(policy.initial_delay_ms))));

    let updates = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => to_sse(&event),
            Err(lagged) => {
                tracing::debug!(error = %lagged, "SSE client lagged");
                None
            }
        }
    });

    let stream = stream::iter(first).chain(updates).map(Ok);

    Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(ctx.core.config.sse_keepalive_secs)),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SseStatus {
    pub clients: usize,
    pub keep_alive_secs: u64,
    pub reconnect_policy: ReconnectionPolicy,
}

/// `GET /api/sse/status`
pub async fn status(State(ctx): State<ApiContext>) -> Json<SseStatus> {
    Json(SseStatus {
        clients: ctx.core.events().client_count(),
        keep_alive_secs: ctx.core.config.sse_keepalive_secs,
        reconnect_policy: ReconnectionPolicy::default(),
    })
}
