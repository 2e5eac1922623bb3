//! Live update fan-out for SSE clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::consultation::stats::ConsultationStatistics;

/// Client reconnection backoff, sent in the `connected` event.
///
/// Delays double from `initial_delay_ms` up to `max_delay_ms`. After
/// `max_retries` failed attempts the client stops reconnecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectionPolicy {
    pub initial_delay_ms: u32,
    pub max_delay_ms: u32,
    pub max_retries: u32,
}

impl Default for ReconnectionPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_retries: 5,
        }
    }
}

impl ReconnectionPolicy {
    /// Delay before reconnection attempt `attempt` (0-based), or `None`
    /// once the retry budget is spent.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<u32> {
        if attempt >= self.max_retries {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(
            self.initial_delay_ms
                .saturating_mul(factor)
                .min(self.max_delay_ms),
        )
    }

    pub fn schedule(&self) -> Vec<u32> {
        (0..).map_while(|n| self.delay_for_attempt(n)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RosterEntity {
    Doctor,
    Specialist,
    OnCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterChange {
    pub entity: RosterEntity,
    pub action: ChangeAction,
    pub id: u32,
}

/// Wire form is `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum RosterEvent {
    #[serde(rename_all = "camelCase")]
    Connected {
        client_id: String,
        reconnect_policy: ReconnectionPolicy,
    },
    RosterChange(RosterChange),
    AnalyticsUpdate(ConsultationStatistics),
}

impl RosterEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RosterEvent::Connected { .. } => "connected",
            RosterEvent::RosterChange(_) => "roster-change",
            RosterEvent::AnalyticsUpdate(_) => "analytics-update",
        }
    }
}

/// Broadcast hub. Each SSE connection holds one receiver.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<RosterEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.tx.subscribe()
    }

    /// Send to every connected client. Returns how many received it.
    pub fn publish(&self, event: RosterEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(n) => {
                tracing::debug!(event = name, receivers = n, "Event published");
                n
            }
            // No subscribers
            Err(_) => 0,
        }
    }

    pub fn roster_changed(&self, entity: RosterEntity, action: ChangeAction, id: u32) -> usize {
        self.publish(RosterEvent::RosterChange(RosterChange { entity, action, id }))
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
