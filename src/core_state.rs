//! Shared application state.
//!
//! `CoreState` is wrapped in `Arc` at startup and handed to every axum
//! handler. Collections live behind `Repository` trait objects; the
//! notification surfaces use `RwLock`. No guard is held across `.await`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::config::ServerConfig;
use crate::consultation::stats::{statistics, ConsultationStatistics};
use crate::doctors::doctor_display_name;
use crate::events::{EventHub, RosterEvent};
use crate::models::{ConsultationLog, Doctor, Specialist, SpecialistOnCall};
use crate::notifications::{PushRegistry, SmsGateway};
use crate::on_call::service_day;
use crate::specialists::specialist_display_name;
use crate::store::seed::{seed_sample_data, SeedSummary};
use crate::store::{MemoryRepository, Repository, StoreError};

/// Audit entries kept in memory. Oldest are dropped first.
const AUDIT_BUFFER_CAPACITY: usize = 1_000;

/// Application state shared by all request handlers.
pub struct CoreState {
    pub config: ServerConfig,
    pub doctors: Arc<dyn Repository<Doctor>>,
    pub specialists: Arc<dyn Repository<Specialist>>,
    pub on_call: Arc<dyn Repository<SpecialistOnCall>>,
    pub consultation_logs: Arc<dyn Repository<ConsultationLog>>,
    sms: RwLock<SmsGateway>,
    push: RwLock<PushRegistry>,
    events: EventHub,
    audit: AuditLogger,
    started_at: Instant,
}

impl CoreState {
    /// Empty collections backed by in-memory repositories.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
        )
    }

    pub fn with_repositories(
        config: ServerConfig,
        doctors: Arc<dyn Repository<Doctor>>,
        specialists: Arc<dyn Repository<Specialist>>,
        on_call: Arc<dyn Repository<SpecialistOnCall>>,
        consultation_logs: Arc<dyn Repository<ConsultationLog>>,
    ) -> Self {
        let events = EventHub::new(config.event_capacity);
        Self {
            config,
            doctors,
            specialists,
            on_call,
            consultation_logs,
            sms: RwLock::new(SmsGateway::default()),
            push: RwLock::new(PushRegistry::new()),
            events,
            audit: AuditLogger::new(),
            started_at: Instant::now(),
        }
    }

    /// State pre-filled with sample data around service day `today`.
    pub fn seeded(config: ServerConfig, today: NaiveDate) -> Result<Self, CoreError> {
        let state = Self::new(config);
        state.seed(today)?;
        Ok(state)
    }

    /// Build from configuration, seeding relative to the current
    /// service day when enabled.
    pub fn from_config(config: ServerConfig) -> Result<Self, CoreError> {
        if config.seed {
            let today = service_day(Local::now().naive_local());
            Self::seeded(config, today)
        } else {
            Ok(Self::new(config))
        }
    }

    pub fn seed(&self, today: NaiveDate) -> Result<SeedSummary, CoreError> {
        Ok(seed_sample_data(
            today,
            self.doctors.as_ref(),
            self.specialists.as_ref(),
            self.on_call.as_ref(),
            self.consultation_logs.as_ref(),
        )?)
    }

    // ── Name resolution ─────────────────────────────────────

    pub fn doctor_name(&self, id: u32) -> String {
        doctor_display_name(self.doctors.as_ref(), id)
    }

    pub fn specialist_name(&self, id: u32) -> String {
        specialist_display_name(self.specialists.as_ref(), id)
    }

    /// Overview statistics across every consultation log.
    pub fn statistics(&self) -> Result<ConsultationStatistics, CoreError> {
        let logs = self.consultation_logs.list()?;
        Ok(statistics(&logs, &|id| self.doctor_name(id)))
    }

    // ── Notification surfaces ───────────────────────────────

    pub fn read_sms(&self) -> Result<RwLockReadGuard<'_, SmsGateway>, CoreError> {
        self.sms.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_sms(&self) -> Result<RwLockWriteGuard<'_, SmsGateway>, CoreError> {
        self.sms.write().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn read_push(&self) -> Result<RwLockReadGuard<'_, PushRegistry>, CoreError> {
        self.push.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_push(&self) -> Result<RwLockWriteGuard<'_, PushRegistry>, CoreError> {
        self.push.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Events ──────────────────────────────────────────────

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Push fresh statistics to SSE clients after a log mutation.
    /// Failure to compute them is logged, not returned.
    pub fn publish_analytics(&self) {
        match self.statistics() {
            Ok(stats) => {
                self.events.publish(RosterEvent::AnalyticsUpdate(stats));
            }
            Err(e) => tracing::warn!(error = %e, "Skipping analytics update"),
        }
    }

    // ── Audit ───────────────────────────────────────────────

    pub fn log_access(&self, entry: AuditEntry) {
        self.audit.log(entry);
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// One handled API request.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub latency_ms: u64,
}

/// Bounded in-memory audit buffer.
pub struct AuditLogger {
    buffer: Mutex<VecDeque<AuditEntry>>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(AUDIT_BUFFER_CAPACITY)),
        }
    }

    pub fn log(&self, entry: AuditEntry) {
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() == AUDIT_BUFFER_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> AuditEntry {
        AuditEntry {
            timestamp: chrono::Utc::now(),
            method: "GET".into(),
            path: path.into(),
            status: 200,
            latency_ms: 1,
        }
    }

    #[test]
    fn new_state_is_empty() {
        let state = CoreState::new(ServerConfig::default());
        assert_eq!(state.doctors.count().unwrap(), 0);
        assert_eq!(state.statistics().unwrap().total, 0);
    }

    #[test]
    fn seeded_state_has_sample_data() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 29).unwrap();
        let state = CoreState::seeded(ServerConfig::default(), today).unwrap();
        assert_eq!(state.consultation_logs.count().unwrap(), 5);
        assert_eq!(state.doctor_name(1), "Sarah Lee");
        assert_eq!(state.specialist_name(99), "Unknown (#99)");
    }

    #[test]
    fn from_config_respects_seed_flag() {
        let config = ServerConfig {
            seed: false,
            ..Default::default()
        };
        let state = CoreState::from_config(config).unwrap();
        assert_eq!(state.specialists.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn analytics_update_reaches_subscribers() {
        let state = CoreState::new(ServerConfig::default());
        let mut rx = state.events().subscribe();
        state.publish_analytics();
        match rx.recv().await.unwrap() {
            RosterEvent::AnalyticsUpdate(stats) => assert_eq!(stats.total, 0),
            other => panic!("unexpected event {}", other.name()),
        }
    }

    #[test]
    fn audit_buffer_is_bounded() {
        let logger = AuditLogger::new();
        for i in 0..AUDIT_BUFFER_CAPACITY + 5 {
            logger.log(entry(&format!("/api/{i}")));
        }
        assert_eq!(logger.buffer_len(), AUDIT_BUFFER_CAPACITY);
        assert_eq!(logger.entries()[0].path, "/api/5");
    }

    #[test]
    fn state_records_audit_entries() {
        let state = CoreState::new(ServerConfig::default());
        state.log_access(entry("/api/health"));
        assert_eq!(state.audit_entries().len(), 1);
    }
}
