use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{OnCallEntry, SmsKind, SmsMessage, SmsStatus, Specialist};

use super::NotifyError;

/// Oldest messages are dropped past this many.
pub const OUTBOX_CAPACITY: usize = 500;

/// Concatenated SMS limit (10 segments).
pub const MAX_MESSAGE_LEN: usize = 1_600;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsStatusReport {
    pub enabled: bool,
    pub queued: usize,
    pub emergency_sent: usize,
    pub direct_sent: usize,
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Result of an emergency fan-out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyReport {
    pub sent: usize,
    pub messages: Vec<SmsMessage>,
    /// Specialists on call without a phone number.
    pub skipped: Vec<String>,
}

pub struct SmsGateway {
    enabled: bool,
    outbox: VecDeque<SmsMessage>,
    emergency_sent: usize,
    direct_sent: usize,
}

impl SmsGateway {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            outbox: VecDeque::new(),
            emergency_sent: 0,
            direct_sent: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the enabled flag, or flip it when `enabled` is `None`.
    pub fn toggle(&mut self, enabled: Option<bool>) -> bool {
        self.enabled = enabled.unwrap_or(!self.enabled);
        tracing::info!(enabled = self.enabled, "SMS notifications toggled");
        self.enabled
    }

    pub fn status(&self) -> SmsStatusReport {
        SmsStatusReport {
            enabled: self.enabled,
            queued: self.outbox.len(),
            emergency_sent: self.emergency_sent,
            direct_sent: self.direct_sent,
            last_sent_at: self.outbox.back().map(|m| m.created_at),
        }
    }

    /// Newest first.
    pub fn messages(&self) -> Vec<SmsMessage> {
        self.outbox.iter().rev().cloned().collect()
    }

    /// Queue `message` for every on-call specialist with a phone number.
    pub fn emergency_broadcast(
        &mut self,
        message: &str,
        on_call: &[OnCallEntry],
    ) -> Result<EmergencyReport, NotifyError> {
        self.ensure_enabled()?;
        let body = validate_body(message)?;

        let mut messages = Vec::new();
        let mut skipped = Vec::new();
        for entry in on_call {
            match entry.specialist.as_ref().and_then(phone_of) {
                Some(phone) => {
                    let sms = self.enqueue(phone, &entry.specialist_name, body, SmsKind::Emergency);
                    messages.push(sms);
                }
                None => skipped.push(entry.specialist_name.clone()),
            }
        }
        self.emergency_sent += messages.len();

        tracing::warn!(
            sent = messages.len(),
            skipped = skipped.len(),
            "Emergency SMS broadcast queued"
        );
        Ok(EmergencyReport {
            sent: messages.len(),
            messages,
            skipped,
        })
    }

    /// Queue a direct message to one specialist.
    pub fn send(&mut self, specialist: &Specialist, message: &str) -> Result<SmsMessage, NotifyError> {
        self.ensure_enabled()?;
        let body = validate_body(message)?;
        let phone = phone_of(specialist).ok_or_else(|| {
            NotifyError::Invalid(format!("Specialist {} has no phone number", specialist.id))
        })?;
        let sms = self.enqueue(phone, &specialist.name, body, SmsKind::Direct);
        self.direct_sent += 1;
        tracing::info!(specialist_id = specialist.id, "Direct SMS queued");
        Ok(sms)
    }

    fn ensure_enabled(&self) -> Result<(), NotifyError> {
        if self.enabled {
            Ok(())
        } else {
            Err(NotifyError::SmsDisabled)
        }
    }

    fn enqueue(&mut self, to: &str, name: &str, body: &str, kind: SmsKind) -> SmsMessage {
        let sms = SmsMessage {
            id: Uuid::new_v4(),
            to: to.to_string(),
            recipient_name: name.to_string(),
            body: body.to_string(),
            kind,
            status: SmsStatus::Queued,
            created_at: Utc::now(),
        };
        if self.outbox.len() == OUTBOX_CAPACITY {
            self.outbox.pop_front();
        }
        self.outbox.push_back(sms.clone());
        sms
    }
}

impl Default for SmsGateway {
    fn default() -> Self {
        Self::new(true)
    }
}

fn phone_of(specialist: &Specialist) -> Option<&str> {
    specialist
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

fn validate_body(message: &str) -> Result<&str, NotifyError> {
    let body = message.trim();
    if body.is_empty() {
        return Err(NotifyError::Invalid("Message is required".into()));
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(NotifyError::Invalid(format!(
            "Message exceeds {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(body)
}
