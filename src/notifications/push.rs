use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::VAPID_KEY_LEN;
use crate::models::{PushKeys, PushSubscription};

use super::NotifyError;

/// Length of the client auth secret.
const AUTH_SECRET_LEN: usize = 16;

/// Subscription body as produced by `PushSubscription.toJSON()` in browsers.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Default)]
pub struct PushRegistry {
    by_endpoint: HashMap<String, PushSubscription>,
}

impl PushRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or refresh a subscription. Returns it and whether it was new.
    pub fn subscribe(
        &mut self,
        request: SubscribeRequest,
    ) -> Result<(PushSubscription, bool), NotifyError> {
        let endpoint = validate_endpoint(&request.endpoint)?;
        validate_key("p256dh", &request.keys.p256dh, VAPID_KEY_LEN)?;
        validate_key("auth", &request.keys.auth, AUTH_SECRET_LEN)?;

        if let Some(existing) = self.by_endpoint.get_mut(endpoint) {
            existing.keys = request.keys;
            tracing::debug!(id = %existing.id, "Push subscription refreshed");
            return Ok((existing.clone(), false));
        }

        let subscription = PushSubscription {
            id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            keys: request.keys,
            created_at: Utc::now(),
        };
        self.by_endpoint
            .insert(subscription.endpoint.clone(), subscription.clone());
        tracing::info!(id = %subscription.id, "Push subscription added");
        Ok((subscription, true))
    }

    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&mut self, endpoint: &str) -> bool {
        let removed = self.by_endpoint.remove(endpoint.trim()).is_some();
        if removed {
            tracing::info!("Push subscription removed");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.by_endpoint.len()
    }
}

fn validate_endpoint(endpoint: &str) -> Result<&str, NotifyError> {
    let endpoint = endpoint.trim();
    if endpoint.starts_with("https://") && endpoint.len() > "https://".len() {
        Ok(endpoint)
    } else {
        Err(NotifyError::Invalid(
            "Subscription endpoint must be an https URL".into(),
        ))
    }
}

fn validate_key(name: &str, value: &str, expected_len: usize) -> Result<(), NotifyError> {
    match URL_SAFE_NO_PAD.decode(value.trim().trim_end_matches('=')) {
        Ok(bytes) if bytes.len() == expected_len => Ok(()),
        _ => Err(NotifyError::Invalid(format!(
            "Subscription key {name} must be {expected_len} bytes of URL-safe base64"
        ))),
    }
}
