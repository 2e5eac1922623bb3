//! SMS and web-push boundary surfaces.
//!
//! Nothing here talks to a carrier or a push service. SMS messages are
//! queued in an in-memory outbox and push subscriptions are kept in a
//! registry keyed by endpoint.

pub mod push;
pub mod sms;

pub use push::PushRegistry;
pub use sms::SmsGateway;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotifyError {
    #[error("SMS notifications are disabled")]
    SmsDisabled,

    #[error("Push notifications are not configured")]
    PushNotConfigured,

    #[error("{0}")]
    Invalid(String),
}
