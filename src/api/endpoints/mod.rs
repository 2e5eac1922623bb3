//! API endpoint handlers, one module per resource.
//! Handlers are thin: they parse input, call the domain module and
//! publish an event after a successful mutation.

pub mod consultation_logs;
pub mod doctors;
pub mod health;
pub mod on_call;
pub mod push;
pub mod sms;
pub mod specialists;
