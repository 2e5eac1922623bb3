//! HTTP API.
//!
//! All routes are nested under `/api/`. Every request passes through the
//! audit middleware; mutations publish on the event hub so connected SSE
//! clients refresh.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod sse;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerSession};
pub use types::ApiContext;
