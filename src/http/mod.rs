//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → request.rs (owned DispatchRequest behind RequestContext)
//!     → Dispatcher::dispatch_and_process
//!     → response.rs (BufferedResponse behind ResponseSink)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{DispatchRequest, RequestContext};
pub use response::{BufferedResponse, ResponseSink};
pub use server::{AppState, HttpServer};
