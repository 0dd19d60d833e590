//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → middleware/ (request deadline, per-route metrics)
//!     → handlers.rs (validate, call the student service)
//!     → response.rs (JSON envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
