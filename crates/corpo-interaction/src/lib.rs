//! HTTP plumbing for the Corpo client.
//!
//! - `reqwest_transport`: the concrete [`HttpTransport`](corpo_core::transport::HttpTransport)
//! - `logging_transport`: per-request tracing wrapper
//! - `mime`: content type detection for uploads

pub mod logging_transport;
pub mod mime;
pub mod reqwest_transport;

pub use logging_transport::LoggingTransport;
pub use reqwest_transport::ReqwestTransport;
