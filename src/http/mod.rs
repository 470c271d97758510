//! HTTP transport
//!
//! Thin axum layer over [`crate::resource::ResourceRegistry`]. Handlers
//! only extract, look up the resource and map errors to status codes.

mod config;
mod errors;
mod response;
mod server;

pub use config::HttpConfig;
pub use errors::{ErrorResponse, HttpError, HttpResult};
pub use response::DeleteResponse;
pub use server::ResourceServer;
