//! Outbound HTTP plumbing shared by the probe and the notification channels.
//!
//! - Request/response value types ([`HttpRequest`], [`HttpResponse`])
//! - Client abstraction ([`HttpClient`]) and its reqwest-backed implementation ([`ReqwestClient`])
//! - Transport errors ([`HttpError`])

mod client;
mod error;
mod request;

#[cfg(test)]
pub mod mock;

pub use client::ReqwestClient;
pub use error::HttpError;
pub use request::{HttpClient, HttpRequest, HttpResponse};
