//! Model client layer for toolrun.
//!
//! # Architecture
//!
//! - [`traits::ModelClient`] — trait the orchestration loop calls
//! - [`traits::RequestConfig`] — shapes a conversation into a request
//! - [`http_client::HttpModelClient`] — OpenAI-compatible HTTP client
//! - [`retry`] — exponential backoff with full jitter
//! - [`error::ModelError`] — transport / API / decode failures

pub mod error;
pub mod http_client;
pub mod retry;
pub mod traits;

pub use error::ModelError;
pub use http_client::HttpModelClient;
pub use retry::{with_retry, RetryPolicy};
pub use traits::{ModelClient, RequestConfig};
