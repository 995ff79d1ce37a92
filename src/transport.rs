//! Transport abstraction for sending a search to the server.

use async_trait::async_trait;
use serde_json::Value;

use crate::{Result, SearchRequest};

/// Default search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://saucenao.com/search.php";

/// What the server answered, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, if the server sent one.
    pub body: Option<Value>,
}

impl RawReply {
    /// Creates a reply with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Creates a reply without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// Trait for sending a search and returning the raw reply.
///
/// Implementations only move bytes: they must not interpret the status code.
/// Network failures are returned as errors; every HTTP answer is a reply.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs the request to `endpoint`.
    async fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply>;
}

/// Blocking counterpart of [`Transport`].
pub trait BlockingTransport: Send + Sync {
    /// POSTs the request to `endpoint`, blocking the calling thread.
    fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply>;
}
