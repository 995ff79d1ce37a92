//! Mapping of HTTP statuses and response headers to typed errors.

use serde_json::Value;
use tracing::warn;

use crate::json::as_int;
use crate::transport::RawReply;
use crate::{Result, SauceError};

/// Checks a reply and returns its payload if the search succeeded.
///
/// `api_key_sent` tells whether the request carried an API key: the server
/// answers an invalid key with `user_id == 0` instead of HTTP 403.
pub fn verify(reply: RawReply, api_key_sent: bool) -> Result<Value> {
    let result = match reply.status {
        200 => verify_payload(reply.body, api_key_sent),
        403 => Err(SauceError::BadKey),
        413 => Err(SauceError::FileTooLarge),
        429 => Err(limit_error(reply.body.as_ref())),
        status => Err(SauceError::UnknownApi { status }),
    };

    if let Err(e) = &result {
        warn!("Search rejected (HTTP {}): {}", reply.status, e);
    }
    result
}

fn limit_error(body: Option<&Value>) -> SauceError {
    let daily = body
        .and_then(|b| b.pointer("/header/message"))
        .and_then(Value::as_str)
        .is_some_and(|message| message.contains("Daily"));

    if daily {
        SauceError::LongLimitReached
    } else {
        SauceError::ShortLimitReached
    }
}

fn verify_payload(body: Option<Value>, api_key_sent: bool) -> Result<Value> {
    let payload = body.ok_or_else(|| SauceError::Parse("empty response body".into()))?;
    let header = payload
        .get("header")
        .ok_or_else(|| SauceError::Parse("response has no header".into()))?;

    let int = |key: &str| header.get(key).and_then(as_int);
    let status = int("status").ok_or_else(|| SauceError::Parse("header has no status".into()))?;
    let user_id = int("user_id").ok_or_else(|| SauceError::Parse("header has no user_id".into()))?;

    if status < 0 {
        return Err(SauceError::UnknownClient);
    }
    if status > 0 {
        return Err(SauceError::UnknownServer("status > 0"));
    }
    if user_id < 0 {
        return Err(SauceError::UnknownServer("user_id < 0"));
    }
    if user_id == 0 && api_key_sent {
        return Err(SauceError::BadKey);
    }
    if int("short_remaining").is_some_and(|n| n < 0) {
        return Err(SauceError::ShortLimitReached);
    }
    if int("long_remaining").is_some_and(|n| n < 0) {
        return Err(SauceError::LongLimitReached);
    }

    Ok(payload)
}
