//! HTTP transports using reqwest.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::transport::{RawReply, Transport};
use crate::{Result, SearchRequest};

const USER_AGENT: &str = concat!("sauce-search/", env!("CARGO_PKG_VERSION"));

/// Name sent for uploaded images; the server ignores it but requires one.
const UPLOAD_NAME: &str = "image";

/// An async transport backed by a pooled `reqwest::Client`.
///
/// The connection pool lives as long as the transport and is released
/// when it is dropped.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Creates an `HttpTransport` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply> {
        let kind = request.kind();
        let (params, file) = request.into_parts();
        debug!("POST {} ({} search, {} params)", endpoint, kind, params.len());

        let mut builder = self.client.post(endpoint).query(&params);
        if let Some(file) = file {
            let part = Part::bytes(file).file_name(UPLOAD_NAME);
            builder = builder.multipart(Form::new().part("file", part));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!("Server answered HTTP {} ({} bytes)", status, text.len());

        Ok(RawReply {
            status,
            body: parse_body(status, &text)?,
        })
    }
}

/// Parses a reply body. Only a 200 body must be valid JSON; error pages
/// are often HTML and are kept as no body.
pub(crate) fn parse_body(status: u16, text: &str) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    if status == 200 {
        return Ok(Some(serde_json::from_str(text)?));
    }
    Ok(serde_json::from_str(text).ok())
}

#[cfg(feature = "blocking")]
pub use blocking::BlockingHttpTransport;

#[cfg(feature = "blocking")]
mod blocking {
    use reqwest::blocking::multipart::{Form, Part};
    use reqwest::blocking::Client;
    use tracing::debug;

    use super::{parse_body, UPLOAD_NAME, USER_AGENT};
    use crate::transport::{BlockingTransport, RawReply};
    use crate::{Result, SearchRequest};

    /// A blocking transport backed by a pooled `reqwest::blocking::Client`.
    ///
    /// Must not be used from inside an async runtime.
    #[derive(Debug, Clone)]
    pub struct BlockingHttpTransport {
        client: Client,
    }

    impl BlockingHttpTransport {
        /// Creates a new `BlockingHttpTransport` with default settings.
        pub fn new() -> Self {
            Self {
                client: Client::builder()
                    .user_agent(USER_AGENT)
                    .build()
                    .expect("Failed to create HTTP client"),
            }
        }

        /// Creates a `BlockingHttpTransport` with a custom reqwest client.
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl Default for BlockingHttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BlockingTransport for BlockingHttpTransport {
        fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply> {
            let kind = request.kind();
            let (params, file) = request.into_parts();
            debug!("POST {} ({} search, {} params)", endpoint, kind, params.len());

            let mut builder = self.client.post(endpoint).query(&params);
            if let Some(file) = file {
                let part = Part::bytes(file).file_name(UPLOAD_NAME);
                builder = builder.multipart(Form::new().part("file", part));
            }

            let response = builder.send()?;
            let status = response.status().as_u16();
            let text = response.text()?;
            debug!("Server answered HTTP {} ({} bytes)", status, text.len());

            Ok(RawReply {
                status,
                body: parse_body(status, &text)?,
            })
        }
    }
}
