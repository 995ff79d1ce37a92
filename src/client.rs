//! Search clients.
//!
//! [`SauceNao`] awaits the round trip, [`BlockingSauceNao`] blocks the calling
//! thread. Both hand the reply to the same validation and classification code.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::classifier::parse_response;
use crate::transport::{BlockingTransport, RawReply, Transport, DEFAULT_ENDPOINT};
use crate::validate::verify;
use crate::{Result, SauceResponse, SearchConfig, SearchRequest};

/// Validates and classifies a reply. Shared by both clients.
fn finish(reply: RawReply, api_key_sent: bool) -> Result<SauceResponse> {
    let payload: Value = verify(reply, api_key_sent)?;
    parse_response(payload)
}

fn parse_endpoint(endpoint: &str) -> Result<String> {
    Ok(Url::parse(endpoint)?.to_string())
}

/// Async search client.
///
/// Cloning is cheap and clones share the transport. The connection pool is
/// released when the last clone is dropped, including on early return.
///
/// # Example
/// ```no_run
/// use sauce_search::{SauceNao, SearchConfig};
///
/// # async fn example() -> sauce_search::Result<()> {
/// let sauce = SauceNao::new(SearchConfig::new().with_api_key("key"));
/// let results = sauce.from_url("https://example.com/image.png").await?;
/// if let Some(best) = results.first() {
///     println!("{}", best);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SauceNao {
    config: SearchConfig,
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl SauceNao {
    /// Creates a client using [`crate::HttpTransport`].
    pub fn new(config: SearchConfig) -> Self {
        Self::with_transport(config, crate::HttpTransport::new())
    }

    /// Creates a client with a custom transport.
    pub fn with_transport<T: Transport + 'static>(config: SearchConfig, transport: T) -> Self {
        Self {
            config,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: Arc::new(transport),
        }
    }

    /// Points the client at another endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Returns the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the endpoint searches are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Searches for an image hosted at `url`.
    pub async fn from_url(&self, url: &str) -> Result<SauceResponse> {
        self.search(self.config.url_request(url)).await
    }

    /// Searches for an uploaded image.
    pub async fn from_file(&self, file: impl Into<Vec<u8>>) -> Result<SauceResponse> {
        self.search(self.config.file_request(file)).await
    }

    /// Sends a prepared request.
    pub async fn search(&self, request: SearchRequest) -> Result<SauceResponse> {
        let api_key_sent = request.has_api_key();
        let reply = self.transport.post(&self.endpoint, request).await?;
        finish(reply, api_key_sent)
    }

    /// Ends the client's scope and releases its transport.
    pub fn close(self) {
        debug!("Closing search client for {}", self.endpoint);
        // The connection pool is freed when `self` drops here.
    }
}

/// Blocking search client.
///
/// Same behaviour as [`SauceNao`]; each call blocks until the reply arrives.
/// Must not be called from inside an async runtime.
#[derive(Clone)]
pub struct BlockingSauceNao {
    config: SearchConfig,
    endpoint: String,
    transport: Arc<dyn BlockingTransport>,
}

impl BlockingSauceNao {
    /// Creates a client using [`crate::BlockingHttpTransport`].
    #[cfg(feature = "blocking")]
    pub fn new(config: SearchConfig) -> Self {
        Self::with_transport(config, crate::BlockingHttpTransport::new())
    }

    /// Creates a client with a custom transport.
    pub fn with_transport<T: BlockingTransport + 'static>(
        config: SearchConfig,
        transport: T,
    ) -> Self {
        Self {
            config,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: Arc::new(transport),
        }
    }

    /// Points the client at another endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Returns the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the endpoint searches are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Searches for an image hosted at `url`.
    pub fn from_url(&self, url: &str) -> Result<SauceResponse> {
        self.search(self.config.url_request(url))
    }

    /// Searches for an uploaded image.
    pub fn from_file(&self, file: impl Into<Vec<u8>>) -> Result<SauceResponse> {
        self.search(self.config.file_request(file))
    }

    /// Sends a prepared request.
    pub fn search(&self, request: SearchRequest) -> Result<SauceResponse> {
        let api_key_sent = request.has_api_key();
        let reply = self.transport.post(&self.endpoint, request)?;
        finish(reply, api_key_sent)
    }

    /// Ends the client's scope and releases its transport.
    pub fn close(self) {
        debug!("Closing blocking search client for {}", self.endpoint);
        // The connection pool is freed when `self` drops here.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SauceError, SauceKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a canned answer and records what was sent.
    struct MockTransport {
        reply: RawReply,
        sent: Arc<Mutex<Vec<(String, SearchRequest)>>>,
    }

    impl MockTransport {
        fn new(reply: RawReply) -> Self {
            Self {
                reply,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn record(&self, endpoint: &str, request: SearchRequest) -> RawReply {
            self.sent
                .lock()
                .unwrap()
                .push((endpoint.to_string(), request));
            self.reply.clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply> {
            Ok(self.record(endpoint, request))
        }
    }

    impl BlockingTransport for MockTransport {
        fn post(&self, endpoint: &str, request: SearchRequest) -> Result<RawReply> {
            Ok(self.record(endpoint, request))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn post(&self, _endpoint: &str, _request: SearchRequest) -> Result<RawReply> {
            Err(SauceError::Parse("connection reset".into()))
        }
    }

    fn payload() -> Value {
        json!({
            "header": {
                "user_id": "12",
                "account_type": "1",
                "short_limit": "4",
                "long_limit": "100",
                "long_remaining": 98,
                "short_remaining": 3,
                "status": 0,
                "results_requested": 6,
                "search_depth": "128",
                "minimum_similarity": 40.5,
                "results_returned": 2,
            },
            "results": [
                {
                    "header": {"similarity": "55.1", "thumbnail": "t1", "index_id": 5, "index_name": "Pixiv"},
                    "data": {"title": "low", "member_name": "artist", "ext_urls": ["https://pixiv.example/1"]},
                },
                {
                    "header": {"similarity": "90.4", "thumbnail": "t2", "index_id": 37, "index_name": "MangaDex"},
                    "data": {"source": "high", "part": "5"},
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_from_url_sends_url_param() {
        let transport = MockTransport::new(RawReply::json(200, payload()));
        let sent = Arc::clone(&transport.sent);
        let sauce = SauceNao::with_transport(SearchConfig::new(), transport);

        let response = sauce.from_url("https://example.com/").await.unwrap();
        assert_eq!(response.len(), 2);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, DEFAULT_ENDPOINT);
        assert_eq!(sent[0].1.param("url"), Some("https://example.com/"));
        assert!(sent[0].1.file().is_none());
    }

    #[tokio::test]
    async fn test_from_file_sends_bytes() {
        let transport = MockTransport::new(RawReply::json(200, payload()));
        let sent = Arc::clone(&transport.sent);
        let sauce = SauceNao::with_transport(SearchConfig::new(), transport);

        sauce.from_file(b"\x89PNG".to_vec()).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].1.file(), Some(&b"\x89PNG"[..]));
        assert_eq!(sent[0].1.param("url"), None);
    }

    #[tokio::test]
    async fn test_results_sorted_and_classified() {
        let sauce = SauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::json(200, payload())),
        );
        let response = sauce.from_url("https://example.com/").await.unwrap();

        assert_eq!(response[0].title.as_deref(), Some("high"));
        assert_eq!(response[0].kind, SauceKind::Book { part: "5".into() });
        assert_eq!(response[1].title.as_deref(), Some("low"));
        assert_eq!(response[1].author.as_deref(), Some("artist"));
        assert_eq!(response[1].kind, SauceKind::Basic);
        assert_eq!(response.header.user_id, 12);
        assert_eq!(response.header.minimum_similarity, 40.5);
    }

    #[tokio::test]
    async fn test_status_error_propagates() {
        let sauce = SauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::empty(500)),
        );
        let err = sauce.from_url("https://example.com/").await.unwrap_err();
        assert!(matches!(err, SauceError::UnknownApi { status: 500 }));
    }

    #[tokio::test]
    async fn test_bad_key_detected_from_header() {
        let reply = RawReply::json(200, json!({"header": {"user_id": "0", "status": 0}}));
        let sauce = SauceNao::with_transport(
            SearchConfig::new().with_api_key("BadToken"),
            MockTransport::new(reply),
        );
        let err = sauce.from_url("https://example.com/").await.unwrap_err();
        assert!(matches!(err, SauceError::BadKey));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let sauce = SauceNao::with_transport(SearchConfig::new(), FailingTransport);
        let err = sauce.from_url("https://example.com/").await.unwrap_err();
        assert!(matches!(err, SauceError::Parse(ref m) if m == "connection reset"));
    }

    #[tokio::test]
    async fn test_with_endpoint() {
        let sauce = SauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::empty(403)),
        )
        .with_endpoint("http://127.0.0.1:8080/search.php")
        .unwrap();
        assert_eq!(sauce.endpoint(), "http://127.0.0.1:8080/search.php");
    }

    #[test]
    fn test_with_endpoint_invalid() {
        let result = SauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::empty(403)),
        )
        .with_endpoint("not a url");
        assert!(matches!(result, Err(SauceError::UrlParse(_))));
    }

    #[test]
    fn test_config_accessor() {
        let sauce = SauceNao::with_transport(
            SearchConfig::new().with_numres(3),
            MockTransport::new(RawReply::empty(403)),
        );
        assert_eq!(sauce.config().numres, 3);
        sauce.close();
    }

    #[test]
    fn test_close_releases_transport() {
        let transport = MockTransport::new(RawReply::empty(403));
        let sent = Arc::clone(&transport.sent);
        let sauce = SauceNao::with_transport(SearchConfig::new(), transport);
        let copy = sauce.clone();
        assert_eq!(Arc::strong_count(&sent), 2);

        sauce.close();
        assert_eq!(Arc::strong_count(&sent), 2);
        copy.close();
        assert_eq!(Arc::strong_count(&sent), 1);

        let transport = MockTransport::new(RawReply::empty(403));
        let sent = Arc::clone(&transport.sent);
        BlockingSauceNao::with_transport(SearchConfig::new(), transport).close();
        assert_eq!(Arc::strong_count(&sent), 1);
    }

    #[tokio::test]
    async fn test_db_id_outside_table_is_sent() {
        let transport = MockTransport::new(RawReply::json(200, payload()));
        let sent = Arc::clone(&transport.sent);
        let sauce = SauceNao::with_transport(SearchConfig::new().with_db(41u32), transport);

        sauce.from_url("https://example.com/").await.unwrap();
        assert_eq!(sent.lock().unwrap()[0].1.param("db"), Some("41"));
    }

    #[test]
    fn test_blocking_from_url() {
        let transport = MockTransport::new(RawReply::json(200, payload()));
        let sent = Arc::clone(&transport.sent);
        let sauce = BlockingSauceNao::with_transport(SearchConfig::new(), transport);

        let response = sauce.from_url("https://example.com/").unwrap();
        assert_eq!(response.len(), 2);
        assert_eq!(response[0].similarity, 90.4);
        assert_eq!(
            sent.lock().unwrap()[0].1.param("url"),
            Some("https://example.com/")
        );
    }

    #[test]
    fn test_blocking_from_file_limit() {
        let reply = RawReply::json(429, json!({"header": {"message": "Daily Search Limit Exceeded."}}));
        let sauce = BlockingSauceNao::with_transport(SearchConfig::new(), MockTransport::new(reply));
        let err = sauce.from_file(vec![0u8; 4]).unwrap_err();
        assert!(matches!(err, SauceError::LongLimitReached));
        assert!(err.is_limit_reached());
    }

    #[test]
    fn test_async_and_blocking_agree() {
        let async_sauce = SauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::json(200, payload())),
        );
        let blocking_sauce = BlockingSauceNao::with_transport(
            SearchConfig::new(),
            MockTransport::new(RawReply::json(200, payload())),
        );

        let a = tokio_test::block_on(async_sauce.from_url("https://example.com/")).unwrap();
        let b = blocking_sauce.from_url("https://example.com/").unwrap();
        assert_eq!(a, b);
    }
}
