//! # sauce-search
//!
//! A typed client for the [SauceNAO](https://saucenao.com) reverse image
//! search API.
//!
//! An image is submitted by URL or uploaded as bytes; the JSON reply is
//! checked for server-side errors and turned into results that are:
//!
//! - Sorted by descending similarity
//! - Classified as basic, book or video by their source index
//! - Normalized to a title, an author and a list of external URLs
//!
//! Both an async client ([`SauceNao`]) and a blocking one
//! ([`BlockingSauceNao`]) are provided.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sauce_search::{SauceNao, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> sauce_search::Result<()> {
//!     let sauce = SauceNao::new(SearchConfig::new().with_api_key("your-key"));
//!     let results = sauce.from_url("https://example.com/image.png").await?;
//!
//!     for result in &results {
//!         println!("{}: {:?}", result, result.urls);
//!     }
//!     Ok(())
//! }
//! ```

mod classifier;
mod client;
mod error;
mod json;
mod params;
mod result;
mod transport;
mod transport_http;
mod validate;

pub use classifier::{classify, parse_header, parse_response, ResultShape, BOOK_SOURCES, VIDEO_SOURCES};
pub use client::{BlockingSauceNao, SauceNao};
pub use error::{Result, SauceError};
pub use params::{BgColor, Database, Hide, OutputType, SearchConfig, SearchRequest};
pub use result::{ResponseHeader, SauceKind, SauceResponse, SauceResult};
pub use transport::{BlockingTransport, RawReply, Transport, DEFAULT_ENDPOINT};
pub use transport_http::HttpTransport;
#[cfg(feature = "blocking")]
pub use transport_http::BlockingHttpTransport;
pub use validate::verify;
