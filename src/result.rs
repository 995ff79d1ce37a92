//! Search result types.

use std::fmt;
use std::ops::Index;

use serde::Serialize;
use serde_json::Value;

/// Shape of a result, decided by the source index it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SauceKind {
    /// Illustrations, photos and everything without extra fields.
    Basic,
    /// Magazines and manga chapters.
    Book {
        /// Chapter or volume.
        part: String,
    },
    /// Anime, movies and shows.
    Video {
        /// Episode.
        part: String,
        /// Release year.
        year: String,
        /// Timestamp of the matched frame.
        est_time: String,
    },
}

impl SauceKind {
    /// Returns the lowercase kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Book { .. } => "book",
            Self::Video { .. } => "video",
        }
    }

    /// Returns the part for book and video results.
    pub fn part(&self) -> Option<&str> {
        match self {
            Self::Basic => None,
            Self::Book { part } | Self::Video { part, .. } => Some(part),
        }
    }
}

/// A single classified match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SauceResult {
    /// Match confidence in percent.
    pub similarity: f64,
    /// Thumbnail URL of the matched image.
    pub thumbnail: String,
    /// Id of the source index.
    pub index_id: u32,
    /// Human-readable source index name.
    pub index_name: String,
    /// Title, if the source provides one.
    pub title: Option<String>,
    /// Author, if the source provides one.
    pub author: Option<String>,
    /// External links to the source. Empty when none are known.
    pub urls: Vec<String>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub kind: SauceKind,
    /// The record as returned by the server.
    #[serde(skip)]
    pub raw: Value,
}

impl SauceResult {
    /// Whether this is a book result.
    pub fn is_book(&self) -> bool {
        matches!(self.kind, SauceKind::Book { .. })
    }

    /// Whether this is a video result.
    pub fn is_video(&self) -> bool {
        matches!(self.kind, SauceKind::Video { .. })
    }
}

impl fmt::Display for SauceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        match &self.title {
            Some(title) => write!(f, " {:?}", title)?,
            None => write!(f, " (untitled)")?,
        }
        if let Some(part) = self.kind.part() {
            write!(f, " part {}", part)?;
        }
        write!(f, " ({:.2}%)", self.similarity)
    }
}

/// Account and quota information from the response header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseHeader {
    /// Account id, 0 for anonymous requests.
    pub user_id: i64,
    /// Account tier.
    pub account_type: i64,
    /// Requests allowed per 30 seconds.
    pub short_limit: String,
    /// Requests allowed per 24 hours.
    pub long_limit: String,
    /// Requests left in the current 30 seconds.
    pub short_remaining: i64,
    /// Requests left in the current 24 hours.
    pub long_remaining: i64,
    /// Request status, 0 on success.
    pub status: i64,
    /// Number of results asked for.
    pub results_requested: i64,
    /// Number of results returned.
    pub results_returned: i64,
    /// Search depth used by the server.
    pub search_depth: String,
    /// Similarity threshold below which results are not returned.
    pub minimum_similarity: f64,
    /// Path of the uploaded image as displayed by the server.
    pub query_image_display: Option<String>,
    /// Name of the uploaded image on the server.
    pub query_image: Option<String>,
}

/// A successful search, with results ordered by descending similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SauceResponse {
    /// Account and quota information.
    pub header: ResponseHeader,
    results: Vec<SauceResult>,
    /// The payload as returned by the server.
    #[serde(skip)]
    pub raw: Value,
}

impl SauceResponse {
    /// Creates a response from a parsed header and classified results.
    pub fn new(header: ResponseHeader, results: Vec<SauceResult>, raw: Value) -> Self {
        Self {
            header,
            results,
            raw,
        }
    }

    /// Returns the results.
    pub fn results(&self) -> &[SauceResult] {
        &self.results
    }

    /// Returns the number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the result at `index`.
    pub fn get(&self, index: usize) -> Option<&SauceResult> {
        self.results.get(index)
    }

    /// Returns the best match.
    pub fn first(&self) -> Option<&SauceResult> {
        self.results.first()
    }

    /// Iterates over the results, best match first.
    pub fn iter(&self) -> std::slice::Iter<'_, SauceResult> {
        self.results.iter()
    }

    /// Consumes the response, returning the results.
    pub fn into_results(self) -> Vec<SauceResult> {
        self.results
    }
}

impl Index<usize> for SauceResponse {
    type Output = SauceResult;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl<'a> IntoIterator for &'a SauceResponse {
    type Item = &'a SauceResult;
    type IntoIter = std::slice::Iter<'a, SauceResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for SauceResponse {
    type Item = SauceResult;
    type IntoIter = std::vec::IntoIter<SauceResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl fmt::Display for SauceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} results (short remaining {}, long remaining {})",
            self.results.len(),
            self.header.short_remaining,
            self.header.long_remaining
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ResponseHeader {
        ResponseHeader {
            user_id: 1,
            account_type: 1,
            short_limit: "4".to_string(),
            long_limit: "100".to_string(),
            short_remaining: 3,
            long_remaining: 99,
            status: 0,
            results_requested: 6,
            results_returned: 2,
            search_depth: "128".to_string(),
            minimum_similarity: 55.5,
            query_image_display: None,
            query_image: None,
        }
    }

    fn result(kind: SauceKind, title: Option<&str>, similarity: f64) -> SauceResult {
        SauceResult {
            similarity,
            thumbnail: "https://img.example/t.jpg".to_string(),
            index_id: 5,
            index_name: "Index #5: Pixiv Images".to_string(),
            title: title.map(String::from),
            author: None,
            urls: Vec::new(),
            kind,
            raw: Value::Null,
        }
    }

    #[test]
    fn test_kind_name_and_part() {
        assert_eq!(SauceKind::Basic.name(), "basic");
        assert_eq!(SauceKind::Basic.part(), None);

        let book = SauceKind::Book {
            part: "12".to_string(),
        };
        assert_eq!(book.name(), "book");
        assert_eq!(book.part(), Some("12"));

        let video = SauceKind::Video {
            part: "3".to_string(),
            year: "2019".to_string(),
            est_time: "00:12:01 / 00:24:00".to_string(),
        };
        assert_eq!(video.name(), "video");
        assert_eq!(video.part(), Some("3"));
    }

    #[test]
    fn test_result_display() {
        let r = result(
            SauceKind::Book {
                part: "2".to_string(),
            },
            Some("Title"),
            92.1,
        );
        assert_eq!(r.to_string(), "book \"Title\" part 2 (92.10%)");

        let r = result(SauceKind::Basic, None, 40.0);
        assert_eq!(r.to_string(), "basic (untitled) (40.00%)");
    }

    #[test]
    fn test_result_kind_predicates() {
        let r = result(SauceKind::Basic, None, 1.0);
        assert!(!r.is_book());
        assert!(!r.is_video());
    }

    #[test]
    fn test_result_serialization_flattens_kind() {
        let r = result(
            SauceKind::Book {
                part: "7".to_string(),
            },
            Some("T"),
            80.0,
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["kind"], "book");
        assert_eq!(json["part"], "7");
        assert_eq!(json["urls"], serde_json::json!([]));
        assert!(json.get("raw").is_none());
    }

    #[test]
    fn test_response_sequence_access() {
        let response = SauceResponse::new(
            header(),
            vec![
                result(SauceKind::Basic, Some("a"), 90.0),
                result(SauceKind::Basic, Some("b"), 80.0),
            ],
            Value::Null,
        );

        assert_eq!(response.len(), 2);
        assert!(!response.is_empty());
        assert_eq!(response[1].title.as_deref(), Some("b"));
        assert_eq!(response.get(0).and_then(|r| r.title.as_deref()), Some("a"));
        assert!(response.get(2).is_none());
        assert_eq!(response.first().map(|r| r.similarity), Some(90.0));
        assert_eq!(response.iter().count(), 2);
        assert_eq!((&response).into_iter().count(), 2);
        assert_eq!(response.into_results().len(), 2);
    }

    #[test]
    fn test_response_empty() {
        let response = SauceResponse::new(header(), Vec::new(), Value::Null);
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert!(response.first().is_none());
    }

    #[test]
    fn test_response_display() {
        let response = SauceResponse::new(
            header(),
            vec![result(SauceKind::Basic, None, 50.0)],
            Value::Null,
        );
        assert_eq!(
            response.to_string(),
            "1 results (short remaining 3, long remaining 99)"
        );
    }
}
