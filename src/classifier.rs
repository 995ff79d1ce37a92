//! Result classification and field extraction.
//!
//! Every source index exposes a different subset of `data` keys, so the
//! normalized fields are read through ordered key lists where the first
//! present key wins, even when lower-priority keys are also present.

use serde_json::Value;
use tracing::debug;

use crate::json::{as_float, as_int, as_text};
use crate::{Database, ResponseHeader, Result, SauceError, SauceKind, SauceResponse, SauceResult};

/// Sources whose results are classified as books.
pub const BOOK_SOURCES: [Database; 3] = [Database::HMagazines, Database::Madokami, Database::MangaDex];

/// Sources whose results are classified as videos.
pub const VIDEO_SOURCES: [Database; 4] = [
    Database::Anime,
    Database::HAnime,
    Database::Movies,
    Database::Shows,
];

const TITLE_KEYS: &[&str] = &["title", "eng_name", "material", "source", "created_at"];

const AUTHOR_KEYS: &[&str] = &[
    "author",
    "author_name",
    "member_name",
    "pawoo_user_username",
    "twitter_user_handle",
    "company",
    "creator",
];

const GETCHU_URL: &str = "http://www.getchu.com/soft.phtml?id=";

/// Result shape without its kind-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Basic,
    Book,
    Video,
}

impl ResultShape {
    /// Returns the shape results from `index_id` are classified as.
    pub fn for_index(index_id: u32) -> Self {
        if BOOK_SOURCES.iter().any(|db| db.id() == index_id) {
            Self::Book
        } else if VIDEO_SOURCES.iter().any(|db| db.id() == index_id) {
            Self::Video
        } else {
            Self::Basic
        }
    }
}

/// Builds a [`SauceResponse`] from a verified payload.
pub fn parse_response(payload: Value) -> Result<SauceResponse> {
    let header = payload
        .get("header")
        .ok_or_else(|| SauceError::Parse("response has no header".into()))?;
    let header = parse_header(header)?;
    let results = classify(payload.get("results"))?;

    debug!(
        "Classified {} results (returned {})",
        results.len(),
        header.results_returned
    );

    Ok(SauceResponse::new(header, results, payload))
}

/// Reads the response header. Only `user_id` and `status` are required.
pub fn parse_header(header: &Value) -> Result<ResponseHeader> {
    let int = |key: &str| header.get(key).and_then(as_int);
    let text = |key: &str| header.get(key).and_then(as_text);

    Ok(ResponseHeader {
        user_id: int("user_id")
            .ok_or_else(|| SauceError::Parse("header has no user_id".into()))?,
        account_type: int("account_type").unwrap_or_default(),
        short_limit: text("short_limit").unwrap_or_default(),
        long_limit: text("long_limit").unwrap_or_default(),
        short_remaining: int("short_remaining").unwrap_or_default(),
        long_remaining: int("long_remaining").unwrap_or_default(),
        status: int("status").ok_or_else(|| SauceError::Parse("header has no status".into()))?,
        results_requested: int("results_requested").unwrap_or_default(),
        results_returned: int("results_returned").unwrap_or_default(),
        search_depth: text("search_depth").unwrap_or_default(),
        minimum_similarity: header
            .get("minimum_similarity")
            .and_then(as_float)
            .unwrap_or_default(),
        query_image_display: text("query_image_display"),
        query_image: text("query_image"),
    })
}

/// Sorts and classifies the raw `results` array.
///
/// A missing or `null` array yields no results. Records are ordered by
/// descending similarity; records with equal similarity keep server order.
pub fn classify(results: Option<&Value>) -> Result<Vec<SauceResult>> {
    let records = match results {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(records)) => records,
        Some(_) => return Err(SauceError::Parse("results is not an array".into())),
    };

    let mut scored = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let similarity = record
            .pointer("/header/similarity")
            .and_then(as_float)
            .filter(|similarity| similarity.is_finite())
            .ok_or_else(|| {
                SauceError::Parse(format!("result #{} has no numeric similarity", position))
            })?;
        scored.push((similarity, record));
    }

    // `sort_by` is stable, ties keep server order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (similarity, record))| classify_record(index, similarity, record))
        .collect()
}

fn classify_record(index: usize, similarity: f64, record: &Value) -> Result<SauceResult> {
    let header = record
        .get("header")
        .ok_or_else(|| SauceError::Parse(format!("result #{} has no header", index)))?;
    let data = record
        .get("data")
        .ok_or_else(|| SauceError::Parse(format!("result #{} has no data", index)))?;

    let index_id = header
        .get("index_id")
        .and_then(as_int)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| SauceError::Parse(format!("result #{} has no index_id", index)))?;
    let header_text = |key: &str| {
        header
            .get(key)
            .and_then(as_text)
            .ok_or_else(|| SauceError::Parse(format!("result #{} has no {}", index, key)))
    };

    let kind = match ResultShape::for_index(index_id) {
        ResultShape::Basic => SauceKind::Basic,
        ResultShape::Book => SauceKind::Book {
            part: required(data, index, "part")?,
        },
        ResultShape::Video => SauceKind::Video {
            part: required(data, index, "part")?,
            year: required(data, index, "year")?,
            est_time: required(data, index, "est_time")?,
        },
    };

    Ok(SauceResult {
        similarity,
        thumbnail: header_text("thumbnail")?,
        index_id,
        index_name: header_text("index_name")?,
        title: title(data),
        author: author(data),
        urls: urls(data),
        kind,
        raw: record.clone(),
    })
}

/// Returns the first of `keys` present in `data`, with its value.
fn first_present<'a>(data: &'a Value, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|&key| data.get(key).map(|value| (key, value)))
}

fn title(data: &Value) -> Option<String> {
    first_present(data, TITLE_KEYS).and_then(|(_, value)| as_text(value))
}

fn author(data: &Value) -> Option<String> {
    match first_present(data, AUTHOR_KEYS)? {
        ("creator", Value::Array(creators)) => creators.first().and_then(as_text),
        (_, value) => as_text(value),
    }
}

fn urls(data: &Value) -> Vec<String> {
    if let Some(ext_urls) = data.get("ext_urls") {
        return match ext_urls {
            Value::Array(urls) => urls.iter().filter_map(as_text).collect(),
            other => as_text(other).into_iter().collect(),
        };
    }

    data.get("getchu_id")
        .and_then(as_text)
        .map(|id| vec![format!("{}{}", GETCHU_URL, id)])
        .unwrap_or_default()
}

fn required(data: &Value, index: usize, field: &'static str) -> Result<String> {
    data.get(field)
        .and_then(as_text)
        .ok_or(SauceError::MissingField { index, field })
}
