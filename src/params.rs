//! Search parameters and request building.

use serde::{Deserialize, Serialize};

/// A source database indexed by the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Database {
    HMagazines = 0,
    HGameCg = 2,
    DoujinshiDb = 3,
    PixivImages = 5,
    NicoNicoSeiga = 8,
    Danbooru = 9,
    DrawrImages = 10,
    NijieImages = 11,
    Yandere = 12,
    Openingsmoe = 13,
    Shutterstock = 15,
    Fakku = 16,
    HMisc = 18,
    TwoDMarket = 19,
    MediBang = 20,
    Anime = 21,
    HAnime = 22,
    Movies = 23,
    Shows = 24,
    Gelbooru = 25,
    Konachan = 26,
    SankakuChannel = 27,
    AnimePicturesNet = 28,
    E621Net = 29,
    IdolComplex = 30,
    BcyNetIllust = 31,
    BcyNetCosplay = 32,
    PortalGraphicsNet = 33,
    DeviantArt = 34,
    PawooNet = 35,
    Madokami = 36,
    MangaDex = 37,
    HMiscEHentai = 38,
    /// Search every index at once.
    #[default]
    All = 999,
}

impl Database {
    /// Every concrete source, excluding [`Database::All`].
    pub const SOURCES: [Database; 33] = [
        Self::HMagazines,
        Self::HGameCg,
        Self::DoujinshiDb,
        Self::PixivImages,
        Self::NicoNicoSeiga,
        Self::Danbooru,
        Self::DrawrImages,
        Self::NijieImages,
        Self::Yandere,
        Self::Openingsmoe,
        Self::Shutterstock,
        Self::Fakku,
        Self::HMisc,
        Self::TwoDMarket,
        Self::MediBang,
        Self::Anime,
        Self::HAnime,
        Self::Movies,
        Self::Shows,
        Self::Gelbooru,
        Self::Konachan,
        Self::SankakuChannel,
        Self::AnimePicturesNet,
        Self::E621Net,
        Self::IdolComplex,
        Self::BcyNetIllust,
        Self::BcyNetCosplay,
        Self::PortalGraphicsNet,
        Self::DeviantArt,
        Self::PawooNet,
        Self::Madokami,
        Self::MangaDex,
        Self::HMiscEHentai,
    ];

    /// Returns the wire id of this database.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Looks up a database by its wire id.
    pub fn from_id(id: u32) -> Option<Self> {
        if id == Self::All.id() {
            return Some(Self::All);
        }
        Self::SOURCES.iter().copied().find(|db| db.id() == id)
    }
}

impl From<Database> for u32 {
    fn from(db: Database) -> Self {
        db.id()
    }
}

impl TryFrom<u32> for Database {
    type Error = String;

    fn try_from(id: u32) -> std::result::Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("unknown database id {}", id))
    }
}

/// Filtering of explicit content in the returned results.
///
/// Serialized as its wire level, like [`Database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Hide {
    /// No filtering.
    #[default]
    None = 0,
    /// Hide results known to be explicit.
    Known = 1,
    /// Hide known and suspected explicit results.
    Suspected = 2,
    /// Hide everything that is not known to be safe.
    All = 3,
}

impl Hide {
    /// Returns the wire level.
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Looks up a filter by its wire level.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Known),
            2 => Some(Self::Suspected),
            3 => Some(Self::All),
            _ => None,
        }
    }
}

impl From<Hide> for u8 {
    fn from(hide: Hide) -> Self {
        hide.level()
    }
}

impl TryFrom<u8> for Hide {
    type Error = String;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_level(level).ok_or_else(|| format!("unknown hide level {}", level))
    }
}

/// Background colour hint used when matching images with transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgColor {
    #[default]
    None,
    White,
    Black,
    Grey,
}

impl BgColor {
    /// Returns the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::White => "white",
            Self::Black => "black",
            Self::Grey => "grey",
        }
    }
}

/// Response format requested from the server.
///
/// The client only understands JSON and always sends [`OutputType::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Html = 0,
    Xml = 1,
    Json = 2,
}

/// Immutable set of search parameters, reused for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// API key. Without one the anonymous quota applies.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Bitmask of databases to search.
    #[serde(default)]
    pub dbmask: Option<u64>,
    /// Bitmask of databases to exclude.
    #[serde(default)]
    pub dbmaski: Option<u64>,
    /// Id of the single database to search, or 999 for all of them.
    ///
    /// Any id is accepted; the server rejects the ones it does not know.
    #[serde(default = "default_db")]
    pub db: u32,
    /// Maximum number of results.
    #[serde(default = "default_numres")]
    pub numres: u32,
    /// Display framing hint, passed through unchanged.
    #[serde(default = "default_frame")]
    pub frame: u32,
    /// Explicit content filter.
    #[serde(default)]
    pub hide: Hide,
    /// Background colour hint.
    #[serde(default)]
    pub bgcolor: BgColor,
    /// Server test mode flag.
    #[serde(default)]
    pub testmode: u8,
}

fn default_db() -> u32 {
    Database::All.id()
}

fn default_numres() -> u32 {
    6
}

fn default_frame() -> u32 {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            dbmask: None,
            dbmaski: None,
            db: default_db(),
            numres: 6,
            frame: 1,
            hide: Hide::None,
            bgcolor: BgColor::None,
            testmode: 0,
        }
    }
}

impl SearchConfig {
    /// Creates a configuration with default parameters and no API key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the inclusive database bitmask.
    pub fn with_dbmask(mut self, mask: u64) -> Self {
        self.dbmask = Some(mask);
        self
    }

    /// Sets the exclusive database bitmask.
    pub fn with_dbmaski(mut self, mask: u64) -> Self {
        self.dbmaski = Some(mask);
        self
    }

    /// Restricts the search to one database, given as a [`Database`] or a raw id.
    pub fn with_db(mut self, db: impl Into<u32>) -> Self {
        self.db = db.into();
        self
    }

    /// Returns the named database for the configured id, if there is one.
    pub fn database(&self) -> Option<Database> {
        Database::from_id(self.db)
    }

    /// Sets the maximum number of results.
    pub fn with_numres(mut self, numres: u32) -> Self {
        self.numres = numres;
        self
    }

    /// Sets the framing hint.
    pub fn with_frame(mut self, frame: u32) -> Self {
        self.frame = frame;
        self
    }

    /// Sets the explicit content filter.
    pub fn with_hide(mut self, hide: Hide) -> Self {
        self.hide = hide;
        self
    }

    /// Sets the background colour hint.
    pub fn with_bgcolor(mut self, bgcolor: BgColor) -> Self {
        self.bgcolor = bgcolor;
        self
    }

    /// Sets the server test mode flag.
    pub fn with_testmode(mut self, testmode: u8) -> Self {
        self.testmode = testmode;
        self
    }

    /// Returns the query parameters shared by every search, in wire order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(11);

        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        if let Some(mask) = self.dbmask {
            params.push(("dbmask", mask.to_string()));
        }
        if let Some(mask) = self.dbmaski {
            params.push(("dbmaski", mask.to_string()));
        }

        params.push(("testmode", self.testmode.to_string()));
        params.push(("db", self.db.to_string()));
        params.push(("numres", self.numres.to_string()));
        params.push(("hide", self.hide.level().to_string()));
        params.push(("frame", self.frame.to_string()));
        params.push(("bgcolor", self.bgcolor.as_str().to_string()));
        params.push(("output_type", (OutputType::Json as u8).to_string()));
        params
    }

    /// Builds a search for an image hosted at `url`.
    pub fn url_request(&self, url: impl Into<String>) -> SearchRequest {
        let mut params = self.params();
        params.push(("url", url.into()));
        SearchRequest::Url { params }
    }

    /// Builds a search that uploads the image bytes as a multipart `file` part.
    pub fn file_request(&self, file: impl Into<Vec<u8>>) -> SearchRequest {
        SearchRequest::File {
            params: self.params(),
            file: file.into(),
        }
    }
}

/// A fully assembled search, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// The server fetches the image from the `url` query parameter.
    Url { params: Vec<(&'static str, String)> },
    /// The image is uploaded in the request body.
    File {
        params: Vec<(&'static str, String)>,
        file: Vec<u8>,
    },
}

impl SearchRequest {
    /// Returns the query parameters.
    pub fn params(&self) -> &[(&'static str, String)] {
        match self {
            Self::Url { params } | Self::File { params, .. } => params,
        }
    }

    /// Returns the value of a query parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the uploaded bytes for a file search.
    pub fn file(&self) -> Option<&[u8]> {
        match self {
            Self::File { file, .. } => Some(file),
            Self::Url { .. } => None,
        }
    }

    /// Whether an API key is sent with this request.
    pub fn has_api_key(&self) -> bool {
        self.param("api_key").is_some()
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url { .. } => "url",
            Self::File { .. } => "file",
        }
    }

    /// Splits the request into its query parameters and optional upload.
    pub fn into_parts(self) -> (Vec<(&'static str, String)>, Option<Vec<u8>>) {
        match self {
            Self::Url { params } => (params, None),
            Self::File { params, file } => (params, Some(file)),
        }
    }
}
