use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub tokens: Option<Tokens>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub tokens: Option<Tokens>,
    #[serde(default)]
    pub session_active: bool,
    #[serde(default)]
    pub cached_profile: Option<Profile>,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            tokens: None,
            session_active: false,
            cached_profile: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub avatar_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub instance_id: u64,
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub rating: u8,
    pub basic_information: BasicInformation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInformation {
    pub title: String,
    // 0 means the catalog does not know the year
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub artists: Vec<ReleaseArtist>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub labels: Vec<ReleaseLabel>,
    #[serde(default)]
    pub formats: Vec<ReleaseFormat>,
    // empty when the catalog does not report a country
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseArtist {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseLabel {
    pub name: String,
    #[serde(default)]
    pub catno: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFormat {
    pub name: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub items: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPageResponse {
    pub pagination: Pagination,
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimitQuota {
    pub limit: Option<u32>,
    pub used: Option<u32>,
    pub remaining: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: SortKey,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub releases: Vec<Release>,
    pub pagination: Pagination,
    pub quota: RateLimitQuota,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Added,
    Artist,
    Title,
    Label,
    Format,
    Year,
    Genre,
    Random,
}

impl SortKey {
    // genre and random cannot be delegated to the catalog service
    pub fn is_client_only(&self) -> bool {
        matches!(self, SortKey::Genre | SortKey::Random)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Added => "added",
            SortKey::Artist => "artist",
            SortKey::Title => "title",
            SortKey::Label => "label",
            SortKey::Format => "format",
            SortKey::Year => "year",
            SortKey::Genre => "genre",
            SortKey::Random => "random",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Tabled)]
pub struct CollectionTableRow {
    pub artist: String,
    pub title: String,
    pub year: String,
    pub format: String,
    pub label: String,
}
