use std::{fmt, sync::Arc};

use async_trait::async_trait;
use futures::future::join_all;

use crate::{
    catalog::rate::RateGovernor,
    filter::FilterSelection,
    types::{FetchedPage, PageQuery, Release, SortKey, SortOrder},
};

/// Errors produced while retrieving collection pages.
///
/// The variants split into two camps: rejections the caller must not retry
/// (`Unauthorized`, `Forbidden`, `NotFound`, `QuotaExceeded`) and transient
/// failures worth a bounded number of retries (`Http` 5xx, `Network`,
/// `Decode`). See [`FetchError::is_retryable`].
#[derive(Debug)]
pub enum FetchError {
    Unauthorized,
    Forbidden,
    NotFound,
    QuotaExceeded,
    Http(u16),
    Network(String),
    Decode(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Unauthorized
            | FetchError::Forbidden
            | FetchError::NotFound
            | FetchError::QuotaExceeded => false,
            FetchError::Http(_) | FetchError::Network(_) | FetchError::Decode(_) => true,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unauthorized => write!(f, "not authorized for the collection"),
            FetchError::Forbidden => write!(f, "access to the collection is forbidden"),
            FetchError::NotFound => write!(f, "collection not found"),
            FetchError::QuotaExceeded => write!(f, "request quota exceeded"),
            FetchError::Http(status) => write!(f, "catalog service returned status {status}"),
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Decode(msg) => write!(f, "malformed catalog response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Capability for retrieving one page of a paginated collection.
///
/// Swappable so tests can script pages, delays, and failures without a
/// network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FetchedPage, FetchError>;
}

/// Returns whether the requested view needs the complete collection.
///
/// Server-side pagination suffices for plain browsing; a client-only sort
/// (genre, random), a non-blank search, or any active facet filter requires
/// every page up front.
pub fn needs_full_collection(selection: &FilterSelection, search: &str, sort: SortKey) -> bool {
    sort.is_client_only() || !search.trim().is_empty() || selection.is_active()
}

/// Retrieves collection pages through the rate governor.
///
/// Every page request waits out the governor first, is bracketed by
/// in-flight accounting, and forwards the server's quota report back into
/// the governor. [`fetch_all`](Self::fetch_all) retrieves an entire
/// collection in fixed-size concurrent batches while keeping the result in
/// page-number order.
pub struct CollectionFetcher {
    fetcher: Arc<dyn PageFetcher>,
    governor: Arc<RateGovernor>,
    batch_size: usize,
}

impl CollectionFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, governor: Arc<RateGovernor>, batch_size: usize) -> Self {
        Self {
            fetcher,
            governor,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches a single page, governed.
    pub async fn fetch_page(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        self.governor.wait_if_needed().await;

        self.governor.start_request().await;
        let result = self.fetcher.fetch_page(query).await;
        self.governor.finish_request().await;

        if let Ok(page) = &result {
            self.governor.update_from_quota(&page.quota).await;
        }

        result
    }

    /// Fetches every page of the collection and concatenates the releases in
    /// page-number order.
    ///
    /// Page 1 is fetched first to learn the total page count; the remaining
    /// pages are dispatched in batches of `batch_size` concurrent requests,
    /// re-checking the throttle before every batch. Any failed page fails
    /// the whole operation; pages already fetched are discarded with the
    /// error.
    pub async fn fetch_all(
        &self,
        per_page: u32,
        sort: SortKey,
        sort_order: SortOrder,
    ) -> Result<Vec<Release>, FetchError> {
        let first = self
            .fetch_page(&PageQuery {
                page: 1,
                per_page,
                sort,
                sort_order,
            })
            .await?;

        let total_pages = first.pagination.pages;
        let mut releases = first.releases;
        if total_pages <= 1 {
            return Ok(releases);
        }

        let remaining: Vec<u32> = (2..=total_pages).collect();
        for batch in remaining.chunks(self.batch_size) {
            self.governor.wait_if_needed().await;

            let queries: Vec<PageQuery> = batch
                .iter()
                .map(|&page| PageQuery {
                    page,
                    per_page,
                    sort,
                    sort_order,
                })
                .collect();

            // join_all keeps input order, so the scan below reports the
            // lowest failing page and appends releases page by page
            let results = join_all(queries.iter().map(|q| self.fetch_page(q))).await;
            for result in results {
                releases.extend(result?.releases);
            }
        }

        Ok(releases)
    }
}
