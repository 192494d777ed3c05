use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderMap};

use crate::{
    catalog::fetch::{FetchError, PageFetcher},
    config,
    management::{AuthError, SessionStateMachine},
    types::{CollectionPageResponse, FetchedPage, PageQuery, RateLimitQuota},
};

/// [`PageFetcher`] implementation against the catalog web API.
///
/// Pulls a fresh access token from the session for every request (tokens
/// rotate mid-fetch on large collections), maps response statuses into the
/// fetch error taxonomy, and extracts the service's quota report from the
/// `x-ratelimit-*` headers.
pub struct HttpPageFetcher {
    client: Client,
    session: Arc<SessionStateMachine>,
}

impl HttpPageFetcher {
    pub fn new(session: Arc<SessionStateMachine>) -> Self {
        Self {
            client: Client::new(),
            session,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        let token = match self.session.valid_access_token().await {
            Ok(token) => token,
            Err(AuthError::Unauthorized) => return Err(FetchError::Unauthorized),
            Err(e) => return Err(FetchError::Network(e.to_string())),
        };

        let api_url = format!(
            "{uri}/users/{username}/collection/folders/0/releases?page={page}&per_page={per_page}&sort={sort}&sort_order={order}",
            uri = &config::catalog_api_url(),
            username = &config::catalog_username(),
            page = query.page,
            per_page = query.per_page,
            sort = query.sort,
            order = query.sort_order,
        );

        let response = self
            .client
            .get(&api_url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let quota = parse_quota_headers(response.headers());

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
                StatusCode::FORBIDDEN => FetchError::Forbidden,
                StatusCode::NOT_FOUND => FetchError::NotFound,
                StatusCode::TOO_MANY_REQUESTS => FetchError::QuotaExceeded,
                other => FetchError::Http(other.as_u16()),
            });
        }

        let page: CollectionPageResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(FetchedPage {
            releases: page.releases,
            pagination: page.pagination,
            quota,
        })
    }
}

/// Reads the service's quota report from response headers.
///
/// Absent or unparseable headers yield `None` for that field, leaving the
/// governor's prior state untouched.
pub fn parse_quota_headers(headers: &HeaderMap) -> RateLimitQuota {
    RateLimitQuota {
        limit: header_u32(headers, "x-ratelimit-limit"),
        used: header_u32(headers, "x-ratelimit-used"),
        remaining: header_u32(headers, "x-ratelimit-remaining"),
    }
}

fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
