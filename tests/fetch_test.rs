use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use vinylcli::catalog::fetch::{CollectionFetcher, FetchError, PageFetcher, needs_full_collection};
use vinylcli::catalog::rate::{RateGovernor, RateGovernorConfig};
use vinylcli::filter::{FilterSelection, ViewRequest, derive_view};
use vinylcli::types::{
    BasicInformation, FetchedPage, PageQuery, Pagination, RateLimitQuota, Release, ReleaseArtist,
    ReleaseFormat, ReleaseLabel, SortKey, SortOrder,
};

// Helper function to create a test release
fn create_test_release(instance_id: u64, title: &str, artist: &str) -> Release {
    Release {
        id: instance_id,
        instance_id,
        date_added: "2023-06-01T00:00:00-07:00".to_string(),
        rating: 0,
        basic_information: BasicInformation {
            title: title.to_string(),
            year: 1975,
            artists: vec![ReleaseArtist {
                id: 1,
                name: artist.to_string(),
            }],
            genres: vec!["Rock".to_string()],
            styles: vec!["Prog Rock".to_string()],
            labels: vec![ReleaseLabel {
                name: "Harvest".to_string(),
                catno: None,
            }],
            formats: vec![ReleaseFormat {
                name: "Vinyl".to_string(),
                descriptions: vec!["LP".to_string(), "12\"".to_string()],
            }],
            country: "UK".to_string(),
        },
    }
}

// Helper function to create a test release with specific facet values
fn create_test_album(
    instance_id: u64,
    title: &str,
    artist: &str,
    genre: &str,
    style: &str,
    format: &str,
) -> Release {
    let mut release = create_test_release(instance_id, title, artist);
    release.basic_information.genres = vec![genre.to_string()];
    release.basic_information.styles = vec![style.to_string()];
    release.basic_information.formats = vec![ReleaseFormat {
        name: format.to_string(),
        descriptions: vec!["LP".to_string()],
    }];
    release
}

/// Serves pages from a script. Per-page delays scramble the completion
/// order, pages listed in `fail_on` return an error naming the page, and
/// every response carries the same quota report.
struct ScriptedPageFetcher {
    pages: Vec<Vec<Release>>,
    delays_ms: Vec<u64>,
    fail_on: Vec<u32>,
    quota: RateLimitQuota,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedPageFetcher {
    fn new(pages: Vec<Vec<Release>>) -> Self {
        Self {
            pages,
            delays_ms: Vec::new(),
            fail_on: Vec::new(),
            quota: RateLimitQuota::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn numbered(page_count: u32, per_page: u32) -> Self {
        let pages = (1..=page_count)
            .map(|page| {
                (0..per_page)
                    .map(|i| {
                        let instance_id = u64::from(page) * 100 + u64::from(i);
                        create_test_release(instance_id, &format!("Release {page}-{i}"), "Various")
                    })
                    .collect()
            })
            .collect();
        Self::new(pages)
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedPageFetcher {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(query.page);

        if let Some(delay) = self.delays_ms.get((query.page - 1) as usize) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }

        if self.fail_on.contains(&query.page) {
            return Err(FetchError::Network(format!(
                "page {} unreachable",
                query.page
            )));
        }

        let releases = self.pages[(query.page - 1) as usize].clone();
        let items = self.pages.iter().map(|p| p.len() as u64).sum();

        Ok(FetchedPage {
            releases,
            pagination: Pagination {
                page: query.page,
                pages: self.pages.len() as u32,
                per_page: query.per_page,
                items,
            },
            quota: self.quota,
        })
    }
}

fn test_governor() -> Arc<RateGovernor> {
    Arc::new(RateGovernor::new(RateGovernorConfig {
        window: Duration::from_secs(60),
        buffer: 3,
        initial_limit: 60,
    }))
}

fn instance_ids(releases: &[Release]) -> Vec<u64> {
    releases.iter().map(|r| r.instance_id).collect()
}

#[tokio::test(start_paused = true)]
async fn test_fetch_all_concatenates_in_page_order() {
    let mut script = ScriptedPageFetcher::numbered(3, 2);
    // page 2 finishes last and page 3 in between, order must not change
    script.delays_ms = vec![0, 300, 50];
    let script = Arc::new(script);
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, governor, 10);

    let releases = fetcher
        .fetch_all(2, SortKey::Added, SortOrder::Ascending)
        .await
        .unwrap();

    // releases come back in page-number order despite the delays
    assert_eq!(instance_ids(&releases), vec![100, 101, 200, 201, 300, 301]);
    assert_eq!(script.calls(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_fetch_all_single_page_stops_after_one_request() {
    let script = Arc::new(ScriptedPageFetcher::numbered(1, 3));
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, governor, 5);

    let releases = fetcher
        .fetch_all(3, SortKey::Added, SortOrder::Ascending)
        .await
        .unwrap();

    assert_eq!(releases.len(), 3);
    // the page count comes from page 1, no speculative second request
    assert_eq!(script.calls(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_all_fails_whole_and_reports_lowest_page() {
    let mut script = ScriptedPageFetcher::numbered(5, 1);
    // page 5 fails immediately, page 3 fails late; the error must still
    // name page 3
    script.fail_on = vec![3, 5];
    script.delays_ms = vec![0, 0, 200, 0, 0];
    let script = Arc::new(script);
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, governor, 4);

    let result = fetcher
        .fetch_all(1, SortKey::Added, SortOrder::Ascending)
        .await;

    match result {
        Err(FetchError::Network(msg)) => assert_eq!(msg, "page 3 unreachable"),
        other => panic!("expected a network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_page_stops_later_batches() {
    let mut script = ScriptedPageFetcher::numbered(5, 1);
    script.fail_on = vec![4];
    let script = Arc::new(script);
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, governor, 3);

    let result = fetcher
        .fetch_all(1, SortKey::Added, SortOrder::Ascending)
        .await;

    assert!(result.is_err());
    // the failing batch was [2, 3, 4]; page 5 must never be requested
    assert_eq!(script.calls(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_quota_reports_flow_into_the_governor() {
    let mut script = ScriptedPageFetcher::numbered(2, 1);
    script.quota = RateLimitQuota {
        limit: Some(60),
        used: Some(12),
        remaining: Some(48),
    };
    let script = Arc::new(script);
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, Arc::clone(&governor), 2);

    fetcher
        .fetch_all(1, SortKey::Added, SortOrder::Ascending)
        .await
        .unwrap();

    let stats = governor.stats().await;
    assert_eq!(stats.limit, 60);
    assert_eq!(stats.used, 12);
    assert_eq!(stats.remaining, 48);
    // in-flight accounting is balanced once the fetch is done
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_quota_pauses_between_batches() {
    let mut script = ScriptedPageFetcher::numbered(5, 1);
    // every response reports the window as nearly exhausted
    script.quota = RateLimitQuota {
        limit: Some(60),
        used: Some(58),
        remaining: Some(2),
    };
    let script = Arc::new(script);
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, Arc::clone(&governor), 3);

    let started = tokio::time::Instant::now();
    let releases = fetcher
        .fetch_all(1, SortKey::Added, SortOrder::Ascending)
        .await
        .unwrap();

    // the fetch completed, in order, but had to sit out quota windows
    assert_eq!(instance_ids(&releases), vec![100, 200, 300, 400, 500]);
    assert_eq!(script.calls(), vec![1, 2, 3, 4, 5]);
    assert!(governor.stats().await.waits_started >= 1);
    assert!(started.elapsed() >= Duration::from_secs(60));
}

#[test]
fn test_needs_full_collection_rule() {
    let selection = FilterSelection::default();

    // plain browsing keeps server-side pagination
    assert!(!needs_full_collection(&selection, "", SortKey::Added));
    assert!(!needs_full_collection(&selection, "   ", SortKey::Year));

    // a search term needs the whole collection
    assert!(needs_full_collection(&selection, "floyd", SortKey::Added));

    // client-only sorts need the whole collection
    assert!(needs_full_collection(&selection, "", SortKey::Genre));
    assert!(needs_full_collection(&selection, "", SortKey::Random));

    // any active facet needs the whole collection
    let mut active = FilterSelection::default();
    active.styles.insert("Prog Rock".to_string());
    assert!(needs_full_collection(&active, "", SortKey::Added));
}

#[tokio::test]
async fn test_fetched_collection_drives_the_view_pipeline() {
    let pages = vec![
        vec![
            create_test_album(1, "Wish You Were Here", "Pink Floyd", "Rock", "Prog Rock", "Vinyl"),
            create_test_album(2, "Nevermind", "Nirvana", "Rock", "Grunge", "Vinyl"),
        ],
        vec![
            create_test_album(
                3,
                "The Dark Side of the Moon",
                "Pink Floyd",
                "Electronic",
                "Prog Rock",
                "Vinyl",
            ),
            create_test_album(4, "Meddle", "Pink Floyd", "Rock", "Prog Rock", "CD"),
        ],
        vec![
            create_test_album(5, "Animals", "Pink Floyd", "Rock", "Prog Rock", "Vinyl"),
            create_test_album(6, "Close to the Edge", "Yes", "Rock", "Prog Rock", "Vinyl"),
        ],
    ];
    let script = Arc::new(ScriptedPageFetcher::new(pages));
    let governor = test_governor();
    let fetcher = CollectionFetcher::new(Arc::clone(&script) as _, governor, 3);

    let mut selection = FilterSelection::default();
    selection.styles.insert("Prog Rock".to_string());

    // search + facet + client-only sort forces the fetch-all path
    assert!(needs_full_collection(&selection, "floyd", SortKey::Genre));
    let releases = fetcher
        .fetch_all(2, SortKey::Added, SortOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(releases.len(), 6);

    let request = ViewRequest {
        selection,
        search: "floyd".to_string(),
        sort: SortKey::Genre,
        sort_order: SortOrder::Ascending,
        page: 1,
        per_page: 2,
        ..ViewRequest::default()
    };
    let view = derive_view(&releases, &request, None);

    // the CD pressing is excluded and counted, Nirvana and Yes fail the
    // search, and the genre sort puts Electronic before Rock
    let titles: Vec<&str> = view
        .releases
        .iter()
        .map(|r| r.basic_information.title.as_str())
        .collect();
    assert_eq!(titles, vec!["The Dark Side of the Moon", "Animals"]);
    assert_eq!(view.non_vinyl.get("CD"), Some(&1));
    assert_eq!(view.pagination.page, 1);
    assert_eq!(view.pagination.pages, 2);
    assert_eq!(view.pagination.items, 3);

    // the second page holds the remaining match
    let request = ViewRequest {
        page: 2,
        ..request
    };
    let view = derive_view(&releases, &request, None);
    let titles: Vec<&str> = view
        .releases
        .iter()
        .map(|r| r.basic_information.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Wish You Were Here"]);
}
