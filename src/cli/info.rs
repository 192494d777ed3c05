use std::sync::Arc;

use crate::{
    catalog::{
        collection::HttpPageFetcher,
        fetch::CollectionFetcher,
        rate::{RateGovernor, RateGovernorConfig},
    },
    cli, config, error, info,
    management::FileStore,
    types::{PageQuery, SortKey, SortOrder},
    warning,
};

/// Displays information about the application's configuration and the
/// catalog service's rate-limit quota.
///
/// Provides a unified CLI interface for the two diagnostic views the
/// application supports. The function accepts boolean flags to determine
/// what information to display.
///
/// # Arguments
///
/// * `quota` - Display the current rate-limit quota as the catalog service
///   reports it
/// * `show_config` - Display the resolved configuration values and local
///   storage paths
///
/// # Information Types
///
/// ## Quota (`--quota`)
/// Issues the smallest possible collection request so the service's quota
/// headers pass through the rate governor, then prints the governor's view:
/// - Requests allowed per window
/// - Requests used and remaining in the current window
/// - Whether the governor would currently hold new requests back
///
/// ## Configuration (`--config`)
/// Shows where requests go and where state lives:
/// - Catalog API endpoint and account username
/// - Collection page size and fetch batch size
/// - Rate limit window and buffer
/// - Durable store location on disk
///
/// # Execution Priority
///
/// The function executes in priority order and returns after the first match:
/// 1. Quota information (if `quota` is true)
/// 2. Configuration information (if `show_config` is true)
///
/// # Example Usage
///
/// ```bash
/// # Check how much quota is left
/// vinylcli info --quota
///
/// # Show resolved configuration
/// vinylcli info --config
/// ```
pub async fn info(quota: bool, show_config: bool) {
    if quota {
        let machine = cli::session::build_machine().await;
        cli::session::require_authenticated(&machine);

        let governor = Arc::new(RateGovernor::new(RateGovernorConfig::from_env()));
        let fetcher = CollectionFetcher::new(
            Arc::new(HttpPageFetcher::new(Arc::clone(&machine))),
            Arc::clone(&governor),
            config::fetch_batch_size(),
        );

        // the smallest possible request refreshes the governor's quota report
        let probe = PageQuery {
            page: 1,
            per_page: 1,
            sort: SortKey::Added,
            sort_order: SortOrder::Ascending,
        };
        if let Err(e) = fetcher.fetch_page(&probe).await {
            error!("Failed to probe the catalog service: {}", e);
        }

        let stats = governor.stats().await;
        info!("Requests per window: {}", stats.limit);
        info!("Used in this window: {}", stats.used);
        info!("Remaining: {}", stats.remaining);
        if stats.throttled {
            warning!("Requests are currently held back until the window resets.");
        }
        return;
    }

    if show_config {
        let store = FileStore::new("durable");

        info!("Catalog API: {}", config::catalog_api_url());
        info!("Username: {}", config::catalog_username());
        info!("Collection page size: {}", config::collection_page_size());
        info!("Fetch batch size: {}", config::fetch_batch_size());
        info!(
            "Rate limit window: {}s",
            config::rate_limit_window().as_secs()
        );
        info!("Rate limit buffer: {}", config::rate_limit_buffer());
        info!("Durable store: {}", store.path().display());
    }
}
