use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::time::sleep;

use crate::{
    catalog::{
        collection::HttpPageFetcher,
        fetch::{CollectionFetcher, FetchError, needs_full_collection},
        rate::{RateGovernor, RateGovernorConfig},
    },
    cli, config, error,
    filter::{self, CollectionView, FilterSelection, ViewRequest, derive_view},
    info,
    management::SessionStateMachine,
    types::{CollectionTableRow, PageQuery, Pagination, Release, SortKey, SortOrder},
    utils,
};

pub struct CollectionParams {
    pub selection: FilterSelection,
    pub search: String,
    pub sort: SortKey,
    pub sort_order: SortOrder,
    pub seed: Option<u32>,
    pub page: u32,
    pub per_page: Option<u32>,
    pub show_facets: bool,
}

impl Default for CollectionParams {
    fn default() -> Self {
        Self {
            selection: FilterSelection::default(),
            search: String::new(),
            sort: SortKey::Added,
            sort_order: SortOrder::Ascending,
            seed: None,
            page: 1,
            per_page: None,
            show_facets: false,
        }
    }
}

impl CollectionParams {
    // lands a shared /collection?... link on the same view the sender saw
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self {
            selection: FilterSelection::from_query_string(query),
            ..Self::default()
        };

        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let Ok(value) = urlencoding::decode(value) else {
                continue;
            };

            match key {
                "search" => params.search = value.into_owned(),
                "sort" => {
                    if let Ok(sort) = utils::parse_sort_key(&value) {
                        params.sort = sort;
                    }
                }
                "order" => {
                    if let Ok(order) = utils::parse_sort_order(&value) {
                        params.sort_order = order;
                    }
                }
                "page" => {
                    if let Ok(page) = value.parse() {
                        params.page = page;
                    }
                }
                "seed" => {
                    if let Ok(seed) = value.parse() {
                        params.seed = Some(seed);
                    }
                }
                _ => {}
            }
        }

        params
    }
}

pub async fn browse(params: CollectionParams) {
    let machine = cli::session::build_machine().await;
    browse_with_machine(machine, params).await;
}

pub(crate) async fn browse_with_machine(
    machine: Arc<SessionStateMachine>,
    params: CollectionParams,
) {
    cli::session::require_authenticated(&machine);

    let governor = Arc::new(RateGovernor::new(RateGovernorConfig::from_env()));
    let fetcher = CollectionFetcher::new(
        Arc::new(HttpPageFetcher::new(Arc::clone(&machine))),
        Arc::clone(&governor),
        config::fetch_batch_size(),
    );

    let per_page = params.per_page.unwrap_or_else(config::collection_page_size);
    let fetch_all = needs_full_collection(&params.selection, &params.search, params.sort);
    // the catalog service cannot produce genre or random orderings
    let wire_sort = if params.sort.is_client_only() {
        SortKey::Added
    } else {
        params.sort
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message(if fetch_all {
        "Fetching the whole collection..."
    } else {
        "Fetching collection page..."
    });
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let mut attempts = 0;
    let (releases, server_pagination) = loop {
        match fetch_collection(&fetcher, fetch_all, &params, per_page, wire_sort).await {
            Ok(outcome) => break outcome,
            Err(e) if e.is_retryable() && attempts < 2 => {
                attempts += 1;
                pb.set_message(format!("Fetch failed ({error}), retrying...", error = e));
                sleep(Duration::from_secs(2)).await;
            }
            Err(FetchError::Unauthorized) => {
                pb.finish_and_clear();
                error!("Session expired. Run vinylcli auth to sign in again.");
            }
            Err(e) => {
                pb.finish_and_clear();
                error!("Failed to fetch collection: {}", e);
            }
        }
    };
    pb.finish_and_clear();

    let seed = match params.seed {
        Some(seed) => seed,
        None => {
            let seed = filter::fresh_seed();
            if params.sort == SortKey::Random {
                info!("Shuffle seed: {seed} (repeat with --seed {seed})", seed = seed);
            }
            seed
        }
    };

    let request = ViewRequest {
        selection: params.selection.clone(),
        search: params.search.clone(),
        sort: params.sort,
        sort_order: params.sort_order,
        shuffle_seed: seed,
        page: params.page,
        per_page,
    };

    let view = derive_view(&releases, &request, server_pagination.as_ref());

    if params.show_facets {
        print_facets(&view);
    }

    let rows: Vec<CollectionTableRow> = view
        .releases
        .iter()
        .map(|release| {
            let info = &release.basic_information;
            CollectionTableRow {
                artist: utils::join_artist_names(&info.artists),
                title: info.title.clone(),
                year: utils::year_display(info.year),
                format: utils::format_summary(info),
                label: utils::label_summary(info),
            }
        })
        .collect();

    if rows.is_empty() {
        info!("No releases match the current view.");
    } else {
        let table = Table::new(rows);
        println!("{table}", table = table);
    }

    if !view.non_vinyl.is_empty() {
        let total: u64 = view.non_vinyl.values().sum();
        let breakdown = view
            .non_vinyl
            .iter()
            .map(|(name, count)| format!("{count} {name}", count = count, name = name))
            .collect::<Vec<String>>()
            .join(", ");
        info!(
            "Excluded {total} non-vinyl items: {breakdown}",
            total = total,
            breakdown = breakdown
        );
    }

    info!(
        "Page {page} of {pages} ({items} releases)",
        page = view.pagination.page,
        pages = view.pagination.pages,
        items = view.pagination.items
    );

    if params.selection.is_active() {
        info!(
            "Share this view: /collection?{query}",
            query = params.selection.to_query_string()
        );
    }
}

async fn fetch_collection(
    fetcher: &CollectionFetcher,
    fetch_all: bool,
    params: &CollectionParams,
    per_page: u32,
    wire_sort: SortKey,
) -> Result<(Vec<Release>, Option<Pagination>), FetchError> {
    if fetch_all {
        let releases = fetcher
            .fetch_all(per_page, wire_sort, params.sort_order)
            .await?;
        Ok((releases, None))
    } else {
        let page = fetcher
            .fetch_page(&PageQuery {
                page: params.page,
                per_page,
                sort: wire_sort,
                sort_order: params.sort_order,
            })
            .await?;
        Ok((page.releases, Some(page.pagination)))
    }
}

fn print_facets(view: &CollectionView<'_>) {
    let groups = [
        ("Genres", &view.facets.genres),
        ("Styles", &view.facets.styles),
        ("Labels", &view.facets.labels),
        ("Types", &view.facets.types),
        ("Sizes", &view.facets.sizes),
        ("Countries", &view.facets.countries),
    ];

    for (name, options) in groups {
        if options.is_empty() {
            continue;
        }
        println!("{name}:", name = name);
        for option in options {
            println!(
                "  {value} ({count})",
                value = option.value,
                count = option.count
            );
        }
    }

    if let Some((min, max)) = view.facets.year_bounds {
        println!("Years: {min}-{max}", min = min, max = max);
    }
}
