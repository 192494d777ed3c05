use std::collections::BTreeMap;

use crate::{
    filter::{
        facets::{FacetOptions, derive_facet_options, partition_vinyl, vinyl_sizes, vinyl_types},
        selection::FilterSelection,
        shuffle::ShuffleRng,
    },
    types::{Pagination, Release, SortKey, SortOrder},
    utils,
};

/// Everything the pipeline needs to turn a raw release list into one page of
/// a browsable view.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub selection: FilterSelection,
    pub search: String,
    pub sort: SortKey,
    pub sort_order: SortOrder,
    pub shuffle_seed: u32,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self {
            selection: FilterSelection::default(),
            search: String::new(),
            sort: SortKey::Added,
            sort_order: SortOrder::Ascending,
            shuffle_seed: 0,
            page: 1,
            per_page: 50,
        }
    }
}

/// One derived page of the collection, plus the facet menus and diagnostics
/// that belong alongside it.
#[derive(Debug)]
pub struct CollectionView<'a> {
    pub releases: Vec<&'a Release>,
    pub facets: FacetOptions,
    pub non_vinyl: BTreeMap<String, u64>,
    pub pagination: Pagination,
}

/// Runs the full derivation pipeline over a release snapshot.
///
/// Stages run in a fixed order:
/// 1. Vinyl filter, retaining a per-format count of everything excluded
/// 2. Facet option derivation from the vinyl set, selected values unioned in
/// 3. Search filter over artist names and title, blank search passes through
/// 4. Facet filter, OR within a facet and AND across facets
/// 5. Sort, a pass-through for orders the catalog service applied upstream
/// 6. Pagination
///
/// # Arguments
///
/// * `releases` - The snapshot to derive from. In fetch-all mode this is the
///   whole collection; otherwise it is the single page the service returned.
/// * `request` - Selection, search, sort, and paging parameters.
/// * `server_pagination` - Pagination metadata reported by the service. When
///   present it is trusted as-is and no client-side slicing happens; when
///   absent the pipeline paginates the filtered and sorted list itself.
///
/// # Sorting
///
/// The catalog service handles the storable sort orders, so those arrive
/// pre-sorted and pass straight through. Genre sorts locally by the first
/// listed genre, case-insensitively, with the title as tie-breaker; flipping
/// the direction flips both keys together. Random applies a seeded shuffle,
/// so the same seed over the same snapshot reproduces the same order.
pub fn derive_view<'a>(
    releases: &'a [Release],
    request: &ViewRequest,
    server_pagination: Option<&Pagination>,
) -> CollectionView<'a> {
    let (vinyl, non_vinyl) = partition_vinyl(releases);
    let facets = derive_facet_options(&vinyl, &request.selection);

    let mut filtered = vinyl;

    // blank search passes everything through
    let needle = request.search.trim().to_lowercase();
    if !needle.is_empty() {
        filtered.retain(|release| {
            let info = &release.basic_information;
            utils::join_artist_names(&info.artists)
                .to_lowercase()
                .contains(&needle)
                || info.title.to_lowercase().contains(&needle)
        });
    }

    if request.selection.is_active() {
        filtered.retain(|release| matches_selection(release, &request.selection));
    }

    match request.sort {
        SortKey::Genre => {
            filtered.sort_by(|a, b| {
                let ordering = genre_sort_key(a).cmp(&genre_sort_key(b));
                match request.sort_order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        SortKey::Random => {
            ShuffleRng::new(request.shuffle_seed).shuffle(&mut filtered);
        }
        // remaining orders were applied by the catalog service
        _ => {}
    }

    if let Some(pagination) = server_pagination {
        return CollectionView {
            releases: filtered,
            facets,
            non_vinyl,
            pagination: *pagination,
        };
    }

    let per_page = request.per_page.max(1);
    let items = filtered.len() as u64;
    let pages = items.div_ceil(u64::from(per_page)) as u32;
    let page = request.page.clamp(1, pages.max(1));
    let start = ((page - 1) * per_page) as usize;

    let releases = filtered
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    CollectionView {
        releases,
        facets,
        non_vinyl,
        pagination: Pagination {
            page,
            pages,
            per_page,
            items,
        },
    }
}

fn matches_selection(release: &Release, selection: &FilterSelection) -> bool {
    let info = &release.basic_information;

    if !selection.genres.is_empty() && !info.genres.iter().any(|g| selection.genres.contains(g)) {
        return false;
    }
    if !selection.styles.is_empty() && !info.styles.iter().any(|s| selection.styles.contains(s)) {
        return false;
    }
    if !selection.labels.is_empty()
        && !info.labels.iter().any(|l| selection.labels.contains(&l.name))
    {
        return false;
    }
    if !selection.types.is_empty()
        && !vinyl_types(release)
            .iter()
            .any(|t| selection.types.contains(*t))
    {
        return false;
    }
    if !selection.sizes.is_empty()
        && !vinyl_sizes(release)
            .iter()
            .any(|s| selection.sizes.contains(*s))
    {
        return false;
    }
    if !selection.countries.is_empty() && !selection.countries.contains(&info.country) {
        return false;
    }
    if let Some((min, max)) = selection.year_range {
        // a release without a known year fails an active year filter
        if info.year == 0 || info.year < min || info.year > max {
            return false;
        }
    }

    true
}

fn genre_sort_key(release: &Release) -> (String, String) {
    let info = &release.basic_information;
    let genre = info
        .genres
        .first()
        .map(|g| g.to_lowercase())
        .unwrap_or_default();
    (genre, info.title.to_lowercase())
}
