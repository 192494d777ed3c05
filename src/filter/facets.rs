use std::collections::BTreeMap;

use crate::{filter::FilterSelection, types::Release};

/// One selectable facet value together with the number of releases that
/// currently carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub count: u64,
}

/// All facet options derivable from the vinyl portion of a collection.
///
/// Options are sorted by value. Values the user has selected stay listed even
/// when their count drops to zero, so an active selection never disappears
/// from the menu it was picked from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub genres: Vec<FacetOption>,
    pub styles: Vec<FacetOption>,
    pub labels: Vec<FacetOption>,
    pub types: Vec<FacetOption>,
    pub sizes: Vec<FacetOption>,
    pub countries: Vec<FacetOption>,
    pub year_bounds: Option<(u32, u32)>,
}

pub fn is_vinyl(release: &Release) -> bool {
    release
        .basic_information
        .formats
        .iter()
        .any(|format| format.name == "Vinyl")
}

/// Splits a collection into its vinyl releases and a per-format count of
/// everything else, for the "excluded N items" diagnostic line.
///
/// A non-vinyl release is counted once, under its first format name.
pub fn partition_vinyl(releases: &[Release]) -> (Vec<&Release>, BTreeMap<String, u64>) {
    let mut vinyl = Vec::new();
    let mut excluded: BTreeMap<String, u64> = BTreeMap::new();

    for release in releases {
        if is_vinyl(release) {
            vinyl.push(release);
        } else {
            let format = release
                .basic_information
                .formats
                .first()
                .map(|f| f.name.as_str())
                .unwrap_or("Unknown");
            *excluded.entry(format.to_string()).or_insert(0) += 1;
        }
    }

    (vinyl, excluded)
}

// a size descriptor is digits followed by an inch mark, e.g. 12" or 7"
pub fn is_size_descriptor(description: &str) -> bool {
    match description.strip_suffix('"') {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

pub fn vinyl_sizes(release: &Release) -> Vec<&str> {
    vinyl_descriptions(release, true)
}

pub fn vinyl_types(release: &Release) -> Vec<&str> {
    vinyl_descriptions(release, false)
}

fn vinyl_descriptions(release: &Release, sizes: bool) -> Vec<&str> {
    release
        .basic_information
        .formats
        .iter()
        .filter(|format| format.name == "Vinyl")
        .flat_map(|format| format.descriptions.iter())
        .map(|description| description.as_str())
        .filter(|description| is_size_descriptor(description) == sizes)
        .collect()
}

/// Computes the `{value, count}` option lists for every facet from the vinyl
/// releases, then unions in each currently-selected value at count zero if it
/// matched nothing.
pub fn derive_facet_options(vinyl: &[&Release], selection: &FilterSelection) -> FacetOptions {
    let mut genres: BTreeMap<String, u64> = BTreeMap::new();
    let mut styles: BTreeMap<String, u64> = BTreeMap::new();
    let mut labels: BTreeMap<String, u64> = BTreeMap::new();
    let mut types: BTreeMap<String, u64> = BTreeMap::new();
    let mut sizes: BTreeMap<String, u64> = BTreeMap::new();
    let mut countries: BTreeMap<String, u64> = BTreeMap::new();

    for release in vinyl {
        let info = &release.basic_information;
        for genre in &info.genres {
            *genres.entry(genre.clone()).or_insert(0) += 1;
        }
        for style in &info.styles {
            *styles.entry(style.clone()).or_insert(0) += 1;
        }
        for label in &info.labels {
            *labels.entry(label.name.clone()).or_insert(0) += 1;
        }
        for vinyl_type in vinyl_types(release) {
            *types.entry(vinyl_type.to_string()).or_insert(0) += 1;
        }
        for size in vinyl_sizes(release) {
            *sizes.entry(size.to_string()).or_insert(0) += 1;
        }
        if !info.country.is_empty() {
            *countries.entry(info.country.clone()).or_insert(0) += 1;
        }
    }

    // selected values stay visible even when nothing matches them anymore
    for (counts, selected) in [
        (&mut genres, &selection.genres),
        (&mut styles, &selection.styles),
        (&mut labels, &selection.labels),
        (&mut types, &selection.types),
        (&mut sizes, &selection.sizes),
        (&mut countries, &selection.countries),
    ] {
        for value in selected {
            counts.entry(value.clone()).or_insert(0);
        }
    }

    let years = vinyl
        .iter()
        .map(|release| release.basic_information.year)
        .filter(|year| *year > 0);
    let year_bounds = match (years.clone().min(), years.max()) {
        (Some(min), Some(max)) => Some((min, max)),
        _ => None,
    };

    FacetOptions {
        genres: collect_options(genres),
        styles: collect_options(styles),
        labels: collect_options(labels),
        types: collect_options(types),
        sizes: collect_options(sizes),
        countries: collect_options(countries),
        year_bounds,
    }
}

fn collect_options(counts: BTreeMap<String, u64>) -> Vec<FacetOption> {
    counts
        .into_iter()
        .map(|(value, count)| FacetOption { value, count })
        .collect()
}
