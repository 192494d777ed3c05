use std::collections::BTreeSet;

use crate::utils;

/// The facet values a user has switched on, plus an optional year range.
/// An empty set means "no restriction" for that facet.
///
/// Selections round-trip through a canonical query-string form so a filtered
/// view can be shared as a plain URL and restored later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub genres: BTreeSet<String>,
    pub styles: BTreeSet<String>,
    pub labels: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub year_range: Option<(u32, u32)>,
}

impl FilterSelection {
    /// True when at least one facet value or a year range is selected.
    pub fn is_active(&self) -> bool {
        !self.genres.is_empty()
            || !self.styles.is_empty()
            || !self.labels.is_empty()
            || !self.types.is_empty()
            || !self.sizes.is_empty()
            || !self.countries.is_empty()
            || self.year_range.is_some()
    }

    /// Serializes the selection into its canonical query-string form.
    ///
    /// Facets appear in a fixed order with one `key=value` pair per selected
    /// value, so equal selections always produce byte-identical strings.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();

        for (key, values) in [
            ("genre", &self.genres),
            ("style", &self.styles),
            ("label", &self.labels),
            ("type", &self.types),
            ("size", &self.sizes),
            ("country", &self.countries),
        ] {
            for value in values {
                pairs.push(format!(
                    "{key}={value}",
                    key = key,
                    value = urlencoding::encode(value)
                ));
            }
        }

        if let Some((min, max)) = self.year_range {
            pairs.push(format!("year={min}-{max}", min = min, max = max));
        }

        pairs.join("&")
    }

    /// Restores a selection from a query string.
    ///
    /// Tolerant by design: pairs with unknown keys, missing values, or broken
    /// percent-encoding are skipped rather than failing the whole string.
    pub fn from_query_string(query: &str) -> Self {
        let mut selection = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let Ok(value) = urlencoding::decode(value) else {
                continue;
            };
            let value = value.into_owned();
            if value.is_empty() {
                continue;
            }

            match key {
                "genre" => {
                    selection.genres.insert(value);
                }
                "style" => {
                    selection.styles.insert(value);
                }
                "label" => {
                    selection.labels.insert(value);
                }
                "type" => {
                    selection.types.insert(value);
                }
                "size" => {
                    selection.sizes.insert(value);
                }
                "country" => {
                    selection.countries.insert(value);
                }
                "year" => {
                    if let Ok(range) = utils::parse_year_range(&value) {
                        selection.year_range = Some(range);
                    }
                }
                _ => {}
            }
        }

        selection
    }
}
