use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{BasicInformation, ReleaseArtist, SortKey, SortOrder};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    let normalized = s.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "added" => Ok(SortKey::Added),
        "artist" => Ok(SortKey::Artist),
        "title" => Ok(SortKey::Title),
        "label" => Ok(SortKey::Label),
        "format" => Ok(SortKey::Format),
        "year" => Ok(SortKey::Year),
        "genre" => Ok(SortKey::Genre),
        "random" => Ok(SortKey::Random),
        "" => Err("sort key cannot be empty".to_string()),
        other => Err(format!(
            "invalid value '{other}' [possible values: added, artist, title, label, format, year, genre, random]"
        )),
    }
}

pub fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    let normalized = s.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "asc" | "ascending" => Ok(SortOrder::Ascending),
        "desc" | "descending" => Ok(SortOrder::Descending),
        "" => Err("sort order cannot be empty".to_string()),
        other => Err(format!(
            "invalid value '{other}' [possible values: asc, desc]"
        )),
    }
}

pub fn parse_year_range(s: &str) -> Result<(u32, u32), String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("year range cannot be empty".to_string());
    }

    let Some((min, max)) = trimmed.split_once('-') else {
        return Err(format!("invalid value '{trimmed}', expected <min>-<max>"));
    };

    let min: u32 = min
        .trim()
        .parse()
        .map_err(|_| format!("invalid minimum year '{min}'"))?;
    let max: u32 = max
        .trim()
        .parse()
        .map_err(|_| format!("invalid maximum year '{max}'"))?;

    if min > max {
        return Err(format!(
            "minimum year {min} is greater than maximum year {max}"
        ));
    }

    Ok((min, max))
}

pub fn join_artist_names(artists: &[ReleaseArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_summary(info: &BasicInformation) -> String {
    let vinyl = info
        .formats
        .iter()
        .find(|f| f.name == "Vinyl")
        .or_else(|| info.formats.first());

    match vinyl {
        Some(format) if format.descriptions.is_empty() => format.name.clone(),
        Some(format) => format!(
            "{name} ({descriptions})",
            name = format.name,
            descriptions = format.descriptions.join(", ")
        ),
        None => String::new(),
    }
}

pub fn label_summary(info: &BasicInformation) -> String {
    match info.labels.first() {
        Some(label) => match &label.catno {
            Some(catno) => format!("{name} [{catno}]", name = label.name, catno = catno),
            None => label.name.clone(),
        },
        None => String::new(),
    }
}

pub fn year_display(year: u32) -> String {
    if year == 0 {
        String::new()
    } else {
        year.to_string()
    }
}
