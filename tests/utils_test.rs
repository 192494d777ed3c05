use vinylcli::types::{BasicInformation, ReleaseArtist, ReleaseFormat, ReleaseLabel, SortKey, SortOrder};
use vinylcli::utils::*;

// Helper function to create a test artist
fn create_test_artist(id: u64, name: &str) -> ReleaseArtist {
    ReleaseArtist {
        id,
        name: name.to_string(),
    }
}

// Helper function to create basic information with given formats and labels
fn create_test_info(formats: Vec<ReleaseFormat>, labels: Vec<ReleaseLabel>) -> BasicInformation {
    BasicInformation {
        title: "Test Album".to_string(),
        year: 1975,
        artists: vec![create_test_artist(1, "Test Artist")],
        genres: Vec::new(),
        styles: Vec::new(),
        labels,
        formats,
        country: "UK".to_string(),
    }
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should not be empty
    assert!(!challenge.is_empty());

    // Should be deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_parse_sort_key_valid_inputs() {
    assert_eq!(parse_sort_key("added").unwrap(), SortKey::Added);
    assert_eq!(parse_sort_key("artist").unwrap(), SortKey::Artist);
    assert_eq!(parse_sort_key("title").unwrap(), SortKey::Title);
    assert_eq!(parse_sort_key("label").unwrap(), SortKey::Label);
    assert_eq!(parse_sort_key("format").unwrap(), SortKey::Format);
    assert_eq!(parse_sort_key("year").unwrap(), SortKey::Year);
    assert_eq!(parse_sort_key("genre").unwrap(), SortKey::Genre);
    assert_eq!(parse_sort_key("random").unwrap(), SortKey::Random);

    // Test case insensitivity and surrounding whitespace
    assert_eq!(parse_sort_key("GENRE").unwrap(), SortKey::Genre);
    assert_eq!(parse_sort_key("  added  ").unwrap(), SortKey::Added);
}

#[test]
fn test_parse_sort_key_invalid_inputs() {
    // Test empty string
    let result = parse_sort_key("");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("cannot be empty"));

    // Test whitespace only
    let result = parse_sort_key("   ");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("cannot be empty"));

    // Test invalid key
    let result = parse_sort_key("popularity");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("invalid value 'popularity'"));
}

#[test]
fn test_parse_sort_order() {
    // Test both spellings of each direction
    assert_eq!(parse_sort_order("asc").unwrap(), SortOrder::Ascending);
    assert_eq!(parse_sort_order("ascending").unwrap(), SortOrder::Ascending);
    assert_eq!(parse_sort_order("desc").unwrap(), SortOrder::Descending);
    assert_eq!(parse_sort_order("descending").unwrap(), SortOrder::Descending);

    // Test case insensitivity
    assert_eq!(parse_sort_order("DESC").unwrap(), SortOrder::Descending);

    // Test invalid inputs
    assert!(parse_sort_order("").is_err());
    assert!(parse_sort_order("backwards").is_err());
}

#[test]
fn test_parse_year_range_valid_inputs() {
    // Test a plain range
    assert_eq!(parse_year_range("1970-1979").unwrap(), (1970, 1979));

    // Test spaces around the dash
    assert_eq!(parse_year_range("1970 - 1979").unwrap(), (1970, 1979));

    // Test a single-year range
    assert_eq!(parse_year_range("1975-1975").unwrap(), (1975, 1975));
}

#[test]
fn test_parse_year_range_invalid_inputs() {
    // Test empty string
    let result = parse_year_range("");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("cannot be empty"));

    // Test missing dash
    let result = parse_year_range("1975");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("expected <min>-<max>"));

    // Test non-numeric bounds
    let result = parse_year_range("abc-2000");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("invalid minimum year 'abc'"));

    let result = parse_year_range("1990-xyz");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("invalid maximum year 'xyz'"));

    // Test reversed bounds
    let result = parse_year_range("1990-1980");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("greater than"));
}

#[test]
fn test_join_artist_names() {
    // Test empty list
    assert_eq!(join_artist_names(&[]), "");

    // Test single artist
    let artists = vec![create_test_artist(1, "Pink Floyd")];
    assert_eq!(join_artist_names(&artists), "Pink Floyd");

    // Test multiple artists joined in order
    let artists = vec![
        create_test_artist(1, "David Bowie"),
        create_test_artist(2, "Brian Eno"),
    ];
    assert_eq!(join_artist_names(&artists), "David Bowie, Brian Eno");
}

#[test]
fn test_format_summary() {
    // Vinyl should win over an earlier non-vinyl format
    let info = create_test_info(
        vec![
            ReleaseFormat {
                name: "CD".to_string(),
                descriptions: Vec::new(),
            },
            ReleaseFormat {
                name: "Vinyl".to_string(),
                descriptions: vec!["LP".to_string(), "Gatefold".to_string()],
            },
        ],
        Vec::new(),
    );
    assert_eq!(format_summary(&info), "Vinyl (LP, Gatefold)");

    // A format without descriptions shows the bare name
    let info = create_test_info(
        vec![ReleaseFormat {
            name: "Vinyl".to_string(),
            descriptions: Vec::new(),
        }],
        Vec::new(),
    );
    assert_eq!(format_summary(&info), "Vinyl");

    // Without any vinyl the first format is shown
    let info = create_test_info(
        vec![ReleaseFormat {
            name: "CD".to_string(),
            descriptions: vec!["Album".to_string()],
        }],
        Vec::new(),
    );
    assert_eq!(format_summary(&info), "CD (Album)");

    // No formats at all renders as empty
    let info = create_test_info(Vec::new(), Vec::new());
    assert_eq!(format_summary(&info), "");
}

#[test]
fn test_label_summary() {
    // A catalog number is appended in brackets
    let info = create_test_info(
        Vec::new(),
        vec![ReleaseLabel {
            name: "Harvest".to_string(),
            catno: Some("SHVL 814".to_string()),
        }],
    );
    assert_eq!(label_summary(&info), "Harvest [SHVL 814]");

    // Without one the label name stands alone
    let info = create_test_info(
        Vec::new(),
        vec![ReleaseLabel {
            name: "Columbia".to_string(),
            catno: None,
        }],
    );
    assert_eq!(label_summary(&info), "Columbia");

    // No labels renders as empty
    let info = create_test_info(Vec::new(), Vec::new());
    assert_eq!(label_summary(&info), "");
}

#[test]
fn test_year_display() {
    // An unknown year renders as empty instead of 0
    assert_eq!(year_display(0), "");
    assert_eq!(year_display(1975), "1975");
}
