//! Configuration management for the vinyl collection CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including catalog API credentials, server
//! settings, and the tuning knobs of the rate governor and collection fetcher.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf, time::Duration};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `vinylcli/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/vinylcli/.env`
/// - macOS: `~/Library/Application Support/vinylcli/.env`
/// - Windows: `%LOCALAPPDATA%/vinylcli/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment file is successfully loaded, or an error
/// string if directory creation or file loading fails.
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("vinylcli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// Retrieves the `SERVER_ADDRESS` environment variable which specifies
/// the address and port where the local HTTP server should bind for
/// handling OAuth callbacks during the authentication flow.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the base URL of the catalog web API.
///
/// Retrieves the `CATALOG_API_URL` environment variable which contains the
/// base URL for all collection endpoints after authentication.
///
/// # Panics
///
/// Panics if the `CATALOG_API_URL` environment variable is not set.
pub fn catalog_api_url() -> String {
    env::var("CATALOG_API_URL").expect("CATALOG_API_URL must be set")
}

/// Returns the catalog OAuth authorization URL.
///
/// Retrieves the `CATALOG_AUTH_URL` environment variable which contains
/// the base URL of the authorization endpoint users are sent to when
/// granting this application access to their collection.
///
/// # Panics
///
/// Panics if the `CATALOG_AUTH_URL` environment variable is not set.
pub fn catalog_auth_url() -> String {
    env::var("CATALOG_AUTH_URL").expect("CATALOG_AUTH_URL must be set")
}

/// Returns the catalog OAuth token exchange URL.
///
/// Retrieves the `CATALOG_TOKEN_URL` environment variable which contains
/// the URL for exchanging authorization codes for access tokens and for
/// refreshing expired tokens.
///
/// # Panics
///
/// Panics if the `CATALOG_TOKEN_URL` environment variable is not set.
pub fn catalog_token_url() -> String {
    env::var("CATALOG_TOKEN_URL").expect("CATALOG_TOKEN_URL must be set")
}

/// Returns the client ID registered with the catalog service.
///
/// The PKCE flow needs no client secret, so this is the only credential
/// required to identify the application.
///
/// # Panics
///
/// Panics if the `CATALOG_CLIENT_ID` environment variable is not set.
pub fn catalog_client_id() -> String {
    env::var("CATALOG_CLIENT_ID").expect("CATALOG_CLIENT_ID must be set")
}

/// Returns the OAuth redirect URI.
///
/// Retrieves the `CATALOG_REDIRECT_URI` environment variable which specifies
/// the callback URL the catalog service redirects to after user authorization.
/// This must match the redirect URI registered for the client and must point
/// at the local callback server (see [`server_addr`]).
///
/// # Panics
///
/// Panics if the `CATALOG_REDIRECT_URI` environment variable is not set.
pub fn catalog_redirect_uri() -> String {
    env::var("CATALOG_REDIRECT_URI").expect("CATALOG_REDIRECT_URI must be set")
}

/// Returns the OAuth scope requested during authorization.
///
/// # Panics
///
/// Panics if the `CATALOG_AUTH_SCOPE` environment variable is not set.
pub fn catalog_scope() -> String {
    env::var("CATALOG_AUTH_SCOPE").expect("CATALOG_AUTH_SCOPE must be set")
}

/// Returns the username owning the collection to browse.
///
/// # Panics
///
/// Panics if the `CATALOG_USERNAME` environment variable is not set.
pub fn catalog_username() -> String {
    env::var("CATALOG_USERNAME").expect("CATALOG_USERNAME must be set")
}

/// Returns the page size used for collection requests.
///
/// Read from `COLLECTION_PAGE_SIZE`; defaults to 50 when unset or
/// unparseable.
pub fn collection_page_size() -> u32 {
    env_or_default("COLLECTION_PAGE_SIZE", 50)
}

/// Returns the number of pages fetched concurrently per batch in
/// fetch-all mode.
///
/// Read from `FETCH_BATCH_SIZE`; defaults to 3 when unset or unparseable.
pub fn fetch_batch_size() -> usize {
    env_or_default("FETCH_BATCH_SIZE", 3)
}

/// Returns the rolling quota window of the catalog service.
///
/// Read from `RATE_LIMIT_WINDOW_SECS`; defaults to 60 seconds.
pub fn rate_limit_window() -> Duration {
    Duration::from_secs(env_or_default("RATE_LIMIT_WINDOW_SECS", 60))
}

/// Returns the safety buffer of requests kept in reserve before the
/// governor starts throttling.
///
/// Read from `RATE_LIMIT_BUFFER`; defaults to 3.
pub fn rate_limit_buffer() -> u32 {
    env_or_default("RATE_LIMIT_BUFFER", 3)
}

/// Returns the assumed request quota before the first server report arrives.
///
/// Read from `RATE_LIMIT_INITIAL`; defaults to 60.
pub fn rate_limit_initial() -> u32 {
    env_or_default("RATE_LIMIT_INITIAL", 60)
}

fn env_or_default<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
