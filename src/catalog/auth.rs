use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config,
    management::{AuthError, TokenExchange},
    server::start_api_server,
    types::{PkceToken, Profile, Tokens},
    utils, warning,
};

/// Runs the OAuth 2.0 PKCE authorization flow against the catalog service.
///
/// This function orchestrates the interactive part of authentication:
/// 1. Generating a PKCE code verifier and challenge
/// 2. Starting a local callback server
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the OAuth callback to deliver tokens
///
/// The PKCE (Proof Key for Code Exchange) flow avoids storing a client
/// secret on the user's machine; the verifier generated here proves to the
/// token endpoint that the same client that started the flow is finishing it.
///
/// # Arguments
///
/// * `shared_state` - Thread-safe slot shared with the callback handler,
///   carrying the verifier out and the exchanged tokens back
///
/// # Returns
///
/// Returns `Some(Tokens)` once the callback handler has exchanged the
/// authorization code, or `None` if the user never completed authorization
/// within the timeout window.
///
/// # Error Handling
///
/// - Browser launch failures produce a warning with manual URL instructions
/// - Timeouts are reported through the `None` return; callers decide how to
///   surface the failure
pub async fn authorize(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Tokens> {
    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    // start API server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // Construct the authorization URL
    let auth_url = format!(
        "{catalog_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        catalog_auth_url = &config::catalog_auth_url(),
        client_id = &config::catalog_client_id(),
        redirect_uri = &config::catalog_redirect_uri(),
        code_challenge = code_challenge,
        scope = &config::catalog_scope()
    );

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            tokens: None,
        });
    }

    // Open the authorization URL in the default browser
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    wait_for_tokens(shared_state).await
}

/// Waits for the OAuth callback to complete and return tokens.
///
/// Polls the shared state for completed tokens with a 60-second timeout.
/// This function runs concurrently with the callback handler that populates
/// the slot after a successful code exchange.
///
/// # Timeout Behavior
///
/// - Maximum wait time: 60 seconds
/// - Polling interval: 1 second
/// - Non-blocking: Uses async sleep to avoid CPU spinning
async fn wait_for_tokens(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Tokens> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(tokens) = &pkce_token.tokens {
                return Some(tokens.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for access tokens using PKCE.
///
/// Completes the OAuth 2.0 PKCE flow by posting the authorization code
/// received from the callback to the token endpoint, along with the code
/// verifier that was generated at the start of the flow.
///
/// # Arguments
///
/// * `code` - Authorization code received from the OAuth callback
/// * `verifier` - PKCE code verifier matching the challenge sent initially
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Tokens)` - Access token, refresh token, scope, and expiry metadata
/// - `Err(reqwest::Error)` - HTTP error, network error, or decode failure
///
/// # Token Contents
///
/// The returned tokens include the expiration time in seconds and the
/// timestamp at which they were obtained, which together drive the
/// early-refresh logic in the session layer.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Tokens, reqwest::Error> {
    let client_id = &config::catalog_client_id();
    let redirect_uri = &config::catalog_redirect_uri();

    let client = Client::new();
    let res = client
        .post(&config::catalog_token_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    let json: Value = res.json().await?;

    Ok(Tokens {
        access_token: json["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

/// [`TokenExchange`] implementation backed by the catalog web API.
///
/// The session state machine stays transport-agnostic; this client supplies
/// the two network operations it needs, mapping connectivity failures to
/// [`AuthError::Offline`] so the session layer can tell "the service said no"
/// apart from "the service could not be reached".
pub struct CatalogTokenClient {
    client: Client,
}

impl CatalogTokenClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for CatalogTokenClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenExchange for CatalogTokenClient {
    async fn validate(&self, tokens: &Tokens) -> Result<Profile, AuthError> {
        let api_url = format!(
            "{uri}/users/{username}",
            uri = &config::catalog_api_url(),
            username = &config::catalog_username(),
        );

        let response = self
            .client
            .get(&api_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Offline(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Service(format!(
                "profile request failed with status {status}",
                status = status.as_u16()
            )));
        }

        response
            .json::<Profile>()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))
    }

    async fn refresh(&self, tokens: &Tokens) -> Result<Tokens, AuthError> {
        let response = self
            .client
            .post(&config::catalog_token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", tokens.refresh_token.as_str()),
                ("client_id", &config::catalog_client_id()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Offline(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Service(format!(
                "token refresh failed with status {status}",
                status = status.as_u16()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        let refresh_token = match json["refresh_token"].as_str() {
            // the service may omit the refresh token when it does not rotate
            Some(rotated) if !rotated.is_empty() => rotated.to_string(),
            _ => tokens.refresh_token.clone(),
        };

        Ok(Tokens {
            access_token: json["access_token"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            refresh_token,
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}
