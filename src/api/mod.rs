//! # API Module
//!
//! This module provides the HTTP endpoints for the application's embedded web
//! server. The server only exists to complete interactive authentication and
//! to answer basic liveness probes.
//!
//! ## Overview
//!
//! Vinylcli talks to the catalog service as an OAuth 2.0 client. Because the
//! authorization step happens in the user's browser, the CLI briefly runs a
//! local web server that the browser is redirected back to. This module
//! implements that surface:
//!
//! - **OAuth Authentication Flow**: The PKCE (Proof Key for Code Exchange)
//!   callback handler that exchanges the authorization code for tokens
//! - **Health Monitoring**: A health check endpoint for quickly verifying the
//!   callback server actually came up on the configured address
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`callback`] - Handles the OAuth redirect from the catalog service's
//!   authorization server. Completes the PKCE flow by exchanging the
//!   authorization code for access and refresh tokens.
//!
//! ### Monitoring
//!
//! - [`health`] - Returns application status and version information.
//!
//! ## Architecture
//!
//! The module is built using the [Axum](https://docs.rs/axum) web framework.
//! Each endpoint is implemented as an async function that plugs into Axum's
//! routing system; shared authentication state travels through an
//! [`axum::Extension`] layer.
//!
//! ## Security Considerations
//!
//! - Uses the OAuth 2.0 PKCE flow so no client secret is stored locally
//! - The code verifier never leaves the process; only the derived challenge
//!   is sent through the browser
//! - Exchange failures render a plain error page and leave no partial state
//!
//! ## Related Modules
//!
//! - [`crate::catalog`] - Catalog service integration and token exchange
//! - [`crate::types`] - Type definitions for authentication tokens

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
