//! # Catalog Integration Module
//!
//! This module provides the client side of the remote vinyl catalog service:
//! quota-aware request pacing, paginated collection retrieval, and the OAuth
//! token plumbing. It is the only part of the application that talks to the
//! network; everything above it consumes plain data structures.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Filter Pipeline)
//!          ↓
//! Catalog Integration Layer
//!     ├── Rate Governor (quota mirror, shared throttle wait)
//!     ├── Collection Fetcher (page vs. fetch-all strategy)
//!     ├── HTTP Page Fetcher (wire calls, quota header parsing)
//!     └── Authentication (OAuth 2.0 PKCE, token exchange/refresh)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Catalog Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Rate Governor
//!
//! [`rate`] - Client-side self-throttling against the service's moving-window
//! request quota:
//! - **Quota Mirror**: Tracks `limit` / `used` / `remaining` as reported by
//!   response headers; the quota is never known in advance.
//! - **In-Flight Accounting**: Requests already dispatched but not yet
//!   reflected in server counters still count against the safety buffer.
//! - **Shared Wait**: All callers throttled during the same window await one
//!   timer and unblock together instead of spawning N independent timers.
//! - **Advisory Only**: The governor never fails and never blocks longer
//!   than one quota window.
//!
//! ### Collection Fetcher
//!
//! [`fetch`] - Strategy layer above the page fetcher capability:
//! - **Decision Rule**: Server-side pagination when it suffices; exhaustive
//!   fetch-all when a client-only sort, a search, or a facet filter needs
//!   the complete dataset.
//! - **Batched Fetch-All**: Pages are retrieved in fixed-size concurrent
//!   batches, re-checking the throttle before every batch, and concatenated
//!   in page-number order regardless of completion order.
//! - **Atomic Failure**: Any failed page fails the whole fetch; partial
//!   collections are never handed to the pipeline.
//! - **Error Taxonomy**: Non-retryable failures (unauthorized, forbidden,
//!   not-found, quota-exceeded) are distinguished from retryable transient
//!   ones (5xx, network, decode) so callers can retry the right things.
//!
//! ### HTTP Page Fetcher
//!
//! [`collection`] - The concrete [`fetch::PageFetcher`] implementation:
//! builds collection URLs, attaches bearer tokens, maps response statuses
//! into the error taxonomy, and parses `x-ratelimit-*` headers leniently
//! (absent or malformed headers leave the governor untouched).
//!
//! ### Authentication
//!
//! [`auth`] - OAuth 2.0 PKCE flow and token lifecycle:
//! - **Complete Auth Flow**: Verifier/challenge generation, local callback
//!   server, browser launch, code-for-token exchange.
//! - **Token Exchange Capability**: Validation (profile probe) and refresh,
//!   with transient failures kept distinct from real rejections so the
//!   session layer can tell "offline" apart from "signed out elsewhere".
//!
//! ## Error Handling Philosophy
//!
//! Network and service errors never panic; they surface as typed errors the
//! CLI retries or reports. Rate limiting is handled before requests are sent
//! rather than after 429 responses arrive, using the server-reported quota.
//!
//! ## Dependencies
//!
//! - **reqwest** - HTTP client with JSON support
//! - **tokio** / **futures** - async runtime, shared futures, batch joins
//! - **rand** / **sha2** / **base64** - PKCE verifier and challenge
//! - **chrono** - token timestamps

pub mod auth;
pub mod collection;
pub mod fetch;
pub mod rate;
