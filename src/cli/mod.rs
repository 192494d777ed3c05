//! # CLI Module
//!
//! This module provides the command-line interface layer for Vinylcli, a
//! client for browsing a personal vinyl collection held in a remote catalog
//! service. It implements all user-facing CLI commands and coordinates
//! between the catalog integration, session management, and the local filter
//! pipeline.
//!
//! ## Overview
//!
//! The CLI module is the primary interface between users and the
//! application's functionality. It provides commands for:
//!
//! - **Authentication Management**: OAuth 2.0 PKCE flow for catalog access
//! - **Collection Browsing**: Fetching, filtering, sorting, and paginating
//!   the vinyl collection
//! - **Session Management**: Resuming, ending, and severing the stored
//!   session
//! - **Information Queries**: Quota and configuration diagnostics
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Initiates the OAuth authentication flow with PKCE security,
//!   optionally landing on a remembered collection view afterwards
//!
//! ### Collection Operations
//!
//! - [`browse`] - Displays a filtered, sorted, paginated slice of the
//!   collection together with its facet menus
//!
//! ### Session Operations
//!
//! - [`status`] - Shows the current session phase and profile
//! - [`continue_session`] - Resumes a signed-out session from stored tokens
//! - [`sign_out`] - Ends the live session but keeps tokens for a quick resume
//! - [`disconnect`] - Removes all stored credentials and preferences
//! - [`set_avatar`] - Records the preferred avatar source for the account
//!
//! ### Information Commands
//!
//! - [`info`] - Provides quota and configuration information
//!
//! ## Architecture Design
//!
//! The CLI module follows a layered architecture approach:
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Session State / Stores)
//!     ↓
//! Catalog Layer (Service Integration, Rate Governing)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! Each CLI command delegates to the management and catalog modules while
//! handling user interaction, progress feedback, and error presentation.
//!
//! ## Data Flow
//!
//! A browse request runs through the full stack: the session machine
//! supplies a valid access token, the rate governor decides whether the
//! request may leave, the fetcher retrieves one page or the whole
//! collection, and the filter pipeline derives the visible slice that the
//! table renderer prints.
//!
//! ## Error Handling Philosophy
//!
//! The CLI module implements user-friendly error handling:
//!
//! - **Helpful Messages**: Clear guidance on how to resolve issues, such as
//!   which command to run after a session expires
//! - **Graceful Degradation**: Transient fetch failures retry before the
//!   command gives up
//! - **Context Preservation**: Error messages include the failing operation
//!
//! ## Progress and User Experience
//!
//! Long-running operations provide user feedback:
//!
//! - **Progress Indicators**: Spinners while the collection is fetched
//! - **Status Messages**: Informative messages about the current operation
//! - **Detailed Output**: Rich formatting using tables and color coding
//!
//! ## Usage Patterns
//!
//! ### Initial Setup
//! ```bash
//! vinylcli auth                    # Authenticate with the catalog service
//! vinylcli collection              # Browse the first page
//! ```
//!
//! ### Regular Usage
//! ```bash
//! vinylcli collection --style "Prog Rock" --search floyd
//! vinylcli collection --sort random --seed 7
//! vinylcli session sign-out
//! vinylcli session continue
//! ```
//!
//! ### Diagnostics
//! ```bash
//! vinylcli info --quota            # Remaining request quota
//! vinylcli info --config           # Resolved configuration
//! ```
//!
//! ## Dependencies
//!
//! This module depends on several core application components:
//! - [`crate::catalog`] - Catalog service integration and authentication
//! - [`crate::management`] - Session state and storage
//! - [`crate::filter`] - The collection view pipeline
//! - [`crate::types`] - Data structures and type definitions
//! - [`crate::utils`] - Parsing and formatting helpers

mod auth;
mod collection;
mod info;
mod session;

pub use auth::auth;
pub use collection::CollectionParams;
pub use collection::browse;
pub use info::info;
pub use session::continue_session;
pub use session::disconnect;
pub use session::set_avatar;
pub use session::sign_out;
pub use session::status;
