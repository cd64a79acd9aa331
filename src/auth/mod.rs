//! Authentication types for Shopify apps.
//!
//! This module provides the values that flow through and out of the OAuth
//! handshake.
//!
//! # Overview
//!
//! - [`AuthScopes`]: The ordered list of requested or granted scopes
//! - [`Session`]: The result of a completed handshake
//! - [`AssociatedUser`]: The staff member behind an online session
//! - [`SessionStore`]: The storage seam the application implements
//! - [`oauth`]: The handshake itself and its cryptographic verification layer
//!
//! # Session Types
//!
//! - **Offline sessions**: App-level tokens that stay valid until the app is
//!   uninstalled. Their id is always `offline_{shop}`.
//! - **Online sessions**: Tokens tied to the staff member who approved the
//!   app. They expire and carry an [`AssociatedUser`].

mod associated_user;
pub mod oauth;
mod scopes;
pub mod session;
mod session_store;

pub use associated_user::AssociatedUser;
pub use scopes::AuthScopes;
pub use session::{AccessTokenResponse, Session};
pub use session_store::{MemorySessionStore, SessionStorageError, SessionStore};
