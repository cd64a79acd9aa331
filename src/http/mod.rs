//! Typed HTTP boundary between a web framework and the OAuth handshake.
//!
//! The router that owns the real server converts its request into an
//! [`AuthRequest`] and converts the returned [`AuthResponse`] back. Both
//! carry `reqwest`'s re-exported `http` header and status types, so no
//! stringly-typed shims cross the boundary.

mod request;
mod response;

pub use request::AuthRequest;
pub use response::AuthResponse;
