//! `basekit-auth`: authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP: it decides, the gateway enforces.
//! The decision is [`authorize`], a pure function of the route's
//! [`RouteAuth`] record, the presented credential, a [`TokenVerifier`] and
//! the current time.

pub mod claims;
pub mod dto;
pub mod guard;
pub mod literals;
pub mod principal;
pub mod reason;
pub mod roles;
pub mod route;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use guard::{Access, Denial, DenialKind, authenticate, authorize, require_admin};
pub use principal::AuthUser;
pub use reason::AuthReason;
pub use roles::UserRole;
pub use route::RouteAuth;
pub use token::{AccessToken, Hs256TokenCodec, TokenError, TokenVerifier};
