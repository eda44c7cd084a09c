//! `basekit-core`: shared primitives for the gateway.
//!
//! This crate contains **no transport or storage** concerns: identifiers, the
//! build-mode flag, validation, the domain error model, and the injectable
//! capabilities (clock, hashing, code generation).

pub mod clock;
pub mod codes;
pub mod environment;
pub mod error;
pub mod hashing;
pub mod id;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock, parse_duration};
pub use codes::{CodeGenerator, FixedCodeGenerator, RandomCodeGenerator};
pub use environment::AppEnvironment;
pub use error::{DomainError, DomainResult};
pub use hashing::{BcryptHasher, Hasher, PrefixHasher};
pub use id::UserId;
pub use validation::{Validate, ValidationErrors};
