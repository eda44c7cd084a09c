//! Infrastructure layer: database connectivity and dependency health.
//!
//! Nothing here is on the request path except the health probes; pools are
//! built lazily so the gateway starts (and reports) with databases down.

pub mod health;
pub mod mongo;
pub mod postgres;

pub use health::{DependencyProbe, DependencyState, DependencyStatus, ProbeError, check, check_all};
pub use mongo::MongoProbe;
pub use postgres::PostgresProbe;
