//! HTTP gateway: configuration, boundary middleware, and routes.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
