//! Member portal web tier.
//!
//! SYSTEM CONTEXT
//! ==============
//! Incoming requests pass through an ordered interceptor chain before they
//! reach a route loader. Loaders call the authenticated fetch dispatcher,
//! which resolves a bearer token from a cookie-backed session store (browser)
//! or straight from the request cookie jar (server), then validate the
//! upstream JSON into typed records.

pub mod claims;
pub mod codec;
pub mod config;
pub mod fetch;
pub mod loaders;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod validate;

#[cfg(test)]
#[path = "upstream_test.rs"]
mod upstream;
