//! Query and mutation use-cases over the booking store.
//!
//! # Responsibility
//! - Compose repository calls into page-level views (query side).
//! - Run every write inside one scoped transaction (mutation side).
//! - Translate results into typed outcomes for presentation callers.
//!
//! # Invariants
//! - Services receive the store handle explicitly; nothing is global.
//! - Time-dependent queries take `now` from the caller, read once per request.

pub mod mutation_service;
pub mod outcome;
pub mod query_service;
