//! Repository layer for geographic rows.
//!
//! # Responsibility
//! - Keep SQL for countries/regions/cities inside one boundary.
//! - Expose the existence counts used for installation checks.
//!
//! # Invariants
//! - Repositories only accept fully migrated connections.

pub mod geo_repo;
