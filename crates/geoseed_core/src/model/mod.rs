//! Domain model for country datasets.
//!
//! # Responsibility
//! - Normalize country names between display and identifier forms.
//! - Define the dataset shapes seeded into storage.
//!
//! # Invariants
//! - A dataset is keyed by the identifier form of its country name.
//! - A dataset's `country.code` is the installation key in storage.

pub mod country_name;
pub mod geo;
