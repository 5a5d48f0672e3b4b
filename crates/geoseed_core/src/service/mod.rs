//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate catalogs, repositories, transactions and seed runners into
//!   use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod country_loader;
