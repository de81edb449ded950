//! `Margem` - Recipe costing and pricing for small food businesses
//!
//! This crate provides the costing engine behind a recipe-pricing service:
//! ingredients are registered with package purchase data, recipes are composed
//! from them, and the engine derives per-recipe cost, suggested sale price and
//! profit margin. Ingredient price history is tracked across purchases and a
//! cost-spike detector decides when to alert the owner, bounded by a cooldown.
//! A subscription state machine gates access based on trial/paid status.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::float_cmp,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Configuration management for database and application settings
pub mod config;
/// Core business logic - costing, price history, anomaly detection, subscriptions
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Notification collaborator - cost alerts and weekly reports
pub mod notify;

#[cfg(test)]
pub mod test_utils;
