//! Core business logic - framework-agnostic costing, tracking and gating.
//!
//! The costing arithmetic (`units`, `recipe`) and the anomaly detector
//! (`alert`) are pure; the surrounding modules orchestrate them against
//! persistence, always committing multi-step updates as one transaction.

/// Cost anomaly detection and alert cooldown handling
pub mod alert;
/// Ingredient lifecycle - creation, purchase updates, lookups
pub mod ingredient;
/// Append-only price history per ingredient
pub mod price_history;
/// Recipe cost aggregation and derived pricing
pub mod recipe;
/// Weekly performance report generation
pub mod report;
/// Subscription state machine and access gating
pub mod subscription;
/// Unit normalization and conversion arithmetic
pub mod units;
