//! Shared primitive types used across the analysis core.

/// A credit-card account identifier representing one customer.
pub type AccountId = String;

/// A spending category label (e.g. "grocery_pos").
pub type Category = String;
