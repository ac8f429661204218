//! Monthly attendance aggregation and the payment statement documents built from it.
//!
//! Both renderers consume the same [`statement::Statement`], so filtering,
//! numbering and number formatting are decided once.
pub mod aggregate;
pub mod pdf;
pub mod statement;
pub mod xlsx;
