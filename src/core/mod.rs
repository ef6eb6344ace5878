//! Core storefront functionality
//!
//! Pure transformations over immutable entity snapshots, plus the few
//! stateful services the views lean on:
//!
//! - [`entity`]: Category, product, deal and profile records
//! - [`slides`]: Slide grouping, circular slide cursor, pagination, breakpoints
//! - [`catalogue`]: Text search, numeric range filter and stable sorting
//! - [`progress`]: Tier resolution and deal progress percentages
//! - [`source`]: Injectable data access and fetch state
//! - [`scheduler`]: Cancellable delayed messages for carousels and debouncing
//! - [`store`]: Local key/value persistence with expiring entries
//! - [`discount`]: Discount wheel and eligibility pricing
//! - [`cart`]: Quantity clamping and the persisted cart
//! - [`error`]: Error types and user-facing translations

pub mod cart;
pub mod catalogue;
pub mod discount;
pub mod entity;
pub mod error;
pub mod progress;
pub mod scheduler;
pub mod slides;
pub mod source;
pub mod store;

#[cfg(test)]
pub mod test_helpers;

#[cfg(test)]
mod tests;
