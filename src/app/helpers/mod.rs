//! Helper utilities for the app layer
//!
//! Pure formatting functions shared by the views.

pub mod formatting;

pub use formatting::{format_percentage, format_price, format_time_remaining, truncate};
