//! Storefront - headless core of an online shop front end
//!
//! Everything a storefront page shows is derived here from immutable data
//! snapshots: catalogue filtering and pagination, carousel slides, deal
//! progress bars, cart and discount pricing, and the form state of the
//! profile and registration pages.
//!
//! # Architecture
//!
//! - [`core`] - Entities, pure computations, data source, scheduler, local store
//! - [`app`] - Per-page view state machines (`State` + `Message` + `update`)
//! - [`validators`] - Field validation for customer input
//! - [`config`] - Configuration persistence
//! - [`utils`] - XDG directories

#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod config;
pub mod core;
pub mod utils;
pub mod validators;

pub use core::error::{Error, Result};
pub use core::entity::{Category, DealRecord, Product, UserProfile};
