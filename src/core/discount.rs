//! Discount wheel and sub-category eligibility discount
//!
//! A spin picks one of the configured percentages uniformly. The win is
//! stored under [`WHEEL_DISCOUNT_KEY`] with an expiry and applies to every
//! catalogue price until then; a new spin replaces it.
//!
//! Separately, products viewed from an eligible sub-category get a flat rate
//! off the line total.

use crate::core::error::{Error, Result};
use crate::core::store::{self, KeyValueStore, StoreError, WHEEL_DISCOUNT_KEY};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Degrees of free spin before the wheel settles
const FULL_TURNS_DEG: f64 = 3600.0;

/// Rounds to cents, half away from zero
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of one spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSpin {
    pub index: usize,
    pub percent: u32,
    /// Final wheel rotation in degrees
    pub rotation: f64,
}

/// Rotation that lands the wheel on segment `index` of `segments`.
pub fn wheel_rotation(index: usize, segments: usize) -> f64 {
    if segments == 0 {
        return FULL_TURNS_DEG;
    }
    FULL_TURNS_DEG + index as f64 * (360.0 / segments as f64)
}

/// Spins the wheel.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if there are no options.
pub fn spin<R: Rng + ?Sized>(options: &[u32], rng: &mut R) -> Result<WheelSpin> {
    if options.is_empty() {
        return Err(Error::invalid("the discount wheel has no options"));
    }
    let index = rng.random_range(0..options.len());
    Ok(WheelSpin {
        index,
        percent: options[index],
        rotation: wheel_rotation(index, options.len()),
    })
}

/// A wheel win that is still running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountGrant {
    pub percent: u32,
    pub expires_at: DateTime<Utc>,
}

impl DiscountGrant {
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        time_remaining(self.expires_at, now)
    }

    /// Discounted catalogue price
    pub fn apply(&self, price: f64) -> f64 {
        discounted_price(price, f64::from(self.percent))
    }
}

/// Stores a new grant, replacing any previous one.
///
/// # Errors
///
/// Returns [`StoreError`] if the grant cannot be written.
pub fn grant<S: KeyValueStore + ?Sized>(
    store: &mut S,
    percent: u32,
    now: DateTime<Utc>,
    lifetime: Duration,
) -> std::result::Result<DiscountGrant, StoreError> {
    let expires_at = store::expiry_after(now, lifetime)?;
    store::set_expiring(store, WHEEL_DISCOUNT_KEY, percent, expires_at)?;
    tracing::info!("Won {percent}% discount, valid until {expires_at}");
    Ok(DiscountGrant {
        percent,
        expires_at,
    })
}

/// The running grant, if any. Expired grants are removed.
///
/// # Errors
///
/// Returns [`StoreError`] if removing an expired grant fails.
pub fn active_grant<S: KeyValueStore + ?Sized>(
    store: &mut S,
    now: DateTime<Utc>,
) -> std::result::Result<Option<DiscountGrant>, StoreError> {
    Ok(
        store::get_live::<u32, S>(store, WHEEL_DISCOUNT_KEY, now)?.map(|entry| DiscountGrant {
            percent: entry.value,
            expires_at: entry.expires_at,
        }),
    )
}

/// `price * (1 - percent / 100)`, rounded to cents.
pub fn discounted_price(price: f64, percent: f64) -> f64 {
    round_cents(price * (1.0 - percent / 100.0))
}

/// Time left until `expires_at`, never negative.
pub fn time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (expires_at - now).max(Duration::zero())
}

/// Whether a product viewed from `sub_category_id` gets the eligibility rate.
pub fn is_eligible(sub_category_id: Option<u64>, eligible: &[u64]) -> bool {
    sub_category_id.is_some_and(|id| eligible.contains(&id))
}

/// Line total after the eligibility rate (a fraction, `0.1` for 10%).
pub fn eligibility_price(total: f64, rate: f64) -> f64 {
    round_cents(total * (1.0 - rate))
}
