//! Shopping cart
//!
//! The cart lives in the local store under [`CART_KEY`] with a time-to-live
//! that restarts on every write. Adding a product already in the cart merges
//! into its line.

use crate::core::discount::{eligibility_price, round_cents};
use crate::core::entity::Product;
use crate::core::error::{Error, Result};
use crate::core::store::{self, CART_KEY, KeyValueStore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Clamps a requested quantity into `1..=max`.
pub fn clamp_quantity(requested: i64, max: u32) -> u32 {
    let max = max.max(1);
    u32::try_from(requested.clamp(1, i64::from(max))).unwrap_or(1)
}

/// Parses a typed quantity; anything unparseable becomes 1.
pub fn parse_quantity(input: &str, max: u32) -> u32 {
    clamp_quantity(input.trim().parse().unwrap_or(1), max)
}

/// Prices shown on the product page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub unit_price: f64,
    pub quantity: u32,
    /// `unit_price * quantity`, rounded to cents
    pub total: f64,
    /// Total after the eligibility rate; equal to `total` when not eligible
    pub discounted: f64,
    pub eligible: bool,
}

impl PriceBreakdown {
    pub fn new(unit_price: f64, quantity: u32, eligible: bool, rate: f64) -> Self {
        let total = round_cents(unit_price * f64::from(quantity));
        let discounted = if eligible {
            eligibility_price(total, rate)
        } else {
            total
        };
        Self {
            unit_price,
            quantity,
            total,
            discounted,
            eligible,
        }
    }

    pub fn savings(&self) -> f64 {
        round_cents(self.total - self.discounted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: f64,
    /// Unit price after discount
    pub final_price: f64,
    pub quantity: u32,
    pub total: f64,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub has_discount: bool,
}

impl CartItem {
    pub fn from_product(product: &Product, prices: &PriceBreakdown, now: DateTime<Utc>) -> Self {
        Self {
            id: product.id,
            name: product.display_name().to_string(),
            image: product.img.clone(),
            unit_price: prices.unit_price,
            final_price: prices.discounted / f64::from(prices.quantity.max(1)),
            quantity: prices.quantity,
            total: prices.discounted,
            added_at: now,
            has_discount: prices.eligible,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Loads the cart; an expired or missing cart is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if removing an expired cart fails.
    pub fn load<S: KeyValueStore + ?Sized>(store: &mut S, now: DateTime<Utc>) -> Result<Self> {
        Ok(store::get_live::<Cart, S>(store, CART_KEY, now)?
            .map(|entry| entry.value)
            .unwrap_or_default())
    }

    /// Writes the cart and restarts its time-to-live.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<()> {
        store::set_expiring(store, CART_KEY, self, store::expiry_after(now, lifetime)?)?;
        Ok(())
    }

    /// Adds a line, merging with an existing line for the same product. Line
    /// quantities are capped at `max_quantity`; units over the cap are
    /// dropped and not charged. A line's total is always its quantity at the
    /// latest unit price.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero quantity.
    pub fn add(&mut self, item: CartItem, max_quantity: u32) -> Result<()> {
        if item.quantity == 0 {
            return Err(Error::invalid("Invalid quantity"));
        }
        let max_quantity = max_quantity.max(1);
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            let merged = line.quantity.saturating_add(item.quantity).min(max_quantity);
            if merged > line.quantity {
                line.unit_price = item.unit_price;
                line.final_price = item.final_price;
                line.has_discount = item.has_discount;
            }
            line.quantity = merged;
            line.total = round_cents(line.final_price * f64::from(merged));
        } else {
            let mut item = item;
            if item.quantity > max_quantity {
                item.quantity = max_quantity;
                item.total = round_cents(item.final_price * f64::from(max_quantity));
            }
            self.items.push(item);
        }
        Ok(())
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        round_cents(self.items.iter().map(|i| i.total).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Loads the cart, adds `item`, saves it back and returns the new cart.
///
/// # Errors
///
/// Returns an error for a zero quantity or a store failure.
pub fn add_to_cart<S: KeyValueStore + ?Sized>(
    store: &mut S,
    item: CartItem,
    now: DateTime<Utc>,
    lifetime: Duration,
    max_quantity: u32,
) -> Result<Cart> {
    let mut cart = Cart::load(store, now)?;
    let quantity = item.quantity;
    let id = item.id;
    cart.add(item, max_quantity)?;
    cart.save(store, now, lifetime)?;
    tracing::info!("Added {quantity} x product {id} to cart");
    Ok(cart)
}
