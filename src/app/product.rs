//! Product page: quantity, eligibility pricing, favorites and add to cart
//!
//! A product reached through an eligible sub-category gets the eligibility
//! rate off its line total.

use crate::core::cart::{CartItem, PriceBreakdown, add_to_cart, clamp_quantity, parse_quantity};
use crate::core::discount::is_eligible;
use crate::core::entity::{Product, find_by_id};
use crate::core::error::{Error, Result};
use crate::core::source::{FetchState, ViewBranch};
use crate::core::store::{self, KeyValueStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

#[derive(Debug)]
pub enum Message {
    Loaded(Result<Arc<[Product]>>),
    Increment,
    Decrement,
    QuantityInput(String),
    ToggleFavorite,
    AddToCart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    FavoriteChanged(bool),
    AddedToCart { item_count: u32, total: f64 },
}

#[derive(Debug, Clone)]
pub struct ProductSettings {
    pub eligible_sub_categories: Vec<u64>,
    /// Fraction off the line total, `0.1` for 10%
    pub eligibility_rate: f64,
    pub max_quantity: u32,
    pub cart_lifetime: Duration,
}

impl Default for ProductSettings {
    fn default() -> Self {
        Self {
            eligible_sub_categories: vec![2, 3],
            eligibility_rate: 0.1,
            max_quantity: 99,
            cart_lifetime: Duration::days(7),
        }
    }
}

#[derive(Debug)]
pub struct ProductDetail {
    product_id: u64,
    via_sub_category: Option<u64>,
    settings: ProductSettings,
    product: FetchState<Product>,
    quantity: u32,
    favorite: bool,
    notice: Option<String>,
}

impl ProductDetail {
    pub fn new<S: KeyValueStore + ?Sized>(
        product_id: u64,
        via_sub_category: Option<u64>,
        settings: ProductSettings,
        store: &S,
    ) -> Self {
        Self {
            product_id,
            via_sub_category,
            settings,
            product: FetchState::Loading,
            quantity: 1,
            favorite: store::favorites(store).contains(&product_id),
            notice: None,
        }
    }

    pub fn branch(&self) -> ViewBranch<'_, Product> {
        self.product.branch(|_| false)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// Last user-facing notice ("Added to cart" or a failure)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_eligible(&self) -> bool {
        is_eligible(self.via_sub_category, &self.settings.eligible_sub_categories)
    }

    pub fn prices(&self) -> Option<PriceBreakdown> {
        let product = self.product.ready()?;
        Some(PriceBreakdown::new(
            product.price.value(),
            self.quantity,
            self.is_eligible(),
            self.settings.eligibility_rate,
        ))
    }

    fn set_quantity(&mut self, requested: i64) {
        self.quantity = clamp_quantity(requested, self.settings.max_quantity);
    }

    pub fn update<S: KeyValueStore + ?Sized>(
        &mut self,
        message: Message,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> Outcome {
        match message {
            Message::Loaded(result) => {
                let id = self.product_id;
                self.product = FetchState::from_result(result.and_then(|products| {
                    find_by_id(&products, id)
                        .cloned()
                        .ok_or_else(|| Error::NotFound(format!("product {id}")))
                }));
                self.quantity = 1;
            }
            Message::Increment => self.set_quantity(i64::from(self.quantity) + 1),
            Message::Decrement => self.set_quantity(i64::from(self.quantity) - 1),
            Message::QuantityInput(input) => {
                self.quantity = parse_quantity(&input, self.settings.max_quantity);
            }
            Message::ToggleFavorite => match store::toggle_favorite(store, self.product_id) {
                Ok(favorite) => {
                    self.favorite = favorite;
                    return Outcome::FavoriteChanged(favorite);
                }
                Err(e) => {
                    tracing::warn!("Failed to update favorites: {e}");
                    self.notice = Some("Could not update favorites".to_string());
                }
            },
            Message::AddToCart => {
                let (Some(product), Some(prices)) = (self.product.ready(), self.prices()) else {
                    return Outcome::None;
                };
                let item = CartItem::from_product(product, &prices, now);
                match add_to_cart(
                    store,
                    item,
                    now,
                    self.settings.cart_lifetime,
                    self.settings.max_quantity,
                ) {
                    Ok(cart) => {
                        self.notice = Some("Added to cart".to_string());
                        return Outcome::AddedToCart {
                            item_count: cart.item_count(),
                            total: cart.total(),
                        };
                    }
                    Err(e) => {
                        tracing::warn!("Failed to add product {} to cart: {e}", self.product_id);
                        self.notice = Some("Could not add to cart".to_string());
                    }
                }
            }
        }
        Outcome::None
    }
}
