//! Shared test utilities for core module tests
//!
//! Builders for small, known catalogues so tests do not repeat record
//! literals. This module is only compiled in test mode.

use crate::core::entity::{
    Category, DealGoal, DealKind, DealRecord, Product, RawNumber, UserProfile,
};
use crate::core::progress::Tier;
use crate::core::source::{CatalogDocument, FixtureSource};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed instant used wherever a test needs "now"
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

pub fn category(id: u64, title: &str, parent_id: u64) -> Category {
    Category {
        id,
        title: title.to_string(),
        picture: None,
        parent_id,
    }
}

/// The catch-all root (1), seven visible roots (2..=8) and two subcategories
/// under root 2.
pub fn sample_categories() -> Vec<Category> {
    let mut categories = vec![category(1, "All", 0)];
    for (i, title) in ["Grocery", "Drinks", "Dairy", "Bakery", "Hygiene", "Home", "Baby"]
        .iter()
        .enumerate()
    {
        categories.push(category(i as u64 + 2, title, 0));
    }
    categories.push(category(20, "Juice", 2));
    categories.push(category(21, "Water", 2));
    categories
}

pub fn product(id: u64, name: &str, price: f64, sub_category_id: u64) -> Product {
    Product {
        sub_category_id: Some(sub_category_id),
        ..Product::new(id, name, RawNumber::Number(price))
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        product(1, "Apple juice", 4.5, 20),
        product(2, "orange juice", 5.2, 20),
        product(3, "Mineral water", 0.9, 21),
        product(4, "Sparkling water", 1.4, 21),
        Product {
            price: RawNumber::Text("not a price".into()),
            ..product(5, "Lemonade", 0.0, 20)
        },
    ]
}

/// Three-tier spend deal: 5 -> 10, 10 -> 25, 20 -> 50
pub fn tiered_deal(id: u64, client_id: u64, counter: f64) -> DealRecord {
    DealRecord {
        id,
        offer_id: id,
        client_id,
        kind: DealKind::Spend,
        counter: counter.into(),
        goal: DealGoal::Tiered {
            tiers: vec![
                Tier::new(5.0, 10.0),
                Tier::new(10.0, 25.0),
                Tier::new(20.0, 50.0),
            ],
        },
        period: 1,
    }
}

pub fn frequency_deal(id: u64, client_id: u64, counter: f64, target: f64) -> DealRecord {
    DealRecord {
        id,
        offer_id: id,
        client_id,
        kind: DealKind::Frequency,
        counter: counter.into(),
        goal: DealGoal::Frequency {
            target: target.into(),
            gain: 15.0,
            min_basket: 30.0,
        },
        period: 1,
    }
}

pub fn sample_profile() -> UserProfile {
    UserProfile {
        client_id: 7,
        full_name: "Sami Ben Ali".into(),
        email: "sami@example.com".into(),
        address: "12 Rue de Marseille, Tunis".into(),
        image: None,
        phone: "21234567".into(),
        wallet_balance: 12.5.into(),
    }
}

/// A source serving all of the samples above
pub fn sample_source() -> FixtureSource {
    FixtureSource::new(CatalogDocument {
        categories: sample_categories(),
        products: sample_products(),
        deals: vec![tiered_deal(1, 7, 12.0), frequency_deal(2, 7, 3.0, 5.0)],
        profile: Some(sample_profile()),
    })
}
