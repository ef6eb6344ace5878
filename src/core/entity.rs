//! Storefront records as delivered by the backend
//!
//! Every record is immutable once fetched. Generic engines (filtering, sorting,
//! price statistics) read records through the [`Fields`] trait, so they work the
//! same for categories, products and anything else that can name its fields.
//!
//! # Numeric fields
//!
//! The backend is inconsistent about numbers: prices and counters arrive either
//! as JSON numbers or as strings (`"12.500"`). [`RawNumber`] accepts both and
//! [`parse_numeric`] treats anything unparseable as `0`.
//!
//! # Example
//!
//! ```
//! use storefront::core::entity::{Fields, FieldValue, Product, RawNumber};
//!
//! let product = Product::new(7, "Olive oil", RawNumber::Text("12.5".into()));
//! assert_eq!(product.price.value(), 12.5);
//! assert!(matches!(product.field("name"), Some(FieldValue::Text(_))));
//! ```

use crate::core::progress::Tier;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Parses a numeric field leniently.
///
/// Empty, malformed and non-finite inputs all become `0.0`.
pub fn parse_numeric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A number that may have been sent as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Numeric value, `0.0` when the raw text does not parse
    pub fn value(&self) -> f64 {
        match self {
            RawNumber::Number(n) if n.is_finite() => *n,
            RawNumber::Number(_) => 0.0,
            RawNumber::Text(s) => parse_numeric(s),
        }
    }
}

impl Default for RawNumber {
    fn default() -> Self {
        RawNumber::Number(0.0)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

/// A field read through [`Fields`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
}

impl FieldValue<'_> {
    /// Numeric view of the field; text is parsed leniently
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) if n.is_finite() => *n,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(s) => parse_numeric(s),
        }
    }

    /// Text view of the field
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// Named field access used by the filter/sort engine
pub trait Fields {
    /// Returns the named field, or `None` if the record has no such field
    /// (or it is absent on this record).
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    /// Stable identifier used for lookups
    fn id(&self) -> u64;
}

impl<T: Fields + ?Sized> Fields for &T {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }

    fn id(&self) -> u64 {
        (**self).id()
    }
}

/// Product category or subcategory
///
/// Root categories carry `parent_id == 0`; subcategories point at their root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub parent_id: u64,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}

impl Fields for Category {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "title" | "name" => Some(FieldValue::Text(Cow::Borrowed(&self.title))),
            "parent_id" => Some(FieldValue::Number(self.parent_id as f64)),
            _ => None,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }
}

/// Root categories shown in the carousel, in source order.
///
/// `hidden` lists root ids the storefront never shows (the catch-all root).
pub fn root_categories<'a>(categories: &'a [Category], hidden: &[u64]) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| c.is_root() && !hidden.contains(&c.id))
        .collect()
}

/// Subcategories of `parent_id`, in source order.
pub fn subcategories_of(categories: &[Category], parent_id: u64) -> Vec<&Category> {
    categories
        .iter()
        .filter(|c| parent_id != 0 && c.parent_id == parent_id)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: RawNumber,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub sub_category_id: Option<u64>,
}

impl Product {
    pub fn new(id: u64, name: &str, price: RawNumber) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            description: None,
            price,
            img: None,
            sub_category_id: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl Fields for Product {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "name" => self
                .name
                .as_deref()
                .map(|n| FieldValue::Text(Cow::Borrowed(n))),
            "description" => self
                .description
                .as_deref()
                .map(|d| FieldValue::Text(Cow::Borrowed(d))),
            "price" => Some(FieldValue::Number(self.price.value())),
            _ => None,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }
}

/// Kind of promotional deal
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DealKind {
    /// Cumulative spend against three goals
    Spend,
    /// Purchases of a given brand against three goals
    Brand,
    /// Birthday-month purchases against three goals
    Birthday,
    /// Number of qualifying visits against a single target
    Frequency,
}

impl DealKind {
    pub const fn label(self) -> &'static str {
        match self {
            DealKind::Spend => "Spend",
            DealKind::Brand => "Brand",
            DealKind::Birthday => "Birthday",
            DealKind::Frequency => "Frequency",
        }
    }
}

/// What a deal counts towards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DealGoal {
    /// Ascending thresholds, each with its reward
    Tiered { tiers: Vec<Tier<f64>> },
    /// A visit target; `gain` is paid once the target is met by visits of at
    /// least `min_basket` each
    Frequency {
        target: RawNumber,
        gain: f64,
        #[serde(default)]
        min_basket: f64,
    },
}

/// A client's progress on one deal offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: u64,
    pub offer_id: u64,
    pub client_id: u64,
    pub kind: DealKind,
    #[serde(default)]
    pub counter: RawNumber,
    pub goal: DealGoal,
    /// Deal period; a new period is a new deal instance
    #[serde(default)]
    pub period: u32,
}

impl DealRecord {
    /// Finds the record of `client_id` for `offer_id`; `None` when the
    /// client has no progress on that offer.
    pub fn find(deals: &[DealRecord], client_id: u64, offer_id: u64) -> Option<&DealRecord> {
        deals
            .iter()
            .find(|d| d.client_id == client_id && d.offer_id == offer_id)
    }
}

/// Signed-in customer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub client_id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub wallet_balance: RawNumber,
}

/// Looks up a record by identifier; absence is `None`, not an error.
pub fn find_by_id<T: Fields>(items: &[T], id: u64) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}
