//! Filtering and sorting of entity lists
//!
//! The catalogue narrows a product list with a case-insensitive substring
//! query over one text field and an inclusive range over one numeric field,
//! then orders the survivors by a text or numeric field. Everything is a pure
//! function of (source list, [`CatalogueQuery`]); the same inputs always give
//! the same output.
//!
//! Sorting is stable: records with equal keys keep their source order in both
//! directions.

use crate::core::entity::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// How a sort field is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Case-insensitive lexicographic
    Text,
    /// Numeric; unparseable values count as zero
    Numeric,
}

/// Product fields the catalogue can sort by
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Price,
    Id,
}

impl SortField {
    pub const fn field_name(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Id => "id",
        }
    }

    pub const fn kind(self) -> SortKind {
        match self {
            SortField::Name => SortKind::Text,
            SortField::Price | SortField::Id => SortKind::Numeric,
        }
    }
}

/// Inclusive numeric range; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub const UNBOUNDED: NumericRange = NumericRange {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for NumericRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Full set of catalogue parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueQuery {
    /// Substring searched for, case-insensitively
    pub search: String,
    /// Text field the search applies to
    pub search_field: String,
    /// Range applied to `range_field`
    pub range: NumericRange,
    /// Numeric field the range applies to
    pub range_field: String,
    pub sort_field: String,
    pub sort_kind: SortKind,
    pub sort_order: SortOrder,
}

impl Default for CatalogueQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            search_field: "name".to_string(),
            range: NumericRange::UNBOUNDED,
            range_field: "price".to_string(),
            sort_field: SortField::Name.field_name().to_string(),
            sort_kind: SortField::Name.kind(),
            sort_order: SortOrder::Asc,
        }
    }
}

impl CatalogueQuery {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field.field_name().to_string();
        self.sort_kind = field.kind();
        self.sort_order = order;
        self
    }
}

/// Whether `item` contains `needle_lowercase` in `field`, ignoring case.
///
/// An empty needle matches everything, including records without the field.
pub fn matches_search<T: Fields>(item: &T, field: &str, needle_lowercase: &str) -> bool {
    if needle_lowercase.is_empty() {
        return true;
    }
    item.field(field)
        .is_some_and(|v| v.as_text().to_lowercase().contains(needle_lowercase))
}

/// Numeric value of `field`, zero when missing or unparseable
pub fn numeric_value<T: Fields>(item: &T, field: &str) -> f64 {
    item.field(field).map_or(0.0, |v| v.as_number())
}

/// Keeps the records matching both the search and the range, in source order.
pub fn filter_entities<'a, T: Fields>(items: &'a [T], query: &CatalogueQuery) -> Vec<&'a T> {
    let needle = query.search.to_lowercase();
    items
        .iter()
        .filter(|item| {
            matches_search(*item, &query.search_field, &needle)
                && query.range.contains(numeric_value(*item, &query.range_field))
        })
        .collect()
}

fn text_key<T: Fields>(item: &T, field: &str) -> String {
    item.field(field)
        .map(|v| match v {
            FieldValue::Text(s) => s.to_lowercase(),
            FieldValue::Number(n) => n.to_string(),
        })
        .unwrap_or_default()
}

/// Stable sort of `items` by `field`.
///
/// Ties keep their relative order in both directions.
pub fn sort_entities<T: Fields>(items: &mut [&T], field: &str, kind: SortKind, order: SortOrder) {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    match kind {
        SortKind::Text => {
            // Keys computed once per record rather than once per comparison
            let mut keyed: Vec<(String, &T)> =
                items.iter().map(|item| (text_key(*item, field), *item)).collect();
            keyed.sort_by(|a, b| directed(a.0.cmp(&b.0)));
            for (slot, (_, item)) in items.iter_mut().zip(keyed) {
                *slot = item;
            }
        }
        SortKind::Numeric => {
            items.sort_by(|a, b| {
                directed(numeric_value(*a, field).total_cmp(&numeric_value(*b, field)))
            });
        }
    }
}

/// Filter then sort: the full catalogue pipeline.
pub fn apply_query<'a, T: Fields>(items: &'a [T], query: &CatalogueQuery) -> Vec<&'a T> {
    let mut result = filter_entities(items, query);
    sort_entities(
        &mut result,
        &query.sort_field,
        query.sort_kind,
        query.sort_order,
    );
    tracing::debug!(
        total = items.len(),
        matched = result.len(),
        search = %query.search,
        "Catalogue query applied"
    );
    result
}

/// Price bounds used to seed the range slider.
///
/// Returns `(floor(min), ceil(max))` over `field`, or `(0, 100)` for an
/// empty list.
pub fn price_stats<T: Fields>(items: &[T], field: &str) -> (f64, f64) {
    if items.is_empty() {
        return (0.0, 100.0);
    }
    let (min, max) = items
        .iter()
        .map(|item| numeric_value(item, field))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    (min.floor(), max.ceil())
}
