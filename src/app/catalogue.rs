//! Catalogue page: search, price range, sort and pagination
//!
//! The filtered and sorted list is derived from the product snapshot and the
//! query, and recomputed only when one of them changes. Any change to the
//! query or the page size goes back to page 1.

use crate::core::catalogue::{
    CatalogueQuery, NumericRange, SortField, SortOrder, apply_query, price_stats,
};
use crate::core::discount::DiscountGrant;
use crate::core::entity::{FieldValue, Fields, Product};
use crate::core::error::{Error, Result};
use crate::core::slides::Pager;
use crate::core::source::{FetchState, ViewBranch, same_snapshot};
use std::sync::Arc;

#[derive(Debug)]
pub enum Message {
    Loaded(Result<Arc<[Product]>>),
    SearchChanged(String),
    RangeChanged(NumericRange),
    SortChanged(SortField, SortOrder),
    PerPageChanged(usize),
    PageChanged(usize),
    NextPage,
    PrevPage,
    GrantChanged(Option<DiscountGrant>),
    ProductChosen(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    None,
    /// Open a product page. `via_sub_category` decides eligibility pricing.
    OpenProduct {
        product_id: u64,
        via_sub_category: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct CatalogueSettings {
    pub page_sizes: Vec<usize>,
    /// Sub-category passed along while a wheel discount is running
    pub promo_sub_category: Option<u64>,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            page_sizes: vec![8, 16, 24, 32],
            promo_sub_category: Some(2),
        }
    }
}

/// A product together with its position in the snapshot
struct Indexed<'a> {
    index: usize,
    product: &'a Product,
}

impl Fields for Indexed<'_> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.product.field(name)
    }

    fn id(&self) -> u64 {
        self.product.id
    }
}

/// Memoized result of one (snapshot, query) pair
#[derive(Debug)]
struct Derived {
    snapshot: Arc<[Product]>,
    query: CatalogueQuery,
    /// Indices into `snapshot`, filtered and sorted
    indices: Vec<usize>,
}

pub struct CatalogueView {
    settings: CatalogueSettings,
    /// Restricts the page to one sub-category
    sub_category: Option<u64>,
    products: FetchState<Arc<[Product]>>,
    query: CatalogueQuery,
    pager: Pager,
    grant: Option<DiscountGrant>,
    derived: Option<Derived>,
    recomputations: usize,
}

impl CatalogueView {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no page size is configured or the
    /// first one is zero.
    pub fn new(settings: CatalogueSettings) -> Result<Self> {
        let first = settings
            .page_sizes
            .first()
            .copied()
            .ok_or_else(|| Error::invalid("no page sizes configured"))?;
        Ok(Self {
            pager: Pager::new(first)?,
            settings,
            sub_category: None,
            products: FetchState::Loading,
            query: CatalogueQuery::default(),
            grant: None,
            derived: None,
            recomputations: 0,
        })
    }

    /// Page listing only the products of `sub_category_id`
    ///
    /// # Errors
    ///
    /// See [`CatalogueView::new`].
    pub fn for_sub_category(settings: CatalogueSettings, sub_category_id: u64) -> Result<Self> {
        let mut view = Self::new(settings)?;
        view.sub_category = Some(sub_category_id);
        Ok(view)
    }

    pub fn query(&self) -> &CatalogueQuery {
        &self.query
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.settings.page_sizes
    }

    pub fn grant(&self) -> Option<&DiscountGrant> {
        self.grant.as_ref()
    }

    /// Times the derived list was rebuilt
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn branch(&self) -> ViewBranch<'_, Arc<[Product]>> {
        let empty = self.result_len() == 0;
        self.products.branch(|_| empty)
    }

    /// Number of products matching the query
    pub fn result_len(&self) -> usize {
        self.derived.as_ref().map_or(0, |d| d.indices.len())
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.result_len())
    }

    /// Every matching product, in display order
    pub fn results(&self) -> Vec<&Product> {
        self.derived
            .as_ref()
            .map(|d| d.indices.iter().map(|&i| &d.snapshot[i]).collect())
            .unwrap_or_default()
    }

    /// Products on the current page
    pub fn page_items(&self) -> Vec<&Product> {
        let Some(derived) = &self.derived else {
            return Vec::new();
        };
        self.pager
            .slice(&derived.indices)
            .iter()
            .map(|&i| &derived.snapshot[i])
            .collect()
    }

    /// Bounds for the price slider over the loaded products
    pub fn price_bounds(&self) -> (f64, f64) {
        price_stats(&self.scoped_products(), &self.query.range_field)
    }

    /// Catalogue price after the running wheel discount
    pub fn discounted_price(&self, product: &Product) -> Option<f64> {
        self.grant.map(|g| g.apply(product.price.value()))
    }

    fn scoped_products(&self) -> Vec<&Product> {
        let Some(all) = self.products.ready() else {
            return Vec::new();
        };
        all.iter()
            .filter(|p| self.sub_category.is_none() || p.sub_category_id == self.sub_category)
            .collect()
    }

    pub fn update(&mut self, message: Message) -> Outcome {
        match message {
            Message::Loaded(result) => {
                let unchanged = matches!(
                    (self.products.ready(), &result),
                    (Some(old), Ok(new)) if same_snapshot(old, new)
                );
                self.products = FetchState::from_result(result);
                if !unchanged {
                    self.pager.reset();
                }
            }
            Message::SearchChanged(search) => {
                self.query.search = search;
                self.pager.reset();
            }
            Message::RangeChanged(range) => {
                self.query.range = range;
                self.pager.reset();
            }
            Message::SortChanged(field, order) => {
                self.query = std::mem::take(&mut self.query).with_sort(field, order);
                self.pager.reset();
            }
            Message::PerPageChanged(per_page) => {
                if !self.settings.page_sizes.contains(&per_page) {
                    tracing::warn!("Ignoring unsupported page size {per_page}");
                } else if let Err(e) = self.pager.set_per_page(per_page) {
                    tracing::warn!("{e}");
                }
            }
            Message::PageChanged(page) => {
                let len = self.result_len();
                self.pager.go_to(page, len);
            }
            Message::NextPage => {
                let len = self.result_len();
                self.pager.go_to(self.pager.page() + 1, len);
            }
            Message::PrevPage => {
                let len = self.result_len();
                self.pager.go_to(self.pager.page().saturating_sub(1), len);
            }
            Message::GrantChanged(grant) => self.grant = grant,
            Message::ProductChosen(product_id) => {
                let product = self.results().into_iter().find(|p| p.id == product_id);
                if let Some(product) = product {
                    return Outcome::OpenProduct {
                        product_id: product.id,
                        via_sub_category: self
                            .grant
                            .map_or(self.sub_category, |_| self.settings.promo_sub_category),
                    };
                }
            }
        }
        self.refresh();
        Outcome::None
    }

    /// Rebuilds the derived list if the snapshot or the query changed.
    fn refresh(&mut self) {
        let Some(snapshot) = self.products.ready() else {
            self.derived = None;
            return;
        };
        if let Some(d) = &self.derived
            && same_snapshot(&d.snapshot, snapshot)
            && d.query == self.query
        {
            return;
        }

        let snapshot = Arc::clone(snapshot);
        let indices: Vec<usize> = {
            let scoped: Vec<Indexed<'_>> = snapshot
                .iter()
                .enumerate()
                .filter(|(_, p)| {
                    self.sub_category.is_none() || p.sub_category_id == self.sub_category
                })
                .map(|(index, product)| Indexed { index, product })
                .collect();
            apply_query(&scoped, &self.query)
                .into_iter()
                .map(|entry| entry.index)
                .collect()
        };
        self.recomputations += 1;
        tracing::debug!("Catalogue recomputed ({} results)", indices.len());
        self.derived = Some(Derived {
            snapshot,
            query: self.query.clone(),
            indices,
        });
        let len = self.result_len();
        let page = self.pager.page();
        self.pager.go_to(page, len);
    }
}
