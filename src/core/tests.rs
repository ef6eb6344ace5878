#[cfg(test)]
mod tests_impl {
    use crate::core::catalogue::{CatalogueQuery, NumericRange, SortField, SortOrder, apply_query};
    use crate::core::entity::root_categories;
    use crate::core::progress::deal_progress;
    use crate::core::slides::{Pager, SlideCursor, group_slides};
    use crate::core::source::{DataSource, FetchState};
    use crate::core::test_helpers::{sample_categories, sample_products, sample_source};

    #[test]
    fn test_filter_sort_then_paginate() {
        let products = sample_products();
        let query = CatalogueQuery::default()
            .with_search("JUICE")
            .with_sort(SortField::Price, SortOrder::Desc);
        let visible = apply_query(&products, &query);
        let ids: Vec<u64> = visible.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let pager = Pager::new(1).unwrap();
        assert_eq!(pager.total_pages(visible.len()), 2);
        assert_eq!(pager.slice(&visible).len(), 1);
    }

    #[test]
    fn test_unparseable_price_sorts_as_zero() {
        let products = sample_products();
        let query = CatalogueQuery::default().with_sort(SortField::Price, SortOrder::Asc);
        let visible = apply_query(&products, &query);
        assert_eq!(visible[0].id, 5);

        let ranged = CatalogueQuery::default().with_range(NumericRange::new(1.0, 5.0));
        assert!(apply_query(&products, &ranged).iter().all(|p| p.id != 5));
    }

    #[test]
    fn test_carousel_slides_over_visible_roots() {
        let categories = sample_categories();
        let roots = root_categories(&categories, &[1]);
        assert_eq!(roots.len(), 7);

        let slides = group_slides(&roots, 3).unwrap();
        let sizes: Vec<usize> = slides.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        let mut cursor = SlideCursor::new(slides.len());
        cursor.go_to(2);
        cursor.next();
        assert_eq!(cursor.index(), 0);
    }

    #[tokio::test]
    async fn test_deals_through_source() {
        let source = sample_source();
        let state = FetchState::from_result(source.deals(7).await);
        let deals = state.ready().unwrap();
        let progress: Vec<_> = deals.iter().map(|d| deal_progress(d).unwrap()).collect();
        assert_eq!(progress[0].reward, Some(25.0));
        assert_eq!(progress[1].percentage, 60.0);
    }
}
