//! Slide grouping, carousel cursor and page cursor
//!
//! Carousels and the catalogue both show a flat ordered list a fixed number of
//! items at a time. Slides are re-derived from the source list every time the
//! list or the group size changes; nothing here keeps the previous grouping.
//!
//! ```
//! use storefront::core::slides::{group_slides, SlideCursor};
//!
//! let items: Vec<u32> = (1..=7).collect();
//! let slides = group_slides(&items, 3).unwrap();
//! assert_eq!(slides.iter().map(|s| s.len()).collect::<Vec<_>>(), vec![3, 3, 1]);
//!
//! let mut cursor = SlideCursor::new(slides.len());
//! cursor.go_to(2);
//! cursor.next();
//! assert_eq!(cursor.index(), 0);
//! ```

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Validates a signed group size coming from user input or configuration.
pub fn slide_size(raw: i64) -> Result<usize> {
    if raw <= 0 {
        return Err(Error::invalid(format!(
            "group size must be positive, got {raw}"
        )));
    }
    usize::try_from(raw).map_err(|_| Error::invalid(format!("group size {raw} is too large")))
}

/// Partitions `items` into consecutive slides of `per_slide` items.
///
/// Every slide has exactly `per_slide` items except the last, which holds the
/// remainder. An empty list yields no slides.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when `per_slide` is zero.
pub fn group_slides<T>(items: &[T], per_slide: usize) -> Result<Vec<&[T]>> {
    if per_slide == 0 {
        return Err(Error::invalid("group size must be positive, got 0"));
    }
    Ok(items.chunks(per_slide).collect())
}

/// Number of slides `len` items produce at `per_slide` per slide.
pub fn slide_count(len: usize, per_slide: usize) -> usize {
    len.div_ceil(per_slide.max(1))
}

/// Circular position within a carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideCursor {
    index: usize,
    len: usize,
}

impl SlideCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advances one slide, wrapping from the last slide to the first.
    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    /// Steps back one slide, wrapping from the first slide to the last.
    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = if self.index == 0 {
                self.len - 1
            } else {
                self.index - 1
            };
        }
    }

    /// Jumps to `index`, clamped to the last slide.
    pub fn go_to(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }

    /// Adopts a new slide count after a regrouping.
    ///
    /// The index is clamped so it always points at an existing slide.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        self.index = self.index.min(len.saturating_sub(1));
    }
}

/// One-based page cursor over a paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    per_page: usize,
}

impl Pager {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `per_page` is zero.
    pub fn new(per_page: usize) -> Result<Self> {
        if per_page == 0 {
            return Err(Error::invalid("page size must be positive, got 0"));
        }
        Ok(Self { page: 1, per_page })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        slide_count(len, self.per_page)
    }

    /// Changes the page size and returns to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `per_page` is zero.
    pub fn set_per_page(&mut self, per_page: usize) -> Result<()> {
        if per_page == 0 {
            return Err(Error::invalid("page size must be positive, got 0"));
        }
        self.per_page = per_page;
        self.reset();
        Ok(())
    }

    /// Back to page 1
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Moves to `page`, clamped into `1..=total_pages(len)`.
    pub fn go_to(&mut self, page: usize, len: usize) {
        self.page = page.clamp(1, self.total_pages(len).max(1));
    }

    /// Half-open `start..end` range of the current page within a list of `len`
    pub fn window(&self, len: usize) -> (usize, usize) {
        let start = self.page.saturating_sub(1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page).min(len);
        (start.min(len), end)
    }

    /// The current page of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.window(items.len());
        &items[start..end]
    }
}

/// Width rule: viewports narrower than `max_width` show `items` per slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub max_width: u32,
    pub items: usize,
}

/// Responsive items-per-slide table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// Rules checked in ascending `max_width` order
    pub rules: Vec<Breakpoint>,
    /// Items per slide when no rule matches
    pub default_items: usize,
}

impl Breakpoints {
    /// Root-category carousel layout
    pub fn categories() -> Self {
        Self {
            rules: vec![
                Breakpoint { max_width: 720, items: 1 },
                Breakpoint { max_width: 1024, items: 3 },
            ],
            default_items: 6,
        }
    }

    /// Subcategory carousel layout
    pub fn subcategories() -> Self {
        Self {
            rules: vec![
                Breakpoint { max_width: 640, items: 1 },
                Breakpoint { max_width: 1024, items: 3 },
            ],
            default_items: 4,
        }
    }

    /// Items per slide for a viewport `width` pixels wide.
    pub fn items_for(&self, width: u32) -> usize {
        self.rules
            .iter()
            .find(|rule| width < rule.max_width)
            .map_or(self.default_items, |rule| rule.items)
    }

    /// Rejects tables that could produce a zero group size.
    pub fn validate(&self) -> Result<()> {
        if self.default_items == 0 || self.rules.iter().any(|r| r.items == 0) {
            return Err(Error::invalid("breakpoint item counts must be positive"));
        }
        if self.rules.windows(2).any(|w| w[0].max_width >= w[1].max_width) {
            return Err(Error::invalid("breakpoints must be in ascending width order"));
        }
        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_slides_partition_source(
            items in proptest::collection::vec(any::<u16>(), 1..200),
            per_slide in 1usize..20
        ) {
            let slides = group_slides(&items, per_slide).unwrap();
            let flattened: Vec<u16> = slides.iter().flat_map(|s| s.iter().copied()).collect();
            prop_assert_eq!(&flattened, &items);

            let (last, rest) = slides.split_last().unwrap();
            prop_assert!(rest.iter().all(|s| s.len() == per_slide));
            prop_assert!(!last.is_empty() && last.len() <= per_slide);
            prop_assert_eq!(slides.len(), slide_count(items.len(), per_slide));
        }

        #[test]
        fn test_non_positive_size_always_rejected(raw in i64::MIN..=0) {
            prop_assert!(matches!(slide_size(raw), Err(Error::InvalidArgument(_))));
        }

        #[test]
        fn test_next_then_prev_is_identity(len in 1usize..50, start in 0usize..50) {
            let mut cursor = SlideCursor::new(len);
            cursor.go_to(start);
            let before = cursor.index();
            cursor.next();
            cursor.prev();
            prop_assert_eq!(cursor.index(), before);
        }

        #[test]
        fn test_pages_cover_list(len in 0usize..300, per_page in 1usize..40) {
            let mut pager = Pager::new(per_page).unwrap();
            let items: Vec<usize> = (0..len).collect();
            let mut seen = Vec::new();
            for page in 1..=pager.total_pages(len) {
                pager.go_to(page, len);
                seen.extend_from_slice(pager.slice(&items));
            }
            prop_assert_eq!(seen, items);
        }
    }
}
