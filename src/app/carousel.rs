//! Category browser: root carousel and the subcategory panel
//!
//! Clicking a root category hides the panel and reveals the new
//! subcategories after a short debounce, so rapid clicks settle on the last
//! one. While the panel is open its slides advance on a fixed interval,
//! paused while the pointer is over it. Any manual move restarts the
//! interval.

use crate::core::entity::{Category, root_categories, subcategories_of};
use crate::core::error::Result;
use crate::core::scheduler::{Fired, Scheduler, TimerSlot};
use crate::core::slides::{Breakpoints, SlideCursor, slide_count};
use crate::core::source::{FetchState, ViewBranch};
use std::sync::Arc;
use std::time::Duration;

/// Timer purposes of the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselTimer {
    AutoAdvance,
    Reveal(u64),
}

#[derive(Debug)]
pub enum Message {
    Loaded(Result<Arc<[Category]>>),
    Resized(u32),
    Next,
    Prev,
    GoTo(usize),
    CategoryClicked(u64),
    ClosePanel,
    SubNext,
    SubPrev,
    SubGoTo(usize),
    PointerEntered,
    PointerLeft,
    SubcategoryChosen(u64),
    Timer(Fired<CarouselTimer>),
}

/// What the caller should do after an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    None,
    /// Show the products of a subcategory
    OpenProducts { sub_category_id: u64, title: String },
}

/// Settings taken from the app configuration
#[derive(Debug, Clone)]
pub struct CarouselSettings {
    pub root_breakpoints: Breakpoints,
    pub sub_breakpoints: Breakpoints,
    pub hidden_roots: Vec<u64>,
    pub interval: Duration,
    pub debounce: Duration,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            root_breakpoints: Breakpoints::categories(),
            sub_breakpoints: Breakpoints::subcategories(),
            hidden_roots: vec![1],
            interval: Duration::from_millis(3000),
            debounce: Duration::from_millis(300),
        }
    }
}

pub struct CategoryBrowser {
    settings: CarouselSettings,
    categories: FetchState<Arc<[Category]>>,
    width: u32,
    cursor: SlideCursor,
    /// Root whose subcategories are shown
    open: Option<u64>,
    sub_cursor: SlideCursor,
    hovering: bool,
    auto_advance: TimerSlot,
    reveal: TimerSlot,
}

impl CategoryBrowser {
    pub fn new(settings: CarouselSettings, width: u32) -> Self {
        Self {
            settings,
            categories: FetchState::Loading,
            width,
            cursor: SlideCursor::new(0),
            open: None,
            sub_cursor: SlideCursor::new(0),
            hovering: false,
            auto_advance: TimerSlot::new(),
            reveal: TimerSlot::new(),
        }
    }

    pub fn branch(&self) -> ViewBranch<'_, Arc<[Category]>> {
        let hidden = &self.settings.hidden_roots;
        self.categories
            .branch(|all| root_categories(all, hidden).is_empty())
    }

    pub fn per_slide(&self) -> usize {
        self.settings.root_breakpoints.items_for(self.width).max(1)
    }

    pub fn sub_per_slide(&self) -> usize {
        self.settings.sub_breakpoints.items_for(self.width).max(1)
    }

    fn all(&self) -> &[Category] {
        self.categories.ready().map(|all| &all[..]).unwrap_or(&[])
    }

    /// Visible root categories, in source order
    pub fn roots(&self) -> Vec<&Category> {
        root_categories(self.all(), &self.settings.hidden_roots)
    }

    pub fn cursor(&self) -> &SlideCursor {
        &self.cursor
    }

    /// Root categories on the current slide
    pub fn current_slide(&self) -> Vec<&Category> {
        window(self.roots(), self.cursor.index(), self.per_slide())
    }

    pub fn open_category(&self) -> Option<&Category> {
        let id = self.open?;
        self.all().iter().find(|c| c.id == id)
    }

    pub fn subcategories(&self) -> Vec<&Category> {
        self.open
            .map(|id| subcategories_of(self.all(), id))
            .unwrap_or_default()
    }

    pub fn sub_cursor(&self) -> &SlideCursor {
        &self.sub_cursor
    }

    /// Subcategories on the current panel slide
    pub fn current_sub_slide(&self) -> Vec<&Category> {
        window(
            self.subcategories(),
            self.sub_cursor.index(),
            self.sub_per_slide(),
        )
    }

    /// Panel hidden while a reveal is pending
    pub fn is_panel_visible(&self) -> bool {
        self.open.is_some() && !self.reveal.is_pending()
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto_advance.is_pending()
    }

    pub fn update(
        &mut self,
        message: Message,
        scheduler: &mut dyn Scheduler<CarouselTimer>,
    ) -> Outcome {
        match message {
            Message::Loaded(result) => {
                self.categories = FetchState::from_result(result);
                self.open = None;
                self.reveal.cancel(scheduler);
                self.auto_advance.cancel(scheduler);
                self.regroup();
                self.cursor.go_to(0);
            }
            Message::Resized(width) => {
                self.width = width;
                self.regroup();
                self.restart_auto_advance(scheduler);
            }
            Message::Next => self.cursor.next(),
            Message::Prev => self.cursor.prev(),
            Message::GoTo(index) => self.cursor.go_to(index),
            Message::CategoryClicked(id) => {
                tracing::debug!("Revealing subcategories of {id}");
                self.auto_advance.cancel(scheduler);
                self.reveal
                    .start(scheduler, self.settings.debounce, CarouselTimer::Reveal(id));
            }
            Message::ClosePanel => {
                self.open = None;
                self.reveal.cancel(scheduler);
                self.auto_advance.cancel(scheduler);
            }
            Message::SubNext => {
                self.sub_cursor.next();
                self.restart_auto_advance(scheduler);
            }
            Message::SubPrev => {
                self.sub_cursor.prev();
                self.restart_auto_advance(scheduler);
            }
            Message::SubGoTo(index) => {
                self.sub_cursor.go_to(index);
                self.restart_auto_advance(scheduler);
            }
            Message::PointerEntered => {
                self.hovering = true;
                self.auto_advance.cancel(scheduler);
            }
            Message::PointerLeft => {
                self.hovering = false;
                self.restart_auto_advance(scheduler);
            }
            Message::SubcategoryChosen(id) => {
                if let Some(sub) = self.subcategories().into_iter().find(|c| c.id == id) {
                    return Outcome::OpenProducts {
                        sub_category_id: sub.id,
                        title: sub.title.clone(),
                    };
                }
            }
            Message::Timer(fired) => self.on_timer(fired, scheduler),
        }
        Outcome::None
    }

    fn on_timer(&mut self, fired: Fired<CarouselTimer>, scheduler: &mut dyn Scheduler<CarouselTimer>) {
        match fired.message {
            CarouselTimer::Reveal(id) => {
                if !self.reveal.accept(fired.handle) {
                    return;
                }
                self.open = Some(id);
                self.sub_cursor = SlideCursor::new(self.sub_slide_count());
                self.restart_auto_advance(scheduler);
            }
            CarouselTimer::AutoAdvance => {
                if !self.auto_advance.accept(fired.handle) {
                    return;
                }
                self.sub_cursor.next();
                self.restart_auto_advance(scheduler);
            }
        }
    }

    fn sub_slide_count(&self) -> usize {
        slide_count(self.subcategories().len(), self.sub_per_slide())
    }

    /// Re-derives slide counts after the data or the width changed.
    fn regroup(&mut self) {
        let roots = slide_count(self.roots().len(), self.per_slide());
        self.cursor.resize(roots);
        let subs = self.sub_slide_count();
        self.sub_cursor.resize(subs);
    }

    /// Starts a fresh interval when the panel has something to rotate and
    /// nobody is hovering it; otherwise makes sure none is pending.
    fn restart_auto_advance(&mut self, scheduler: &mut dyn Scheduler<CarouselTimer>) {
        let should_run = self.open.is_some()
            && !self.reveal.is_pending()
            && !self.hovering
            && self.sub_cursor.len() > 1;
        if should_run {
            self.auto_advance
                .start(scheduler, self.settings.interval, CarouselTimer::AutoAdvance);
        } else {
            self.auto_advance.cancel(scheduler);
        }
    }
}

fn window<'a>(items: Vec<&'a Category>, index: usize, per_slide: usize) -> Vec<&'a Category> {
    items.into_iter().skip(index * per_slide).take(per_slide).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualScheduler;
    use crate::core::test_helpers::{category, sample_categories};

    const MS: Duration = Duration::from_millis(1);

    /// Root 2 gets six subcategories so the panel has several slides
    fn categories() -> Arc<[Category]> {
        let mut all = sample_categories();
        for id in 30..34 {
            all.push(category(id, &format!("Sub {id}"), 2));
        }
        all.into()
    }

    fn loaded(width: u32) -> (CategoryBrowser, ManualScheduler<CarouselTimer>) {
        let mut sched = ManualScheduler::new();
        let mut browser = CategoryBrowser::new(CarouselSettings::default(), width);
        browser.update(Message::Loaded(Ok(categories())), &mut sched);
        (browser, sched)
    }

    fn pump(
        browser: &mut CategoryBrowser,
        sched: &mut ManualScheduler<CarouselTimer>,
        by: Duration,
    ) {
        for fired in sched.advance(by) {
            browser.update(Message::Timer(fired), sched);
        }
    }

    #[test]
    fn test_loading_then_ready() {
        let browser = CategoryBrowser::new(CarouselSettings::default(), 800);
        assert!(matches!(browser.branch(), ViewBranch::Loading));

        let (browser, _) = loaded(800);
        assert!(matches!(browser.branch(), ViewBranch::Ready(_)));
        assert_eq!(browser.roots().len(), 7);
        assert!(browser.roots().iter().all(|c| c.id != 1));
    }

    #[test]
    fn test_root_slides_wrap() {
        let (mut browser, mut sched) = loaded(800);
        assert_eq!(browser.per_slide(), 3);
        assert_eq!(browser.cursor().len(), 3);

        browser.update(Message::Prev, &mut sched);
        assert_eq!(browser.cursor().index(), 2);
        assert_eq!(browser.current_slide().len(), 1);
        browser.update(Message::Next, &mut sched);
        assert_eq!(browser.cursor().index(), 0);
    }

    #[test]
    fn test_resize_clamps_cursor() {
        let (mut browser, mut sched) = loaded(500);
        assert_eq!(browser.cursor().len(), 7);
        browser.update(Message::GoTo(6), &mut sched);
        browser.update(Message::Resized(1400), &mut sched);
        assert_eq!(browser.cursor().len(), 2);
        assert_eq!(browser.cursor().index(), 1);
        assert_eq!(browser.current_slide().len(), 1);
    }

    #[test]
    fn test_reveal_is_debounced() {
        let (mut browser, mut sched) = loaded(800);
        browser.update(Message::CategoryClicked(3), &mut sched);
        pump(&mut browser, &mut sched, 200 * MS);
        browser.update(Message::CategoryClicked(2), &mut sched);
        assert_eq!(sched.pending(), 1);
        assert!(!browser.is_panel_visible());

        pump(&mut browser, &mut sched, 299 * MS);
        assert!(browser.open_category().is_none());
        pump(&mut browser, &mut sched, MS);
        assert_eq!(browser.open_category().map(|c| c.id), Some(2));
        assert!(browser.is_panel_visible());
        assert_eq!(browser.subcategories().len(), 6);
    }

    #[test]
    fn test_auto_advance_and_hover_pause() {
        let (mut browser, mut sched) = loaded(800);
        browser.update(Message::CategoryClicked(2), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);
        assert_eq!(browser.sub_cursor().len(), 2);
        assert!(browser.is_auto_advancing());

        pump(&mut browser, &mut sched, 3000 * MS);
        assert_eq!(browser.sub_cursor().index(), 1);
        pump(&mut browser, &mut sched, 3000 * MS);
        assert_eq!(browser.sub_cursor().index(), 0);

        browser.update(Message::PointerEntered, &mut sched);
        assert_eq!(sched.pending(), 0);
        pump(&mut browser, &mut sched, 10_000 * MS);
        assert_eq!(browser.sub_cursor().index(), 0);

        browser.update(Message::PointerLeft, &mut sched);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_manual_move_restarts_interval() {
        let (mut browser, mut sched) = loaded(800);
        browser.update(Message::CategoryClicked(2), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);

        pump(&mut browser, &mut sched, 2000 * MS);
        browser.update(Message::SubNext, &mut sched);
        assert_eq!(browser.sub_cursor().index(), 1);
        assert_eq!(sched.pending(), 1);

        pump(&mut browser, &mut sched, 2000 * MS);
        assert_eq!(browser.sub_cursor().index(), 1);
        pump(&mut browser, &mut sched, 1000 * MS);
        assert_eq!(browser.sub_cursor().index(), 0);
    }

    #[test]
    fn test_single_slide_panel_does_not_rotate() {
        let (mut browser, mut sched) = loaded(1400);
        browser.update(Message::CategoryClicked(2), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);
        assert_eq!(browser.sub_per_slide(), 4);
        assert_eq!(browser.sub_cursor().len(), 2);

        browser.update(Message::CategoryClicked(3), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);
        assert_eq!(browser.sub_cursor().len(), 0);
        assert!(!browser.is_auto_advancing());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_choose_subcategory() {
        let (mut browser, mut sched) = loaded(800);
        browser.update(Message::CategoryClicked(2), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);
        let outcome = browser.update(Message::SubcategoryChosen(20), &mut sched);
        assert_eq!(
            outcome,
            Outcome::OpenProducts {
                sub_category_id: 20,
                title: "Juice".into()
            }
        );
        assert_eq!(browser.update(Message::SubcategoryChosen(99), &mut sched), Outcome::None);
    }

    #[test]
    fn test_close_panel_cancels_timers() {
        let (mut browser, mut sched) = loaded(800);
        browser.update(Message::CategoryClicked(2), &mut sched);
        pump(&mut browser, &mut sched, 300 * MS);
        browser.update(Message::ClosePanel, &mut sched);
        assert_eq!(sched.pending(), 0);
        assert!(!browser.is_panel_visible());
    }

    #[test]
    fn test_failed_fetch() {
        let mut sched: ManualScheduler<CarouselTimer> = ManualScheduler::new();
        let mut browser = CategoryBrowser::new(CarouselSettings::default(), 800);
        browser.update(
            Message::Loaded(Err(crate::core::error::Error::Fetch("network down".into()))),
            &mut sched,
        );
        assert!(matches!(browser.branch(), ViewBranch::Error(_)));
        assert!(browser.roots().is_empty());
    }
}
