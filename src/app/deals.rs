//! Deal progress card
//!
//! Tracks one offer for the signed-in client. A deal instance is identified
//! by its record id, offer id and period; within one instance the level never
//! goes backwards and a completed deal stays completed. A record with a new
//! id or period starts a fresh instance.

use crate::core::entity::{DealKind, DealRecord};
use crate::core::error::Result;
use crate::core::progress::{DealProgress, deal_progress};
use crate::core::source::{FetchState, ViewBranch};
use std::sync::Arc;

#[derive(Debug)]
pub enum Message {
    Loaded(Result<Arc<[DealRecord]>>),
}

/// Identity of one deal instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DealKey {
    pub deal_id: u64,
    pub offer_id: u64,
    pub period: u32,
}

impl DealKey {
    pub fn of(record: &DealRecord) -> Self {
        Self {
            deal_id: record.id,
            offer_id: record.offer_id,
            period: record.period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealCard {
    pub key: DealKey,
    pub kind: DealKind,
    pub progress: DealProgress,
}

impl DealCard {
    /// Completed deals show the terminal "deal ended" state instead of a bar
    pub fn is_ended(&self) -> bool {
        self.progress.completed
    }
}

pub struct DealTracker {
    client_id: u64,
    offer_id: u64,
    deals: FetchState<Arc<[DealRecord]>>,
    card: Option<DealCard>,
}

impl DealTracker {
    pub fn new(client_id: u64, offer_id: u64) -> Self {
        Self {
            client_id,
            offer_id,
            deals: FetchState::Loading,
            card: None,
        }
    }

    pub fn card(&self) -> Option<&DealCard> {
        self.card.as_ref()
    }

    /// Ready with no card means the client has no progress on this offer.
    pub fn branch(&self) -> ViewBranch<'_, Arc<[DealRecord]>> {
        let empty = self.card.is_none();
        self.deals.branch(|_| empty)
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Loaded(result) => {
                self.deals = FetchState::from_result(result);
                self.refresh();
            }
        }
    }

    fn refresh(&mut self) {
        let Some(deals) = self.deals.ready() else {
            return;
        };
        let Some(record) = DealRecord::find(deals, self.client_id, self.offer_id) else {
            tracing::debug!(
                "Client {} has no progress on offer {}",
                self.client_id,
                self.offer_id
            );
            self.card = None;
            return;
        };

        let key = DealKey::of(record);
        let kind = record.kind;
        let progress = match deal_progress(record) {
            Ok(progress) => progress,
            Err(e) => {
                self.deals = FetchState::from_result(Err(e));
                self.card = None;
                return;
            }
        };

        if let Some(card) = &self.card
            && card.key == key
            && (card.progress.completed || progress.level < card.progress.level)
        {
            tracing::debug!(
                "Keeping deal {} at level {}",
                key.deal_id,
                card.progress.level
            );
            return;
        }

        if progress.completed && !self.card.as_ref().is_some_and(DealCard::is_ended) {
            tracing::info!("Deal {} on offer {} completed", key.deal_id, key.offer_id);
        }
        self.card = Some(DealCard {
            key,
            kind,
            progress,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::DealGoal;
    use crate::core::error::Error;
    use crate::core::progress::Tier;
    use crate::core::test_helpers::{frequency_deal, tiered_deal};

    fn load(tracker: &mut DealTracker, deals: Vec<DealRecord>) {
        tracker.update(Message::Loaded(Ok(deals.into())));
    }

    #[test]
    fn test_tiered_card() {
        let mut tracker = DealTracker::new(7, 1);
        assert!(matches!(tracker.branch(), ViewBranch::Loading));

        load(&mut tracker, vec![tiered_deal(1, 7, 12.0)]);
        let card = tracker.card().unwrap();
        assert_eq!(card.progress.level, 2);
        assert_eq!(card.progress.reward, Some(25.0));
        assert_eq!(card.progress.percentage, 50.0);
        assert!(!card.is_ended());
        assert!(matches!(tracker.branch(), ViewBranch::Ready(_)));
    }

    #[test]
    fn test_other_clients_are_ignored() {
        let mut tracker = DealTracker::new(7, 1);
        load(&mut tracker, vec![tiered_deal(1, 8, 12.0)]);
        assert!(tracker.card().is_none());
        assert!(matches!(tracker.branch(), ViewBranch::Empty));
    }

    #[test]
    fn test_level_never_regresses() {
        let mut tracker = DealTracker::new(7, 1);
        load(&mut tracker, vec![tiered_deal(1, 7, 12.0)]);
        load(&mut tracker, vec![tiered_deal(1, 7, 6.0)]);
        assert_eq!(tracker.card().unwrap().progress.level, 2);

        load(&mut tracker, vec![tiered_deal(1, 7, 15.0)]);
        assert_eq!(tracker.card().unwrap().progress.level, 2);
        load(&mut tracker, vec![tiered_deal(1, 7, 20.0)]);
        assert!(tracker.card().unwrap().is_ended());
    }

    #[test]
    fn test_completed_is_terminal_until_new_period() {
        let mut tracker = DealTracker::new(7, 2);
        load(&mut tracker, vec![frequency_deal(2, 7, 5.0, 5.0)]);
        assert!(tracker.card().unwrap().is_ended());
        assert_eq!(tracker.card().unwrap().progress.reward, Some(15.0));

        load(&mut tracker, vec![frequency_deal(2, 7, 0.0, 5.0)]);
        assert!(tracker.card().unwrap().is_ended());

        let mut next_period = frequency_deal(2, 7, 1.0, 5.0);
        next_period.period = 2;
        load(&mut tracker, vec![next_period]);
        let card = tracker.card().unwrap();
        assert!(!card.is_ended());
        assert_eq!(card.progress.level, 1);
        assert_eq!(card.progress.percentage, 20.0);
    }

    #[test]
    fn test_invalid_ladder_is_error_branch() {
        let mut record = tiered_deal(1, 7, 3.0);
        record.goal = DealGoal::Tiered {
            tiers: vec![Tier::new(10.0, 1.0), Tier::new(5.0, 2.0)],
        };
        let mut tracker = DealTracker::new(7, 1);
        load(&mut tracker, vec![record]);
        assert!(tracker.card().is_none());
        assert!(matches!(tracker.branch(), ViewBranch::Error(_)));
    }

    #[test]
    fn test_fetch_failure() {
        let mut tracker = DealTracker::new(7, 1);
        tracker.update(Message::Loaded(Err(Error::Fetch(
            "Authentication token is missing".into(),
        ))));
        match tracker.branch() {
            ViewBranch::Error(t) => assert!(t.user_message.contains("session")),
            other => panic!("unexpected branch: {other:?}"),
        }
    }
}
