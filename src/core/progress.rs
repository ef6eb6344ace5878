//! Deal progress: tier resolution and progress-bar percentages
//!
//! A tiered deal pays the reward of the highest threshold the counter has
//! reached (`counter >= threshold`). Reaching the last threshold completes the
//! deal. Frequency deals instead fill a linear bar towards a single target.
//!
//! # Bar layout
//!
//! With `N` tiers, marker `k` (1-based) sits at `k * 100 / (N + 1)` percent of
//! the bar. The fill stops at the marker of the achieved tier and jumps to 100
//! on completion, so three tiers render as 0 / 25 / 50 / 100.

use crate::core::entity::{DealGoal, DealRecord};
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A threshold and the reward paid once it is reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier<R> {
    pub threshold: f64,
    pub reward: R,
}

impl<R> Tier<R> {
    pub fn new(threshold: f64, reward: R) -> Self {
        Self { threshold, reward }
    }
}

/// Outcome of resolving a counter against a tier ladder
#[derive(Debug, Clone, PartialEq)]
pub struct TierResolution<'a, R> {
    /// Number of tiers reached; 0 when none
    pub level: usize,
    /// Highest tier reached
    pub tier: Option<&'a Tier<R>>,
    /// Counter reached the last tier
    pub completed: bool,
}

impl<R> TierResolution<'_, R> {
    pub fn reward(&self) -> Option<&R> {
        self.tier.map(|t| &t.reward)
    }
}

/// Checks that thresholds are finite and strictly ascending.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty, unordered or non-finite
/// ladder.
pub fn validate_tiers<R>(tiers: &[Tier<R>]) -> Result<()> {
    if tiers.is_empty() {
        return Err(Error::invalid("a deal needs at least one tier"));
    }
    if tiers.iter().any(|t| !t.threshold.is_finite()) {
        return Err(Error::invalid("tier thresholds must be finite"));
    }
    if tiers.windows(2).any(|w| w[0].threshold >= w[1].threshold) {
        return Err(Error::invalid("tier thresholds must be strictly ascending"));
    }
    Ok(())
}

/// Resolves `counter` against an ascending ladder.
///
/// Returns the highest tier whose threshold is `<= counter`. The counter
/// equal to a threshold counts as reached.
pub fn resolve_tier<R>(counter: f64, tiers: &[Tier<R>]) -> TierResolution<'_, R> {
    let level = tiers.iter().take_while(|t| counter >= t.threshold).count();
    TierResolution {
        level,
        tier: level.checked_sub(1).map(|i| &tiers[i]),
        completed: !tiers.is_empty() && level == tiers.len(),
    }
}

/// Position of marker `level` (1-based) on a bar carrying `tier_count` markers.
pub fn marker_position(level: usize, tier_count: usize) -> f64 {
    if tier_count == 0 {
        return 0.0;
    }
    (level.min(tier_count) as f64) * 100.0 / (tier_count as f64 + 1.0)
}

/// Bar fill for a tiered deal.
pub fn tiered_percentage(level: usize, tier_count: usize) -> f64 {
    if tier_count > 0 && level >= tier_count {
        100.0
    } else {
        marker_position(level, tier_count)
    }
}

/// `counter / target` as a percentage clamped into `[0, 100]`.
///
/// # Errors
///
/// Returns [`Error::DivisionByZero`] when `target` is zero.
pub fn try_percentage(counter: f64, target: f64) -> Result<f64> {
    if target == 0.0 {
        return Err(Error::DivisionByZero(format!(
            "progress of {counter} against a zero target"
        )));
    }
    let pct = counter / target * 100.0;
    if pct.is_nan() {
        return Ok(0.0);
    }
    Ok(pct.clamp(0.0, 100.0))
}

/// Linear progress percentage; a zero target yields 0%.
pub fn linear_percentage(counter: f64, target: f64) -> f64 {
    try_percentage(counter, target).unwrap_or_else(|e| {
        tracing::debug!("{e}; showing 0%");
        0.0
    })
}

/// One milestone drawn on a progress bar
#[derive(Debug, Clone, PartialEq)]
pub struct Marker<R> {
    /// Left offset in percent
    pub position: f64,
    pub threshold: f64,
    pub reward: R,
    pub achieved: bool,
}

/// Markers for every tier of a ladder
pub fn tier_markers<R: Clone>(counter: f64, tiers: &[Tier<R>]) -> Vec<Marker<R>> {
    tiers
        .iter()
        .enumerate()
        .map(|(i, tier)| Marker {
            position: marker_position(i + 1, tiers.len()),
            threshold: tier.threshold,
            reward: tier.reward.clone(),
            achieved: counter >= tier.threshold,
        })
        .collect()
}

/// One marker per visit for a frequency target of `target` visits.
///
/// Each marker carries the minimum basket as its label.
pub fn visit_markers(counter: f64, target: u32, min_basket: f64) -> Vec<Marker<f64>> {
    (1..=target)
        .map(|visit| Marker {
            position: f64::from(visit) / f64::from(target) * 100.0,
            threshold: f64::from(visit),
            reward: min_basket,
            achieved: counter >= f64::from(visit),
        })
        .collect()
}

/// Everything a deal card needs to draw its bar
#[derive(Debug, Clone, PartialEq)]
pub struct DealProgress {
    /// Tiers reached, or visits counted for frequency deals
    pub level: usize,
    pub percentage: f64,
    /// Reward of the achieved tier; the gain once a frequency deal completes
    pub reward: Option<f64>,
    pub completed: bool,
    pub markers: Vec<Marker<f64>>,
}

/// Computes the progress of one deal record.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when a tiered goal is not a valid
/// ascending ladder.
pub fn deal_progress(record: &DealRecord) -> Result<DealProgress> {
    let counter = record.counter.value();
    match &record.goal {
        DealGoal::Tiered { tiers } => {
            validate_tiers(tiers)?;
            let res = resolve_tier(counter, tiers);
            Ok(DealProgress {
                level: res.level,
                percentage: tiered_percentage(res.level, tiers.len()),
                reward: res.reward().copied(),
                completed: res.completed,
                markers: tier_markers(counter, tiers),
            })
        }
        DealGoal::Frequency {
            target,
            gain,
            min_basket,
        } => {
            // Visits are whole, so a fractional target needs the next visit up
            let target = target.value().max(0.0).ceil();
            let completed = counter >= target;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let visits = counter.clamp(0.0, target).floor() as usize;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let marker_count = target.min(f64::from(u16::MAX)) as u32;
            Ok(DealProgress {
                level: visits,
                percentage: linear_percentage(counter, target),
                reward: completed.then_some(*gain),
                completed,
                markers: visit_markers(counter, marker_count, *min_basket),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> Vec<Tier<&'static str>> {
        vec![
            Tier::new(5.0, "10dt"),
            Tier::new(10.0, "25dt"),
            Tier::new(20.0, "50dt"),
        ]
    }

    #[test]
    fn test_counter_between_tiers() {
        let tiers = ladder();
        let res = resolve_tier(12.0, &tiers);
        assert_eq!(res.tier, Some(&Tier::new(10.0, "25dt")));
        assert_eq!(res.level, 2);
        assert!(!res.completed);
    }

    #[test]
    fn test_counter_on_last_threshold_completes() {
        let tiers = ladder();
        let res = resolve_tier(20.0, &tiers);
        assert_eq!(res.reward(), Some(&"50dt"));
        assert!(res.completed);

        let beyond = resolve_tier(500.0, &tiers);
        assert_eq!(beyond.level, 3);
        assert!(beyond.completed);
    }

    #[test]
    fn test_equal_threshold_counts_as_reached() {
        let tiers = ladder();
        assert_eq!(resolve_tier(5.0, &tiers).level, 1);
        assert_eq!(resolve_tier(4.99, &tiers).level, 0);
    }

    #[test]
    fn test_nothing_reached() {
        let tiers = ladder();
        let res = resolve_tier(0.0, &tiers);
        assert!(res.tier.is_none());
        assert!(res.reward().is_none());
        assert!(!res.completed);
    }

    #[test]
    fn test_empty_ladder_never_completes() {
        let tiers: Vec<Tier<f64>> = Vec::new();
        let res = resolve_tier(100.0, &tiers);
        assert_eq!(res.level, 0);
        assert!(!res.completed);
        assert!(validate_tiers(&tiers).is_err());
    }

    #[test]
    fn test_validate_rejects_unordered() {
        let tiers = vec![Tier::new(10.0, 1.0), Tier::new(5.0, 2.0)];
        assert!(matches!(
            validate_tiers(&tiers),
            Err(Error::InvalidArgument(_))
        ));
        let dup = vec![Tier::new(5.0, 1.0), Tier::new(5.0, 2.0)];
        assert!(validate_tiers(&dup).is_err());
        assert!(validate_tiers(&ladder()).is_ok());
    }

    #[test]
    fn test_three_tier_bar_fill() {
        assert_eq!(tiered_percentage(0, 3), 0.0);
        assert_eq!(tiered_percentage(1, 3), 25.0);
        assert_eq!(tiered_percentage(2, 3), 50.0);
        assert_eq!(tiered_percentage(3, 3), 100.0);
        assert_eq!(marker_position(3, 3), 75.0);
    }

    #[test]
    fn test_zero_target_is_zero_percent() {
        assert!(matches!(
            try_percentage(5.0, 0.0),
            Err(Error::DivisionByZero(_))
        ));
        assert_eq!(linear_percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_linear_percentage_clamps() {
        assert_eq!(linear_percentage(3.0, 4.0), 75.0);
        assert_eq!(linear_percentage(9.0, 4.0), 100.0);
        assert_eq!(linear_percentage(-2.0, 4.0), 0.0);
    }

    #[test]
    fn test_tier_markers() {
        let markers = tier_markers(12.0, &ladder());
        assert_eq!(markers.len(), 3);
        assert!(markers[0].achieved && markers[1].achieved && !markers[2].achieved);
        assert_eq!(markers[1].position, 50.0);
    }

    fn deal(counter: f64, goal: DealGoal) -> DealRecord {
        DealRecord {
            id: 1,
            offer_id: 2,
            client_id: 3,
            kind: crate::core::entity::DealKind::Spend,
            counter: counter.into(),
            goal,
            period: 0,
        }
    }

    #[test]
    fn test_deal_progress_tiered() {
        let goal = DealGoal::Tiered {
            tiers: vec![Tier::new(5.0, 10.0), Tier::new(10.0, 25.0), Tier::new(20.0, 50.0)],
        };
        let progress = deal_progress(&deal(12.0, goal.clone())).unwrap();
        assert_eq!(progress.level, 2);
        assert_eq!(progress.percentage, 50.0);
        assert_eq!(progress.reward, Some(25.0));
        assert!(!progress.completed);

        let done = deal_progress(&deal(20.0, goal)).unwrap();
        assert!(done.completed);
        assert_eq!(done.percentage, 100.0);
    }

    #[test]
    fn test_deal_progress_rejects_bad_ladder() {
        let goal = DealGoal::Tiered {
            tiers: vec![Tier::new(10.0, 1.0), Tier::new(5.0, 2.0)],
        };
        assert!(deal_progress(&deal(1.0, goal)).is_err());
    }

    #[test]
    fn test_deal_progress_frequency_zero_target() {
        let goal = DealGoal::Frequency {
            target: 0.0.into(),
            gain: 20.0,
            min_basket: 30.0,
        };
        let progress = deal_progress(&deal(5.0, goal)).unwrap();
        assert_eq!(progress.percentage, 0.0);
        assert!(progress.completed);
        assert!(progress.markers.is_empty());
    }

    #[test]
    fn test_deal_progress_frequency_partial() {
        let goal = DealGoal::Frequency {
            target: crate::core::entity::RawNumber::Text("4".into()),
            gain: 20.0,
            min_basket: 30.0,
        };
        let progress = deal_progress(&deal(3.0, goal)).unwrap();
        assert_eq!(progress.level, 3);
        assert_eq!(progress.percentage, 75.0);
        assert_eq!(progress.reward, None);
        assert_eq!(progress.markers.len(), 4);
    }

    #[test]
    fn test_deal_progress_fractional_target_rounds_up() {
        let goal = |target: f64| DealGoal::Frequency {
            target: target.into(),
            gain: 20.0,
            min_basket: 30.0,
        };
        let progress = deal_progress(&deal(2.5, goal(2.5))).unwrap();
        assert_eq!(progress.level, 2);
        assert_eq!(progress.markers.len(), 3);
        assert!(!progress.completed);
        assert_eq!(progress.markers.iter().filter(|m| m.achieved).count(), 2);

        let done = deal_progress(&deal(3.0, goal(2.5))).unwrap();
        assert!(done.completed);
        assert_eq!(done.level, done.markers.len());
        assert_eq!(done.percentage, 100.0);
    }

    #[test]
    fn test_visit_markers() {
        let markers = visit_markers(2.0, 4, 30.0);
        assert_eq!(markers.len(), 4);
        assert_eq!(markers.iter().filter(|m| m.achieved).count(), 2);
        assert_eq!(markers[3].position, 100.0);
        assert!(visit_markers(2.0, 0, 30.0).is_empty());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_ladder()(steps in proptest::collection::vec(1u32..50, 1..6)) -> Vec<Tier<u32>> {
            let mut threshold = 0u32;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, step)| {
                    threshold += step;
                    Tier::new(f64::from(threshold), u32::try_from(i).unwrap_or(0) * 10)
                })
                .collect()
        }
    }

    proptest! {
        #[test]
        fn test_resolution_is_monotonic(
            tiers in arb_ladder(),
            a in 0.0f64..300.0,
            b in 0.0f64..300.0
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = resolve_tier(lo, &tiers);
            let high = resolve_tier(hi, &tiers);
            prop_assert!(low.level <= high.level);
            prop_assert!(low.reward().copied().unwrap_or(0) <= high.reward().copied().unwrap_or(0));
            prop_assert!(!low.completed || high.completed);
            prop_assert!(tiered_percentage(low.level, tiers.len()) <= tiered_percentage(high.level, tiers.len()));
        }

        #[test]
        fn test_resolved_tier_is_highest_reached(tiers in arb_ladder(), counter in 0.0f64..300.0) {
            let res = resolve_tier(counter, &tiers);
            if let Some(tier) = res.tier {
                prop_assert!(counter >= tier.threshold);
            }
            if let Some(next) = tiers.get(res.level) {
                prop_assert!(counter < next.threshold);
            }
        }

        #[test]
        fn test_linear_percentage_bounded(counter in -1e6f64..1e6, target in -1e3f64..1e3) {
            let pct = linear_percentage(counter, target);
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}
