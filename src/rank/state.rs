//! Score accumulation and rank-change detection

use crate::color::TierColor;
use crate::error::{Error, Result};

use super::tier::{RankTier, TierTable};

/// Emitted when the resolved tier differs from the previous one
#[derive(Debug, Clone, PartialEq)]
pub struct RankChange {
    /// Tier index before the points were added
    pub from: usize,
    /// Tier index after
    pub to: usize,
    pub name: String,
    pub color: TierColor,
    /// Score that caused the change
    pub score: f64,
}

impl RankChange {
    pub fn is_promotion(&self) -> bool {
        self.to > self.from
    }
}

/// Accumulated score and the tier it resolves to
#[derive(Debug, Clone)]
pub struct RankState {
    table: TierTable,
    score: f64,
    current: usize,
}

impl RankState {
    /// Start at zero in whatever tier zero resolves to
    pub fn new(table: TierTable) -> Self {
        let current = table.resolve(0.0);
        Self {
            table,
            score: 0.0,
            current,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn tier_index(&self) -> usize {
        self.current
    }

    pub fn tier(&self) -> &RankTier {
        &self.table.tiers()[self.current]
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Add `amount` (fractional allowed, never negative) and report a tier change
    pub fn add_points(&mut self, amount: f64) -> Result<Option<RankChange>> {
        if !amount.is_finite() {
            return Err(Error::NonFiniteInput {
                what: "points",
                value: amount,
            });
        }
        if amount < 0.0 {
            return Err(Error::NegativePoints(amount));
        }

        self.score += amount;
        let resolved = self.table.resolve(self.score);
        if resolved == self.current {
            return Ok(None);
        }

        let tier = &self.table.tiers()[resolved];
        let change = RankChange {
            from: self.current,
            to: resolved,
            name: tier.name.clone(),
            color: tier.color.clone(),
            score: self.score,
        };
        log::info!("Rank {} at {:.1} points", change.name, change.score);
        self.current = resolved;
        Ok(Some(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_lowest_tier() {
        let rank = RankState::new(TierTable::stylish());
        assert_eq!(rank.score(), 0.0);
        assert_eq!(rank.tier().name, "DISMAL");
    }

    #[test]
    fn test_change_fires_once_per_crossing() {
        let mut rank = RankState::new(TierTable::stylish());
        assert_eq!(rank.add_points(10.0).unwrap(), None);
        let change = rank.add_points(45.0).unwrap().unwrap();
        assert_eq!(change.name, "CRAZY");
        assert_eq!((change.from, change.to), (0, 1));
        assert!(change.is_promotion());
        assert_eq!(rank.add_points(1.0).unwrap(), None);
    }

    #[test]
    fn test_skipping_tiers_reports_final_tier() {
        let mut rank = RankState::new(TierTable::stylish());
        let change = rank.add_points(600.0).unwrap().unwrap();
        assert_eq!(change.name, "STYLISH!");
        assert_eq!(change.to, 4);
        assert!(change.color.is_gradient());
    }

    #[test]
    fn test_bad_amounts_rejected_without_mutation() {
        let mut rank = RankState::new(TierTable::stylish());
        rank.add_points(5.0).unwrap();
        assert!(matches!(rank.add_points(-1.0), Err(Error::NegativePoints(_))));
        assert!(matches!(
            rank.add_points(f64::NAN),
            Err(Error::NonFiniteInput { what: "points", .. })
        ));
        assert!(rank.add_points(f64::INFINITY).is_err());
        assert_eq!(rank.score(), 5.0);
    }

    #[test]
    fn test_zero_points_never_changes_rank() {
        let mut rank = RankState::new(TierTable::letter_grades());
        assert_eq!(rank.add_points(0.0).unwrap(), None);
        assert_eq!(rank.tier().name, "D");
    }

    proptest! {
        #[test]
        fn prop_add_points_monotonic_and_event_iff_tier_differs(
            amounts in proptest::collection::vec(0.0f64..120.0, 1..40)
        ) {
            let mut rank = RankState::new(TierTable::stylish());
            for amount in amounts {
                let before = rank.score();
                let tier_before = rank.table().resolve(before);
                let change = rank.add_points(amount).unwrap();
                let after = rank.score();
                let tier_after = rank.table().resolve(after);

                prop_assert!(after >= before);
                prop_assert_eq!(change.is_some(), tier_before != tier_after);
                prop_assert_eq!(rank.tier_index(), tier_after);
                if let Some(change) = change {
                    prop_assert_eq!(change.to, tier_after);
                    prop_assert_eq!(&change.name, &rank.tier().name);
                }
            }
        }
    }
}
