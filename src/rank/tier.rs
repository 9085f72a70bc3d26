//! Rank tiers
//!
//! Each tier starts at its `min` and runs up to the next tier's `min`
//! (exclusive); the last tier is unbounded. Integer scores land exactly as
//! in the inclusive ranges [0, 50], [51, 150], ... while fractional scores
//! between two ranges (50.5) stay in the lower tier.

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, TierColor};
use crate::error::{Error, Result};
use crate::settings::TierPreset;

/// A named band of score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTier {
    pub name: String,
    /// Inclusive lower bound
    pub min: f64,
    pub color: TierColor,
}

impl RankTier {
    pub fn new(name: &str, min: f64, color: TierColor) -> Self {
        Self {
            name: name.to_string(),
            min,
            color,
        }
    }
}

fn solid(name: &str, min: f64, hex: &str) -> RankTier {
    RankTier::new(name, min, TierColor::Solid(Rgb::from_hex_or_white(hex)))
}

/// Ordered, gap-free tier ladder starting at zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RankTier>", into = "Vec<RankTier>")]
pub struct TierTable {
    tiers: Vec<RankTier>,
}

impl TryFrom<Vec<RankTier>> for TierTable {
    type Error = Error;

    fn try_from(tiers: Vec<RankTier>) -> Result<Self> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<RankTier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

impl TierTable {
    /// Validate and build a table: non-empty, first tier at 0, strictly
    /// increasing finite thresholds
    pub fn new(tiers: Vec<RankTier>) -> Result<Self> {
        let Some(first) = tiers.first() else {
            return Err(Error::InvalidTierTable("no tiers".into()));
        };
        if first.min != 0.0 {
            return Err(Error::InvalidTierTable(format!(
                "first tier '{}' starts at {} instead of 0",
                first.name, first.min
            )));
        }
        for pair in tiers.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if !b.min.is_finite() || b.min <= a.min {
                return Err(Error::InvalidTierTable(format!(
                    "tier '{}' ({}) must start above '{}' ({})",
                    b.name, b.min, a.name, a.min
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// DISMAL → CRAZY → BADASS → APOCALYPTIC → STYLISH!
    pub fn stylish() -> Self {
        Self {
            tiers: vec![
                solid("DISMAL", 0.0, "#888"),
                solid("CRAZY", 51.0, "#FFD700"),
                solid("BADASS", 151.0, "#FF8C00"),
                solid("APOCALYPTIC", 301.0, "#DC143C"),
                RankTier::new(
                    "STYLISH!",
                    501.0,
                    TierColor::Gradient(vec![
                        Rgb::new(0xFF, 0x00, 0x80),
                        Rgb::new(0x79, 0x28, 0xCA),
                        Rgb::new(0xFF, 0x00, 0x80),
                    ]),
                ),
            ],
        }
    }

    /// D → C → B → A → S → SS → SSS
    pub fn letter_grades() -> Self {
        Self {
            tiers: vec![
                solid("D", 0.0, "#888"),
                solid("C", 11.0, "#CD7F32"),
                solid("B", 26.0, "#C0C0C0"),
                solid("A", 51.0, "#FFD700"),
                solid("S", 81.0, "#FF4500"),
                solid("SS", 121.0, "#DC143C"),
                solid("SSS", 201.0, "#FF0080"),
            ],
        }
    }

    pub fn from_preset(preset: TierPreset) -> Self {
        match preset {
            TierPreset::Stylish => Self::stylish(),
            TierPreset::LetterGrade => Self::letter_grades(),
        }
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RankTier> {
        self.tiers.get(index)
    }

    /// `[min, max)` of tier `index`; `max` is `None` for the last tier
    pub fn range(&self, index: usize) -> Option<(f64, Option<f64>)> {
        let tier = self.tiers.get(index)?;
        Some((tier.min, self.tiers.get(index + 1).map(|next| next.min)))
    }

    /// Whether tier `index` covers `score`
    pub fn contains(&self, index: usize, score: f64) -> bool {
        match self.range(index) {
            Some((min, Some(max))) => score >= min && score < max,
            Some((min, None)) => score >= min,
            None => false,
        }
    }

    /// Index of the first tier whose range holds `score`; the lowest tier
    /// when nothing matches (negative or NaN scores)
    pub fn resolve(&self, score: f64) -> usize {
        (0..self.tiers.len())
            .find(|&i| self.contains(i, score))
            .unwrap_or(0)
    }

    /// Tier for `score`
    pub fn tier_for(&self, score: f64) -> &RankTier {
        &self.tiers[self.resolve(score)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stylish_boundaries() {
        let table = TierTable::stylish();
        assert_eq!(table.tier_for(0.0).name, "DISMAL");
        assert_eq!(table.tier_for(50.0).name, "DISMAL");
        assert_eq!(table.tier_for(50.5).name, "DISMAL");
        assert_eq!(table.tier_for(51.0).name, "CRAZY");
        assert_eq!(table.tier_for(150.0).name, "CRAZY");
        assert_eq!(table.tier_for(151.0).name, "BADASS");
        assert_eq!(table.tier_for(300.75).name, "BADASS");
        assert_eq!(table.tier_for(301.0).name, "APOCALYPTIC");
        assert_eq!(table.tier_for(501.0).name, "STYLISH!");
        assert_eq!(table.tier_for(1e12).name, "STYLISH!");
        assert!(table.tier_for(600.0).color.is_gradient());
    }

    #[test]
    fn test_letter_grades_boundaries() {
        let table = TierTable::letter_grades();
        let names: Vec<&str> = [0.0, 10.0, 11.0, 25.0, 26.0, 51.0, 81.0, 121.0, 201.0]
            .iter()
            .map(|s| table.tier_for(*s).name.as_str())
            .collect();
        assert_eq!(names, ["D", "D", "C", "C", "B", "A", "S", "SS", "SSS"]);
    }

    #[test]
    fn test_fallback_to_lowest() {
        let table = TierTable::stylish();
        assert_eq!(table.resolve(-1.0), 0);
        assert_eq!(table.resolve(f64::NAN), 0);
    }

    #[test]
    fn test_ranges() {
        let table = TierTable::stylish();
        assert_eq!(table.range(0), Some((0.0, Some(51.0))));
        assert_eq!(table.range(4), Some((501.0, None)));
        assert_eq!(table.range(5), None);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        let color = TierColor::Solid(Rgb::WHITE);
        assert!(TierTable::new(vec![]).is_err());
        assert!(TierTable::new(vec![RankTier::new("A", 5.0, color.clone())]).is_err());
        assert!(TierTable::new(vec![
            RankTier::new("A", 0.0, color.clone()),
            RankTier::new("B", 10.0, color.clone()),
            RankTier::new("C", 10.0, color.clone()),
        ])
        .is_err());
        assert!(TierTable::new(vec![
            RankTier::new("A", 0.0, color.clone()),
            RankTier::new("B", f64::INFINITY, color),
        ])
        .is_err());
    }

    #[test]
    fn test_table_json_is_validated() {
        let json = serde_json::to_string(&TierTable::letter_grades()).unwrap();
        let decoded: TierTable = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, TierTable::letter_grades());

        let bad = r#"[{"name":"X","min":3.0,"color":{"kind":"solid","stops":{"r":1,"g":2,"b":3}}}]"#;
        assert!(serde_json::from_str::<TierTable>(bad).is_err());
    }

    proptest! {
        #[test]
        fn prop_resolve_total_and_contiguous(score in 0.0f64..1e6) {
            for table in [TierTable::stylish(), TierTable::letter_grades()] {
                let matching: Vec<usize> =
                    (0..table.len()).filter(|&i| table.contains(i, score)).collect();
                prop_assert_eq!(matching.len(), 1);
                let resolved = table.resolve(score);
                prop_assert_eq!(resolved, matching[0]);
                prop_assert!(table.contains(resolved, score));
            }
        }
    }
}
