//! Rank meter
//!
//! Score only ever grows; the tier is derived from it and a `RankChange` is
//! returned whenever the derived tier moves.

pub mod meter;
pub mod state;
pub mod ticker;
pub mod tier;

pub use meter::ActivityMeter;
pub use state::{RankChange, RankState};
pub use ticker::ScoreTicker;
pub use tier::{RankTier, TierTable};
