//! Animated score counter for the HUD

use crate::consts::SCORE_TWEEN_MS;

/// Counts the displayed integer score up (linearly) to the real one
#[derive(Debug, Clone)]
pub struct ScoreTicker {
    from: i64,
    to: i64,
    started_at: f64,
    duration_ms: f64,
}

impl Default for ScoreTicker {
    fn default() -> Self {
        Self {
            from: 0,
            to: 0,
            started_at: 0.0,
            duration_ms: SCORE_TWEEN_MS,
        }
    }
}

impl ScoreTicker {
    /// Start counting from what is shown now towards `floor(score)`
    pub fn retarget(&mut self, score: f64, now_ms: f64) {
        let target = score.floor() as i64;
        let shown = self.value(now_ms);
        if target != shown {
            self.from = shown;
            self.to = target;
            self.started_at = now_ms;
        }
    }

    /// Integer to display at `now_ms`
    pub fn value(&self, now_ms: f64) -> i64 {
        if self.from == self.to || self.duration_ms <= 0.0 {
            return self.to;
        }
        let progress = ((now_ms - self.started_at) / self.duration_ms).clamp(0.0, 1.0);
        (self.from as f64 + (self.to - self.from) as f64 * progress).floor() as i64
    }

    pub fn is_settled(&self, now_ms: f64) -> bool {
        self.value(now_ms) == self.to
    }
}
