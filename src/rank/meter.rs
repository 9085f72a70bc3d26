//! Capped reward for continuous pointer activity

use crate::settings::Rewards;

/// Grants a fixed amount per pointer move until `cap` has been granted in
/// the current window; windows are fixed-length and back to back
#[derive(Debug, Clone)]
pub struct ActivityMeter {
    per_event: f64,
    cap: f64,
    window_ms: f64,
    window_start: Option<f64>,
    granted: f64,
}

impl ActivityMeter {
    pub fn new(per_event: f64, cap: f64, window_ms: f64) -> Self {
        Self {
            per_event,
            cap,
            window_ms,
            window_start: None,
            granted: 0.0,
        }
    }

    pub fn from_rewards(rewards: &Rewards) -> Self {
        Self::new(
            rewards.pointer_move_points,
            rewards.pointer_move_cap,
            rewards.pointer_move_window_ms,
        )
    }

    /// Points earned by one pointer move at `now_ms` (0 once capped)
    pub fn grant(&mut self, now_ms: f64) -> f64 {
        let start = *self.window_start.get_or_insert(now_ms);
        if self.window_ms > 0.0 && now_ms - start >= self.window_ms {
            let windows = ((now_ms - start) / self.window_ms).floor();
            self.window_start = Some(start + windows * self.window_ms);
            self.granted = 0.0;
        }

        if self.granted < self.cap {
            self.granted += self.per_event;
            self.per_event
        } else {
            0.0
        }
    }

    /// Points granted so far in the current window
    pub fn granted(&self) -> f64 {
        self.granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_within_window() {
        let mut meter = ActivityMeter::new(0.5, 50.0, 5000.0);
        let total: f64 = (0..150).map(|i| meter.grant(i as f64 * 10.0)).sum();
        assert_eq!(total, 50.0);
        assert_eq!(meter.grant(1600.0), 0.0);
    }

    #[test]
    fn test_next_window_resets() {
        let mut meter = ActivityMeter::new(0.5, 1.0, 5000.0);
        assert_eq!(meter.grant(0.0), 0.5);
        assert_eq!(meter.grant(1.0), 0.5);
        assert_eq!(meter.grant(2.0), 0.0);
        assert_eq!(meter.grant(5000.0), 0.5);
        // Windows stay aligned to the first grant
        assert_eq!(meter.grant(12_500.0), 0.5);
        assert_eq!(meter.grant(14_999.0), 0.5);
        assert_eq!(meter.grant(14_999.5), 0.0);
        assert_eq!(meter.grant(15_000.0), 0.5);
    }

    #[test]
    fn test_from_default_rewards() {
        let meter = ActivityMeter::from_rewards(&Rewards::default());
        assert_eq!(meter.granted(), 0.0);
    }
}
