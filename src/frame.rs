//! Frame scheduling
//!
//! Turns host animation-frame timestamps into a whole number of fixed
//! simulation ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Fixed-timestep accumulator
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    accumulator: f32,
    /// Timestamp of the previous frame in milliseconds
    last_time: Option<f64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks due for a frame at `now_ms`.
    ///
    /// The first frame counts as one step. Long stalls are clamped and at most
    /// `MAX_SUBSTEPS` ticks run per frame; the backlog beyond that is dropped.
    pub fn due_ticks(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) if now_ms.is_finite() => ((now_ms - last) / 1000.0) as f32,
            _ => SIM_DT,
        };
        if now_ms.is_finite() {
            self.last_time = Some(now_ms);
        }
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        ticks
    }

    /// Forget the previous timestamp (tab hidden, card restarted)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.due_ticks(1000.0), 1);
    }

    #[test]
    fn test_steady_60hz() {
        let mut scheduler = FrameScheduler::new();
        scheduler.due_ticks(0.0);
        let frame = 1000.0 / 60.0;
        let total: u32 = (1..=60)
            .map(|i| scheduler.due_ticks(i as f64 * frame + 0.01))
            .sum();
        assert!((59..=61).contains(&total), "got {}", total);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut scheduler = FrameScheduler::new();
        scheduler.due_ticks(0.0);
        // Five seconds in a background tab
        let ticks = scheduler.due_ticks(5000.0);
        assert!(ticks <= MAX_SUBSTEPS);
        assert!(ticks >= 5);
        // The backlog does not carry over
        assert!(scheduler.due_ticks(5001.0) <= 1);
    }

    #[test]
    fn test_time_going_backwards() {
        let mut scheduler = FrameScheduler::new();
        scheduler.due_ticks(1000.0);
        assert_eq!(scheduler.due_ticks(500.0), 0);
    }

    #[test]
    fn test_high_refresh_accumulates() {
        let mut scheduler = FrameScheduler::new();
        scheduler.due_ticks(0.0);
        // 144 Hz frames: some frames run no tick
        let ticks: Vec<u32> = (1..=10)
            .map(|i| scheduler.due_ticks(i as f64 * 1000.0 / 144.0))
            .collect();
        assert!(ticks.contains(&0));
        assert!(ticks.iter().sum::<u32>() >= 3);
    }
}
