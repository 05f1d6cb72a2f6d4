//! Frame pacing for the render loop.
//!
//! Paces redraws to a fixed target interval by sleeping out the
//! remainder of each frame's budget. `thread::sleep` routinely over-
//! or undershoots by a scheduler quantum, so the pacer carries the
//! signed pacing error of each frame into the next frame's budget
//! instead of letting it accumulate.

use std::time::{Duration, Instant};

/// Monotonic-clock frame pacer.
pub struct FramePacer {
    target: Duration,
    last_frame: Instant,
    carry_ns: i64,
}

impl FramePacer {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            last_frame: Instant::now(),
            carry_ns: 0,
        }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    /// Sleeps out whatever is left of the current frame budget, then
    /// returns the time elapsed since the previous call in seconds.
    ///
    /// A close request arriving mid-sleep is only observed after the
    /// sleep returns; the loop is cooperative, not interruptible.
    pub fn pace(&mut self) -> f32 {
        let elapsed = self.last_frame.elapsed();
        if let Some(remaining) = sleep_budget(self.target, self.carry_ns, elapsed) {
            std::thread::sleep(remaining);
        }

        let now = Instant::now();
        let frame = now - self.last_frame;
        self.carry_ns = next_carry(frame, self.target);
        self.last_frame = now;
        frame.as_secs_f32()
    }

    pub fn target(&self) -> Duration {
        self.target
    }
}

/// Remaining sleep for a frame that has consumed `elapsed` of a budget
/// shortened (or stretched) by the previous frame's carry. `None` when
/// the frame already ran past its budget.
fn sleep_budget(target: Duration, carry_ns: i64, elapsed: Duration) -> Option<Duration> {
    let budget_ns = (target.as_nanos() as i64 - carry_ns).max(0);
    let budget = Duration::from_nanos(budget_ns as u64);
    (elapsed < budget).then(|| budget - elapsed)
}

/// Signed pacing error of the finished frame, clamped to one frame in
/// either direction so a long stall cannot starve later frames.
fn next_carry(frame: Duration, target: Duration) -> i64 {
    let target_ns = target.as_nanos() as i64;
    let error = frame.as_nanos() as i64 - target_ns;
    error.clamp(-target_ns, target_ns)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Duration = Duration::from_millis(16);

    #[test]
    fn budget_is_remainder_of_target() {
        let remaining = sleep_budget(TARGET, 0, Duration::from_millis(6)).unwrap();
        assert_eq!(remaining, Duration::from_millis(10));
    }

    #[test]
    fn no_sleep_when_frame_ran_long() {
        assert!(sleep_budget(TARGET, 0, Duration::from_millis(20)).is_none());
        assert!(sleep_budget(TARGET, 0, TARGET).is_none());
    }

    #[test]
    fn overshoot_shortens_next_budget() {
        // previous frame overslept by 2ms; this frame gets 14ms
        let carry = next_carry(Duration::from_millis(18), TARGET);
        assert_eq!(carry, 2_000_000);
        let remaining = sleep_budget(TARGET, carry, Duration::ZERO).unwrap();
        assert_eq!(remaining, Duration::from_millis(14));
    }

    #[test]
    fn undershoot_stretches_next_budget() {
        let carry = next_carry(Duration::from_millis(12), TARGET);
        assert_eq!(carry, -4_000_000);
        let remaining = sleep_budget(TARGET, carry, Duration::ZERO).unwrap();
        assert_eq!(remaining, Duration::from_millis(20));
    }

    #[test]
    fn carry_is_clamped_to_one_frame() {
        let carry = next_carry(Duration::from_millis(500), TARGET);
        assert_eq!(carry, TARGET.as_nanos() as i64);
        // a fully consumed carry yields a zero budget, not a negative one
        assert!(sleep_budget(TARGET, carry, Duration::ZERO).is_none());
    }

    #[test]
    fn pace_returns_elapsed_seconds() {
        let mut pacer = FramePacer::new(Duration::from_millis(1));
        let dt = pacer.pace();
        assert!(dt >= 0.0);
    }
}
