use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens to the accumulated hold time when good posture breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPolicy {
    /// Time before a break is kept; the next segment adds to it.
    #[default]
    Continuous,
    /// The frozen value stays visible until the next segment, which starts
    /// again from zero.
    RestartOnBreak,
}

/// Accumulates hold duration from frame timestamps.
///
/// Timestamps come from the frames themselves, never from the wall clock.
#[derive(Debug, Clone, Default)]
pub struct HoldTimer {
    policy: HoldPolicy,
    banked: Duration,
    segment_start: Option<Duration>,
}

impl HoldTimer {
    pub fn new(policy: HoldPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.segment_start.is_some()
    }

    /// Begins a good-posture segment at `now`. Has no effect while a segment
    /// is already running.
    pub fn start_segment(&mut self, now: Duration) {
        if self.segment_start.is_some() {
            return;
        }

        if self.policy == HoldPolicy::RestartOnBreak {
            self.banked = Duration::ZERO;
        }
        self.segment_start = Some(now);
    }

    /// Freezes the running segment at `now`.
    pub fn pause(&mut self, now: Duration) {
        if let Some(start) = self.segment_start.take() {
            self.banked += now.saturating_sub(start);
        }
    }

    /// Hold time as of `now`. Timestamps earlier than the segment start count
    /// as zero elapsed.
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.segment_start {
            Some(start) => self.banked + now.saturating_sub(start),
            None => self.banked,
        }
    }

    pub fn reset(&mut self) {
        self.banked = Duration::ZERO;
        self.segment_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn continuous_policy_resumes_total() {
        let mut timer = HoldTimer::new(HoldPolicy::Continuous);
        assert_eq!(timer.elapsed(secs(5)), Duration::ZERO);

        timer.start_segment(secs(10));
        assert_eq!(timer.elapsed(secs(14)), secs(4));

        timer.pause(secs(16));
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(secs(30)), secs(6));

        timer.start_segment(secs(40));
        assert_eq!(timer.elapsed(secs(43)), secs(9));
    }

    #[test]
    fn restart_policy_freezes_then_restarts() {
        let mut timer = HoldTimer::new(HoldPolicy::RestartOnBreak);
        timer.start_segment(secs(0));
        timer.pause(secs(7));
        assert_eq!(timer.elapsed(secs(9)), secs(7));

        timer.start_segment(secs(10));
        assert_eq!(timer.elapsed(secs(12)), secs(2));
    }

    #[test]
    fn repeated_start_keeps_original_segment() {
        let mut timer = HoldTimer::default();
        timer.start_segment(secs(1));
        timer.start_segment(secs(5));
        assert_eq!(timer.elapsed(secs(6)), secs(5));

        timer.reset();
        assert_eq!(timer.elapsed(secs(6)), Duration::ZERO);
        assert_eq!(timer.elapsed(Duration::ZERO), Duration::ZERO);
    }
}
