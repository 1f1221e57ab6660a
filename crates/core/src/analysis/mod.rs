use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{ExerciseError, Result};

/// Which way the debounced state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipDirection {
    /// `false` → `true`: the signal has settled above the upper threshold.
    Rising,
    /// `true` → `false`: the signal has settled at or below the lower threshold.
    Falling,
}

/// Bounded moving average over the most recent valid angle samples.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    capacity: usize,
    samples: VecDeque<f32>,
}

impl SignalSmoother {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ExerciseError::config(
                "smoothing window must hold at least one sample",
            ));
        }

        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        })
    }

    /// Appends a sample, evicting the oldest once the window is full.
    ///
    /// Undefined and non-finite samples are ignored entirely: they neither
    /// enter the window nor push anything out of it.
    pub fn push(&mut self, sample: Option<f32>) -> Option<f32> {
        if let Some(value) = sample.filter(|value| value.is_finite()) {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(value);
        }

        self.current()
    }

    /// Mean of the buffered samples, or `None` while the window is empty.
    pub fn current(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }

        let sum: f32 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f32)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Result of feeding one smoothed value to the [`HysteresisDebouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOutcome {
    pub state: bool,
    pub flip: Option<FlipDirection>,
}

impl DebounceOutcome {
    pub fn just_flipped(&self) -> bool {
        self.flip.is_some()
    }
}

/// Turns a smoothed scalar into a binary state using a hysteresis band and a
/// consistency window.
///
/// While the state is `false` a value counts as "above" only past `upper`;
/// once `true` it stays above as long as it exceeds `lower`. The state
/// changes only when the window is full and every entry disagrees with it.
#[derive(Debug, Clone)]
pub struct HysteresisDebouncer {
    upper: f32,
    lower: f32,
    capacity: usize,
    window: VecDeque<bool>,
    state: bool,
}

impl HysteresisDebouncer {
    pub fn new(upper: f32, lower: f32, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ExerciseError::config(
                "debounce window must hold at least one frame",
            ));
        }
        if !(upper.is_finite() && lower.is_finite()) {
            return Err(ExerciseError::config("thresholds must be finite"));
        }
        if upper <= lower {
            return Err(ExerciseError::config(format!(
                "upper threshold {upper} must be greater than lower threshold {lower}"
            )));
        }

        Ok(Self {
            upper,
            lower,
            capacity,
            window: VecDeque::with_capacity(capacity),
            state: false,
        })
    }

    pub fn state(&self) -> bool {
        self.state
    }

    /// Threshold the next value is compared against.
    pub fn active_threshold(&self) -> f32 {
        if self.state {
            self.lower
        } else {
            self.upper
        }
    }

    pub fn observe(&mut self, value: f32) -> DebounceOutcome {
        let above = value > self.active_threshold();

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(above);

        let full = self.window.len() == self.capacity;
        let mut flip = None;
        if full && self.window.iter().all(|&entry| entry != self.state) {
            self.state = !self.state;
            self.window.clear();
            flip = Some(if self.state {
                FlipDirection::Rising
            } else {
                FlipDirection::Falling
            });
        }

        DebounceOutcome {
            state: self.state,
            flip,
        }
    }

    pub fn pending(&self) -> usize {
        self.window.len()
    }

    /// Clears the window and returns to the initial `false` state.
    pub fn reset(&mut self) {
        self.window.clear();
        self.state = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer(capacity: usize) -> HysteresisDebouncer {
        HysteresisDebouncer::new(165.0, 155.0, capacity).unwrap()
    }

    #[test]
    fn smoother_averages_partial_window() {
        let mut smoother = SignalSmoother::new(4).unwrap();
        assert_eq!(smoother.current(), None);

        smoother.push(Some(10.0));
        let value = smoother.push(Some(20.0)).unwrap();
        assert!((value - 15.0).abs() < 1e-6);
    }

    #[test]
    fn smoother_evicts_oldest() {
        let mut smoother = SignalSmoother::new(3).unwrap();
        for sample in [100.0, 10.0, 20.0, 30.0] {
            smoother.push(Some(sample));
        }

        assert_eq!(smoother.len(), 3);
        assert!((smoother.current().unwrap() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn smoother_ignores_undefined_samples() {
        let mut smoother = SignalSmoother::new(2).unwrap();
        smoother.push(Some(40.0));
        smoother.push(Some(60.0));
        smoother.push(None);
        smoother.push(Some(f32::NAN));

        assert_eq!(smoother.len(), 2);
        assert!((smoother.current().unwrap() - 50.0).abs() < 1e-6);

        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.push(None), None);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(SignalSmoother::new(0).is_err());
        assert!(HysteresisDebouncer::new(150.0, 150.0, 5).is_err());
        assert!(HysteresisDebouncer::new(140.0, 150.0, 5).is_err());
        assert!(HysteresisDebouncer::new(f32::INFINITY, 150.0, 5).is_err());
        assert!(HysteresisDebouncer::new(165.0, 155.0, 0).is_err());
    }

    #[test]
    fn flips_on_the_nth_consistent_sample() {
        let mut debouncer = debouncer(10);

        for _ in 0..9 {
            let outcome = debouncer.observe(170.0);
            assert!(!outcome.state);
            assert!(!outcome.just_flipped());
        }

        let outcome = debouncer.observe(170.0);
        assert!(outcome.state);
        assert_eq!(outcome.flip, Some(FlipDirection::Rising));
        assert_eq!(debouncer.pending(), 0);

        for _ in 0..30 {
            assert!(!debouncer.observe(170.0).just_flipped());
        }
    }

    #[test]
    fn interrupted_run_does_not_flip() {
        let mut debouncer = debouncer(5);
        for _ in 0..4 {
            debouncer.observe(170.0);
        }
        debouncer.observe(150.0);
        for _ in 0..4 {
            assert!(!debouncer.observe(170.0).state);
        }
        assert!(debouncer.observe(170.0).state);
    }

    #[test]
    fn hysteresis_band_holds_both_states() {
        let mut debouncer = debouncer(3);
        for _ in 0..200 {
            debouncer.observe(156.0);
            debouncer.observe(164.0);
        }
        assert!(!debouncer.state());

        for _ in 0..3 {
            debouncer.observe(170.0);
        }
        assert!(debouncer.state());
        for _ in 0..200 {
            assert!(!debouncer.observe(156.0).just_flipped());
            assert!(!debouncer.observe(164.0).just_flipped());
        }
        assert!(debouncer.state());
    }

    #[test]
    fn falls_after_sustained_drop() {
        let mut debouncer = debouncer(4);
        for _ in 0..4 {
            debouncer.observe(170.0);
        }
        assert_eq!(debouncer.active_threshold(), 155.0);

        let flips: Vec<_> = (0..4)
            .filter_map(|_| debouncer.observe(155.0).flip)
            .collect();
        assert_eq!(flips, vec![FlipDirection::Falling]);
        assert!(!debouncer.state());

        debouncer.reset();
        assert_eq!(debouncer.pending(), 0);
        assert_eq!(debouncer.active_threshold(), 165.0);
    }
}
