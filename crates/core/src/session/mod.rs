//! Per-exercise state machine.
//!
//! One [`ExerciseSession`] is built per exercise activation and driven with
//! one [`ExerciseSession::update`] call per detector frame. Every call runs
//! the whole pipeline synchronously: gestures, joint angle, smoothing,
//! debouncing and finally the rep counter or hold timer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    combined_angle, CountingMode, DebounceOutcome, ExerciseConfig, FlipDirection, Frame,
    GestureController, GestureEvent, HoldTimer, HysteresisDebouncer, Result, SignalSmoother,
};

/// Lifecycle of a session. There is no terminal phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    AwaitingStart,
    Active,
}

/// Debounced posture. `Up` is the extended posture (signal above the
/// thresholds), `Down` the contracted one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Up,
    #[default]
    Down,
}

impl From<bool> for Posture {
    fn from(state: bool) -> Self {
        if state {
            Posture::Up
        } else {
            Posture::Down
        }
    }
}

/// Count or duration, depending on the counting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Reps(u32),
    Hold(Duration),
}

/// Read-only snapshot handed to the renderer after every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub timestamp: Duration,
    pub phase: Phase,
    pub reading: Reading,
    pub posture: Posture,
    /// Current smoothed joint angle in degrees.
    pub smoothed_angle: Option<f32>,
    /// Gesture recognised on this frame, if any.
    pub event: Option<GestureEvent>,
    /// Posture change confirmed on this frame, if any.
    pub flip: Option<FlipDirection>,
}

/// Rep counter or hold timer for one exercise, driven one frame at a time.
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    config: ExerciseConfig,
    gestures: GestureController,
    smoother: SignalSmoother,
    debouncer: HysteresisDebouncer,
    hold: HoldTimer,
    phase: Phase,
    reps: u32,
    started_at: Option<Duration>,
}

impl ExerciseSession {
    /// Validates `config` and builds a session waiting for the start gesture.
    pub fn new(config: ExerciseConfig) -> Result<Self> {
        config.validate()?;

        let smoother = SignalSmoother::new(config.smoothing_window)?;
        let debouncer = HysteresisDebouncer::new(
            config.upper_threshold,
            config.lower_threshold,
            config.debounce_window,
        )?;

        tracing::info!(
            exercise = %config.name,
            mode = ?config.mode,
            upper = config.upper_threshold,
            lower = config.lower_threshold,
            "exercise session created"
        );

        Ok(Self {
            gestures: GestureController::new(config.gesture.clone()),
            hold: HoldTimer::new(config.hold_policy),
            smoother,
            debouncer,
            phase: Phase::AwaitingStart,
            reps: 0,
            started_at: None,
            config,
        })
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn posture(&self) -> Posture {
        self.debouncer.state().into()
    }

    pub fn smoothed_angle(&self) -> Option<f32> {
        self.smoother.current()
    }

    /// Timestamp of the frame that started the current activity.
    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    /// Accumulated hold time as of `now`.
    pub fn hold_duration(&self, now: Duration) -> Duration {
        self.hold.elapsed(now)
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.gestures.cooldown_remaining()
    }

    /// Runs one frame through the pipeline and returns the resulting telemetry.
    ///
    /// Frames without a pose still tick the gesture cooldown. They leave the
    /// angle pipeline and posture untouched.
    pub fn update(&mut self, frame: &Frame) -> Telemetry {
        let now = frame.timestamp;
        let event = self.gestures.observe(frame, self.phase);
        match event {
            Some(GestureEvent::Reset) => {
                tracing::info!(exercise = %self.config.name, reps = self.reps, "reset gesture");
                self.reset();
            }
            Some(GestureEvent::Start) => {
                tracing::info!(exercise = %self.config.name, "start gesture");
                self.start(now);
            }
            None => {}
        }

        let mut flip = None;
        if self.phase == Phase::Active {
            match frame.pose.as_ref() {
                Some(pose) => {
                    let sample =
                        combined_angle(&self.config.joints, pose, self.config.min_visibility);
                    self.smoother.push(sample);

                    // Only frames that contributed a sample may move the debouncer.
                    if let (Some(_), Some(smoothed)) = (sample, self.smoother.current()) {
                        let outcome = self.debouncer.observe(smoothed);
                        self.apply(outcome, smoothed, now);
                        flip = outcome.flip;
                    }
                }
                None => tracing::trace!(?now, "no pose in frame"),
            }
        }

        Telemetry {
            timestamp: now,
            phase: self.phase,
            reading: self.reading(now),
            posture: self.posture(),
            smoothed_angle: self.smoother.current(),
            event,
            flip,
        }
    }

    /// Enters [`Phase::Active`] with empty buffers. Repeated calls restart the
    /// activity at `now`.
    pub fn start(&mut self, now: Duration) {
        self.clear_pipeline();
        self.phase = Phase::Active;
        self.started_at = Some(now);
    }

    /// Returns to [`Phase::AwaitingStart`] and zeroes every counter. The
    /// gesture cooldown is left alone. Calling it twice is harmless.
    pub fn reset(&mut self) {
        self.clear_pipeline();
        self.phase = Phase::AwaitingStart;
        self.reps = 0;
        self.started_at = None;
    }

    /// Current reading as of `now`.
    pub fn reading(&self, now: Duration) -> Reading {
        match self.config.mode {
            CountingMode::Rep => Reading::Reps(self.reps),
            CountingMode::Hold => Reading::Hold(self.hold.elapsed(now)),
        }
    }

    fn apply(&mut self, outcome: DebounceOutcome, smoothed: f32, now: Duration) {
        let Some(direction) = outcome.flip else {
            return;
        };
        tracing::debug!(?direction, angle = smoothed, "posture flipped");

        match self.config.mode {
            CountingMode::Rep => {
                if direction == self.config.count_on {
                    self.reps = self.reps.saturating_add(1);
                    tracing::debug!(reps = self.reps, "repetition counted");
                }
            }
            CountingMode::Hold => match direction {
                FlipDirection::Rising => {
                    self.hold.start_segment(now);
                    tracing::debug!(?now, "hold segment started");
                }
                FlipDirection::Falling => {
                    self.hold.pause(now);
                    tracing::debug!(held = ?self.hold.elapsed(now), "hold paused");
                }
            },
        }
    }

    fn clear_pipeline(&mut self) {
        self.smoother.reset();
        self.debouncer.reset();
        self.hold.reset();
    }
}
