//! Start and reset hand gestures.
//!
//! Works purely on the hand landmarks (plus one pose reference point for the
//! start gesture) and is independent of the angle pipeline.

use serde::{Deserialize, Serialize};

use crate::{Frame, GestureConfig, Phase};

/// Control event recognised from the hand landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureEvent {
    /// A wrist was raised level with the reference landmark.
    Start,
    /// Both hands were spread apart.
    Reset,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    config: GestureConfig,
    cooldown: u32,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            cooldown: 0,
        }
    }

    /// Frames left before another reset can fire.
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown
    }

    /// Inspects one frame and reports at most one event.
    ///
    /// Reset takes precedence over start. The cooldown is armed on the frame
    /// that fires a reset and counts down on every later frame. Start is
    /// ignored while the cooldown runs.
    pub fn observe(&mut self, frame: &Frame, phase: Phase) -> Option<GestureEvent> {
        if self.cooldown == 0 && self.is_reset_pose(frame) {
            self.cooldown = self.config.reset_cooldown_frames;
            return Some(GestureEvent::Reset);
        }

        let locked = self.cooldown > 0;
        self.cooldown = self.cooldown.saturating_sub(1);

        if !locked && phase == Phase::AwaitingStart && self.is_start_pose(frame) {
            return Some(GestureEvent::Start);
        }

        None
    }

    fn is_start_pose(&self, frame: &Frame) -> bool {
        let Some(reference) = frame
            .pose
            .as_ref()
            .and_then(|pose| pose.get(self.config.start_reference))
        else {
            return false;
        };

        frame
            .wrists()
            .any(|wrist| (wrist.y - reference.y).abs() < self.config.start_tolerance)
    }

    fn is_reset_pose(&self, frame: &Frame) -> bool {
        if frame.hands.len() != 2 {
            return false;
        }

        let wrists: Vec<_> = frame.wrists().collect();
        match wrists.as_slice() {
            [first, second] => (first.x - second.x).abs() > self.config.reset_tolerance,
            _ => false,
        }
    }
}
