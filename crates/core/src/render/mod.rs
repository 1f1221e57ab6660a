use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CountingMode, ExerciseConfig, GestureEvent, Phase, Posture, Reading, Telemetry};

/// Frames a gesture message stays on screen (about two seconds at 30 fps).
pub const DEFAULT_MESSAGE_FRAMES: u32 = 60;

const START_PROMPT: &str = "Raise a hand to head height to start";

/// Region of the overlay a line of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlaySlot {
    Prompt,
    Counter,
    /// Exercise name shown while a hold posture is being held.
    Status,
    Angle,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayText {
    pub slot: OverlaySlot,
    pub text: String,
}

/// Gesture message waiting to be shown, with its remaining lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub remaining_frames: u32,
}

/// Turns per-frame [`Telemetry`] into text for the video overlay.
///
/// The message countdown lives here rather than in the session because it is
/// purely a display concern. Nothing is drawn; callers place the returned
/// lines themselves.
#[derive(Debug, Clone)]
pub struct Overlay {
    label: String,
    mode: CountingMode,
    message_frames: u32,
    notice: Option<Notice>,
}

impl Overlay {
    pub fn new(config: &ExerciseConfig) -> Self {
        Self {
            label: config.name.clone(),
            mode: config.mode,
            message_frames: DEFAULT_MESSAGE_FRAMES,
            notice: None,
        }
    }

    pub fn with_message_frames(mut self, frames: u32) -> Self {
        self.message_frames = frames;
        self
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn compose(&mut self, telemetry: &Telemetry) -> Vec<OverlayText> {
        if let Some(event) = telemetry.event {
            let text = match event {
                GestureEvent::Start => format!("{} started", self.label),
                GestureEvent::Reset => "Counter Reset".to_string(),
            };
            self.notice = (self.message_frames > 0).then_some(Notice {
                text,
                remaining_frames: self.message_frames,
            });
        }

        let mut lines = Vec::with_capacity(5);
        if telemetry.phase == Phase::AwaitingStart {
            lines.push(line(OverlaySlot::Prompt, START_PROMPT));
        }

        let counter = match telemetry.reading {
            Reading::Reps(count) => format!("{}: {count}", self.label),
            Reading::Hold(duration) => format!("{} {}", self.label, format_hold(duration)),
        };
        lines.push(line(OverlaySlot::Counter, counter));

        let holding = telemetry.phase == Phase::Active && telemetry.posture == Posture::Up;
        if self.mode == CountingMode::Hold && holding {
            lines.push(line(OverlaySlot::Status, self.label.to_uppercase()));
        }

        if let Some(angle) = telemetry.smoothed_angle {
            lines.push(line(OverlaySlot::Angle, format!("{angle:.0}°")));
        }

        if let Some(notice) = self.notice.as_mut() {
            lines.push(line(OverlaySlot::Message, notice.text.clone()));
            notice.remaining_frames -= 1;
            if notice.remaining_frames == 0 {
                self.notice = None;
            }
        }

        lines
    }
}

/// Formats a hold duration as `mm:ss`. Minutes keep growing past 59.
pub fn format_hold(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn line(slot: OverlaySlot, text: impl Into<String>) -> OverlayText {
    OverlayText {
        slot,
        text: text.into(),
    }
}
