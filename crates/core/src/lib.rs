//! Core library for the exercise tracker.
//!
//! The crate turns per-frame pose and hand landmarks into exercise telemetry:
//! a repetition count or a hold duration, plus start and reset hand gestures.
//! Each module owns one stage of the per-frame pipeline (landmark naming,
//! joint geometry, smoothing and debouncing, gestures, the session state
//! machine) and [`render`] turns the resulting telemetry into overlay text.
//! Camera capture, landmark detection and drawing are left to the host.

pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod render;
pub mod session;
pub mod timeline;

pub use analysis::{DebounceOutcome, FlipDirection, HysteresisDebouncer, SignalSmoother};
pub use config::{CountingMode, ExerciseConfig, GestureConfig};
pub use error::{ExerciseError, Result};
pub use geometry::{combined_angle, joint_angle, JointTriple};
pub use gesture::{GestureController, GestureEvent};
pub use landmarks::{
    Frame, HandLandmark, HandLandmarks, Landmark, LandmarkName, LandmarkSet, PoseLandmark,
    PoseLandmarks,
};
pub use render::{format_hold, Notice, Overlay, OverlaySlot, OverlayText};
pub use session::{ExerciseSession, Phase, Posture, Reading, Telemetry};
pub use timeline::{HoldPolicy, HoldTimer};
