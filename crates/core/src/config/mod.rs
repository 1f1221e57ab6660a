use serde::{Deserialize, Serialize};

use crate::{ExerciseError, FlipDirection, HoldPolicy, JointTriple, PoseLandmark, Result};

/// How the debounced posture state is turned into a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountingMode {
    /// One repetition per full posture cycle.
    #[default]
    Rep,
    /// Elapsed time while the posture is held.
    Hold,
}

/// Thresholds for the start and reset hand gestures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pose landmark a wrist must be level with to start a session.
    pub start_reference: PoseLandmark,
    /// Maximum vertical wrist/reference distance for the start gesture.
    pub start_tolerance: f32,
    /// Minimum horizontal distance between both wrists for the reset gesture.
    pub reset_tolerance: f32,
    /// Frames during which no further reset can fire.
    pub reset_cooldown_frames: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            start_reference: PoseLandmark::Nose,
            start_tolerance: 0.1,
            reset_tolerance: 0.3,
            reset_cooldown_frames: 30,
        }
    }
}

/// Immutable description of one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseConfig {
    /// Human readable label, e.g. "Push-ups".
    pub name: String,
    /// One joint, or a symmetric left/right pair whose angles are averaged.
    pub joints: Vec<JointTriple>,
    pub upper_threshold: f32,
    pub lower_threshold: f32,
    pub smoothing_window: usize,
    pub debounce_window: usize,
    pub mode: CountingMode,
    /// Flip that counts a repetition in [`CountingMode::Rep`].
    pub count_on: FlipDirection,
    pub hold_policy: HoldPolicy,
    /// Landmarks reported below this visibility are treated as missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_visibility: Option<f32>,
    pub gesture: GestureConfig,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self::plank()
    }
}

impl ExerciseConfig {
    /// Elbow flexion, counted when both arms bend past the lower threshold.
    pub fn pushup() -> Self {
        Self {
            name: "Push-ups".to_string(),
            joints: bilateral(
                [
                    PoseLandmark::LeftShoulder,
                    PoseLandmark::LeftElbow,
                    PoseLandmark::LeftWrist,
                ],
                [
                    PoseLandmark::RightShoulder,
                    PoseLandmark::RightElbow,
                    PoseLandmark::RightWrist,
                ],
            ),
            upper_threshold: 100.0,
            lower_threshold: 95.0,
            smoothing_window: 5,
            debounce_window: 3,
            mode: CountingMode::Rep,
            count_on: FlipDirection::Falling,
            hold_policy: HoldPolicy::default(),
            min_visibility: None,
            gesture: GestureConfig::default(),
        }
    }

    /// Hip flexion between torso and thighs.
    pub fn situp() -> Self {
        Self {
            name: "Sit-ups".to_string(),
            joints: bilateral(
                [
                    PoseLandmark::LeftShoulder,
                    PoseLandmark::LeftHip,
                    PoseLandmark::LeftKnee,
                ],
                [
                    PoseLandmark::RightShoulder,
                    PoseLandmark::RightHip,
                    PoseLandmark::RightKnee,
                ],
            ),
            ..Self::pushup()
        }
    }

    /// Knee flexion, counted on reaching the bottom of the squat.
    pub fn squat() -> Self {
        Self {
            name: "Squats".to_string(),
            joints: bilateral(
                [
                    PoseLandmark::LeftHip,
                    PoseLandmark::LeftKnee,
                    PoseLandmark::LeftAnkle,
                ],
                [
                    PoseLandmark::RightHip,
                    PoseLandmark::RightKnee,
                    PoseLandmark::RightAnkle,
                ],
            ),
            upper_threshold: 160.0,
            lower_threshold: 110.0,
            ..Self::pushup()
        }
    }

    /// Straight shoulder-hip-knee line held over time.
    pub fn plank() -> Self {
        Self {
            name: "Plank".to_string(),
            joints: bilateral(
                [
                    PoseLandmark::LeftShoulder,
                    PoseLandmark::LeftHip,
                    PoseLandmark::LeftKnee,
                ],
                [
                    PoseLandmark::RightShoulder,
                    PoseLandmark::RightHip,
                    PoseLandmark::RightKnee,
                ],
            ),
            upper_threshold: 165.0,
            lower_threshold: 155.0,
            smoothing_window: 15,
            debounce_window: 10,
            mode: CountingMode::Hold,
            count_on: FlipDirection::Rising,
            hold_policy: HoldPolicy::Continuous,
            min_visibility: None,
            gesture: GestureConfig::default(),
        }
    }

    /// Parses a JSON document and validates the result. Fields that are not
    /// present fall back to the plank defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.joints.is_empty() || self.joints.len() > 2 {
            return Err(ExerciseError::config(format!(
                "expected one or two joint triples, got {}",
                self.joints.len()
            )));
        }
        if self.smoothing_window == 0 {
            return Err(ExerciseError::config("smoothing_window must be positive"));
        }
        if self.debounce_window == 0 {
            return Err(ExerciseError::config("debounce_window must be positive"));
        }
        if !(self.upper_threshold.is_finite() && self.lower_threshold.is_finite()) {
            return Err(ExerciseError::config("thresholds must be finite"));
        }
        if self.upper_threshold <= self.lower_threshold {
            return Err(ExerciseError::config(format!(
                "upper_threshold ({}) must exceed lower_threshold ({})",
                self.upper_threshold, self.lower_threshold
            )));
        }
        if let Some(min) = self.min_visibility {
            if !(0.0..=1.0).contains(&min) {
                return Err(ExerciseError::config(format!(
                    "min_visibility must lie in [0, 1], got {min}"
                )));
            }
        }

        let gesture = &self.gesture;
        for (field, value) in [
            ("start_tolerance", gesture.start_tolerance),
            ("reset_tolerance", gesture.reset_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExerciseError::config(format!(
                    "{field} must be a non-negative distance, got {value}"
                )));
            }
        }

        Ok(())
    }
}

fn bilateral(left: [PoseLandmark; 3], right: [PoseLandmark; 3]) -> Vec<JointTriple> {
    [left, right]
        .into_iter()
        .map(|[first, vertex, last]| JointTriple::new(first, vertex, last))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for config in [
            ExerciseConfig::pushup(),
            ExerciseConfig::situp(),
            ExerciseConfig::squat(),
            ExerciseConfig::plank(),
        ] {
            config.validate().unwrap();
            assert_eq!(config.joints.len(), 2);
        }

        assert_eq!(ExerciseConfig::situp().name, "Sit-ups");
        assert_eq!(ExerciseConfig::squat().mode, CountingMode::Rep);
        assert_eq!(ExerciseConfig::default().mode, CountingMode::Hold);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = ExerciseConfig::pushup();
        config.upper_threshold = 90.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ExerciseError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_empty_windows_and_joints() {
        let mut config = ExerciseConfig::plank();
        config.debounce_window = 0;
        assert!(config.validate().is_err());

        let mut config = ExerciseConfig::plank();
        config.smoothing_window = 0;
        assert!(config.validate().is_err());

        let mut config = ExerciseConfig::plank();
        config.joints.clear();
        assert!(config.validate().is_err());

        let mut config = ExerciseConfig::plank();
        config.gesture.reset_tolerance = -0.1;
        assert!(config.validate().is_err());

        let mut config = ExerciseConfig::plank();
        config.min_visibility = Some(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_json() {
        let config = ExerciseConfig::from_json(
            r#"{
                "name": "Curls",
                "joints": [
                    { "first": "LEFT_SHOULDER", "vertex": "LEFT_ELBOW", "last": "LEFT_WRIST" }
                ],
                "upper_threshold": 150.0,
                "lower_threshold": 60.0,
                "mode": "REP",
                "count_on": "falling",
                "gesture": { "reset_cooldown_frames": 45 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "Curls");
        assert_eq!(config.joints.len(), 1);
        assert_eq!(config.joints[0].vertex, PoseLandmark::LeftElbow);
        assert_eq!(config.count_on, FlipDirection::Falling);
        assert_eq!(config.smoothing_window, 15);
        assert_eq!(config.gesture.reset_cooldown_frames, 45);
        assert_eq!(config.gesture.start_reference, PoseLandmark::Nose);
    }

    #[test]
    fn json_rejects_unknown_landmarks_and_bad_values() {
        let err = ExerciseConfig::from_json(
            r#"{ "joints": [ { "first": "LEFT_SHOULDER", "vertex": "LEFT_ELBOW", "last": "LEFT_PAW" } ] }"#,
        )
        .unwrap_err();
        assert!(format!("{err}").contains("LEFT_PAW"));

        let err = ExerciseConfig::from_json(r#"{ "upper_threshold": 10.0 }"#).unwrap_err();
        assert!(matches!(err, ExerciseError::InvalidConfig(_)));
    }

    #[test]
    fn serialises_with_canonical_names() {
        let json = serde_json::to_string(&ExerciseConfig::squat()).unwrap();
        assert!(json.contains("\"LEFT_KNEE\""));
        assert!(json.contains("\"REP\""));

        let parsed = ExerciseConfig::from_json(&json).unwrap();
        assert_eq!(parsed.joints, ExerciseConfig::squat().joints);
    }
}
