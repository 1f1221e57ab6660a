//! Canonical landmark naming and the per-frame landmark containers.
//!
//! Detectors emit keypoints as index-ordered arrays. Everything downstream of
//! this module addresses them by name instead, so configuration can refer to
//! `LEFT_SHOULDER` rather than `11` and typos are caught when the
//! configuration is parsed.

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ExerciseError, Result};

/// Shared behaviour of the pose and hand name enumerations.
pub trait LandmarkName: Copy + Ord + fmt::Debug + 'static {
    /// Every name in detector index order.
    fn all() -> &'static [Self];

    /// Canonical `SCREAMING_SNAKE_CASE` name.
    fn name(self) -> &'static str;

    /// Position of the landmark in the detector's output array.
    fn index(self) -> usize;

    fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }
}

macro_rules! landmark_names {
    ($(#[$meta:meta])* $ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
        pub enum $ty {
            $($variant),+
        }

        impl LandmarkName for $ty {
            fn all() -> &'static [Self] {
                &[$($ty::$variant),+]
            }

            fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ExerciseError;

            fn from_str(value: &str) -> Result<Self> {
                let wanted = value.trim();
                Self::all()
                    .iter()
                    .copied()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ExerciseError::UnknownLandmark(value.to_string()))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ExerciseError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }
    };
}

landmark_names! {
    /// The 33 keypoints of the full-body pose topology.
    PoseLandmark {
        Nose => "NOSE",
        LeftEyeInner => "LEFT_EYE_INNER",
        LeftEye => "LEFT_EYE",
        LeftEyeOuter => "LEFT_EYE_OUTER",
        RightEyeInner => "RIGHT_EYE_INNER",
        RightEye => "RIGHT_EYE",
        RightEyeOuter => "RIGHT_EYE_OUTER",
        LeftEar => "LEFT_EAR",
        RightEar => "RIGHT_EAR",
        MouthLeft => "MOUTH_LEFT",
        MouthRight => "MOUTH_RIGHT",
        LeftShoulder => "LEFT_SHOULDER",
        RightShoulder => "RIGHT_SHOULDER",
        LeftElbow => "LEFT_ELBOW",
        RightElbow => "RIGHT_ELBOW",
        LeftWrist => "LEFT_WRIST",
        RightWrist => "RIGHT_WRIST",
        LeftPinky => "LEFT_PINKY",
        RightPinky => "RIGHT_PINKY",
        LeftIndex => "LEFT_INDEX",
        RightIndex => "RIGHT_INDEX",
        LeftThumb => "LEFT_THUMB",
        RightThumb => "RIGHT_THUMB",
        LeftHip => "LEFT_HIP",
        RightHip => "RIGHT_HIP",
        LeftKnee => "LEFT_KNEE",
        RightKnee => "RIGHT_KNEE",
        LeftAnkle => "LEFT_ANKLE",
        RightAnkle => "RIGHT_ANKLE",
        LeftHeel => "LEFT_HEEL",
        RightHeel => "RIGHT_HEEL",
        LeftFootIndex => "LEFT_FOOT_INDEX",
        RightFootIndex => "RIGHT_FOOT_INDEX",
    }
}

landmark_names! {
    /// The 21 keypoints of a single tracked hand.
    HandLandmark {
        Wrist => "WRIST",
        ThumbCmc => "THUMB_CMC",
        ThumbMcp => "THUMB_MCP",
        ThumbIp => "THUMB_IP",
        ThumbTip => "THUMB_TIP",
        IndexFingerMcp => "INDEX_FINGER_MCP",
        IndexFingerPip => "INDEX_FINGER_PIP",
        IndexFingerDip => "INDEX_FINGER_DIP",
        IndexFingerTip => "INDEX_FINGER_TIP",
        MiddleFingerMcp => "MIDDLE_FINGER_MCP",
        MiddleFingerPip => "MIDDLE_FINGER_PIP",
        MiddleFingerDip => "MIDDLE_FINGER_DIP",
        MiddleFingerTip => "MIDDLE_FINGER_TIP",
        RingFingerMcp => "RING_FINGER_MCP",
        RingFingerPip => "RING_FINGER_PIP",
        RingFingerDip => "RING_FINGER_DIP",
        RingFingerTip => "RING_FINGER_TIP",
        PinkyMcp => "PINKY_MCP",
        PinkyPip => "PINKY_PIP",
        PinkyDip => "PINKY_DIP",
        PinkyTip => "PINKY_TIP",
    }
}

/// A single keypoint in normalised image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth, when the detector provides one. Angles ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detector confidence in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Returns `false` only when both a minimum and a visibility are known
    /// and the visibility falls short. Landmarks without a confidence signal
    /// are trusted.
    pub fn is_visible(&self, min_visibility: Option<f32>) -> bool {
        match (min_visibility, self.visibility) {
            (Some(min), Some(visibility)) => visibility >= min,
            _ => true,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Name-addressed set of landmarks belonging to one tracked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    transparent,
    bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de> + Ord")
)]
pub struct LandmarkSet<K> {
    points: BTreeMap<K, Landmark>,
}

/// Landmarks of the single tracked body.
pub type PoseLandmarks = LandmarkSet<PoseLandmark>;

/// Landmarks of one tracked hand.
pub type HandLandmarks = LandmarkSet<HandLandmark>;

impl<K: LandmarkName> LandmarkSet<K> {
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Converts a detector's index-ordered output. Entries beyond the known
    /// topology are dropped.
    pub fn from_indexed(points: &[Landmark]) -> Self {
        points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| K::from_index(index).map(|name| (name, *point)))
            .collect()
    }

    pub fn insert(&mut self, name: K, landmark: Landmark) {
        self.points.insert(name, landmark);
    }

    pub fn with(mut self, name: K, landmark: Landmark) -> Self {
        self.insert(name, landmark);
        self
    }

    pub fn get(&self, name: K) -> Option<&Landmark> {
        self.points.get(&name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<K: LandmarkName> Default for LandmarkSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LandmarkName> FromIterator<(K, Landmark)> for LandmarkSet<K> {
    fn from_iter<I: IntoIterator<Item = (K, Landmark)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Everything the detector produced for one video frame.
///
/// `pose` is `None` when no body was found. `hands` holds zero, one or two
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time on the host's monotonic clock.
    #[serde(default)]
    pub timestamp: Duration,
    #[serde(default)]
    pub pose: Option<PoseLandmarks>,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl Frame {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn with_pose(mut self, pose: PoseLandmarks) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_hand(mut self, hand: HandLandmarks) -> Self {
        self.hands.push(hand);
        self
    }

    /// Wrist positions of every tracked hand that reported one.
    pub fn wrists(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.hands
            .iter()
            .filter_map(|hand| hand.get(HandLandmark::Wrist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_detector_order() {
        assert_eq!(PoseLandmark::Nose.index(), 0);
        assert_eq!(PoseLandmark::LeftShoulder.index(), 11);
        assert_eq!(PoseLandmark::RightHip.index(), 24);
        assert_eq!(PoseLandmark::RightFootIndex.index(), 32);
        assert_eq!(PoseLandmark::all().len(), 33);
        assert_eq!(HandLandmark::all().len(), 21);
        assert_eq!(HandLandmark::from_index(0), Some(HandLandmark::Wrist));
        assert_eq!(HandLandmark::from_index(21), None);
    }

    #[test]
    fn parses_canonical_names() {
        assert_eq!(
            "left_shoulder".parse::<PoseLandmark>().unwrap(),
            PoseLandmark::LeftShoulder
        );
        assert_eq!(PoseLandmark::LeftEyeInner.to_string(), "LEFT_EYE_INNER");

        let err = "LEFT_ELBOWW".parse::<PoseLandmark>().unwrap_err();
        assert!(matches!(err, ExerciseError::UnknownLandmark(_)));
        assert!(format!("{err}").contains("LEFT_ELBOWW"));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&PoseLandmark::RightKnee).unwrap();
        assert_eq!(json, "\"RIGHT_KNEE\"");

        let parsed: HandLandmark = serde_json::from_str("\"INDEX_FINGER_TIP\"").unwrap();
        assert_eq!(parsed, HandLandmark::IndexFingerTip);

        assert!(serde_json::from_str::<HandLandmark>("\"KNUCKLE\"").is_err());
    }

    #[test]
    fn converts_indexed_detector_output() {
        let raw: Vec<Landmark> = (0..40)
            .map(|i| Landmark::new(i as f32 / 40.0, 0.5))
            .collect();
        let pose = PoseLandmarks::from_indexed(&raw);

        assert_eq!(pose.len(), 33);
        let elbow = pose.get(PoseLandmark::LeftElbow).unwrap();
        assert!((elbow.x - 13.0 / 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn visibility_gate_trusts_missing_confidence() {
        let point = Landmark::new(0.2, 0.3);
        assert!(point.is_visible(Some(0.5)));
        assert!(!point.with_visibility(0.2).is_visible(Some(0.5)));
        assert!(point.with_visibility(0.2).is_visible(None));
    }

    #[test]
    fn frame_round_trips_through_json() {
        let frame = Frame::new(Duration::from_millis(40))
            .with_pose(PoseLandmarks::new().with(PoseLandmark::Nose, Landmark::new(0.5, 0.2)))
            .with_hand(HandLandmarks::new().with(HandLandmark::Wrist, Landmark::new(0.4, 0.21)));

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"NOSE\""));
        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
        assert_eq!(parsed.wrists().count(), 1);
    }
}
