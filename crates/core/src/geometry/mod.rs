//! Joint angle calculation using the dot product.
//!
//! Angles are measured at the vertex of a landmark triple from the vectors
//! vertex→first and vertex→last, projected onto the image plane. Degenerate
//! triples produce no sample rather than a made-up 0° or 180°.

use serde::{Deserialize, Serialize};

use crate::{Landmark, PoseLandmark, PoseLandmarks};

/// Vectors shorter than this are treated as zero-length.
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Angle at `vertex` in degrees, within [0, 180].
///
/// Returns `None` when either arm of the angle has zero length or any input
/// coordinate is not finite.
pub fn joint_angle(first: &Landmark, vertex: &Landmark, last: &Landmark) -> Option<f32> {
    if !(first.is_finite() && vertex.is_finite() && last.is_finite()) {
        return None;
    }

    let v1 = (first.x - vertex.x, first.y - vertex.y);
    let v2 = (last.x - vertex.x, last.y - vertex.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 < MIN_SEGMENT_LENGTH || mag2 < MIN_SEGMENT_LENGTH {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Three pose landmarks whose middle entry is the measured joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriple {
    pub first: PoseLandmark,
    pub vertex: PoseLandmark,
    pub last: PoseLandmark,
}

impl JointTriple {
    pub const fn new(first: PoseLandmark, vertex: PoseLandmark, last: PoseLandmark) -> Self {
        Self {
            first,
            vertex,
            last,
        }
    }

    /// Measures the joint on `pose`. Missing or insufficiently visible
    /// landmarks yield no sample.
    pub fn measure(&self, pose: &PoseLandmarks, min_visibility: Option<f32>) -> Option<f32> {
        let lookup = |name: PoseLandmark| {
            pose.get(name)
                .filter(|point| point.is_visible(min_visibility))
        };

        let first = lookup(self.first)?;
        let vertex = lookup(self.vertex)?;
        let last = lookup(self.last)?;
        joint_angle(first, vertex, last)
    }
}

/// Mean of the defined angles across `joints`, typically a left/right pair.
///
/// A side that cannot be measured is left out. If no side can be measured the
/// whole sample is undefined.
pub fn combined_angle(
    joints: &[JointTriple],
    pose: &PoseLandmarks,
    min_visibility: Option<f32>,
) -> Option<f32> {
    let angles: Vec<f32> = joints
        .iter()
        .filter_map(|joint| joint.measure(pose, min_visibility))
        .collect();

    if angles.is_empty() {
        return None;
    }
    Some(angles.iter().sum::<f32>() / angles.len() as f32)
}
