//! WebXR recording wire format.
//!
//! A recording is a JSON object with a `frames` array of timestamped pose
//! samples plus optional reference-space and metadata fields:
//!
//! ```json
//! {
//!   "frames": [{"t": 0.0333, "q": [0, 0, 0, 1], "p": [0, 1.6, 0]}],
//!   "referenceSpaceType": "local-floor",
//!   "metadata": {}
//! }
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One recorded camera sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseSample {
    /// Seconds since the start of the recording. Strictly increasing
    /// across a sequence (assumed, not enforced).
    pub t: f32,
    /// Rotation quaternion in x, y, z, w wire order.
    pub q: [f32; 4],
    /// Position in meters. Recordings without positional tracking omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<[f32; 3]>,
}

impl PoseSample {
    /// Wire quaternion as a glam rotation.
    pub fn rotation(&self) -> Quat {
        Quat::from_xyzw(self.q[0], self.q[1], self.q[2], self.q[3])
    }

    /// Wire position, defaulting to the origin when absent.
    pub fn position(&self) -> Vec3 {
        self.p.map(Vec3::from).unwrap_or(Vec3::ZERO)
    }
}

/// A full recording: ordered pose samples plus envelope fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationClip {
    pub frames: Vec<PoseSample>,
    #[serde(
        default,
        rename = "referenceSpaceType",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_space_type: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl AnimationClip {
    /// Total duration in seconds: the last frame's timestamp.
    pub fn duration(&self) -> f32 {
        self.frames.last().map(|f| f.t).unwrap_or(0.0)
    }
}

/// Decode and structurally validate recording JSON.
///
/// Distinguishes the three input failure classes: syntax errors
/// ([`PipelineError::Parse`]), a missing or non-array `frames` field
/// ([`PipelineError::MissingFrames`]), and an empty `frames` array
/// ([`PipelineError::EmptyFrames`]). Anything deeper than structure
/// (timestamp ordering, quaternion magnitude) is assumed valid.
pub fn parse_clip(text: &str) -> Result<AnimationClip, PipelineError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    match value.get("frames") {
        Some(serde_json::Value::Array(_)) => {}
        _ => return Err(PipelineError::MissingFrames),
    }

    let clip: AnimationClip = serde_json::from_value(value)?;
    if clip.frames.is_empty() {
        return Err(PipelineError::EmptyFrames);
    }
    Ok(clip)
}
