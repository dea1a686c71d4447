//! Per-run configuration for the import and export pipelines.
//!
//! One immutable struct per operation, constructed before the pipeline
//! runs and validated up front; individual options are never threaded
//! loosely through the call chain.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::transform::SpaceConversion;

const SCALE_MIN: f32 = 0.001;
const SCALE_MAX: f32 = 1000.0;
const FRAME_RATE_MIN: f32 = 1.0;
const FRAME_RATE_MAX: f32 = 120.0;
const STRIDE_MIN: u32 = 1;
const STRIDE_MAX: u32 = 100;

/// Which coordinate system the recording side of a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Host Z-up space; import converts, export keeps.
    Host,
    /// WebXR Y-up space; import keeps, export converts.
    Webxr,
}

impl FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Ok(CoordinateSystem::Host),
            "webxr" => Ok(CoordinateSystem::Webxr),
            other => Err(format!("unknown coordinate system '{other}' (host, webxr)")),
        }
    }
}

/// Frame-sampling strategy for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Only frames that carry a keyframe on some channel.
    Keyframes,
    /// Every integer frame in the scene range.
    #[default]
    AllFrames,
    /// Every Nth frame in the scene range.
    CustomRate,
}

impl FromStr for SampleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyframes" => Ok(SampleMode::Keyframes),
            "all-frames" | "all" => Ok(SampleMode::AllFrames),
            "custom-rate" | "custom" => Ok(SampleMode::CustomRate),
            other => Err(format!(
                "unknown sample mode '{other}' (keyframes, all-frames, custom-rate)"
            )),
        }
    }
}

/// WebXR reference space recorded in the export envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceSpace {
    #[default]
    LocalFloor,
    Local,
    BoundedFloor,
    Unbounded,
    Viewer,
}

impl ReferenceSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSpace::LocalFloor => "local-floor",
            ReferenceSpace::Local => "local",
            ReferenceSpace::BoundedFloor => "bounded-floor",
            ReferenceSpace::Unbounded => "unbounded",
            ReferenceSpace::Viewer => "viewer",
        }
    }
}

impl fmt::Display for ReferenceSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-floor" => Ok(ReferenceSpace::LocalFloor),
            "local" => Ok(ReferenceSpace::Local),
            "bounded-floor" => Ok(ReferenceSpace::BoundedFloor),
            "unbounded" => Ok(ReferenceSpace::Unbounded),
            "viewer" => Ok(ReferenceSpace::Viewer),
            other => Err(format!("unknown reference space '{other}'")),
        }
    }
}

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Create a new camera object for the animation.
    pub create_camera: bool,
    /// Apply the animation to the active camera instead.
    pub use_existing_camera: bool,
    /// Position scale; WebXR records meters, adjust for scene scale.
    pub scale_factor: f32,
    /// Target space of the recording. `Host` converts Y-up to Z-up,
    /// `Webxr` keeps the recording's own axes.
    pub coordinate_system: CoordinateSystem,
    /// Re-base poses relative to the camera's pre-import pose.
    pub apply_deltas: bool,
    /// Keyframe conversion rate in frames per second.
    pub frame_rate: f32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            create_camera: true,
            use_existing_camera: false,
            scale_factor: 1.0,
            coordinate_system: CoordinateSystem::Host,
            apply_deltas: false,
            frame_rate: 30.0,
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_scale(self.scale_factor)?;
        if !self.frame_rate.is_finite()
            || self.frame_rate < FRAME_RATE_MIN
            || self.frame_rate > FRAME_RATE_MAX
        {
            return Err(PipelineError::InvalidConfig(format!(
                "frame rate {} outside [{FRAME_RATE_MIN}, {FRAME_RATE_MAX}]",
                self.frame_rate
            )));
        }
        Ok(())
    }

    pub(crate) fn conversion(&self) -> SpaceConversion {
        match self.coordinate_system {
            CoordinateSystem::Host => SpaceConversion::WebxrToHost,
            CoordinateSystem::Webxr => SpaceConversion::Keep,
        }
    }
}

/// Options for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Export the scene's active camera; otherwise the first selected one.
    pub export_active_camera: bool,
    /// Inverse of the import scale.
    pub scale_factor: f32,
    /// Output space. `Webxr` converts Z-up back to Y-up, `Host` keeps
    /// scene axes.
    pub coordinate_system: CoordinateSystem,
    pub sample_mode: SampleMode,
    /// Stride for [`SampleMode::CustomRate`].
    pub custom_sample_rate: u32,
    /// Include position data in the output.
    pub export_position: bool,
    /// Reference space written into the envelope.
    pub reference_space_type: ReferenceSpace,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_active_camera: true,
            scale_factor: 1.0,
            coordinate_system: CoordinateSystem::Webxr,
            sample_mode: SampleMode::AllFrames,
            custom_sample_rate: 1,
            export_position: true,
            reference_space_type: ReferenceSpace::LocalFloor,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_scale(self.scale_factor)?;
        if !(STRIDE_MIN..=STRIDE_MAX).contains(&self.custom_sample_rate) {
            return Err(PipelineError::InvalidConfig(format!(
                "sample stride {} outside [{STRIDE_MIN}, {STRIDE_MAX}]",
                self.custom_sample_rate
            )));
        }
        Ok(())
    }

    pub(crate) fn conversion(&self) -> SpaceConversion {
        match self.coordinate_system {
            CoordinateSystem::Webxr => SpaceConversion::HostToWebxr,
            CoordinateSystem::Host => SpaceConversion::Keep,
        }
    }
}

fn validate_scale(factor: f32) -> Result<(), PipelineError> {
    if !factor.is_finite() || factor < SCALE_MIN || factor > SCALE_MAX {
        return Err(PipelineError::InvalidConfig(format!(
            "scale factor {factor} outside [{SCALE_MIN}, {SCALE_MAX}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ImportConfig::default().validate().unwrap();
        ExportConfig::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_scale_rejected() {
        let config = ImportConfig {
            scale_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));

        let config = ExportConfig {
            scale_factor: -2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_frame_rate_rejected() {
        let config = ImportConfig {
            frame_rate: 240.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_stride_rejected() {
        let config = ExportConfig {
            custom_sample_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn enums_parse_from_cli_strings() {
        assert_eq!("host".parse::<CoordinateSystem>().unwrap(), CoordinateSystem::Host);
        assert_eq!("keyframes".parse::<SampleMode>().unwrap(), SampleMode::Keyframes);
        assert_eq!(
            "bounded-floor".parse::<ReferenceSpace>().unwrap(),
            ReferenceSpace::BoundedFloor
        );
        assert!("outer-space".parse::<ReferenceSpace>().is_err());
    }
}
