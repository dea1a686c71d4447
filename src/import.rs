//! Import pipeline: WebXR recording JSON -> host keyframes.
//!
//! Parses a recording, drives the transform core per frame, and writes the
//! result as location/rotation keyframes on a camera object, mapping
//! timestamps onto the host's 1-based frame indices.

use std::path::Path;

use crate::clip::{parse_clip, AnimationClip};
use crate::config::ImportConfig;
use crate::error::{Outcome, PipelineError};
use crate::host::{CameraHandle, Channel, HostScene, Interpolation, PropertyValue, RotationMode};
use crate::transform::{apply_scale, convert_space, rebase_delta, DeltaBasis, Pose};

/// What an import run produced.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub camera: CameraHandle,
    pub frame_count: usize,
    pub duration: f32,
    pub frame_end: i32,
}

/// Map a timestamp to the host's 1-based frame index.
fn frame_index(t: f32, frame_rate: f32) -> i32 {
    (t * frame_rate) as i32 + 1
}

/// Resolve or create the camera the animation lands on.
fn resolve_target<H: HostScene>(
    host: &mut H,
    config: &ImportConfig,
) -> Result<CameraHandle, PipelineError> {
    if config.use_existing_camera {
        if let Some(camera) = host.active_camera() {
            return Ok(camera);
        }
    }
    if config.create_camera || host.active_camera().is_none() {
        let camera = host.create_camera("WebXR_Camera");
        host.set_active_camera(camera);
        return Ok(camera);
    }
    Err(PipelineError::TargetUnavailable)
}

/// Write a parsed recording onto a host camera as keyframes.
///
/// `source_name` is the recording's file name; it names the created track
/// and is persisted as provenance on the camera.
pub fn import_clip<H: HostScene>(
    host: &mut H,
    clip: &AnimationClip,
    config: &ImportConfig,
    source_name: &str,
) -> Result<ImportSummary, PipelineError> {
    config.validate()?;
    if clip.frames.is_empty() {
        return Err(PipelineError::EmptyFrames);
    }

    let camera = resolve_target(host, config)?;
    let conversion = config.conversion();

    let duration = clip.duration();
    let frame_end = ((duration * config.frame_rate) as i32).max(1);
    host.set_frame_range(1, frame_end);
    host.set_fps(config.frame_rate);

    // Captured before any overwrite; the first frame's pose is taken as
    // parsed off the wire, pre-conversion.
    let basis = if config.apply_deltas {
        Some(DeltaBasis {
            initial_position: host.location(camera),
            initial_rotation: host.rotation(camera),
            first_frame_position: clip.frames[0].position(),
            first_frame_rotation: clip.frames[0].rotation(),
        })
    } else {
        None
    };

    host.set_rotation_mode(camera, RotationMode::Quaternion);
    host.clear_animation(camera);

    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);
    host.create_animation(camera, &format!("WebXR_Anim_{stem}"));

    for sample in &clip.frames {
        let frame = frame_index(sample.t, config.frame_rate);

        let mut pose = convert_space(
            Pose::new(sample.position(), sample.rotation()),
            conversion,
        );
        pose.position = apply_scale(pose.position, config.scale_factor, false);
        if let Some(basis) = &basis {
            pose = rebase_delta(pose, basis, conversion);
        }

        host.set_current_frame(frame);
        host.set_location(camera, pose.position);
        host.set_rotation(camera, pose.rotation);
        host.insert_keyframe(camera, Channel::Location, frame);
        host.insert_keyframe(camera, Channel::Rotation, frame);
    }

    // Smooth interpolation with clamped handles keeps the motion free of
    // overshoot between sparse keys.
    host.set_interpolation(camera, Interpolation::BezierAutoClamped);
    host.set_current_frame(1);

    host.set_property(
        camera,
        "webxr_animation_source",
        PropertyValue::Text(source_name.to_string()),
    );
    host.set_property(
        camera,
        "webxr_animation_duration",
        PropertyValue::Float(duration),
    );
    host.set_property(
        camera,
        "webxr_animation_frames",
        PropertyValue::Int(clip.frames.len() as i64),
    );
    if let Some(space) = &clip.reference_space_type {
        host.set_property(
            camera,
            "webxr_reference_space",
            PropertyValue::Text(space.clone()),
        );
    }

    host.set_active_camera(camera);

    tracing::info!(
        "Imported {} frames onto '{}' ({:.2}s at {} fps, frames 1-{})",
        clip.frames.len(),
        host.camera_name(camera),
        duration,
        config.frame_rate,
        frame_end
    );

    Ok(ImportSummary {
        camera,
        frame_count: clip.frames.len(),
        duration,
        frame_end,
    })
}

/// File-level import command: read, parse, import, report.
///
/// Every failure is folded into the returned [`Outcome`]; this never
/// panics or propagates an error to the host process.
pub fn import_file<H: HostScene>(host: &mut H, path: &Path, config: &ImportConfig) -> Outcome {
    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("animation")
        .to_string();

    let result = std::fs::read_to_string(path)
        .map_err(PipelineError::from)
        .and_then(|text| parse_clip(&text))
        .and_then(|clip| import_clip(host, &clip, config, &source_name));

    Outcome::from_result(result, |summary| {
        let stem = Path::new(&source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&source_name)
            .to_string();
        format!("Imported {} frames from '{}'", summary.frame_count, stem)
    })
}
