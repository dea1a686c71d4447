//! Export pipeline: host keyframes -> WebXR recording JSON.
//!
//! Samples a camera's animation at selected frames by moving the playhead
//! (so the host materializes interpolated poses), drives the transform
//! core in reverse, and serializes the result with the metadata envelope.

use std::path::Path;

use hashbrown::HashSet;

use crate::clip::{AnimationClip, PoseSample};
use crate::config::{ExportConfig, SampleMode};
use crate::error::{Outcome, PipelineError};
use crate::host::{CameraHandle, Channel, HostScene, PlaybackScope, PropertyValue, RotationMode};
use crate::transform::{apply_scale, convert_space, Pose};

/// Round to a fixed number of decimal places for the wire format.
fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round() / scale
}

fn resolve_source<H: HostScene>(
    host: &H,
    config: &ExportConfig,
) -> Result<CameraHandle, PipelineError> {
    let camera = if config.export_active_camera {
        host.active_camera()
    } else {
        host.first_selected_camera()
    };
    camera.ok_or(PipelineError::SourceUnavailable)
}

/// Which frames get sampled, per the configured strategy.
fn select_frames<H: HostScene>(
    host: &H,
    camera: CameraHandle,
    config: &ExportConfig,
) -> Vec<i32> {
    let (start, end) = host.frame_range();
    match config.sample_mode {
        SampleMode::Keyframes => {
            let mut distinct: HashSet<i32> = HashSet::new();
            for channel in [Channel::Location, Channel::Rotation] {
                distinct.extend(host.channel_keyframes(camera, channel));
            }
            let mut frames: Vec<i32> = distinct.into_iter().collect();
            frames.sort_unstable();
            frames
        }
        SampleMode::AllFrames => (start..=end).collect(),
        SampleMode::CustomRate => (start..=end)
            .step_by(config.custom_sample_rate as usize)
            .collect(),
    }
}

/// Read a camera's animation back out as a recording.
pub fn export_clip<H: HostScene>(
    host: &mut H,
    config: &ExportConfig,
) -> Result<AnimationClip, PipelineError> {
    config.validate()?;

    let camera = resolve_source(host, config)?;
    if !host.has_animation(camera) {
        return Err(PipelineError::NoAnimation);
    }

    let frames_to_sample = select_frames(host, camera, config);
    let (frame_start, frame_end) = host.frame_range();
    let fps = host.fps();
    let conversion = config.conversion();

    let mut frames = Vec::with_capacity(frames_to_sample.len());
    {
        // Playhead and rotation mode restore on scope drop, success or not.
        let mut scope = PlaybackScope::new(host, camera);
        scope.host().set_rotation_mode(camera, RotationMode::Quaternion);

        for frame in frames_to_sample {
            let host = scope.host();
            host.set_current_frame(frame);

            let pose = convert_space(
                Pose::new(host.location(camera), host.rotation(camera)),
                conversion,
            );
            let position = apply_scale(pose.position, config.scale_factor, true);

            let t = (frame - frame_start) as f32 / fps;
            let q = pose.rotation;
            frames.push(PoseSample {
                t: round_to(t, 4),
                q: [
                    round_to(q.x, 6),
                    round_to(q.y, 6),
                    round_to(q.z, 6),
                    round_to(q.w, 6),
                ],
                p: config.export_position.then(|| {
                    [
                        round_to(position.x, 6),
                        round_to(position.y, 6),
                        round_to(position.z, 6),
                    ]
                }),
            });
        }
    }

    let mut metadata = serde_json::Map::new();
    metadata.insert(
        "exportedFrom".to_string(),
        serde_json::json!(host.host_name()),
    );
    metadata.insert(
        "hostVersion".to_string(),
        serde_json::json!(host.host_version()),
    );
    metadata.insert(
        "sourceName".to_string(),
        serde_json::json!(host.camera_name(camera)),
    );
    metadata.insert("fps".to_string(), serde_json::json!(fps));
    metadata.insert(
        "frameRange".to_string(),
        serde_json::json!([frame_start, frame_end]),
    );
    if let Some(PropertyValue::Text(source)) = host.property(camera, "webxr_animation_source") {
        metadata.insert("originalSource".to_string(), serde_json::json!(source));
    }

    let frame_count = frames.len();
    let clip = AnimationClip {
        frames,
        reference_space_type: Some(config.reference_space_type.as_str().to_string()),
        metadata,
    };

    tracing::info!(
        "Exported {} frames from '{}' ({} fps, frames {}-{})",
        frame_count,
        host.camera_name(camera),
        fps,
        frame_start,
        frame_end
    );

    Ok(clip)
}

/// File-level export command: sample, serialize, write, report.
///
/// Every failure is folded into the returned [`Outcome`]; this never
/// panics or propagates an error to the host process.
pub fn export_file<H: HostScene>(host: &mut H, path: &Path, config: &ExportConfig) -> Outcome {
    let result = export_clip(host, config).and_then(|clip| {
        let text = serde_json::to_string_pretty(&clip)?;
        std::fs::write(path, text)?;
        Ok(clip.frames.len())
    });

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("animation.json")
        .to_string();
    Outcome::from_result(result, |frame_count| {
        format!("Exported {frame_count} frames to '{file_name}'")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoordinateSystem, ReferenceSpace};
    use crate::host::memory::MemoryScene;
    use glam::{Quat, Vec3};

    fn animated_scene() -> (MemoryScene, CameraHandle) {
        let mut scene = MemoryScene::new();
        let camera = scene.create_camera("cam");
        scene.set_active_camera(camera);
        scene.set_frame_range(1, 10);
        scene.set_fps(30.0);
        scene.create_animation(camera, "track");

        scene.set_location(camera, Vec3::ZERO);
        scene.set_rotation(camera, Quat::IDENTITY);
        scene.insert_keyframe(camera, Channel::Location, 1);
        scene.insert_keyframe(camera, Channel::Rotation, 1);

        scene.set_location(camera, Vec3::new(9.0, 0.0, 0.0));
        scene.insert_keyframe(camera, Channel::Location, 10);
        scene.insert_keyframe(camera, Channel::Rotation, 10);
        (scene, camera)
    }

    #[test]
    fn custom_rate_selects_every_nth_frame() {
        let (scene, camera) = animated_scene();
        let config = ExportConfig {
            sample_mode: SampleMode::CustomRate,
            custom_sample_rate: 3,
            ..Default::default()
        };
        assert_eq!(select_frames(&scene, camera, &config), vec![1, 4, 7, 10]);
    }

    #[test]
    fn keyframes_mode_selects_distinct_sorted_indices() {
        let (mut scene, camera) = animated_scene();
        // A rotation-only key off the shared frames still shows up once.
        scene.set_current_frame(5);
        scene.insert_keyframe(camera, Channel::Rotation, 5);

        let config = ExportConfig {
            sample_mode: SampleMode::Keyframes,
            ..Default::default()
        };
        assert_eq!(select_frames(&scene, camera, &config), vec![1, 5, 10]);
    }

    #[test]
    fn all_frames_covers_scene_range() {
        let (scene, camera) = animated_scene();
        let frames = select_frames(&scene, camera, &ExportConfig::default());
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], 1);
        assert_eq!(frames[9], 10);
    }

    #[test]
    fn no_camera_is_source_unavailable() {
        let mut scene = MemoryScene::new();
        assert!(matches!(
            export_clip(&mut scene, &ExportConfig::default()),
            Err(PipelineError::SourceUnavailable)
        ));
    }

    #[test]
    fn unanimated_camera_is_no_animation() {
        let mut scene = MemoryScene::new();
        let camera = scene.create_camera("cam");
        scene.set_active_camera(camera);
        assert!(matches!(
            export_clip(&mut scene, &ExportConfig::default()),
            Err(PipelineError::NoAnimation)
        ));
    }

    #[test]
    fn selected_camera_used_when_not_exporting_active() {
        let mut scene = MemoryScene::new();
        let _active = scene.create_camera("active");
        let selected = scene.create_camera("selected");
        scene.set_selected(selected, true);
        scene.create_animation(selected, "track");
        scene.set_location(selected, Vec3::new(1.0, 2.0, 3.0));
        scene.insert_keyframe(selected, Channel::Location, 1);
        scene.insert_keyframe(selected, Channel::Rotation, 1);
        scene.set_frame_range(1, 1);

        let config = ExportConfig {
            export_active_camera: false,
            coordinate_system: CoordinateSystem::Host, // Keep
            ..Default::default()
        };
        let clip = export_clip(&mut scene, &config).unwrap();
        assert_eq!(clip.frames.len(), 1);
        assert_eq!(clip.frames[0].p, Some([1.0, 2.0, 3.0]));
        assert_eq!(
            clip.metadata.get("sourceName"),
            Some(&serde_json::json!("selected"))
        );
    }

    #[test]
    fn timestamps_are_relative_to_frame_start_and_rounded() {
        let (mut scene, _camera) = animated_scene();
        let config = ExportConfig {
            coordinate_system: CoordinateSystem::Host,
            ..Default::default()
        };
        let clip = export_clip(&mut scene, &config).unwrap();
        assert_eq!(clip.frames[0].t, 0.0);
        // Frame 10 at 30 fps: 9/30 = 0.3.
        assert!((clip.frames[9].t - 0.3).abs() < 1e-6);
    }

    #[test]
    fn envelope_carries_reference_space_and_host_identity() {
        let (mut scene, _camera) = animated_scene();
        let config = ExportConfig {
            reference_space_type: ReferenceSpace::Viewer,
            ..Default::default()
        };
        let clip = export_clip(&mut scene, &config).unwrap();
        assert_eq!(clip.reference_space_type.as_deref(), Some("viewer"));
        assert_eq!(
            clip.metadata.get("exportedFrom"),
            Some(&serde_json::json!("memory-scene"))
        );
        assert_eq!(
            clip.metadata.get("frameRange"),
            Some(&serde_json::json!([1, 10]))
        );
        assert!(clip.metadata.get("originalSource").is_none());
    }

    #[test]
    fn position_export_can_be_disabled() {
        let (mut scene, _camera) = animated_scene();
        let config = ExportConfig {
            export_position: false,
            ..Default::default()
        };
        let clip = export_clip(&mut scene, &config).unwrap();
        assert!(clip.frames.iter().all(|f| f.p.is_none()));
    }

    #[test]
    fn playback_state_is_restored_after_export() {
        let (mut scene, camera) = animated_scene();
        scene.set_current_frame(7);
        scene.set_rotation_mode(camera, RotationMode::EulerXyz);

        export_clip(&mut scene, &ExportConfig::default()).unwrap();

        assert_eq!(scene.current_frame(), 7);
        assert_eq!(scene.rotation_mode(camera), RotationMode::EulerXyz);
    }
}
