//! In-memory host scene.
//!
//! Backs the CLI and the tests with real keyframe storage and playhead
//! evaluation: moving the current frame re-samples every animated camera
//! from its tracks, holding before the first key and after the last,
//! lerping locations and slerping rotations in between.

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use super::{CameraHandle, Channel, HostScene, Interpolation, PropertyValue, RotationMode};

/// Per-camera keyframe track: two channels of `(frame, value)` keys kept
/// sorted by frame index.
#[derive(Debug, Clone)]
struct Track {
    name: String,
    interpolation: Interpolation,
    location_keys: Vec<(i32, Vec3)>,
    rotation_keys: Vec<(i32, Quat)>,
}

impl Track {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            interpolation: Interpolation::Linear,
            location_keys: Vec::new(),
            rotation_keys: Vec::new(),
        }
    }
}

/// Insert or overwrite the key at `frame`, keeping the vector sorted.
fn upsert_key<T>(keys: &mut Vec<(i32, T)>, frame: i32, value: T) {
    match keys.binary_search_by_key(&frame, |(f, _)| *f) {
        Ok(i) => keys[i].1 = value,
        Err(i) => keys.insert(i, (frame, value)),
    }
}

/// Bracketing evaluation over sorted keys. Returns the bracketing pair and
/// the interpolation factor, or a flat value at either end of the range.
fn bracket<T: Copy>(keys: &[(i32, T)], frame: i32) -> Option<(T, T, f32)> {
    let (&(first_frame, first), &(last_frame, last)) = (keys.first()?, keys.last()?);
    if frame <= first_frame {
        return Some((first, first, 0.0));
    }
    if frame >= last_frame {
        return Some((last, last, 0.0));
    }
    let next = keys.partition_point(|(f, _)| *f <= frame);
    let (f0, v0) = keys[next - 1];
    let (f1, v1) = keys[next];
    if f0 == frame {
        return Some((v0, v0, 0.0));
    }
    let factor = (frame - f0) as f32 / (f1 - f0) as f32;
    Some((v0, v1, factor))
}

#[derive(Debug, Clone)]
struct MemoryCamera {
    name: String,
    location: Vec3,
    rotation: Quat,
    rotation_mode: RotationMode,
    selected: bool,
    properties: HashMap<String, PropertyValue>,
    track: Option<Track>,
}

impl MemoryCamera {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            rotation_mode: RotationMode::Quaternion,
            selected: false,
            properties: HashMap::new(),
            track: None,
        }
    }

    fn evaluate_at(&mut self, frame: i32) {
        let Some(track) = &self.track else {
            return;
        };
        if let Some((v0, v1, factor)) = bracket(&track.location_keys, frame) {
            self.location = v0.lerp(v1, factor);
        }
        if let Some((q0, q1, factor)) = bracket(&track.rotation_keys, frame) {
            self.rotation = q0.slerp(q1, factor);
        }
    }
}

/// A standalone scene with the same surface an editor would expose.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    cameras: Vec<MemoryCamera>,
    active: Option<usize>,
    frame_start: i32,
    frame_end: i32,
    fps: f32,
    current_frame: i32,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
            active: None,
            frame_start: 1,
            frame_end: 250,
            fps: 24.0,
            current_frame: 1,
        }
    }

    /// Mark a camera selected without making it the scene camera.
    pub fn set_selected(&mut self, camera: CameraHandle, selected: bool) {
        self.cameras[camera.0].selected = selected;
    }

    /// Name of the animation track on a camera, if any.
    pub fn track_name(&self, camera: CameraHandle) -> Option<&str> {
        self.cameras[camera.0]
            .track
            .as_ref()
            .map(|t| t.name.as_str())
    }

    /// Interpolation currently applied to a camera's track.
    pub fn track_interpolation(&self, camera: CameraHandle) -> Option<Interpolation> {
        self.cameras[camera.0].track.as_ref().map(|t| t.interpolation)
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl HostScene for MemoryScene {
    fn active_camera(&self) -> Option<CameraHandle> {
        self.active.map(CameraHandle)
    }

    fn first_selected_camera(&self) -> Option<CameraHandle> {
        self.cameras
            .iter()
            .position(|c| c.selected)
            .map(CameraHandle)
    }

    fn create_camera(&mut self, name: &str) -> CameraHandle {
        self.cameras.push(MemoryCamera::new(name));
        CameraHandle(self.cameras.len() - 1)
    }

    fn set_active_camera(&mut self, camera: CameraHandle) {
        self.active = Some(camera.0);
        self.cameras[camera.0].selected = true;
    }

    fn camera_name(&self, camera: CameraHandle) -> String {
        self.cameras[camera.0].name.clone()
    }

    fn frame_range(&self) -> (i32, i32) {
        (self.frame_start, self.frame_end)
    }

    fn set_frame_range(&mut self, start: i32, end: i32) {
        self.frame_start = start;
        self.frame_end = end;
    }

    fn fps(&self) -> f32 {
        self.fps
    }

    fn set_fps(&mut self, fps: f32) {
        self.fps = fps;
    }

    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
        for camera in &mut self.cameras {
            camera.evaluate_at(frame);
        }
    }

    fn location(&self, camera: CameraHandle) -> Vec3 {
        self.cameras[camera.0].location
    }

    fn set_location(&mut self, camera: CameraHandle, location: Vec3) {
        self.cameras[camera.0].location = location;
    }

    fn rotation(&self, camera: CameraHandle) -> Quat {
        self.cameras[camera.0].rotation
    }

    fn set_rotation(&mut self, camera: CameraHandle, rotation: Quat) {
        self.cameras[camera.0].rotation = rotation;
    }

    fn rotation_mode(&self, camera: CameraHandle) -> RotationMode {
        self.cameras[camera.0].rotation_mode
    }

    fn set_rotation_mode(&mut self, camera: CameraHandle, mode: RotationMode) {
        self.cameras[camera.0].rotation_mode = mode;
    }

    fn has_animation(&self, camera: CameraHandle) -> bool {
        self.cameras[camera.0].track.is_some()
    }

    fn clear_animation(&mut self, camera: CameraHandle) {
        self.cameras[camera.0].track = None;
    }

    fn create_animation(&mut self, camera: CameraHandle, name: &str) {
        self.cameras[camera.0].track = Some(Track::new(name));
    }

    fn insert_keyframe(&mut self, camera: CameraHandle, channel: Channel, frame: i32) {
        let cam = &mut self.cameras[camera.0];
        let location = cam.location;
        let rotation = cam.rotation;
        let fallback = format!("{}_track", cam.name);
        let track = cam.track.get_or_insert_with(|| Track::new(&fallback));
        match channel {
            Channel::Location => upsert_key(&mut track.location_keys, frame, location),
            Channel::Rotation => upsert_key(&mut track.rotation_keys, frame, rotation),
        }
    }

    fn channel_keyframes(&self, camera: CameraHandle, channel: Channel) -> Vec<i32> {
        let Some(track) = &self.cameras[camera.0].track else {
            return Vec::new();
        };
        match channel {
            Channel::Location => track.location_keys.iter().map(|(f, _)| *f).collect(),
            Channel::Rotation => track.rotation_keys.iter().map(|(f, _)| *f).collect(),
        }
    }

    fn set_interpolation(&mut self, camera: CameraHandle, interpolation: Interpolation) {
        if let Some(track) = &mut self.cameras[camera.0].track {
            track.interpolation = interpolation;
        }
    }

    fn set_property(&mut self, camera: CameraHandle, key: &str, value: PropertyValue) {
        self.cameras[camera.0]
            .properties
            .insert(key.to_string(), value);
    }

    fn property(&self, camera: CameraHandle, key: &str) -> Option<PropertyValue> {
        self.cameras[camera.0].properties.get(key).cloned()
    }

    fn host_name(&self) -> &str {
        "memory-scene"
    }

    fn host_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}
