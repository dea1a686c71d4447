//! Host scene abstraction.
//!
//! The pipelines never talk to an editor directly; everything they need
//! from one (camera objects, the playhead, the keyframe store) goes
//! through [`HostScene`]. That keeps the editor dependency explicit and
//! lets the whole tool run against the in-memory host in [`memory`].

use glam::{Quat, Vec3};

pub mod memory;

/// Handle to a camera object owned by the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub usize);

/// The two animated channels this tool writes and reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Location,
    Rotation,
}

/// Rotation representation carried by a camera object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    Quaternion,
    EulerXyz,
}

/// Keyframe interpolation applied to a camera's animation track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    /// Smooth bezier with auto-clamped tangent handles on both sides;
    /// no overshoot or ringing between keys.
    BezierAutoClamped,
}

/// Attribute value persisted on a camera object (provenance records).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Float(f32),
    Int(i64),
}

/// The surface a host editor exposes to the pipelines.
///
/// Reading `location`/`rotation` on an animated camera reflects the pose
/// evaluated at the current frame; [`HostScene::set_current_frame`] is the
/// way to materialize interpolated poses at non-keyframe frames.
pub trait HostScene {
    // Camera resolution and creation.
    fn active_camera(&self) -> Option<CameraHandle>;
    fn first_selected_camera(&self) -> Option<CameraHandle>;
    fn create_camera(&mut self, name: &str) -> CameraHandle;
    /// Makes the camera the scene camera and selects it.
    fn set_active_camera(&mut self, camera: CameraHandle);
    fn camera_name(&self, camera: CameraHandle) -> String;

    // Playback state.
    fn frame_range(&self) -> (i32, i32);
    fn set_frame_range(&mut self, start: i32, end: i32);
    fn fps(&self) -> f32;
    fn set_fps(&mut self, fps: f32);
    fn current_frame(&self) -> i32;
    /// Move the playhead; animated objects re-evaluate at the new frame.
    fn set_current_frame(&mut self, frame: i32);

    // Camera transform at the current frame.
    fn location(&self, camera: CameraHandle) -> Vec3;
    fn set_location(&mut self, camera: CameraHandle, location: Vec3);
    /// Current rotation as a quaternion, whatever the rotation mode.
    fn rotation(&self, camera: CameraHandle) -> Quat;
    fn set_rotation(&mut self, camera: CameraHandle, rotation: Quat);
    fn rotation_mode(&self, camera: CameraHandle) -> RotationMode;
    fn set_rotation_mode(&mut self, camera: CameraHandle, mode: RotationMode);

    // Keyframe store.
    fn has_animation(&self, camera: CameraHandle) -> bool;
    fn clear_animation(&mut self, camera: CameraHandle);
    fn create_animation(&mut self, camera: CameraHandle, name: &str);
    /// Record the channel's current value as a keyframe, overwriting any
    /// existing entry at the same frame.
    fn insert_keyframe(&mut self, camera: CameraHandle, channel: Channel, frame: i32);
    /// Frame indices carrying a keyframe on the given channel, ascending.
    fn channel_keyframes(&self, camera: CameraHandle, channel: Channel) -> Vec<i32>;
    /// Set the interpolation of every keyframe on every channel.
    fn set_interpolation(&mut self, camera: CameraHandle, interpolation: Interpolation);

    // Provenance attributes.
    fn set_property(&mut self, camera: CameraHandle, key: &str, value: PropertyValue);
    fn property(&self, camera: CameraHandle, key: &str) -> Option<PropertyValue>;

    // Identity, for export envelopes.
    fn host_name(&self) -> &str;
    fn host_version(&self) -> String;
}

/// Scoped save/restore of the host's ambient playback state.
///
/// Captures the playhead and the camera's rotation mode on construction
/// and restores both on drop, so every exit path out of a pipeline,
/// including `?` returns, leaves the scene the way it was found.
pub struct PlaybackScope<'a, H: HostScene> {
    host: &'a mut H,
    camera: CameraHandle,
    saved_frame: i32,
    saved_mode: RotationMode,
}

impl<'a, H: HostScene> PlaybackScope<'a, H> {
    pub fn new(host: &'a mut H, camera: CameraHandle) -> Self {
        let saved_frame = host.current_frame();
        let saved_mode = host.rotation_mode(camera);
        Self {
            host,
            camera,
            saved_frame,
            saved_mode,
        }
    }

    pub fn host(&mut self) -> &mut H {
        self.host
    }
}

impl<H: HostScene> Drop for PlaybackScope<'_, H> {
    fn drop(&mut self) {
        self.host.set_rotation_mode(self.camera, self.saved_mode);
        self.host.set_current_frame(self.saved_frame);
    }
}
