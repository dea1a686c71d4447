//! xrcam-anim library
//!
//! Converts WebXR camera pose recordings (JSON) to and from a 3D editor's
//! keyframe animation system. The editor is abstracted behind the
//! [`host::HostScene`] trait; [`host::memory::MemoryScene`] is a complete
//! in-memory implementation used by the CLI and by tests.

pub mod clip;
pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod import;
pub mod transform;

// Re-export the operational surface for consumers (host adapters, CLI).
pub use clip::{parse_clip, AnimationClip, PoseSample};
pub use config::{CoordinateSystem, ExportConfig, ImportConfig, ReferenceSpace, SampleMode};
pub use error::{Outcome, PipelineError};
pub use export::{export_clip, export_file};
pub use host::memory::MemoryScene;
pub use host::{
    CameraHandle, Channel, HostScene, Interpolation, PlaybackScope, PropertyValue, RotationMode,
};
pub use import::{import_clip, import_file, ImportSummary};
pub use transform::{
    apply_scale, convert_space, rebase_delta, DeltaBasis, Pose, SpaceConversion,
};
