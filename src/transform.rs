//! Pose transform core (WebXR Y-up <-> host Z-up).
//!
//! Pure pose math shared by the import and export pipelines: coordinate
//! space conversion, scale adjustment, and delta rebasing against a
//! captured starting pose. No I/O and no host mutation happens here.

use glam::{Quat, Vec3};

/// Basis change from WebXR (Y-up, forward -Z) into host space (Z-up,
/// forward -Y): a +90 degree rotation about the X axis.
const WEBXR_TO_HOST_BASIS: Quat = Quat::from_xyzw(0.707_106_8, 0.0, 0.0, 0.707_106_8);

/// Inverse basis change, -90 degrees about X.
const HOST_TO_WEBXR_BASIS: Quat = Quat::from_xyzw(-0.707_106_8, 0.0, 0.0, 0.707_106_8);

/// A single camera pose: position plus unit rotation quaternion.
///
/// Rotation magnitude is assumed to be ~1 and is never re-normalized here;
/// malformed numeric input (NaN/Inf) propagates unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Direction of the coordinate space change applied to a pose.
///
/// `WebxrToHost` and `HostToWebxr` are exact algebraic inverses of each
/// other for both position and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceConversion {
    /// Leave the pose in its source space.
    Keep,
    /// WebXR Y-up into host Z-up.
    WebxrToHost,
    /// Host Z-up back into WebXR Y-up.
    HostToWebxr,
}

/// Convert a pose between WebXR space and host space.
///
/// Position axes remap as `(x, y, z) -> (x, -z, y)` going into host space
/// and `(x, y, z) -> (x, z, -y)` going back; rotations are re-based by the
/// fixed +/-90 degree X-axis quaternion.
pub fn convert_space(pose: Pose, conversion: SpaceConversion) -> Pose {
    let p = pose.position;
    match conversion {
        SpaceConversion::Keep => pose,
        SpaceConversion::WebxrToHost => Pose {
            position: Vec3::new(p.x, -p.z, p.y),
            rotation: WEBXR_TO_HOST_BASIS * pose.rotation,
        },
        SpaceConversion::HostToWebxr => Pose {
            position: Vec3::new(p.x, p.z, -p.y),
            rotation: HOST_TO_WEBXR_BASIS * pose.rotation,
        },
    }
}

/// Apply the scene scale factor to a position.
///
/// Import multiplies (`invert = false`), export divides. `factor` must be
/// positive; config validation rejects anything else before the pipelines
/// get here.
pub fn apply_scale(position: Vec3, factor: f32, invert: bool) -> Vec3 {
    debug_assert!(factor > 0.0, "scale factor must be positive");
    if invert {
        position / factor
    } else {
        position * factor
    }
}

/// Starting poses captured once per import run when delta mode is on.
///
/// `initial_*` is the target camera's pose before any keyframe overwrite;
/// `first_frame_*` is the recording's first frame as parsed off the wire.
/// Held immutable for the duration of the run.
#[derive(Debug, Clone, Copy)]
pub struct DeltaBasis {
    pub initial_position: Vec3,
    pub initial_rotation: Quat,
    pub first_frame_position: Vec3,
    pub first_frame_rotation: Quat,
}

/// Re-express a converted pose relative to the captured basis, so the
/// animation plays back from the camera's pre-import pose instead of the
/// recording's absolute coordinates.
///
/// Import-only: the export pipeline has no inverse delta operation.
pub fn rebase_delta(pose: Pose, basis: &DeltaBasis, conversion: SpaceConversion) -> Pose {
    let delta_rotation = basis.first_frame_rotation.inverse() * pose.rotation;
    let rotation = basis.initial_rotation * delta_rotation;

    let delta = pose.position - basis.first_frame_position;
    // The positional delta is carried into the initial orientation's frame
    // only when a space conversion happened; in Keep mode both poses
    // already share a space.
    let rotated = if conversion == SpaceConversion::Keep {
        delta
    } else {
        basis.initial_rotation * delta
    };

    Pose {
        position: basis.initial_position + rotated,
        rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!(
            (a - b).length() < TOLERANCE,
            "vectors differ: {:?} vs {:?}",
            a,
            b
        );
    }

    fn assert_quat_near(a: Quat, b: Quat) {
        // q and -q represent the same rotation
        let dot = a.dot(b).abs();
        assert!(dot > 1.0 - TOLERANCE, "quaternions differ: {:?} vs {:?}", a, b);
    }

    fn sample_poses() -> Vec<Pose> {
        vec![
            Pose::IDENTITY,
            Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7)),
            Pose::new(Vec3::new(-4.5, 0.25, 9.0), Quat::from_rotation_x(-1.2)),
            Pose::new(
                Vec3::new(0.0, -2.0, 0.5),
                Quat::from_euler(glam::EulerRot::XYZ, 0.3, -0.8, 2.1),
            ),
        ]
    }

    #[test]
    fn basis_quaternions_are_inverses() {
        let product = WEBXR_TO_HOST_BASIS * HOST_TO_WEBXR_BASIS;
        assert_quat_near(product, Quat::IDENTITY);
    }

    #[test]
    fn keep_is_identity() {
        for pose in sample_poses() {
            let kept = convert_space(pose, SpaceConversion::Keep);
            assert_vec3_near(kept.position, pose.position);
            assert_quat_near(kept.rotation, pose.rotation);
        }
    }

    #[test]
    fn space_conversion_round_trips() {
        for pose in sample_poses() {
            let there = convert_space(pose, SpaceConversion::WebxrToHost);
            let back = convert_space(there, SpaceConversion::HostToWebxr);
            assert_vec3_near(back.position, pose.position);
            assert_quat_near(back.rotation, pose.rotation);
        }
    }

    #[test]
    fn webxr_up_becomes_host_up() {
        // WebXR +Y (up) maps to host +Z (up); X is untouched by the swap.
        let up = convert_space(
            Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY),
            SpaceConversion::WebxrToHost,
        );
        assert_vec3_near(up.position, Vec3::new(0.0, 0.0, 1.0));

        let right = convert_space(
            Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY),
            SpaceConversion::WebxrToHost,
        );
        assert_vec3_near(right.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn converted_rotation_matches_position_mapping() {
        // A camera-local vector pushed through the converted rotation must
        // land where the original rotation's result lands after the axis
        // remap: (B * q) v == remap(q v).
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.4, 1.1, -0.6);
        let v = Vec3::new(0.3, -1.7, 2.2);

        let converted = convert_space(Pose::new(Vec3::ZERO, rotation), SpaceConversion::WebxrToHost);
        let via_host = converted.rotation * v;

        let rotated = rotation * v;
        let remapped = Vec3::new(rotated.x, -rotated.z, rotated.y);

        assert_vec3_near(via_host, remapped);
    }

    #[test]
    fn scale_round_trips() {
        let p = Vec3::new(1.5, -2.0, 0.125);
        for factor in [0.001, 0.5, 1.0, 42.0, 1000.0] {
            let scaled = apply_scale(p, factor, false);
            let back = apply_scale(scaled, factor, true);
            assert_vec3_near(back, p);
        }
    }

    #[test]
    fn delta_rebase_offsets_position() {
        let basis = DeltaBasis {
            initial_position: Vec3::ZERO,
            initial_rotation: Quat::IDENTITY,
            first_frame_position: Vec3::new(5.0, 0.0, 0.0),
            first_frame_rotation: Quat::IDENTITY,
        };
        let pose = Pose::new(Vec3::new(6.0, 0.0, 0.0), Quat::IDENTITY);
        let rebased = rebase_delta(pose, &basis, SpaceConversion::WebxrToHost);
        assert_vec3_near(rebased.position, Vec3::new(1.0, 0.0, 0.0));
        assert_quat_near(rebased.rotation, Quat::IDENTITY);
    }

    #[test]
    fn delta_rebase_carries_initial_orientation() {
        // With the camera initially yawed 90 degrees, a forward step in the
        // recording becomes a sideways step in the scene.
        let initial_rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let basis = DeltaBasis {
            initial_position: Vec3::new(10.0, 0.0, 0.0),
            initial_rotation,
            first_frame_position: Vec3::ZERO,
            first_frame_rotation: Quat::IDENTITY,
        };
        let pose = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let rebased = rebase_delta(pose, &basis, SpaceConversion::WebxrToHost);
        assert_vec3_near(rebased.position, Vec3::new(10.0, 1.0, 0.0));
        assert_quat_near(rebased.rotation, initial_rotation);
    }

    #[test]
    fn delta_rebase_keep_mode_skips_rotation_of_delta() {
        let initial_rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let basis = DeltaBasis {
            initial_position: Vec3::ZERO,
            initial_rotation,
            first_frame_position: Vec3::ZERO,
            first_frame_rotation: Quat::IDENTITY,
        };
        let pose = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let rebased = rebase_delta(pose, &basis, SpaceConversion::Keep);
        // Positional delta passes through unrotated in Keep mode.
        assert_vec3_near(rebased.position, Vec3::new(1.0, 0.0, 0.0));
        assert_quat_near(rebased.rotation, initial_rotation);
    }
}
