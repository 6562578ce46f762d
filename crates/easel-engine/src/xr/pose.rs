use glam::{Mat4, Quat, Vec3};
use openxr as xr;

/// Converts an OpenXR pose into a rigid transform.
///
/// OpenXR shares the right-handed, Y-up, meters convention, so only the layout
/// changes. A degenerate orientation becomes identity.
pub fn pose_to_mat4(pose: &xr::Posef) -> Mat4 {
    let o = pose.orientation;
    let p = pose.position;

    let q = Quat::from_xyzw(o.x, o.y, o.z, o.w);
    let q = if q.length_squared() > f32::EPSILON && q.is_finite() {
        q.normalize()
    } else {
        Quat::IDENTITY
    };

    Mat4::from_rotation_translation(q, Vec3::new(p.x, p.y, p.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(q: [f32; 4], p: [f32; 3]) -> xr::Posef {
        xr::Posef {
            orientation: xr::Quaternionf { x: q[0], y: q[1], z: q[2], w: q[3] },
            position: xr::Vector3f { x: p[0], y: p[1], z: p[2] },
        }
    }

    #[test]
    fn identity_pose_keeps_translation() {
        let m = pose_to_mat4(&pose([0.0, 0.0, 0.0, 1.0], [0.1, 1.6, -0.3]));
        assert_eq!(m.w_axis.truncate(), Vec3::new(0.1, 1.6, -0.3));
        assert!(m.transform_vector3(Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn yaw_rotates_forward() {
        let half = std::f32::consts::FRAC_PI_4;
        // 90° about +Y: forward (-Z) turns to -X.
        let m = pose_to_mat4(&pose([0.0, half.sin(), 0.0, half.cos()], [0.0; 3]));
        assert!(m.transform_vector3(Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn zero_quaternion_is_identity() {
        let m = pose_to_mat4(&pose([0.0; 4], [1.0, 2.0, 3.0]));
        assert!(m.transform_vector3(Vec3::X).abs_diff_eq(Vec3::X, 1e-6));
    }
}
