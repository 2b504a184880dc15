use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("rotation axis has zero length")]
    ZeroAxis,
    #[error("degenerate frustum: {0} must be non-zero")]
    DegenerateFrustum(&'static str),
}

pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(tx, ty, tz))
}

pub fn scaling(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(sx, sy, sz))
}

/// Rotation of `angle` radians around `axis`. The axis is normalized
/// internally; a zero-length axis is rejected instead of producing NaNs.
pub fn rotation(axis: Vec3, angle: f32) -> Result<Mat4, TransformError> {
    if axis.length_squared() <= f32::EPSILON {
        return Err(TransformError::ZeroAxis);
    }
    Ok(Mat4::from_axis_angle(axis.normalize(), angle))
}

/// Off-axis perspective frustum matrix. The camera looks down -Z; depth maps
/// to [-1, 1] between the near and far planes.
pub fn perspective(
    near: f32,
    far: f32,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
) -> Result<Mat4, TransformError> {
    if right == left {
        return Err(TransformError::DegenerateFrustum("right-left"));
    }
    if top == bottom {
        return Err(TransformError::DegenerateFrustum("top-bottom"));
    }
    if far == near {
        return Err(TransformError::DegenerateFrustum("far-near"));
    }

    Ok(Mat4::from_cols(
        Vec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
        Vec4::new(
            (right + left) / (right - left),
            (top + bottom) / (top - bottom),
            -(far + near) / (far - near),
            -1.0,
        ),
        Vec4::new(0.0, 0.0, -2.0 * far * near / (far - near), 0.0),
    ))
}

pub fn cartesian_to_homogeneous(p: Vec3) -> Vec4 {
    p.extend(1.0)
}

/// Perspective divide. A point with w == 0 maps to the origin rather than to
/// infinities.
pub fn homogeneous_to_cartesian(p: Vec4) -> Vec3 {
    if p.w == 0.0 {
        Vec3::ZERO
    } else {
        p.truncate() / p.w
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::{Vec3, Vec4};

    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn translation_moves_a_point() {
        let p = translation(1.0, 2.0, 3.0).transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(p.distance(Vec3::new(2.0, 3.0, 4.0)) < EPS);
    }

    #[test]
    fn scaling_scales_a_point() {
        let p = scaling(2.0, 3.0, 4.0).transform_point3(Vec3::ONE);
        assert!(p.distance(Vec3::new(2.0, 3.0, 4.0)) < EPS);
    }

    #[test]
    fn rotation_quarter_turn_around_z() {
        let m = rotation(Vec3::Z, FRAC_PI_2).unwrap();
        let p = m.transform_point3(Vec3::X);
        assert!(p.distance(Vec3::Y) < EPS);
    }

    #[test]
    fn rotation_normalizes_the_axis() {
        let a = rotation(Vec3::Z, FRAC_PI_2).unwrap();
        let b = rotation(Vec3::Z * 10.0, FRAC_PI_2).unwrap();
        assert!(a.abs_diff_eq(b, EPS));
    }

    #[test]
    fn rotation_rejects_zero_axis() {
        assert_eq!(rotation(Vec3::ZERO, 1.0), Err(TransformError::ZeroAxis));
    }

    #[test]
    fn perspective_rejects_degenerate_frustums() {
        assert!(perspective(1.0, 1.0, -1.0, 1.0, 1.0, -1.0).is_err());
        assert!(perspective(1.0, 20.0, 1.0, 1.0, 1.0, -1.0).is_err());
        assert!(perspective(1.0, 20.0, -1.0, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn perspective_maps_near_and_far_to_the_cube_faces() {
        let m = perspective(1.0, 20.0, -1.0, 1.0, 1.0, -1.0).unwrap();
        let near = homogeneous_to_cartesian(m * Vec4::new(0.0, 0.0, -1.0, 1.0));
        let far = homogeneous_to_cartesian(m * Vec4::new(0.0, 0.0, -20.0, 1.0));
        assert!((near.z + 1.0).abs() < EPS);
        assert!((far.z - 1.0).abs() < EPS);
    }

    #[test]
    fn homogeneous_round_trip() {
        for p in [Vec3::ZERO, Vec3::new(1.5, -2.0, 0.25), Vec3::splat(-7.0)] {
            let q = homogeneous_to_cartesian(cartesian_to_homogeneous(p));
            assert_eq!(p, q);
        }
    }

    #[test]
    fn zero_weight_maps_to_origin() {
        let p = homogeneous_to_cartesian(Vec4::new(3.0, 4.0, 5.0, 0.0));
        assert_eq!(p, Vec3::ZERO);
    }
}
