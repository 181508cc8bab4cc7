//! Vector buffer operations.
//!
//! Particle state lives in `[Vec3]` arenas addressed by particle index. The
//! helpers here read and write those arenas by index and convert them to and
//! from the flat `f32` layout renderers use.

use glam::{Mat4, Vec3, Vec4};

/// Below this, a length or sine is treated as zero.
pub const EPSILON: f32 = 1e-10;

/// View a vector arena as a flat `[x0, y0, z0, x1, ...]` buffer.
#[inline]
pub fn as_flat(buf: &[Vec3]) -> &[f32] {
    bytemuck::cast_slice(buf)
}

/// Copy a flat buffer into a vector arena. Trailing floats that do not form
/// a full triple are ignored; callers validate the length first.
pub fn from_flat(flat: &[f32]) -> Vec<Vec3> {
    flat.chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect()
}

/// `buf[i] += v * scale`
#[inline]
pub fn add_scaled(buf: &mut [Vec3], i: usize, v: Vec3, scale: f32) {
    buf[i] += v * scale;
}

/// `buf[i] - buf[j]`
#[inline]
pub fn diff(buf: &[Vec3], i: usize, j: usize) -> Vec3 {
    buf[i] - buf[j]
}

/// Squared distance between two entries of the same arena.
#[inline]
pub fn dist_squared(buf: &[Vec3], i: usize, j: usize) -> f32 {
    buf[i].distance_squared(buf[j])
}

/// Unnormalized face normal `(p1 - p0) x (p2 - p0)`; its length is twice the
/// triangle area.
#[inline]
pub fn triangle_cross(buf: &[Vec3], tri: [u32; 3]) -> Vec3 {
    let p0 = buf[tri[0] as usize];
    let e0 = buf[tri[1] as usize] - p0;
    let e1 = buf[tri[2] as usize] - p0;
    e0.cross(e1)
}

/// Triangle area, `0.5 * |e0 x e1|`.
#[inline]
pub fn triangle_area(buf: &[Vec3], tri: [u32; 3]) -> f32 {
    0.5 * triangle_cross(buf, tri).length()
}

/// Cotangent of the angle between `a` and `b`.
///
/// Returns `None` when the vectors are parallel or zero, where the cotangent
/// is unbounded.
#[inline]
pub fn cot_theta(a: Vec3, b: Vec3) -> Option<f32> {
    let cos_theta = a.dot(b);
    let sin_theta = a.cross(b).length();
    if sin_theta < EPSILON {
        return None;
    }
    Some(cos_theta / sin_theta)
}

/// Outer product `k * k^T`.
#[inline]
pub fn outer4(k: Vec4) -> Mat4 {
    Mat4::from_cols(k * k.x, k * k.y, k * k.z, k * k.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_view_matches_components() {
        let buf = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];
        assert_eq!(as_flat(&buf), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(from_flat(as_flat(&buf)), buf);
    }

    #[test]
    fn test_indexed_ops() {
        let mut buf = vec![Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)];
        assert_eq!(diff(&buf, 1, 0), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(dist_squared(&buf, 0, 1), 25.0);
        add_scaled(&mut buf, 0, Vec3::X, 2.0);
        assert_eq!(buf[0], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_cot_theta_right_angle_is_zero() {
        let cot = cot_theta(Vec3::X, Vec3::Y).unwrap();
        assert!(cot.abs() < 1e-6);
        assert!(cot_theta(Vec3::X, Vec3::X * 2.0).is_none());
    }

    #[test]
    fn test_outer4_is_symmetric() {
        let m = outer4(Vec4::new(1.0, -2.0, 3.0, 0.5));
        assert_eq!(m, m.transpose());
        assert_eq!(m.col(1).z, -6.0);
    }
}
