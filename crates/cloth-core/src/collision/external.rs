use glam::{Mat3, Mat4, Vec3};

use crate::collision::Collision;
use crate::grid::SpatialHashGrid;
use crate::math::EPSILON;
use crate::particle::ParticleSet;

/// Receives contact impulses from the cloth, e.g. a rigid body in an
/// external physics engine.
pub trait RigidBodySink {
    fn apply_impulse(&mut self, impulse: Vec3, contact_point: Vec3);
}

/// Nearest point on a surface, in the surface's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Unit face normal, or zero for a degenerate face.
    pub normal: Vec3,
}

/// Read-only obstacle geometry: a triangle mesh in its local frame plus a
/// world transform.
#[derive(Clone, Debug)]
pub struct CollisionSurface {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    world: Mat4,
    world_inverse: Mat4,
    normal_matrix: Mat3,
    local_min: Vec3,
    local_max: Vec3,
}

impl CollisionSurface {
    /// `indices` holds 3 vertex ids per triangle; triangles referencing a
    /// missing vertex and any trailing partial triangle are dropped.
    pub fn new(positions: Vec<Vec3>, indices: &[u32], world: Mat4) -> Self {
        let count = positions.len() as u32;
        let triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .filter(|t| t.iter().all(|&id| id < count))
            .collect();

        let (local_min, local_max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), &p| (lo.min(p), hi.max(p)),
        );

        let mut surface = Self {
            positions,
            triangles,
            world,
            world_inverse: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            local_min,
            local_max,
        };
        surface.set_transform(world);
        surface
    }

    /// Move the surface.
    pub fn set_transform(&mut self, world: Mat4) {
        self.world = world;
        self.world_inverse = world.inverse();
        self.normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Broad phase: is `local` inside the local bounds grown by `margin`?
    pub fn bounds_contain(&self, local: Vec3, margin: f32) -> bool {
        let lo = self.local_min - Vec3::splat(margin);
        let hi = self.local_max + Vec3::splat(margin);
        local.cmpge(lo).all() && local.cmple(hi).all()
    }

    /// Narrow phase: nearest surface point to `local`. `None` if the surface
    /// has no usable triangle.
    pub fn closest_point(&self, local: Vec3) -> Option<SurfaceHit> {
        let mut best: Option<(f32, SurfaceHit)> = None;
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|id| self.positions[id as usize]);
            let point = closest_point_on_triangle(local, a, b, c);
            let d2 = local.distance_squared(point);
            if best.map_or(true, |(bd2, _)| d2 < bd2) {
                let normal = (b - a).cross(c - a).normalize_or_zero();
                best = Some((d2, SurfaceHit { point, normal }));
            }
        }
        best.map(|(_, hit)| hit)
    }
}

/// Closest point on triangle `abc` to `p` (Ericson, Real-Time Collision
/// Detection, 5.1.5).
fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() < EPSILON {
        return a;
    }
    let v = vb / denom;
    let w = vc / denom;
    a + ab * v + ac * w
}

/// Cloth against an arbitrary obstacle surface.
///
/// Particles closer than `thickness` to the surface are pushed directly away
/// from their nearest surface point. With a sink attached, each push is
/// reported as an impulse of `penetration / (dt * inv_mass)` along the
/// surface normal.
pub struct ExternalCollision {
    surface: CollisionSurface,
    thickness: f32,
    sink: Option<Box<dyn RigidBodySink>>,
}

impl ExternalCollision {
    pub fn new(surface: CollisionSurface, thickness: f32) -> Self {
        Self {
            surface,
            thickness,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn RigidBodySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn surface(&self) -> &CollisionSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut CollisionSurface {
        &mut self.surface
    }
}

impl Collision for ExternalCollision {
    fn solve(&mut self, particles: &mut ParticleSet, _grid: &SpatialHashGrid, dt: f32) {
        let thickness2 = self.thickness * self.thickness;

        for id in 0..particles.count {
            if particles.is_pinned(id) {
                continue;
            }

            let local = self.surface.world_inverse.transform_point3(particles.position[id]);
            if !self.surface.bounds_contain(local, self.thickness) {
                continue;
            }

            let Some(hit) = self.surface.closest_point(local) else {
                continue;
            };

            let sep = hit.point - local;
            let dist2 = sep.length_squared();
            if dist2 >= thickness2 || dist2 == 0.0 {
                continue;
            }

            let dist = dist2.sqrt();
            let correction = self.thickness - dist;
            let push = self.surface.world.transform_vector3(sep * (correction / dist));
            particles.position[id] -= push;

            if let Some(sink) = self.sink.as_mut() {
                let normal = (self.surface.normal_matrix * hit.normal).normalize_or_zero();
                let impulse = normal * (correction / (dt * particles.inv_mass[id]));
                sink.apply_impulse(impulse, particles.position[id]);
            }
        }
    }

    fn name(&self) -> &'static str {
        "external_collision"
    }
}
