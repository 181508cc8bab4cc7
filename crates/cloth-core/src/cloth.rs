use glam::Vec3;
use tracing::{debug, info, trace};

use crate::collision::{
    Collision, CollisionSurface, ExternalCollision, RigidBodySink, SelfCollision,
};
use crate::config::ClothConfig;
use crate::constraints::{
    Constraint, DistanceConstraint, IsometricBendingConstraint, PerformantBendingConstraint,
};
use crate::error::{ClothError, ClothResult};
use crate::grid::SpatialHashGrid;
use crate::heightfield::HeightField;
use crate::integrator;
use crate::mesh::ClothMesh;
use crate::particle::ParticleSet;
use crate::topology::{build_inverse_mass, Topology};

/// Tolerance for picking the top-corner particles.
const CORNER_EPS: f32 = 1e-6;

/// A cloth physics object.
///
/// Owns the particle arena and topology derived from a mesh. Constraints and
/// collisions are opt-in: the owner registers the effects it wants after
/// construction. Replacing the mesh drops every registered effect.
///
/// Per frame, [`step_frame`](Self::step_frame) runs
/// `substeps` x (`pre_solve` -> `solve` -> `post_solve`) and refreshes the
/// normals. The individual phases are public for callers that drive
/// substeps themselves.
///
/// `thickness` is fixed at construction: the hash cell size and every
/// registered collision depend on it. The remaining settings have setters.
pub struct Cloth {
    pub particles: ParticleSet,
    pub topology: Topology,
    config: ClothConfig,
    attachments: Vec<[u32; 2]>,
    /// Positions at construction, kept for self collision.
    rest_positions: Vec<Vec3>,
    grid: SpatialHashGrid,
    constraints: Vec<Box<dyn Constraint>>,
    collisions: Vec<Box<dyn Collision>>,
}

impl Cloth {
    pub fn new(mesh: ClothMesh, config: ClothConfig) -> ClothResult<Self> {
        if !(config.thickness > 0.0 && config.thickness.is_finite()) {
            return Err(ClothError::InvalidThickness(config.thickness));
        }
        mesh.validate()?;

        let grid = SpatialHashGrid::new(config.thickness, 2 * mesh.vertex_count());
        let mut cloth = Self {
            particles: ParticleSet::new(Vec::new()),
            topology: Topology::default(),
            config,
            attachments: Vec::new(),
            rest_positions: Vec::new(),
            grid,
            constraints: Vec::new(),
            collisions: Vec::new(),
        };
        cloth.rebuild(mesh);
        Ok(cloth)
    }

    /// Replace the mesh after an external topology change (cut, merge,
    /// vertex removal). Inverse masses, neighbours and the rest snapshot are
    /// recomputed; all constraints and collisions are dropped and must be
    /// registered again.
    pub fn update_mesh(&mut self, mesh: ClothMesh) -> ClothResult<()> {
        mesh.validate()?;
        self.rebuild(mesh);
        Ok(())
    }

    fn rebuild(&mut self, mesh: ClothMesh) {
        let ClothMesh {
            positions,
            indices,
            attachments,
        } = mesh;

        let inv_mass = build_inverse_mass(&positions, &indices);
        self.rest_positions = positions.clone();
        self.particles = ParticleSet::new(positions);
        self.particles.inv_mass = inv_mass;
        self.topology = Topology::new(indices);
        self.attachments = attachments;
        self.grid = SpatialHashGrid::new(self.config.thickness, 2 * self.particles.count);
        self.constraints.clear();
        self.collisions.clear();

        if self.config.pin_top_corners {
            self.pin_top_corners();
        }
        self.particles.update_normals(&self.topology.indices);

        info!(
            particles = self.particles.count,
            triangles = self.topology.triangle_count(),
            attachments = self.attachments.len(),
            "cloth built"
        );
    }

    /// Pin the particles on the top row (max Y) at min and max X.
    pub fn pin_top_corners(&mut self) {
        let (min_x, max_x, max_y) = self.particles.position.iter().fold(
            (f32::MAX, f32::MIN, f32::MIN),
            |(lo, hi, top), p| (lo.min(p.x), hi.max(p.x), top.max(p.y)),
        );
        for i in 0..self.particles.count {
            let p = self.particles.position[i];
            if p.y > max_y - CORNER_EPS && (p.x < min_x + CORNER_EPS || p.x > max_x - CORNER_EPS) {
                self.particles.pin(i);
            }
        }
    }

    /// Make particle `i` immovable. Ignored if out of range.
    pub fn pin(&mut self, i: usize) {
        if i < self.particles.count {
            self.particles.pin(i);
        }
    }

    pub fn config(&self) -> &ClothConfig {
        &self.config
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    pub fn set_substeps(&mut self, substeps: u32) {
        self.config.substeps = substeps;
    }

    pub fn set_floor_height(&mut self, height: Option<f32>) {
        self.config.floor_height = height;
    }

    pub fn set_obstacle(&mut self, obstacle: Option<HeightField>) {
        self.config.obstacle = obstacle;
    }

    /// Damping for self collisions registered after this call.
    pub fn set_self_collision_damping(&mut self, damping: Option<f32>) {
        self.config.self_collision_damping = damping;
    }

    /// Vertex pairs joined by distance constraints registered after this call.
    pub fn set_attachments(&mut self, attachments: Vec<[u32; 2]>) -> ClothResult<()> {
        let count = self.particles.count;
        if let Some(&[a, b]) = attachments
            .iter()
            .find(|[a, b]| *a as usize >= count || *b as usize >= count)
        {
            return Err(ClothError::AttachmentOutOfRange(a, b));
        }
        self.attachments = attachments;
        Ok(())
    }

    pub fn attachments(&self) -> &[[u32; 2]] {
        &self.attachments
    }

    pub fn register_distance_constraint(&mut self, compliance: f32) {
        let c = DistanceConstraint::from_topology(
            &self.particles.position,
            &self.topology,
            &self.attachments,
            compliance,
        );
        debug!(edges = c.edges.len(), compliance, "distance constraint registered");
        self.constraints.push(Box::new(c));
    }

    pub fn register_performant_bending_constraint(&mut self, compliance: f32) {
        let c = PerformantBendingConstraint::from_topology(
            &self.particles.position,
            &self.topology,
            compliance,
        );
        debug!(pairs = c.pairs.len(), compliance, "performant bending registered");
        self.constraints.push(Box::new(c));
    }

    pub fn register_isometric_bending_constraint(&mut self, compliance: f32) {
        let c = IsometricBendingConstraint::from_topology(
            &self.particles.position,
            &self.topology,
            compliance,
        );
        debug!(patches = c.patches.len(), compliance, "isometric bending registered");
        self.constraints.push(Box::new(c));
    }

    /// Register any constraint. Constraints run in registration order.
    pub fn register_constraint(&mut self, constraint: Box<dyn Constraint>) {
        debug!(name = constraint.name(), "constraint registered");
        self.constraints.push(constraint);
    }

    pub fn register_self_collision(&mut self) {
        let c = SelfCollision::new(
            self.rest_positions.clone(),
            self.config.thickness,
            self.config.self_collision_damping,
        );
        debug!(thickness = self.config.thickness, "self collision registered");
        self.collisions.push(Box::new(c));
    }

    pub fn register_external_collision(
        &mut self,
        surface: CollisionSurface,
        sink: Option<Box<dyn RigidBodySink>>,
    ) {
        let mut c = ExternalCollision::new(surface, self.config.thickness);
        if let Some(sink) = sink {
            c = c.with_sink(sink);
        }
        debug!(thickness = self.config.thickness, "external collision registered");
        self.collisions.push(Box::new(c));
    }

    /// Register any collision. Collisions run in registration order, after
    /// all constraints.
    pub fn register_collision(&mut self, collision: Box<dyn Collision>) {
        debug!(name = collision.name(), "collision registered");
        self.collisions.push(collision);
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    /// Rebuild the spatial hash and the neighbour table for this frame.
    ///
    /// The query radius is the collision shell plus the distance a particle
    /// may travel over the frame at the integrator's speed limit.
    pub fn pre_integration(&mut self, dt: f32) {
        let thickness = self.config.thickness;
        let max_travel = (1.0 / 60.0) * integrator::MAX_SPEED_SCALE * thickness / dt;
        self.grid.build(&self.particles.position);
        self.grid.query_all(&self.particles.position, thickness + max_travel);
    }

    pub fn pre_solve(&mut self, dt: f32, gravity: Vec3) {
        integrator::pre_solve(&mut self.particles, dt, gravity);
    }

    /// Floor and obstacle clamp, then every constraint, then every collision.
    pub fn solve(&mut self, dt: f32) {
        self.clamp_to_ground();

        for constraint in &mut self.constraints {
            constraint.solve(&mut self.particles, dt);
        }
        for collision in &mut self.collisions {
            collision.solve(&mut self.particles, &self.grid, dt);
        }
    }

    pub fn post_solve(&mut self, dt: f32) {
        integrator::post_solve(&mut self.particles, dt);
    }

    /// Advance one rendered frame of `frame_dt` seconds.
    pub fn step_frame(&mut self, frame_dt: f32, gravity: Vec3) {
        if frame_dt <= 0.0 {
            return;
        }
        let substeps = self.config.substeps.max(1);
        let dt = frame_dt / substeps as f32;
        trace!(frame_dt, substeps, "cloth frame");

        if self.collisions.iter().any(|c| c.needs_grid()) {
            self.pre_integration(dt);
        }

        for _ in 0..substeps {
            self.pre_solve(dt, gravity);
            self.solve(dt);
            self.post_solve(dt);
        }

        self.update_vertex_normals();
    }

    pub fn update_vertex_normals(&mut self) {
        self.particles.update_normals(&self.topology.indices);
    }

    pub fn positions_flat(&self) -> &[f32] {
        self.particles.positions_flat()
    }

    pub fn normals_flat(&self) -> &[f32] {
        self.particles.normals_flat()
    }

    fn clamp_to_ground(&mut self) {
        let floor = self.config.floor_height;
        let obstacle = self.config.obstacle.as_ref();
        if floor.is_none() && obstacle.is_none() {
            return;
        }

        let particles = &mut self.particles;
        for i in 0..particles.count {
            if particles.is_pinned(i) {
                continue;
            }
            if let Some(height) = floor {
                if particles.position[i].y < height {
                    particles.position[i] = particles.prev_position[i];
                    particles.position[i].y = height;
                }
            }
            if let Some(field) = obstacle {
                particles.position[i].y = field.clamp(particles.position[i]);
            }
        }
    }
}
