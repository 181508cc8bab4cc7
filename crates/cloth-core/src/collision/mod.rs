//! Collision passes run after the constraints of every substep.

pub mod external;
pub mod self_collision;

use crate::grid::SpatialHashGrid;
use crate::particle::ParticleSet;

pub use external::{CollisionSurface, ExternalCollision, RigidBodySink, SurfaceHit};
pub use self_collision::SelfCollision;

/// A collision response registered on a cloth.
pub trait Collision {
    /// Correct positions in place. `grid` holds this frame's particle
    /// adjacency; passes that do not need it ignore it.
    fn solve(&mut self, particles: &mut ParticleSet, grid: &SpatialHashGrid, dt: f32);

    /// Whether `grid` must be rebuilt before this pass runs.
    fn needs_grid(&self) -> bool {
        false
    }

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
