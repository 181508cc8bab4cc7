//! Position-based cloth dynamics.
//!
//! Builds a particle system from an indexed triangle mesh and advances it
//! with XPBD: semi-implicit Euler prediction, in-place Gauss-Seidel
//! projection of distance and bending constraints, spatial-hash self
//! collision and collision against an external surface. Renderers feed in a
//! mesh plus per-frame gravity and `dt`, and read back position and normal
//! buffers.
//!
//! ```
//! use cloth_core::{Cloth, ClothConfig, ClothMesh};
//! use glam::Vec3;
//!
//! let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, -1.0, 0.0];
//! let indices = [0, 2, 1, 1, 2, 3];
//! let mesh = ClothMesh::from_buffers(&positions, &indices).unwrap();
//!
//! let mut cloth = Cloth::new(mesh, ClothConfig::default()).unwrap();
//! cloth.pin(0);
//! cloth.register_distance_constraint(0.0);
//! cloth.register_performant_bending_constraint(1.0);
//! cloth.step_frame(1.0 / 60.0, Vec3::new(0.0, -9.8, 0.0));
//!
//! assert_eq!(cloth.positions_flat().len(), 12);
//! ```

pub mod cloth;
pub mod collision;
pub mod config;
pub mod constraints;
pub mod error;
pub mod grid;
pub mod heightfield;
pub mod integrator;
pub mod math;
pub mod mesh;
pub mod particle;
pub mod topology;

pub use cloth::Cloth;
pub use config::ClothConfig;
pub use error::{ClothError, ClothResult};
pub use heightfield::HeightField;
pub use mesh::ClothMesh;
pub use particle::ParticleSet;
