use bytemuck::Zeroable;
use cloth_core::collision::CollisionSurface;
use cloth_core::{Cloth, ClothConfig, ClothError, ClothMesh, HeightField};
use glam::{Mat4, Vec3};
use wasm_bindgen::prelude::*;

/// GPU-compatible vertex: 24 bytes, matches the WGSL vertex layout
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuVertex {
    position: [f32; 3], // 12 bytes
    normal: [f32; 3],   // 12 bytes
}

fn js_error(err: ClothError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct ClothWorld {
    cloth: Cloth,
    gpu_buffer: Vec<GpuVertex>,
}

#[wasm_bindgen]
impl ClothWorld {
    /// `positions` holds 3 floats per vertex, `indices` 3 ids per triangle.
    #[wasm_bindgen(constructor)]
    pub fn new(positions: &[f32], indices: &[u16], thickness: f32) -> Result<ClothWorld, JsValue> {
        let mesh = ClothMesh::from_buffers(positions, indices).map_err(js_error)?;
        let config = ClothConfig {
            thickness,
            ..ClothConfig::default()
        };
        let cloth = Cloth::new(mesh, config).map_err(js_error)?;

        web_sys::console::log_1(
            &format!(
                "WASM ClothWorld created: {} particles, {} triangles",
                cloth.particles.count,
                cloth.topology.triangle_count()
            )
            .into(),
        );

        let mut world = ClothWorld {
            gpu_buffer: vec![GpuVertex::zeroed(); cloth.particles.count],
            cloth,
        };
        world.write_gpu_output();
        Ok(world)
    }

    /// Replace the mesh. Every registered constraint and collision is dropped.
    #[wasm_bindgen]
    pub fn update_mesh(&mut self, positions: &[f32], indices: &[u16]) -> Result<(), JsValue> {
        let mesh = ClothMesh::from_buffers(positions, indices).map_err(js_error)?;
        self.cloth.update_mesh(mesh).map_err(js_error)?;
        self.gpu_buffer = vec![GpuVertex::zeroed(); self.cloth.particles.count];
        self.write_gpu_output();
        Ok(())
    }

    /// Flat list of vertex pairs to stitch together.
    #[wasm_bindgen]
    pub fn set_attachments(&mut self, pairs: &[u32]) -> Result<(), JsValue> {
        let pairs = pairs.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
        self.cloth.set_attachments(pairs).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn register_distance_constraint(&mut self, compliance: f32) {
        self.cloth.register_distance_constraint(compliance);
    }

    #[wasm_bindgen]
    pub fn register_performant_bending_constraint(&mut self, compliance: f32) {
        self.cloth.register_performant_bending_constraint(compliance);
    }

    #[wasm_bindgen]
    pub fn register_isometric_bending_constraint(&mut self, compliance: f32) {
        self.cloth.register_isometric_bending_constraint(compliance);
    }

    #[wasm_bindgen]
    pub fn register_self_collision(&mut self, damping: Option<f32>) {
        self.cloth.set_self_collision_damping(damping);
        self.cloth.register_self_collision();
    }

    /// Collide against a triangle mesh placed by a column-major 4x4 matrix.
    #[wasm_bindgen]
    pub fn register_external_collision(
        &mut self,
        positions: &[f32],
        indices: &[u32],
        world: &[f32],
    ) -> Result<(), JsValue> {
        let world: &[f32; 16] = world
            .try_into()
            .map_err(|_| JsValue::from_str("world transform needs 16 floats"))?;
        let positions = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        let surface = CollisionSurface::new(positions, indices, Mat4::from_cols_array(world));
        self.cloth.register_external_collision(surface, None);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn pin(&mut self, index: usize) {
        self.cloth.pin(index);
    }

    #[wasm_bindgen]
    pub fn pin_top_corners(&mut self) {
        self.cloth.pin_top_corners();
    }

    #[wasm_bindgen]
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.cloth.set_gravity(Vec3::new(x, y, z));
    }

    #[wasm_bindgen]
    pub fn set_substeps(&mut self, substeps: u32) {
        self.cloth.set_substeps(substeps);
    }

    #[wasm_bindgen]
    pub fn set_floor_height(&mut self, height: Option<f32>) {
        self.cloth.set_floor_height(height);
    }

    /// Toggle the calibrated height-field obstacle.
    #[wasm_bindgen]
    pub fn set_obstacle(&mut self, enabled: bool) {
        self.cloth
            .set_obstacle(enabled.then(|| HeightField::calibrated(HeightField::OBJECT_ADJUST)));
    }

    /// Advance one frame; returns the wall time spent in milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self, frame_dt: f32) -> f32 {
        let start = js_sys::Date::now();
        let gravity = self.cloth.config().gravity;
        self.cloth.step_frame(frame_dt, gravity);
        self.write_gpu_output();
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_ptr(&self) -> *const f32 {
        self.gpu_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_byte_length(&self) -> usize {
        self.gpu_buffer.len() * std::mem::size_of::<GpuVertex>()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.cloth.particles.count
    }

    /// Copy of the positions, 3 floats per particle.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f32> {
        self.cloth.positions_flat().to_vec()
    }

    /// Copy of the unnormalized vertex normals, 3 floats per particle.
    #[wasm_bindgen]
    pub fn normals(&self) -> Vec<f32> {
        self.cloth.normals_flat().to_vec()
    }
}

impl ClothWorld {
    fn write_gpu_output(&mut self) {
        let particles = &self.cloth.particles;
        for (out, (p, n)) in self
            .gpu_buffer
            .iter_mut()
            .zip(particles.position.iter().zip(&particles.normal))
        {
            *out = GpuVertex {
                position: p.to_array(),
                normal: n.normalize_or_zero().to_array(),
            };
        }
    }
}
