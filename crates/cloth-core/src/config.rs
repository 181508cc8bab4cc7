use glam::Vec3;

use crate::heightfield::HeightField;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClothConfig {
    /// Collision shell radius; also the spatial hash cell size.
    pub thickness: f32,
    /// Substeps per frame.
    pub substeps: u32,
    pub gravity: Vec3,
    /// Self-collision friction. `None` or `<= 0` disables it.
    pub self_collision_damping: Option<f32>,
    /// Particles below this height are put back at their previous position,
    /// lifted to the floor.
    pub floor_height: Option<f32>,
    pub obstacle: Option<HeightField>,
    /// Pin the two top corners after every (re)build.
    pub pin_top_corners: bool,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            thickness: 0.05,
            substeps: 10,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            self_collision_damping: None,
            floor_height: None,
            obstacle: None,
            pin_top_corners: false,
        }
    }
}
