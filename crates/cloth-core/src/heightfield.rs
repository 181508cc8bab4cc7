//! Static obstacle proxy built from regions with minimum heights.
//!
//! A coarse, cheap stand-in for "do not fall through this obstacle". Regions
//! are tested in order and the first one whose footprint contains the
//! particle and whose threshold lies above it lifts the particle.

use glam::Vec3;

/// XZ footprint of a region. All bounds are strict.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Footprint {
    /// `x^2 + z^2 < radius_sq`
    Disk { radius_sq: f32 },
    /// Disk additionally limited to `|x| < half_x`.
    DiskBand { radius_sq: f32, half_x: f32 },
    /// `|x| < half_x` and `|z| < half_z`.
    Rect { half_x: f32, half_z: f32 },
}

impl Footprint {
    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        match *self {
            Footprint::Disk { radius_sq } => x * x + z * z < radius_sq,
            Footprint::DiskBand { radius_sq, half_x } => {
                x * x + z * z < radius_sq && -half_x < x && x < half_x
            }
            Footprint::Rect { half_x, half_z } => {
                -half_x < x && x < half_x && -half_z < z && z < half_z
            }
        }
    }
}

/// One row of the table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub footprint: Footprint,
    /// The region applies when `y < below`.
    pub below: f32,
    /// Height the particle is lifted to.
    pub lift_to: f32,
    /// Whether the table's `adjust` offset is added to `below` and `lift_to`.
    pub adjusted: bool,
}

impl Region {
    const fn disk(radius_sq: f32, below: f32, lift_to: f32) -> Self {
        Self {
            footprint: Footprint::Disk { radius_sq },
            below,
            lift_to,
            adjusted: false,
        }
    }

    const fn rect(half_x: f32, half_z: f32, height: f32) -> Self {
        Self {
            footprint: Footprint::Rect { half_x, half_z },
            below: height,
            lift_to: height,
            adjusted: true,
        }
    }
}

/// Ordered region table; first match wins.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightField {
    pub regions: Vec<Region>,
    /// Offset added to every adjusted region.
    pub adjust: f32,
}

/// Calibration for the reference obstacle mesh. The values and their order
/// are tuned by hand and kept as-is.
const CALIBRATED: [Region; 31] = [
    Region::disk(0.1, 0.25, 0.25),
    Region::disk(0.25, 0.0, 0.0),
    Region::disk(0.3, -0.15, 0.0),
    Region {
        footprint: Footprint::DiskBand { radius_sq: 0.73, half_x: 0.5 },
        below: -0.36,
        lift_to: -0.36,
        adjusted: false,
    },
    Region::rect(0.1, 0.95, -0.375),
    Region::rect(0.1, 1.17, -0.39),
    Region::rect(0.35, 0.72, -0.4),
    Region::rect(0.1, 1.3074, -0.4313),
    Region::rect(0.3109, 1.1672, -0.4381),
    Region::rect(0.2798, 1.3049, -0.4798),
    Region::rect(0.1, 1.4027, -0.4844),
    Region::rect(0.2518, 1.4001, -0.5312),
    Region::rect(0.1, 1.5033, -0.5443),
    Region::rect(0.6848, 0.6369, -0.5464),
    Region::rect(0.6191, 0.9347, -0.5779),
    Region::rect(0.782, 0.3195, -0.5833),
    Region::rect(0.7971, 0.1, -0.5862),
    Region::rect(0.2251, 1.5004, -0.5863),
    Region::rect(0.5486, 1.1598, -0.5974),
    Region::rect(0.4892, 1.2966, -0.6376),
    Region::rect(0.1, 1.5816, -0.6694),
    Region::rect(0.4386, 1.3919, -0.6837),
    Region::rect(0.2041, 1.5765, -0.6995),
    Region::rect(0.3882, 1.491, -0.7218),
    Region::rect(0.3335, 1.5557, -0.7684),
    Region::rect(0.852, 0.6356, -0.8468),
    Region::rect(0.7669, 0.9225, -0.8479),
    Region::rect(0.8829, 0.3227, -0.8528),
    Region::rect(0.8827, 0.1, -0.855),
    Region::rect(0.6631, 1.1461, -0.8627),
    Region::rect(0.5787, 1.2819, -0.9006),
];

impl HeightField {
    /// Offset used when the table runs inside the cloth step.
    pub const OBJECT_ADJUST: f32 = 0.04;
    /// Offset used when the table is queried on its own.
    pub const STANDALONE_ADJUST: f32 = 0.06;

    pub fn new(regions: Vec<Region>, adjust: f32) -> Self {
        Self { regions, adjust }
    }

    /// The hand-calibrated table for the reference obstacle.
    pub fn calibrated(adjust: f32) -> Self {
        Self::new(CALIBRATED.to_vec(), adjust)
    }

    /// Clamped height for a particle at `p`; `p.y` if no region applies.
    pub fn clamp(&self, p: Vec3) -> f32 {
        for region in &self.regions {
            let offset = if region.adjusted { self.adjust } else { 0.0 };
            if p.y < region.below + offset && region.footprint.contains(p.x, p.z) {
                return region.lift_to + offset;
            }
        }
        p.y
    }
}
