//! Semi-implicit Euler integration around the constraint passes.
//!
//! Per substep the caller runs `pre_solve`, then every constraint and
//! collision, then `post_solve`, with `dt = frame_dt / substeps`.

use glam::Vec3;

use crate::particle::ParticleSet;

/// Speed cap as a fraction of `REFERENCE_DT / dt`.
pub const MAX_SPEED_SCALE: f32 = 0.2;
/// Substep length at which the cap equals `MAX_SPEED_SCALE`.
pub const REFERENCE_DT: f32 = 0.01;

/// Frame-rate invariant speed limit for a substep of length `dt`.
#[inline]
pub fn max_speed(dt: f32) -> f32 {
    MAX_SPEED_SCALE * (REFERENCE_DT / dt)
}

/// Apply gravity, clamp speed, save the previous position and predict.
/// Pinned particles are not touched.
pub fn pre_solve(particles: &mut ParticleSet, dt: f32, gravity: Vec3) {
    let max_v = max_speed(dt);

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        particles
            .position
            .par_iter_mut()
            .zip(particles.prev_position.par_iter_mut())
            .zip(particles.velocity.par_iter_mut())
            .zip(particles.inv_mass.par_iter())
            .for_each(|(((x, prev), v), &w)| {
                predict(x, prev, v, w, dt, gravity, max_v);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (((x, prev), v), &w) in particles
            .position
            .iter_mut()
            .zip(particles.prev_position.iter_mut())
            .zip(particles.velocity.iter_mut())
            .zip(particles.inv_mass.iter())
        {
            predict(x, prev, v, w, dt, gravity, max_v);
        }
    }
}

/// Rebuild velocity from the corrected position change. Pinned particles
/// are not touched.
pub fn post_solve(particles: &mut ParticleSet, dt: f32) {
    let inv_dt = 1.0 / dt;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        particles
            .velocity
            .par_iter_mut()
            .zip(particles.position.par_iter())
            .zip(particles.prev_position.par_iter())
            .zip(particles.inv_mass.par_iter())
            .for_each(|(((v, &x), &prev), &w)| {
                if w != 0.0 {
                    *v = (x - prev) * inv_dt;
                }
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (((v, &x), &prev), &w) in particles
            .velocity
            .iter_mut()
            .zip(particles.position.iter())
            .zip(particles.prev_position.iter())
            .zip(particles.inv_mass.iter())
        {
            if w != 0.0 {
                *v = (x - prev) * inv_dt;
            }
        }
    }
}

#[inline]
fn predict(
    x: &mut Vec3,
    prev: &mut Vec3,
    v: &mut Vec3,
    w: f32,
    dt: f32,
    gravity: Vec3,
    max_v: f32,
) {
    if w == 0.0 {
        return;
    }
    *v += gravity * dt;
    let speed = v.length();
    if speed > max_v {
        *v *= max_v / speed;
    }
    *prev = *x;
    *x += *v * dt;
}
