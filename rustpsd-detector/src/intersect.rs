//! Intersection engine: first tube crossed by a trajectory.
//!
//! Tubes are scanned in configured order and the first valid intersection
//! wins; later tubes are never checked. Geometric proximity does not break
//! ties: the overlap validator guarantees at most one tube can genuinely
//! contain any point, so order-precedence only matters for rays grazing
//! two bounding regions, which resolve to the lower index.

use crate::geometry::TubeGeometry;
use rustpsd_core::vec3::Vec3;
use rustpsd_core::Trajectory;

/// Quadratic and slab tolerances for near-degenerate rays.
const EPS: f64 = 1e-12;

/// A trajectory's crossing of one tube, in that tube's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Index of the crossed tube.
    pub tube: usize,
    /// Parametric entry time, clamped to 0 for rays starting inside.
    pub t_in: f64,
    /// Parametric exit time (> 0).
    pub t_out: f64,
    /// Trajectory position in the tube-local frame.
    pub local_pos: Vec3,
    /// Trajectory velocity in the tube-local frame.
    pub local_vel: Vec3,
}

/// Entry/exit times of a ray with a finite cylinder about the local y axis.
///
/// The cylinder has the given radius and extends over `|y| <= half_length`.
/// Returns `None` when the ray misses the infinite cylinder, misses the
/// end-plane slab, or runs parallel to the axis outside the radius.
#[must_use]
pub fn cylinder_intersect(
    pos: Vec3,
    vel: Vec3,
    radius: f64,
    half_length: f64,
) -> Option<(f64, f64)> {
    let [x, y, z] = pos;
    let [vx, vy, vz] = vel;

    let a = vx * vx + vz * vz;
    let (mut t0, mut t1) = if a < EPS {
        // Ray parallel to the axis: inside or outside for all time.
        if x * x + z * z > radius * radius {
            return None;
        }
        (f64::NEG_INFINITY, f64::INFINITY)
    } else {
        let b = 2.0 * (x * vx + z * vz);
        let c = x * x + z * z - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        ((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a))
    };

    // Clip against the end planes.
    if vy.abs() < EPS {
        if y.abs() > half_length {
            return None;
        }
    } else {
        let ta = (-half_length - y) / vy;
        let tb = (half_length - y) / vy;
        let (slab_lo, slab_hi) = if ta < tb { (ta, tb) } else { (tb, ta) };
        t0 = t0.max(slab_lo);
        t1 = t1.min(slab_hi);
        if t0 > t1 {
            return None;
        }
    }

    if !t0.is_finite() || !t1.is_finite() {
        // Axis-parallel ray with no end-plane crossing in finite time.
        return None;
    }
    Some((t0, t1))
}

/// Finds the first tube (lowest configured index) crossed by `trajectory`.
///
/// An intersection is valid when its exit lies in the future (`t1 > 0`);
/// the entry time is clamped to 0 for trajectories starting inside the
/// tube volume. Returns `None` when every tube is missed.
#[must_use]
pub fn first_crossing(tubes: &[TubeGeometry], trajectory: &Trajectory) -> Option<Crossing> {
    for (index, tube) in tubes.iter().enumerate() {
        let local_pos = tube.to_local(trajectory.position);
        let local_vel = tube.rotate_to_local(trajectory.velocity);
        if let Some((t0, t1)) =
            cylinder_intersect(local_pos, local_vel, tube.radius, tube.half_length())
        {
            if t1 > 0.0 {
                return Some(Crossing {
                    tube: index,
                    t_in: t0.max(0.0),
                    t_out: t1,
                    local_pos,
                    local_vel,
                });
            }
        }
    }
    None
}
