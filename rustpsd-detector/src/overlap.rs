//! Overlap validator: pairwise cylinder-intersection check.
//!
//! Runs once at setup over all tube pairs. N is tens, so the O(N^2) sweep
//! stays unindexed. The test distinguishes parallel and skew axis pairs;
//! the skew branch probes the four extreme points of the second cylinder
//! against the first tube's axial and radial extent.

use crate::geometry::TubeGeometry;
use rustpsd_core::vec3::{self, Vec3};
use rustpsd_core::{Error, Result};

/// Axis directions closer than this are treated as parallel.
const PARALLEL_EPS: f64 = 1e-9;

/// Tests whether the cylindrical volumes of two tubes intersect.
#[must_use]
pub fn tubes_overlap(first: &TubeGeometry, second: &TubeGeometry) -> bool {
    let u1 = first.axis();
    let u2 = second.axis();
    let d = vec3::sub(second.center, first.center);
    let radius_sum = first.radius + second.radius;

    let perp_both = vec3::cross(u1, u2);
    if vec3::norm(perp_both) < PARALLEL_EPS {
        // Parallel axes: compare the axis-perpendicular center separation
        // with the radii, then the along-axis separation with the lengths.
        let axial = vec3::dot(d, u1);
        let radial = vec3::norm(vec3::sub(d, vec3::scale(u1, axial)));
        if radial >= radius_sum {
            return false;
        }
        return axial.abs() <= first.half_length() + second.half_length();
    }

    // Skew axes: separation along the direction perpendicular to both
    // rules the pair out; otherwise probe the second cylinder's extremes.
    let n = vec3::normalized(perp_both);
    if vec3::dot(d, n).abs() >= radius_sum {
        return false;
    }

    let transverse = vec3::normalized(vec3::cross(n, u2));
    for axial_sign in [-1.0, 1.0] {
        for radial_sign in [-1.0, 1.0] {
            let extreme = vec3::add(
                second.center,
                vec3::add(
                    vec3::scale(u2, axial_sign * second.half_length()),
                    vec3::scale(transverse, radial_sign * second.radius),
                ),
            );
            let rel = vec3::sub(extreme, first.center);
            let axial = vec3::dot(rel, u1);
            let radial = vec3::norm(vec3::sub(rel, vec3::scale(u1, axial)));
            if axial.abs() <= first.half_length() && radial <= first.radius {
                return true;
            }
        }
    }
    false
}

/// Checks every tube pair; any overlap is fatal.
///
/// # Errors
/// `TubeOverlap` with the number of offending pairs, logged before failing.
pub fn validate_no_overlap(tubes: &[TubeGeometry]) -> Result<()> {
    let mut count = 0;
    for i in 0..tubes.len() {
        for j in (i + 1)..tubes.len() {
            if tubes_overlap(&tubes[i], &tubes[j]) {
                log::error!("tubes {i} and {j} occupy overlapping volumes");
                count += 1;
            }
        }
    }
    if count > 0 {
        log::error!("overlap validation failed: {count} overlapping pair(s)");
        return Err(Error::TubeOverlap { count });
    }
    Ok(())
}
