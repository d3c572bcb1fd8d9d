//! Position, efficiency, and charge-division response models.
//!
//! Converts a tube crossing into a fractional absorption position, applies
//! the gas-absorption and dead-zone weight corrections, and simulates the
//! resistive charge split seen by the readout electronics.

use crate::intersect::Crossing;
use rand::Rng;
use std::f64::consts::TAU;

/// Velocity (m/s) to wavenumber (1/angstrom) conversion.
pub const V2K: f64 = 1.588_253_61e-3;

/// He-3 absorption coefficient, 1/(bar * m * angstrom), 1/v law.
pub const SIGMA_HE3: f64 = 7.417;

/// Fractional absorption position along the tube, in [0, 1].
///
/// Uses the mid-chord point of the crossing; positions outside the tube
/// length (numerically possible for grazing rays) are rejected as misses.
#[must_use]
pub fn fractional_position(crossing: &Crossing, length: f64) -> Option<f64> {
    let mid_time = 0.5 * (crossing.t_in + crossing.t_out);
    let along = crossing.local_pos[1] + mid_time * crossing.local_vel[1];
    let frac = 0.5 + along / length;
    (0.0..=1.0).contains(&frac).then_some(frac)
}

/// Gas-absorption weight multiplier.
///
/// The absorption exponent is the pressure times the chord's path-length x
/// wavelength product, in which velocity cancels: `path * lambda =
/// (v * dt) * (tau / (V2K * v)) = tau * dt / V2K`. A non-positive pressure
/// disables the correction entirely (multiplier exactly 1).
#[must_use]
pub fn gas_absorption_factor(pressure: f64, chord_time: f64) -> f64 {
    if pressure <= 0.0 {
        return 1.0;
    }
    1.0 - (-SIGMA_HE3 * pressure * chord_time.abs() * TAU / V2K).exp()
}

/// Quintic smoothstep of `x` between `edge0` and `edge1`.
///
/// Zero first and second derivatives at both edges.
#[must_use]
pub fn smootherstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Dead-zone efficiency multiplier at fractional position `frac`.
///
/// Ramps from 0 to 1 over `dead_length` at each tube end and equals 1 in
/// the interior; a non-positive `dead_length` disables the ramp.
#[must_use]
pub fn dead_zone_factor(dead_length: f64, frac: f64, length: f64) -> f64 {
    if dead_length <= 0.0 {
        return 1.0;
    }
    let x = frac * length;
    smootherstep(0.0, dead_length, x) + smootherstep(0.0, dead_length, length - x) - 1.0
}

/// Simulated total pulse height between the discriminator threshold and
/// the saturation level, independent of position.
pub fn sample_pulse<R: Rng>(rng: &mut R, threshold: f64, max_level: f64) -> f64 {
    threshold + rng.random::<f64>() * (max_level - threshold)
}

/// Splits a pulse across the two wire ends by resistance ratio.
///
/// The right reading is rounded to a whole channel; the left reading is
/// the exact complement and is never rounded independently, so
/// `left + right` reproduces the pulse height exactly.
#[must_use]
pub fn divide_charge(pulse: f64, right_resistance: f64, total_resistance: f64) -> (f64, f64) {
    let right = (pulse * right_resistance / total_resistance).round();
    (pulse - right, right)
}
