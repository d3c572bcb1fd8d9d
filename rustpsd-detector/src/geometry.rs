//! Geometry builder: per-tube length, orientation, and center position.
//!
//! Runs once at setup. Every input can be defaulted: absent end vectors
//! synthesize a vertical tube of the common length so the rest of the
//! pipeline (validation, intersection, wireframe export) always sees one
//! uniform representation; absent positions raster the tubes across the
//! configured width, linearly or along a circular arc.

use rustpsd_core::vec3::{self, Vec3};
use rustpsd_core::{DetectorConfig, Error, Result};

/// Derived geometry of one tube.
///
/// The local frame places the tube center at the origin with the cylinder
/// axis along +y; `angle_x` and `angle_z` are the two rotations applied by
/// [`TubeGeometry::to_local`] to get there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeGeometry {
    /// Cylinder radius (m).
    pub radius: f64,
    /// Center position in the array frame (m).
    pub center: Vec3,
    /// Center-to-end vector; its norm is half the tube length.
    pub end_offset: Vec3,
    /// Full tube length (m).
    pub length: f64,
    /// Rotation about x applied by the local-frame transform (rad).
    pub angle_x: f64,
    /// Rotation about z applied by the local-frame transform (rad).
    pub angle_z: f64,
}

impl TubeGeometry {
    /// Builds one tube from its center and center-to-end vector.
    ///
    /// # Errors
    /// `InvalidGeometry` if the radius is non-positive or the end vector
    /// is degenerate.
    pub fn from_end_offset(radius: f64, center: Vec3, end_offset: Vec3) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "tube radius must be finite and > 0, got {radius}"
            )));
        }
        let half_length = vec3::norm(end_offset);
        if !half_length.is_finite() || half_length <= 0.0 {
            return Err(Error::InvalidGeometry(
                "tube end offset must be a non-zero vector".into(),
            ));
        }
        let u = vec3::scale(end_offset, 1.0 / half_length);
        let angle_x = -u[2].atan2(u[1]);
        let angle_z = u[0].atan2(u[1].hypot(u[2]));
        Ok(Self {
            radius,
            center,
            end_offset,
            length: 2.0 * half_length,
            angle_x,
            angle_z,
        })
    }

    /// Half the tube length.
    #[inline]
    #[must_use]
    pub fn half_length(&self) -> f64 {
        0.5 * self.length
    }

    /// Unit vector along the tube axis.
    #[inline]
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        vec3::scale(self.end_offset, 1.0 / self.half_length())
    }

    /// Transforms a point from the array frame into the tube-local frame.
    #[inline]
    #[must_use]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotate_to_local(vec3::sub(point, self.center))
    }

    /// Applies only the local-frame rotation (for direction vectors).
    #[inline]
    #[must_use]
    pub fn rotate_to_local(&self, v: Vec3) -> Vec3 {
        vec3::rotate_z(vec3::rotate_x(v, self.angle_x), self.angle_z)
    }

    /// Transforms a point from the tube-local frame back to the array frame.
    #[inline]
    #[must_use]
    pub fn from_local(&self, point: Vec3) -> Vec3 {
        vec3::add(self.rotate_to_global(point), self.center)
    }

    /// Inverse of [`TubeGeometry::rotate_to_local`].
    #[inline]
    #[must_use]
    pub fn rotate_to_global(&self, v: Vec3) -> Vec3 {
        vec3::rotate_x(vec3::rotate_z(v, -self.angle_z), -self.angle_x)
    }
}

/// Derives all tube geometries from the configuration.
///
/// # Errors
/// `ConfigError` on inconsistent array lengths, `InvalidGeometry` on
/// degenerate radii or end vectors.
pub fn build_geometry(config: &DetectorConfig) -> Result<Vec<TubeGeometry>> {
    let n = config.effective_tube_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let radii = resolve_radii(config, n)?;
    let end_offsets = resolve_end_offsets(config, n)?;
    let positions = resolve_positions(config, &radii)?;

    let mut tubes = Vec::with_capacity(n);
    for i in 0..n {
        tubes.push(TubeGeometry::from_end_offset(
            radii[i],
            positions[i],
            end_offsets[i],
        )?);
    }

    log::debug!(
        "built {} tube(s), length {:.4} m .. {:.4} m",
        tubes.len(),
        tubes.iter().map(|t| t.length).fold(f64::INFINITY, f64::min),
        tubes.iter().map(|t| t.length).fold(0.0, f64::max),
    );
    Ok(tubes)
}

fn resolve_radii(config: &DetectorConfig, n: usize) -> Result<Vec<f64>> {
    match &config.radii {
        Some(radii) => {
            if radii.len() != n {
                return Err(Error::ConfigError(format!(
                    "radii has {} entries, expected {n}",
                    radii.len()
                )));
            }
            Ok(radii.clone())
        }
        None => Ok(vec![config.radius; n]),
    }
}

fn resolve_end_offsets(config: &DetectorConfig, n: usize) -> Result<Vec<Vec3>> {
    match &config.end_offsets {
        Some(offsets) => {
            if offsets.len() != n {
                return Err(Error::ConfigError(format!(
                    "end_offsets has {} entries, expected {n}",
                    offsets.len()
                )));
            }
            Ok(offsets.clone())
        }
        // Vertical tube of the common length, zero rotation.
        None => Ok(vec![[0.0, 0.5 * config.height, 0.0]; n]),
    }
}

fn resolve_positions(config: &DetectorConfig, radii: &[f64]) -> Result<Vec<Vec3>> {
    let n = radii.len();
    if let Some(positions) = &config.positions {
        if positions.len() != n {
            return Err(Error::ConfigError(format!(
                "positions has {} entries, expected {n}",
                positions.len()
            )));
        }
        return Ok(positions.clone());
    }

    // Raster across the configured width, pulling the two extreme tubes
    // in by their radii so the outermost walls stay inside the aperture.
    if n == 1 {
        return Ok(vec![[0.0, 0.0, 0.0]]);
    }
    let span = config.width - radii[0] - radii[n - 1];
    if span <= 0.0 {
        return Err(Error::ConfigError(format!(
            "raster width {} too small for the extreme tube radii",
            config.width
        )));
    }

    #[allow(clippy::cast_precision_loss)]
    let steps = (n - 1) as f64;
    let mut positions = Vec::with_capacity(n);
    if config.curvature > 0.0 {
        let half_chord = 0.5 * span / config.curvature;
        if half_chord >= 1.0 {
            return Err(Error::ConfigError(format!(
                "curvature {} too tight for raster span {span}",
                config.curvature
            )));
        }
        // Same physical span, expressed as an arc in the x-z plane.
        let angular_width = 2.0 * half_chord.asin();
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let theta = -0.5 * angular_width + angular_width * (i as f64) / steps;
            positions.push([
                config.curvature * theta.sin(),
                0.0,
                config.curvature * (theta.cos() - 1.0),
            ]);
        }
    } else {
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let x = -0.5 * span + span * (i as f64) / steps;
            positions.push([x, 0.0, 0.0]);
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn base_config() -> DetectorConfig {
        DetectorConfig::new()
            .with_tube_count(3)
            .with_radius(0.00625)
            .with_width(0.05)
            .with_height(0.5)
    }

    #[test]
    fn test_default_orientation_is_vertical() {
        let tubes = build_geometry(&base_config()).unwrap();
        for tube in &tubes {
            assert_relative_eq!(tube.length, 0.5);
            assert_relative_eq!(tube.angle_x, 0.0);
            assert_relative_eq!(tube.angle_z, 0.0);
            assert_relative_eq!(tube.end_offset[1], 0.25);
        }
    }

    #[test]
    fn test_linear_layout_corrects_extremes() {
        let tubes = build_geometry(&base_config()).unwrap();
        let span = 0.05 - 2.0 * 0.00625;
        assert_relative_eq!(tubes[0].center[0], -0.5 * span);
        assert_relative_eq!(tubes[1].center[0], 0.0);
        assert_relative_eq!(tubes[2].center[0], 0.5 * span);
    }

    #[test]
    fn test_single_tube_at_origin() {
        let tubes = build_geometry(&base_config().with_tube_count(1)).unwrap();
        assert_eq!(tubes.len(), 1);
        assert_relative_eq!(vec3::norm(tubes[0].center), 0.0);
    }

    #[test]
    fn test_curved_layout_spans_arc() {
        let curvature = 2.0;
        let tubes = build_geometry(&base_config().with_curvature(curvature)).unwrap();
        let span = 0.05 - 2.0 * 0.00625;
        let angular_width = 2.0 * (0.5 * span / curvature).asin();

        // Extremes sit at the half-angle, center tube at the arc origin.
        assert_relative_eq!(
            tubes[2].center[0],
            curvature * (0.5 * angular_width).sin(),
            epsilon = 1e-12
        );
        assert_relative_eq!(tubes[1].center[0], 0.0, epsilon = 1e-12);
        assert!(tubes[0].center[2] < 0.0);
        assert_relative_eq!(tubes[0].center[2], tubes[2].center[2], epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_end_offset_angles() {
        // Tube along +z: reached from +y by a -90 degree rotation about x.
        let tube = TubeGeometry::from_end_offset(0.01, [0.0; 3], [0.0, 0.0, 0.25]).unwrap();
        assert_relative_eq!(tube.length, 0.5);
        assert_relative_eq!(tube.angle_x, -FRAC_PI_2);
        assert_relative_eq!(tube.angle_z, 0.0);

        // Its local frame maps the axis onto +y.
        let local = tube.rotate_to_local([0.0, 0.0, 1.0]);
        assert_relative_eq!(local[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(local[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(local[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_local_frame_roundtrip_for_skew_axis() {
        let tube =
            TubeGeometry::from_end_offset(0.01, [0.1, -0.2, 0.3], [0.1, 0.2, -0.05]).unwrap();
        let local_axis = tube.rotate_to_local(tube.axis());
        assert_relative_eq!(local_axis[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(local_axis[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(local_axis[2], 0.0, epsilon = 1e-12);

        // The tube's own end point lands on the local axis at +half length.
        let end = vec3::add(tube.center, tube.end_offset);
        let local_end = tube.to_local(end);
        assert_relative_eq!(local_end[1], tube.half_length(), epsilon = 1e-12);
    }

    #[test]
    fn test_determinism_of_rebuild() {
        let config = base_config().with_curvature(3.0);
        let a = build_geometry(&config).unwrap();
        let b = build_geometry(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(TubeGeometry::from_end_offset(0.0, [0.0; 3], [0.0, 1.0, 0.0]).is_err());
        assert!(TubeGeometry::from_end_offset(0.01, [0.0; 3], [0.0; 3]).is_err());

        let config = base_config().with_width(0.01); // narrower than the end radii
        assert!(build_geometry(&config).is_err());

        let mut config = base_config();
        config.radii = Some(vec![0.00625; 2]); // wrong length
        assert!(build_geometry(&config).is_err());
    }
}
