//! Detector configuration.

use crate::vec3::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a position-sensitive tube array detector.
///
/// Every geometric and electrical input can be given either as a shared
/// scalar or as an explicit per-tube array; explicit arrays always take
/// precedence. Optional event-record field names enable charge-division
/// write-back; each write is skipped when its name is unset.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Number of tubes, as configured. Non-positive values produce an
    /// empty, always-missing detector (with a warning).
    pub tube_count: i32,
    /// Wire all tubes into one continuous resistive chain.
    pub series: bool,
    /// Histogram bins along each tube's length.
    pub pixels_per_tube: usize,

    /// Discriminator threshold of the charge electronics (channels).
    pub threshold: f64,
    /// Saturation level of the charge electronics (channels).
    pub max_level: f64,

    /// Common tube radius (m), used when `radii` is absent.
    pub radius: f64,
    /// Per-tube radii (m); overrides `radius`.
    pub radii: Option<Vec<f64>>,
    /// Raster width of the array along x (m).
    pub width: f64,
    /// Common tube length (m), used when `end_offsets` is absent.
    pub height: f64,
    /// Curvature radius of the raster (m); 0 lays tubes out linearly.
    pub curvature: f64,
    /// Explicit tube center positions; overrides the raster layout.
    pub positions: Option<Vec<Vec3>>,
    /// Explicit center-to-end vectors; overrides `height` and fixes each
    /// tube's orientation.
    pub end_offsets: Option<Vec<Vec3>>,

    /// Shared inter-tube contact resistance (ohm), used when no explicit
    /// resistance arrays are given.
    pub inter_resistance: f64,
    /// Explicit inter-tube resistances, length N+1; split evenly across
    /// each junction.
    pub inter_resistances: Option<Vec<f64>>,
    /// Explicit pre-contact resistance per tube (ohm).
    pub pre_contact: Option<Vec<f64>>,
    /// Explicit post-contact resistance per tube (ohm).
    pub post_contact: Option<Vec<f64>>,
    /// Shared wire resistivity (ohm/m), used when `resistivities` is absent.
    pub resistivity: f64,
    /// Per-tube wire resistivity (ohm/m); overrides `resistivity`.
    pub resistivities: Option<Vec<f64>>,

    /// Converter gas pressure (bar); 0 disables the absorption correction.
    pub pressure: f64,
    /// Dead-zone characteristic length at each tube end (m); 0 disables
    /// the efficiency ramp.
    pub dead_length: f64,

    /// Event-record field receiving the left charge reading.
    pub field_left: Option<String>,
    /// Event-record field receiving the right charge reading.
    pub field_right: Option<String>,
    /// Event-record field receiving the detection time.
    pub field_time: Option<String>,
    /// Event-record field receiving the wire index.
    pub field_wire: Option<String>,
    /// Wire index of tube 0.
    pub wire_base: i32,
    /// Wire index increment per tube.
    pub wire_step: i32,
    /// Extra time of flight added to the detection time (s).
    pub tof_offset: f64,

    /// Skip the pairwise overlap validation (at the caller's risk).
    pub skip_overlap_check: bool,
    /// Pass a hit trajectory through unchanged instead of consuming it.
    pub restore_trajectory: bool,

    /// Persistence target for the per-tube 2-D grid.
    pub target_2d: Option<String>,
    /// Persistence target for the flattened 1-D grid (series mode only).
    pub target_1d: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tube_count: 1,
            series: false,
            pixels_per_tube: 256,
            threshold: 400.0,  // typical discriminator setting
            max_level: 4096.0, // 12-bit ADC saturation
            radius: 0.00635,   // half-inch tube
            radii: None,
            width: 0.05,
            height: 0.5,
            curvature: 0.0,
            positions: None,
            end_offsets: None,
            inter_resistance: 0.0,
            inter_resistances: None,
            pre_contact: None,
            post_contact: None,
            resistivity: 1000.0,
            resistivities: None,
            pressure: 0.0,
            dead_length: 0.0,
            field_left: None,
            field_right: None,
            field_time: None,
            field_wire: None,
            wire_base: 0,
            wire_step: 1,
            tof_offset: 0.0,
            skip_overlap_check: false,
            restore_trajectory: false,
            target_2d: None,
            target_1d: None,
        }
    }
}

impl DetectorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tube count.
    #[must_use]
    pub fn with_tube_count(mut self, count: i32) -> Self {
        self.tube_count = count;
        self
    }

    /// Enables or disables series wiring.
    #[must_use]
    pub fn with_series(mut self, series: bool) -> Self {
        self.series = series;
        self
    }

    /// Sets the number of pixels per tube.
    #[must_use]
    pub fn with_pixels_per_tube(mut self, pixels: usize) -> Self {
        self.pixels_per_tube = pixels;
        self
    }

    /// Sets the common tube radius (m).
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the raster width (m).
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Sets the common tube length (m).
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Sets the raster curvature radius (m).
    #[must_use]
    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = curvature;
        self
    }

    /// Sets the shared inter-tube contact resistance (ohm).
    #[must_use]
    pub fn with_inter_resistance(mut self, resistance: f64) -> Self {
        self.inter_resistance = resistance;
        self
    }

    /// Sets the shared wire resistivity (ohm/m).
    #[must_use]
    pub fn with_resistivity(mut self, resistivity: f64) -> Self {
        self.resistivity = resistivity;
        self
    }

    /// Sets the converter gas pressure (bar).
    #[must_use]
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    /// Sets the dead-zone characteristic length (m).
    #[must_use]
    pub fn with_dead_length(mut self, length: f64) -> Self {
        self.dead_length = length;
        self
    }

    /// Configures the four charge-division field names at once.
    #[must_use]
    pub fn with_charge_fields(
        mut self,
        left: impl Into<String>,
        right: impl Into<String>,
        time: impl Into<String>,
        wire: impl Into<String>,
    ) -> Self {
        self.field_left = Some(left.into());
        self.field_right = Some(right.into());
        self.field_time = Some(time.into());
        self.field_wire = Some(wire.into());
        self
    }

    /// Sets the 2-D persistence target.
    #[must_use]
    pub fn with_target_2d(mut self, target: impl Into<String>) -> Self {
        self.target_2d = Some(target.into());
        self
    }

    /// Sets the 1-D persistence target.
    #[must_use]
    pub fn with_target_1d(mut self, target: impl Into<String>) -> Self {
        self.target_1d = Some(target.into());
        self
    }

    /// Derived non-negative tube count.
    #[inline]
    #[must_use]
    pub fn effective_tube_count(&self) -> usize {
        usize::try_from(self.tube_count).unwrap_or(0)
    }

    /// True when the flattened 1-D grid is active: series wiring with a
    /// configured persistence target.
    #[inline]
    #[must_use]
    pub fn flattened_grid_enabled(&self) -> bool {
        self.series && self.target_1d.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = DetectorConfig::new()
            .with_tube_count(3)
            .with_series(true)
            .with_pixels_per_tube(100)
            .with_radius(0.00625)
            .with_width(0.05)
            .with_height(0.5);
        assert_eq!(config.tube_count, 3);
        assert!(config.series);
        assert_eq!(config.pixels_per_tube, 100);
        assert_eq!(config.effective_tube_count(), 3);
    }

    #[test]
    fn test_effective_count_clamps_negative() {
        let config = DetectorConfig::new().with_tube_count(-4);
        assert_eq!(config.effective_tube_count(), 0);
    }

    #[test]
    fn test_flattened_grid_requires_series_and_target() {
        let base = DetectorConfig::new().with_target_1d("wire.dat");
        assert!(!base.flattened_grid_enabled());
        assert!(base.with_series(true).flattened_grid_enabled());
    }
}
