//! rustpsd-detector: Tube array construction and event processing.
//!
//! This crate builds a [`TubeArray`] from a `DetectorConfig` (geometry,
//! resistive network, overlap validation) and processes trajectories
//! against it: intersection search, absorption position and efficiency,
//! resistive charge division, and histogram accumulation.
//!

pub mod array;
pub mod geometry;
pub mod intersect;
pub mod network;
pub mod overlap;
pub mod response;

pub use array::{BatchSummary, HitInfo, Outcome, TubeArray};
pub use geometry::{build_geometry, TubeGeometry};
pub use intersect::{cylinder_intersect, first_crossing, Crossing};
pub use network::{build_network, TubeNetwork};
pub use overlap::{tubes_overlap, validate_no_overlap};
pub use response::{
    dead_zone_factor, divide_charge, fractional_position, gas_absorption_factor, sample_pulse,
    smootherstep,
};
