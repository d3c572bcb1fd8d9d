//! Trajectory and event-record abstractions.
//!
//! A [`Trajectory`] is the per-event input supplied by the outer transport
//! engine, expressed in the detector array's reference frame. The
//! [`FieldStore`] trait is the seam to the engine's named dynamic-field
//! store: charge-division results are written back through it by string
//! name, and configured names are validated against it at construction.

use crate::vec3::Vec3;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A particle trajectory entering the detector array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    /// Position in the array reference frame (m).
    pub position: Vec3,
    /// Velocity in the array reference frame (m/s).
    pub velocity: Vec3,
    /// Time of flight accumulated when reaching the array (s).
    pub time: f64,
    /// Statistical weight of the event.
    pub weight: f64,
}

impl Trajectory {
    /// Creates a trajectory with unit weight and zero accumulated time.
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            time: 0.0,
            weight: 1.0,
        }
    }

    /// Sets the accumulated time of flight.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Sets the statistical weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Speed (norm of the velocity).
    #[inline]
    #[must_use]
    pub fn speed(&self) -> f64 {
        crate::vec3::norm(self.velocity)
    }
}

/// String-keyed numeric field store attached to the current event.
///
/// Implemented by the transport engine's event record. The detector only
/// requires existence checks and writes; it never enumerates or reads
/// fields back.
pub trait FieldStore {
    /// Returns true if the schema contains a field with this name.
    fn has_field(&self, name: &str) -> bool;

    /// Writes `value` into the named field on the current event.
    fn set_field(&mut self, name: &str, value: f64);
}

/// In-memory field store backed by a `HashMap`.
///
/// Used by the CLI and tests; a real transport engine supplies its own
/// implementation. Fields must be declared before they resolve, matching
/// engines with a fixed per-run schema.
#[derive(Debug, Clone, Default)]
pub struct MapFieldStore {
    values: HashMap<String, f64>,
}

impl MapFieldStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given fields declared (initialized to 0).
    #[must_use]
    pub fn with_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = names.into_iter().map(|n| (n.into(), 0.0)).collect();
        Self { values }
    }

    /// Declares a field, initialized to 0.
    pub fn declare_field(&mut self, name: impl Into<String>) {
        self.values.entry(name.into()).or_insert(0.0);
    }

    /// Reads a field back, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

impl FieldStore for MapFieldStore {
    fn has_field(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn set_field(&mut self, name: &str, value: f64) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
    }
}
