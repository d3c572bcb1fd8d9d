//! Network builder: contact and wire resistances, charge-division normalizer.
//!
//! Contact resistances are derived so that the resistance between two
//! adjacent tubes equals the configured junction value (split evenly across
//! the junction) and the two free ends of the array see zero contact
//! resistance. Explicit per-tube arrays take precedence over the shared
//! scalar. In series wiring every tube publishes the whole chain's
//! resistance as its charge-division normalizer.

use crate::geometry::TubeGeometry;
use rustpsd_core::{DetectorConfig, Error, Result};

/// Derived electrical network of the tube array.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeNetwork {
    /// Contact resistance before each tube's wire (ohm).
    pub pre_contact: Vec<f64>,
    /// Contact resistance after each tube's wire (ohm).
    pub post_contact: Vec<f64>,
    /// Wire resistivity per tube (ohm/m).
    pub resistivity: Vec<f64>,
    /// Full wire resistance per tube, `resistivity * length` (ohm).
    pub wire_resistance: Vec<f64>,
    /// Published total resistance used as the charge-division normalizer.
    /// Identical across all tubes in series wiring (the whole chain),
    /// tube-local otherwise.
    pub total_resistance: Vec<f64>,
    /// Cumulative base resistance of all preceding chain tubes; all zeros
    /// when not wired in series.
    pub chain_offset: Vec<f64>,
}

impl TubeNetwork {
    /// Number of tubes in the network.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_resistance.len()
    }

    /// Returns true for an empty network.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_resistance.is_empty()
    }

    /// Baseline resistance of one tube: pre + wire + post.
    #[inline]
    #[must_use]
    pub fn base_resistance(&self, tube: usize) -> f64 {
        self.pre_contact[tube] + self.wire_resistance[tube] + self.post_contact[tube]
    }
}

/// Derives the resistive network from the configuration and geometry.
///
/// # Errors
/// `ConfigError` on inconsistent array lengths or a non-positive published
/// total resistance.
pub fn build_network(config: &DetectorConfig, geometry: &[TubeGeometry]) -> Result<TubeNetwork> {
    let n = geometry.len();

    let resistivity = match &config.resistivities {
        Some(values) => {
            if values.len() != n {
                return Err(Error::ConfigError(format!(
                    "resistivities has {} entries, expected {n}",
                    values.len()
                )));
            }
            values.clone()
        }
        None => vec![config.resistivity; n],
    };

    let (pre_contact, post_contact) = resolve_contacts(config, n)?;

    let wire_resistance: Vec<f64> = (0..n)
        .map(|i| resistivity[i] * geometry[i].length)
        .collect();

    let base: Vec<f64> = (0..n)
        .map(|i| pre_contact[i] + wire_resistance[i] + post_contact[i])
        .collect();

    let total_resistance = if config.series {
        let chain: f64 = base.iter().sum();
        vec![chain; n]
    } else {
        base.clone()
    };

    for (i, &total) in total_resistance.iter().enumerate() {
        if total <= 0.0 {
            return Err(Error::ConfigError(format!(
                "total resistance of tube {i} is {total}, must be > 0 for charge division"
            )));
        }
    }

    let mut chain_offset = vec![0.0; n];
    if config.series {
        let mut cumulative = 0.0;
        for i in 0..n {
            chain_offset[i] = cumulative;
            cumulative += base[i];
        }
    }

    log::debug!(
        "network: {} tube(s), normalizer {:?} ohm",
        n,
        total_resistance.first()
    );

    Ok(TubeNetwork {
        pre_contact,
        post_contact,
        resistivity,
        wire_resistance,
        total_resistance,
        chain_offset,
    })
}

fn resolve_contacts(config: &DetectorConfig, n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    match (&config.pre_contact, &config.post_contact) {
        (Some(pre), Some(post)) => {
            if pre.len() != n || post.len() != n {
                return Err(Error::ConfigError(format!(
                    "contact arrays have {}/{} entries, expected {n}",
                    pre.len(),
                    post.len()
                )));
            }
            Ok((pre.clone(), post.clone()))
        }
        (None, None) => Ok(split_junctions(config, n)?),
        _ => Err(Error::ConfigError(
            "pre_contact and post_contact must be given together".into(),
        )),
    }
}

/// Splits junction resistances evenly across adjacent tube contacts, with
/// zero contact resistance at the two free ends.
fn split_junctions(config: &DetectorConfig, n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let junctions = match &config.inter_resistances {
        Some(values) => {
            if values.len() != n + 1 {
                return Err(Error::ConfigError(format!(
                    "inter_resistances has {} entries, expected {}",
                    values.len(),
                    n + 1
                )));
            }
            values.clone()
        }
        None => vec![config.inter_resistance; n + 1],
    };

    let mut pre: Vec<f64> = (0..n).map(|i| 0.5 * junctions[i]).collect();
    let mut post: Vec<f64> = (0..n).map(|i| 0.5 * junctions[i + 1]).collect();

    // Free ends of the whole array carry no contact resistance. A
    // non-positive configured tube count leaves nothing to write.
    if config.tube_count > 0 {
        if let Some(first) = pre.first_mut() {
            *first = 0.0;
        }
        if let Some(last) = post.last_mut() {
            *last = 0.0;
        }
    }

    Ok((pre, post))
}
