//! Per-cell physical parameter set.
//!
//! A [`Parameters`] value is built once (from a parameter file, see
//! [`crate::io::read_parameter_file`], or from [`Parameters::default`]) and
//! handed to every model at construction time. It is never mutated.
//!
//! # Units
//!
//! | Field                      | Unit        |
//! |----------------------------|-------------|
//! | `surface_area`             | cm²         |
//! | elevations, `root_depth`   | cm          |
//! | bulk densities             | g/cm³       |
//! | `initial_surface_biomass`  | g/cm²       |
//! | `decay_rate`, `turnover_rate_k2` | 1/yr  |
//! | `distribution_k1`          | 1/cm        |
//! | fractions and ratios       | –           |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for complementary fractions summing to one.
pub const FRACTION_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Errors
// =============================================================================

/// Configuration inconsistencies detected while validating parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// A density, rate or length that must be strictly positive.
    #[error("cell {id}: {name} must be positive, got {value}")]
    NonPositive {
        id: u32,
        name: &'static str,
        value: f64,
    },

    /// A ratio that must be non-negative.
    #[error("cell {id}: {name} must be non-negative, got {value}")]
    Negative {
        id: u32,
        name: &'static str,
        value: f64,
    },

    /// A fraction outside `[0, 1]`.
    #[error("cell {id}: {name} must be within [0, 1], got {value}")]
    NotAFraction {
        id: u32,
        name: &'static str,
        value: f64,
    },

    /// A complementary pair that does not sum to one.
    #[error("cell {id}: {first} + {second} must equal 1, got {sum}")]
    FractionsDoNotSum {
        id: u32,
        first: &'static str,
        second: &'static str,
        sum: f64,
    },

    /// The initial column is shallower than the root zone.
    #[error("cell {id}: initial depth {depth} cm is shallower than root depth {root_depth} cm")]
    ShallowInitialLayer { id: u32, depth: f64, root_depth: f64 },

    /// Two cells share an id.
    #[error("duplicate cell id {0}")]
    DuplicateId(u32),
}

// =============================================================================
// Parameters
// =============================================================================

/// Physical constants for one marsh cell.
///
/// Only one member of each complementary pair is stored; the partner is
/// derived (`inorganic_fraction = 1 - organic_fraction`,
/// `labile_fraction = 1 - refractory_fraction`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Cell identifier, unique within a marsh.
    pub id: u32,
    /// Horizontal area of the cell [cm²].
    pub surface_area: f64,
    /// Initial ground elevation [cm].
    pub top_elevation: f64,
    /// Elevation of the base of the initial layer [cm].
    pub bottom_elevation: f64,
    /// Self-packing density of organic matter [g/cm³].
    pub organic_bulk_density: f64,
    /// Self-packing density of mineral matter [g/cm³].
    pub inorganic_bulk_density: f64,
    /// Mass fraction of deposited sediment that is organic.
    pub organic_fraction: f64,
    /// First-order decay rate of labile organic sediment [1/yr].
    pub decay_rate: f64,
    /// Fraction of organic matter that is refractory.
    pub refractory_fraction: f64,
    /// Live root biomass concentration at the surface at t = 0 [g/cm²].
    pub initial_surface_biomass: f64,
    /// Maximum rooting depth [cm].
    pub root_depth: f64,
    /// Decay constant of the root distribution with depth [1/cm].
    pub distribution_k1: f64,
    /// Root turnover rate [1/yr].
    pub turnover_rate_k2: f64,
    /// Ash (inorganic) fraction of root biomass.
    pub ash_fraction_k3: f64,
    /// Above-ground stem to below-ground biomass ratio.
    pub stem_to_biomass_ratio: f64,
    /// Litter production to above-ground biomass ratio.
    pub litter_ratio: f64,
    /// Fraction of litter transported out of the cell.
    pub litter_transport_factor: f64,
}

impl Default for Parameters {
    /// Reference parameterization.
    ///
    /// With these values the root distribution integrates to ≈ 9.50 g per
    /// unit surface concentration over the root zone, and the initial 30 cm
    /// layer holds ≈ 0.10 g of roots and ≈ 2.19 g (≈ 28.61 cm) of sediment.
    fn default() -> Self {
        Self {
            id: 0,
            surface_area: 1.0,
            top_elevation: 0.0,
            bottom_elevation: -30.0,
            organic_bulk_density: 0.072,
            inorganic_bulk_density: 1.99,
            organic_fraction: 0.94,
            decay_rate: 0.2,
            refractory_fraction: 0.2,
            initial_surface_biomass: 0.0105,
            root_depth: 30.0,
            distribution_k1: 0.1,
            turnover_rate_k2: 0.5,
            ash_fraction_k3: 0.05,
            stem_to_biomass_ratio: 0.5,
            litter_ratio: 0.5,
            litter_transport_factor: 0.0,
        }
    }
}

impl Parameters {
    /// Default parameters with a different id.
    pub fn with_id(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Mass fraction of deposited sediment that is inorganic.
    #[inline]
    pub fn inorganic_fraction(&self) -> f64 {
        1.0 - self.organic_fraction
    }

    /// Fraction of organic matter that is labile.
    #[inline]
    pub fn labile_fraction(&self) -> f64 {
        1.0 - self.refractory_fraction
    }

    /// Thickness of the initial layer [cm].
    #[inline]
    pub fn initial_depth(&self) -> f64 {
        self.top_elevation - self.bottom_elevation
    }

    /// Check every invariant of a single parameter set.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let id = self.id;
        let positive = [
            ("surface_area", self.surface_area),
            ("organic_bulk_density", self.organic_bulk_density),
            ("inorganic_bulk_density", self.inorganic_bulk_density),
            ("decay_rate", self.decay_rate),
            ("root_depth", self.root_depth),
            ("distribution_k1", self.distribution_k1),
            ("turnover_rate_k2", self.turnover_rate_k2),
        ];
        for (name, value) in positive {
            // `!(x > 0)` also rejects NaN
            if !(value > 0.0) {
                return Err(ParameterError::NonPositive { id, name, value });
            }
        }

        let non_negative = [
            ("initial_surface_biomass", self.initial_surface_biomass),
            ("stem_to_biomass_ratio", self.stem_to_biomass_ratio),
            ("litter_ratio", self.litter_ratio),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ParameterError::Negative { id, name, value });
            }
        }

        let fractions = [
            ("organic_fraction", self.organic_fraction),
            ("refractory_fraction", self.refractory_fraction),
            ("ash_fraction_k3", self.ash_fraction_k3),
            ("litter_transport_factor", self.litter_transport_factor),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParameterError::NotAFraction { id, name, value });
            }
        }

        let depth = self.initial_depth();
        if depth < self.root_depth {
            return Err(ParameterError::ShallowInitialLayer {
                id,
                depth,
                root_depth: self.root_depth,
            });
        }

        Ok(())
    }

    /// Check an explicitly supplied complement against its stored partner.
    pub fn check_complement(
        id: u32,
        first: (&'static str, f64),
        second: (&'static str, f64),
    ) -> Result<(), ParameterError> {
        let sum = first.1 + second.1;
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(ParameterError::FractionsDoNotSum {
                id,
                first: first.0,
                second: second.0,
                sum,
            });
        }
        Ok(())
    }
}

/// Validate a whole marsh worth of parameter sets, including id uniqueness.
pub fn validate_all(params: &[Parameters]) -> Result<(), ParameterError> {
    let mut seen = BTreeSet::new();
    for p in params {
        if !seen.insert(p.id) {
            return Err(ParameterError::DuplicateId(p.id));
        }
        p.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_derived_fractions() {
        let p = Parameters::default();
        assert!((p.organic_fraction + p.inorganic_fraction() - 1.0).abs() < 1e-12);
        assert!((p.labile_fraction() + p.refractory_fraction - 1.0).abs() < 1e-12);
        assert_eq!(p.initial_depth(), 30.0);
    }

    #[test]
    fn test_non_positive_density_rejected() {
        let p = Parameters {
            organic_bulk_density: 0.0,
            ..Parameters::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParameterError::NonPositive {
                name: "organic_bulk_density",
                ..
            })
        ));
    }

    #[test]
    fn test_nan_rate_rejected() {
        let p = Parameters {
            decay_rate: f64::NAN,
            ..Parameters::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_fraction_out_of_range_rejected() {
        let p = Parameters {
            refractory_fraction: 1.5,
            ..Parameters::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParameterError::NotAFraction { .. })
        ));
    }

    #[test]
    fn test_shallow_initial_layer_rejected() {
        let p = Parameters {
            bottom_elevation: -10.0,
            ..Parameters::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParameterError::ShallowInitialLayer { .. })
        ));
    }

    #[test]
    fn test_complement_check() {
        assert!(Parameters::check_complement(1, ("a", 0.3), ("b", 0.7)).is_ok());
        assert!(matches!(
            Parameters::check_complement(1, ("a", 0.3), ("b", 0.6)),
            Err(ParameterError::FractionsDoNotSum { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let params = vec![Parameters::with_id(1), Parameters::with_id(2), Parameters::with_id(1)];
        assert_eq!(validate_all(&params), Err(ParameterError::DuplicateId(1)));
    }

    #[test]
    fn test_json_roundtrip() {
        let p = Parameters::with_id(7);
        let json = serde_json::to_string(&p).unwrap();
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
