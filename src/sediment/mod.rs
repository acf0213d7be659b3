//! Sediment pools of a layer.
//!
//! [`Sediments`] groups the labile, refractory and inorganic [`Sediment`]
//! stocks and applies the sediment fluxes to them. Like every stock, the
//! triple is immutable; each operation returns a new value.

mod model;

pub use model::SedimentModel;

use crate::error::ColumnError;
use crate::stock::{Converter, Fluxes, Stock, checked_weight};
use crate::types::{Material, Measurement};

/// Relative tolerance used by [`Sediment`] equality.
const WEIGHT_EPSILON: f64 = 1e-9;

// =============================================================================
// Single pool
// =============================================================================

/// One sediment pool, stored as a mass [g].
#[derive(Clone, Copy, Debug)]
pub struct Sediment {
    weight: f64,
    material: Material,
    converter: Converter,
}

impl Sediment {
    pub fn new(weight: f64, material: Material, converter: Converter) -> Result<Self, ColumnError> {
        Ok(Self {
            weight: checked_weight(material, weight)?,
            material,
            converter,
        })
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Stock for Sediment {
    fn value(&self) -> f64 {
        self.weight
    }

    fn material(&self) -> Material {
        self.material
    }

    fn measurement(&self) -> Measurement {
        Measurement::Weight
    }

    fn converter(&self) -> &Converter {
        &self.converter
    }

    fn with_delta(&self, delta: f64) -> Result<Self, ColumnError> {
        Self::new(self.weight + delta, self.material, self.converter)
    }
}

impl PartialEq for Sediment {
    fn eq(&self, other: &Self) -> bool {
        let scale = self.weight.abs().max(other.weight.abs()).max(1.0);
        self.material == other.material
            && (self.weight - other.weight).abs() <= WEIGHT_EPSILON * scale
    }
}

// =============================================================================
// Triple
// =============================================================================

/// Labile, refractory and inorganic pools of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Sediments {
    labile: Sediment,
    refractory: Sediment,
    inorganic: Sediment,
    model: SedimentModel,
}

impl Sediments {
    /// Pools holding the given masses [g].
    pub fn new(model: &SedimentModel, weights: Fluxes) -> Result<Self, ColumnError> {
        let conv = *model.converter();
        Ok(Self {
            labile: Sediment::new(weights.labile, Material::Labile, conv)?,
            refractory: Sediment::new(weights.refractory, Material::Refractory, conv)?,
            inorganic: Sediment::new(weights.inorganic, Material::Inorganic, conv)?,
            model: model.clone(),
        })
    }

    /// Empty pools.
    pub fn empty(model: &SedimentModel) -> Self {
        let conv = *model.converter();
        Self {
            labile: Sediment { weight: 0.0, material: Material::Labile, converter: conv },
            refractory: Sediment { weight: 0.0, material: Material::Refractory, converter: conv },
            inorganic: Sediment { weight: 0.0, material: Material::Inorganic, converter: conv },
            model: model.clone(),
        }
    }

    /// Pools filling `length` cm with freshly deposited material.
    ///
    /// Used for the initial layer, where the space not taken by roots is
    /// sediment of deposit composition.
    pub fn from_length(model: &SedimentModel, length: f64) -> Result<Self, ColumnError> {
        ColumnError::check_non_negative("sediment length", length)?;
        Self::new(model, model.deposit_length(length))
    }

    pub fn model(&self) -> &SedimentModel {
        &self.model
    }

    pub fn labile(&self) -> &Sediment {
        &self.labile
    }

    pub fn refractory(&self) -> &Sediment {
        &self.refractory
    }

    pub fn inorganic(&self) -> &Sediment {
        &self.inorganic
    }

    /// Masses of the three pools.
    pub fn weights(&self) -> Fluxes {
        Fluxes::new(
            self.labile.weight,
            self.refractory.weight,
            self.inorganic.weight,
        )
    }

    /// Total mass [g].
    pub fn weight(&self) -> f64 {
        self.weights().total()
    }

    /// Total depth equivalent [cm].
    pub fn length(&self) -> f64 {
        self.labile.length() + self.refractory.length() + self.inorganic.length()
    }

    /// Share of each pool in the total mass; all zero when empty.
    pub fn portions(&self) -> Fluxes {
        let total = self.weight();
        if total > 0.0 {
            self.weights().scaled(1.0 / total)
        } else {
            Fluxes::ZERO
        }
    }

    /// Add a flux triple to the pools.
    pub fn update(&self, fluxes: Fluxes) -> Result<Self, ColumnError> {
        Ok(Self {
            labile: self.labile.with_delta(fluxes.labile)?,
            refractory: self.refractory.with_delta(fluxes.refractory)?,
            inorganic: self.inorganic.with_delta(fluxes.inorganic)?,
            model: self.model.clone(),
        })
    }

    /// Decomposition and ash uptake over `years`; refractory is untouched.
    pub fn transfers(&self, years: f64) -> Result<Self, ColumnError> {
        let decomposed = self.model.decomposition(self.labile.weight, years)?;
        let ash = self.model.ash_uptake(self.inorganic.weight, years)?;
        self.update(Fluxes::new(-decomposed, 0.0, -ash))
    }

    /// Remove `weight` grams in proportion to each pool's share.
    ///
    /// Non-positive weights are a no-op and removal never exceeds what the
    /// pools hold.
    pub fn erosion(&self, weight: f64) -> Result<Self, ColumnError> {
        if !(weight > 0.0) {
            return Ok(self.clone());
        }
        let total = self.weight();
        if weight >= total {
            return Ok(Self::empty(&self.model));
        }
        self.update(-self.portions().scaled(weight))
    }

    /// Mass of a `length` cm slice with the current composition [g].
    pub fn weight_of_length(&self, length: f64) -> f64 {
        let own = self.length();
        if own > 0.0 {
            length * self.weight() / own
        } else {
            0.0
        }
    }
}
