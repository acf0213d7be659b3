//! Shared stock abstraction.
//!
//! Every pool in a layer (live biomass and the three sediment pools) is a
//! [`Stock`]: a scalar value with a material tag and a unit, convertible
//! between mass and depth equivalent through a [`Converter`]. Transfers
//! between pools are expressed as [`Fluxes`] triples.

mod converter;

use std::ops::{Add, Neg};

pub use converter::Converter;

use crate::error::ColumnError;
use crate::types::{Material, Measurement};

/// Values this far below zero are round-off and clamp to zero; anything
/// more negative is a [`ColumnError::NegativeStock`].
pub const STOCK_TOLERANCE: f64 = 1e-12;

/// Common interface of biomass and sediment stocks.
pub trait Stock: Sized {
    /// Raw stored value, in [`Stock::measurement`] units.
    fn value(&self) -> f64;

    /// Pool this stock belongs to.
    fn material(&self) -> Material;

    /// Unit of [`Stock::value`].
    fn measurement(&self) -> Measurement;

    /// Converter bound to the cell parameters.
    fn converter(&self) -> &Converter;

    /// Mass of the stock [g].
    fn weight(&self) -> f64 {
        match self.measurement() {
            Measurement::Weight => self.value(),
            Measurement::Length => {
                self.converter()
                    .convert(self.value(), self.material(), Measurement::Weight)
            }
        }
    }

    /// Depth equivalent of the stock [cm].
    fn length(&self) -> f64 {
        match self.measurement() {
            Measurement::Length => self.value(),
            Measurement::Weight => {
                self.converter()
                    .convert(self.value(), self.material(), Measurement::Length)
            }
        }
    }

    /// New stock with `delta` grams added (removed when negative).
    fn with_delta(&self, delta: f64) -> Result<Self, ColumnError>;
}

/// Check a post-flux mass, absorbing round-off below zero.
pub(crate) fn checked_weight(material: Material, value: f64) -> Result<f64, ColumnError> {
    if value >= 0.0 {
        Ok(value)
    } else if value > -STOCK_TOLERANCE {
        Ok(0.0)
    } else {
        Err(ColumnError::NegativeStock { material, value })
    }
}

// =============================================================================
// Fluxes
// =============================================================================

/// Mass moving into (positive) or out of (negative) the three sediment
/// pools [g].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fluxes {
    pub labile: f64,
    pub refractory: f64,
    pub inorganic: f64,
}

impl Fluxes {
    /// No transfer.
    pub const ZERO: Self = Self {
        labile: 0.0,
        refractory: 0.0,
        inorganic: 0.0,
    };

    pub fn new(labile: f64, refractory: f64, inorganic: f64) -> Self {
        Self {
            labile,
            refractory,
            inorganic,
        }
    }

    /// Split `mass` of dead roots: `k3` leaves as ash (inorganic), the rest
    /// is organic and divides into labile and refractory parts.
    pub fn from_roots(mass: f64, labile_fraction: f64, ash_fraction: f64) -> Self {
        let organic = mass * (1.0 - ash_fraction);
        Self {
            labile: organic * labile_fraction,
            refractory: organic * (1.0 - labile_fraction),
            inorganic: mass * ash_fraction,
        }
    }

    /// Sum of the three components [g].
    #[inline]
    pub fn total(&self) -> f64 {
        self.labile + self.refractory + self.inorganic
    }

    /// Same proportions, multiplied by `factor`.
    #[inline]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            labile: self.labile * factor,
            refractory: self.refractory * factor,
            inorganic: self.inorganic * factor,
        }
    }
}

impl Add for Fluxes {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            labile: self.labile + rhs.labile,
            refractory: self.refractory + rhs.refractory,
            inorganic: self.inorganic + rhs.inorganic,
        }
    }
}

impl Neg for Fluxes {
    type Output = Self;
    fn neg(self) -> Self {
        self.scaled(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_split_conserves_mass() {
        let f = Fluxes::from_roots(2.0, 0.8, 0.05);
        assert!((f.total() - 2.0).abs() < 1e-12);
        assert!((f.inorganic - 0.1).abs() < 1e-12);
        assert!((f.labile / (f.labile + f.refractory) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_checked_weight() {
        assert_eq!(checked_weight(Material::Labile, 1.0), Ok(1.0));
        assert_eq!(checked_weight(Material::Labile, -1e-15), Ok(0.0));
        assert!(checked_weight(Material::Labile, -1e-3).is_err());
    }

    #[test]
    fn test_flux_arithmetic() {
        let a = Fluxes::new(1.0, 2.0, 3.0);
        let b = a + (-a);
        assert_eq!(b, Fluxes::ZERO);
        assert_eq!(a.scaled(2.0).total(), 12.0);
    }
}
