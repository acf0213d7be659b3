//! Sediment flux functions.

use crate::error::ColumnError;
use crate::params::Parameters;
use crate::stock::{Converter, Fluxes};

/// Decomposition, ash uptake and deposition split for one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SedimentModel {
    decay_rate: f64,
    ash_fraction: f64,
    litter_ratio: f64,
    organic_fraction: f64,
    labile_fraction: f64,
    converter: Converter,
}

impl SedimentModel {
    pub fn new(params: &Parameters) -> Self {
        Self {
            decay_rate: params.decay_rate,
            ash_fraction: params.ash_fraction_k3,
            litter_ratio: params.litter_ratio,
            organic_fraction: params.organic_fraction,
            labile_fraction: params.labile_fraction(),
            converter: Converter::new(params),
        }
    }

    #[inline]
    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Organic mass fraction of deposited sediment.
    #[inline]
    pub fn organic_fraction(&self) -> f64 {
        self.organic_fraction
    }

    /// First-order decay loss of `labile` grams over `years`.
    pub fn decomposition(&self, labile: f64, years: f64) -> Result<f64, ColumnError> {
        ColumnError::check_non_negative("years", years)?;
        Ok(labile * self.decay_rate * years)
    }

    /// Inorganic loss to above-ground litter production over `years`.
    ///
    /// The litter pool itself is not tracked; the mass leaves the column.
    pub fn ash_uptake(&self, inorganic: f64, years: f64) -> Result<f64, ColumnError> {
        ColumnError::check_non_negative("years", years)?;
        Ok(inorganic * self.ash_fraction * self.litter_ratio * years)
    }

    /// Split `weight` grams of raw deposit into `(fo·fl, fo·fc, fi)`.
    pub fn deposition(&self, weight: f64) -> Fluxes {
        let organic = weight * self.organic_fraction;
        Fluxes::new(
            organic * self.labile_fraction,
            organic * (1.0 - self.labile_fraction),
            weight * (1.0 - self.organic_fraction),
        )
    }

    /// Longest step [yr] over which decomposition and ash uptake stay within
    /// the pools they draw from.
    ///
    /// Both losses are explicit first-order rates, so a longer step would
    /// remove more than a pool holds.
    pub fn max_step(&self) -> f64 {
        let rate = self.decay_rate.max(self.ash_fraction * self.litter_ratio);
        if rate > 0.0 { 1.0 / rate } else { f64::INFINITY }
    }

    /// Split of a raw deposit `length` cm thick.
    pub fn deposit_length(&self, length: f64) -> Fluxes {
        self.deposition(self.converter.mixture_weight(length, self.organic_fraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Material;
    use approx::assert_relative_eq;

    #[test]
    fn test_decomposition() {
        let m = SedimentModel::new(&Parameters::default());
        assert_relative_eq!(m.decomposition(2.0, 0.5).unwrap(), 0.2);
        assert_eq!(m.decomposition(2.0, 0.0).unwrap(), 0.0);
        assert!(m.decomposition(2.0, -1.0).is_err());
    }

    #[test]
    fn test_ash_uptake() {
        let m = SedimentModel::new(&Parameters::default());
        assert_relative_eq!(m.ash_uptake(4.0, 1.0).unwrap(), 4.0 * 0.05 * 0.5);
    }

    #[test]
    fn test_max_step() {
        let m = SedimentModel::new(&Parameters::default());
        assert_relative_eq!(m.max_step(), 5.0);

        let p = Parameters {
            decay_rate: 0.0,
            ..Parameters::default()
        };
        assert_relative_eq!(SedimentModel::new(&p).max_step(), 40.0);
    }

    #[test]
    fn test_deposition_split_sums_to_weight() {
        let m = SedimentModel::new(&Parameters::default());
        let f = m.deposition(1.5);
        assert_relative_eq!(f.total(), 1.5, max_relative = 1e-12);
        assert_relative_eq!(f.inorganic, 1.5 * 0.06, max_relative = 1e-12);
        assert_relative_eq!(f.refractory, 1.5 * 0.94 * 0.2, max_relative = 1e-12);
    }

    #[test]
    fn test_deposit_length_fills_length() {
        let m = SedimentModel::new(&Parameters::default());
        let f = m.deposit_length(0.4);
        let conv = m.converter();
        let len = conv.to_length(f.labile, Material::Labile)
            + conv.to_length(f.refractory, Material::Refractory)
            + conv.to_length(f.inorganic, Material::Inorganic);
        assert_relative_eq!(len, 0.4, max_relative = 1e-12);
    }
}
