//! Biomass flux functions: turnover, erosion and burial.
//!
//! [`BiomassModel`] holds the parameters that never change for a cell.
//! Binding it to a surface concentration yields [`BiomassTools`], the full
//! function bundle a [`super::Biomass`] stock carries. Because the surface
//! concentration is an external driver that changes every step, tools are
//! rebuilt on every step rather than updated.

use super::distribution::RootDistribution;
use crate::error::ColumnError;
use crate::params::Parameters;
use crate::stock::{Converter, Fluxes};
use crate::types::DepthInterval;

// =============================================================================
// Partially bound model
// =============================================================================

/// Biomass functions bound to a parameter set but not yet to a surface
/// concentration.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomassModel {
    params: Parameters,
    converter: Converter,
}

impl BiomassModel {
    pub fn new(params: &Parameters) -> Self {
        Self {
            params: params.clone(),
            converter: Converter::new(params),
        }
    }

    /// Parameter set the model was built from.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Column root profile for a surface concentration.
    pub fn distribution(&self, surface: f64) -> Result<RootDistribution, ColumnError> {
        RootDistribution::new(surface, &self.params)
    }

    /// Bind every function to the column profile with concentration
    /// `surface` at depth 0.
    pub fn bind(&self, surface: f64) -> Result<BiomassTools, ColumnError> {
        Ok(BiomassTools {
            model: self.clone(),
            distribution: self.distribution(surface)?,
        })
    }

    /// Bind to the profile whose concentration at `depth` is `concentration`.
    pub fn bind_at(&self, concentration: f64, depth: f64) -> Result<BiomassTools, ColumnError> {
        Ok(BiomassTools {
            model: self.clone(),
            distribution: RootDistribution::anchored(concentration, depth, &self.params)?,
        })
    }

    /// Turnover of `weight` grams of roots over `years`.
    ///
    /// Dead roots enter the labile and refractory pools; no ash is produced
    /// (Morris & Bowden, 1986). The live stock is not reduced because new
    /// growth is assumed to replace exactly what turns over, so the result is
    /// a net gain to the detrital pools.
    pub fn turnover(&self, weight: f64, years: f64) -> Result<Fluxes, ColumnError> {
        ColumnError::check_non_negative("weight", weight)?;
        ColumnError::check_non_negative("years", years)?;
        let mass = weight * self.params.turnover_rate_k2 * years;
        Ok(Fluxes::new(
            mass * self.params.labile_fraction(),
            mass * self.params.refractory_fraction,
            0.0,
        ))
    }

    /// Split dead root mass with an ash fraction, as for erosion and burial.
    #[inline]
    pub(crate) fn split_with_ash(&self, mass: f64) -> Fluxes {
        Fluxes::from_roots(
            mass,
            self.params.labile_fraction(),
            self.params.ash_fraction_k3,
        )
    }
}

// =============================================================================
// Fully bound tools
// =============================================================================

/// Biomass functions bound to one root profile.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomassTools {
    model: BiomassModel,
    distribution: RootDistribution,
}

impl BiomassTools {
    pub fn model(&self) -> &BiomassModel {
        &self.model
    }

    pub fn distribution(&self) -> &RootDistribution {
        &self.distribution
    }

    pub fn converter(&self) -> &Converter {
        self.model.converter()
    }

    /// Root mass within `interval` [g].
    #[inline]
    pub fn integrate(&self, interval: &DepthInterval) -> f64 {
        self.distribution.integral(interval)
    }

    /// See [`BiomassModel::turnover`].
    pub fn turnover(&self, weight: f64, years: f64) -> Result<Fluxes, ColumnError> {
        self.model.turnover(weight, years)
    }

    /// Root mass removed when `erosion` cm are stripped from the top of the
    /// layer spanning `interval`.
    ///
    /// Erosion is clipped to the layer thickness so the integral never runs
    /// past the layer bottom. Ash leaves as inorganic mass.
    pub fn erosion(&self, interval: &DepthInterval, erosion: f64) -> Result<Fluxes, ColumnError> {
        ColumnError::check_non_negative("erosion", erosion)?;
        let eroded = DepthInterval::new(
            interval.top(),
            interval.top() + erosion.min(interval.depth()),
        )?;
        Ok(self.model.split_with_ash(self.integrate(&eroded)))
    }

    /// Root mass pushed below the root zone when `deposition` cm settle on
    /// the column above the layer spanning `interval`.
    ///
    /// Only a layer whose bottom is inside the root zone before deposition
    /// and outside it afterwards contributes; the mass is the part of the
    /// layer that crosses the root depth.
    pub fn burial(&self, interval: &DepthInterval, deposition: f64) -> Result<Fluxes, ColumnError> {
        ColumnError::check_non_negative("deposition", deposition)?;
        let root_depth = self.distribution.root_depth();
        let inside_before = interval.bottom() <= root_depth;
        let inside_after = interval.bottom() + deposition <= root_depth;
        if !inside_before || inside_after {
            return Ok(Fluxes::ZERO);
        }
        let crossing = interval.bottom() + deposition - root_depth;
        let buried = DepthInterval::new(
            (interval.bottom() - crossing).max(interval.top()),
            interval.bottom(),
        )?;
        Ok(self.model.split_with_ash(self.integrate(&buried)))
    }
}
