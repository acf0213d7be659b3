//! Live below-ground biomass.
//!
//! A [`Biomass`] stock is the root mass of one layer together with the
//! [`BiomassTools`] bound to the current surface concentration. Stocks are
//! never mutated: every step builds a fresh one with [`Biomass::build`].
//!
//! # Example
//!
//! ```
//! use marsh_rs::biomass::{Biomass, BiomassModel};
//! use marsh_rs::params::Parameters;
//! use marsh_rs::types::DepthInterval;
//!
//! let params = Parameters::default();
//! let model = BiomassModel::new(&params);
//! let interval = DepthInterval::from_surface(params.initial_depth()).unwrap();
//! let roots = Biomass::build(&model, params.initial_surface_biomass, &interval).unwrap();
//! assert!((roots.weight() - 0.0998).abs() < 1e-3);
//! ```

mod distribution;
mod model;

pub use distribution::RootDistribution;
pub use model::{BiomassModel, BiomassTools};

use crate::error::ColumnError;
use crate::stock::{Converter, Stock, checked_weight};
use crate::types::{DepthInterval, Material, Measurement};

/// Relative tolerance used by [`Biomass`] equality.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Root mass of a layer plus its bound functions.
#[derive(Clone, Debug)]
pub struct Biomass {
    weight: f64,
    tools: BiomassTools,
}

impl Biomass {
    /// Stock with an explicit weight [g].
    pub fn new(weight: f64, tools: BiomassTools) -> Result<Self, ColumnError> {
        Ok(Self {
            weight: checked_weight(Material::Biomass, weight)?,
            tools,
        })
    }

    /// Empty stock, used for emptied layers.
    pub fn empty(tools: BiomassTools) -> Self {
        Self { weight: 0.0, tools }
    }

    /// Stock holding the column profile integrated over `interval`, where
    /// the profile has concentration `surface` at depth 0.
    pub fn build(
        model: &BiomassModel,
        surface: f64,
        interval: &DepthInterval,
    ) -> Result<Self, ColumnError> {
        let tools = model.bind(surface)?;
        let weight = tools.integrate(interval);
        Self::new(weight, tools)
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn tools(&self) -> &BiomassTools {
        &self.tools
    }
}

impl Stock for Biomass {
    fn value(&self) -> f64 {
        self.weight
    }

    fn material(&self) -> Material {
        Material::Biomass
    }

    fn measurement(&self) -> Measurement {
        Measurement::Weight
    }

    fn converter(&self) -> &Converter {
        self.tools.converter()
    }

    fn with_delta(&self, delta: f64) -> Result<Self, ColumnError> {
        Self::new(self.weight + delta, self.tools.clone())
    }
}

impl PartialEq for Biomass {
    fn eq(&self, other: &Self) -> bool {
        let scale = self.weight.abs().max(other.weight.abs()).max(1.0);
        (self.weight - other.weight).abs() <= WEIGHT_EPSILON * scale
    }
}
