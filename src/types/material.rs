//! Material and measurement tags carried by every stock.

use std::fmt;

/// Kind of material held by a stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    /// Live below-ground (root) biomass.
    Biomass,
    /// Labile (decomposable) organic sediment.
    Labile,
    /// Refractory (non-decomposing) organic sediment.
    Refractory,
    /// Inorganic (mineral) sediment.
    Inorganic,
}

impl Material {
    /// Whether the material packs at the organic bulk density.
    #[inline]
    pub fn is_organic(self) -> bool {
        !matches!(self, Self::Inorganic)
    }

    /// Short lowercase name, used in logs and CSV headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::Biomass => "biomass",
            Self::Labile => "labile",
            Self::Refractory => "refractory",
            Self::Inorganic => "inorganic",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit a stock value is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Measurement {
    /// Linear depth equivalent [cm].
    Length,
    /// Mass [g].
    Weight,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => f.write_str("cm"),
            Self::Weight => f.write_str("g"),
        }
    }
}
