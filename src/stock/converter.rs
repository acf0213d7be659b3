//! Mass ↔ depth-equivalent conversion.

use crate::params::Parameters;
use crate::types::{Material, Measurement};

/// Converts stock values between mass [g] and depth equivalent [cm].
///
/// A mass `m` of a material with self-packing density `ρ` spread over the
/// cell area `A` occupies a thickness `m / (ρ A)`. Inorganic material uses
/// the inorganic bulk density; everything else (roots, labile and refractory
/// organic matter) uses the organic bulk density.
///
/// # Example
///
/// ```
/// use marsh_rs::params::Parameters;
/// use marsh_rs::stock::Converter;
/// use marsh_rs::types::{Material, Measurement};
///
/// let conv = Converter::new(&Parameters::default());
/// let cm = conv.convert(2.0, Material::Inorganic, Measurement::Length);
/// let g = conv.convert(cm, Material::Inorganic, Measurement::Weight);
/// assert!((g - 2.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Converter {
    surface_area: f64,
    organic_bulk_density: f64,
    inorganic_bulk_density: f64,
}

impl Converter {
    /// Bind a converter to a parameter set.
    pub fn new(params: &Parameters) -> Self {
        Self {
            surface_area: params.surface_area,
            organic_bulk_density: params.organic_bulk_density,
            inorganic_bulk_density: params.inorganic_bulk_density,
        }
    }

    #[inline]
    fn density(&self, material: Material) -> f64 {
        if material.is_organic() {
            self.organic_bulk_density
        } else {
            self.inorganic_bulk_density
        }
    }

    /// Convert `value` of `material` into the `target` unit.
    ///
    /// `value` is read as a mass when the target is [`Measurement::Length`]
    /// and as a length when the target is [`Measurement::Weight`].
    #[inline]
    pub fn convert(&self, value: f64, material: Material, target: Measurement) -> f64 {
        match target {
            Measurement::Length => value / (self.density(material) * self.surface_area),
            Measurement::Weight => value * self.surface_area * self.density(material),
        }
    }

    /// Mass [g] → depth equivalent [cm].
    #[inline]
    pub fn to_length(&self, weight: f64, material: Material) -> f64 {
        self.convert(weight, material, Measurement::Length)
    }

    /// Depth equivalent [cm] → mass [g].
    #[inline]
    pub fn to_weight(&self, length: f64, material: Material) -> f64 {
        self.convert(length, material, Measurement::Weight)
    }

    /// Mass of a raw sediment deposit of thickness `length`.
    ///
    /// The deposit is a mixture with organic mass fraction `organic_fraction`
    /// (the remainder inorganic); the returned mass, split by those
    /// fractions, occupies exactly `length`.
    pub fn mixture_weight(&self, length: f64, organic_fraction: f64) -> f64 {
        let specific_volume = organic_fraction / self.organic_bulk_density
            + (1.0 - organic_fraction) / self.inorganic_bulk_density;
        length * self.surface_area / specific_volume
    }
}
