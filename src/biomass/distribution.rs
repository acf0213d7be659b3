//! Live-root depth profile and its closed-form integral.

use crate::error::ColumnError;
use crate::params::Parameters;
use crate::types::DepthInterval;

/// Exponential root profile bound to one surface concentration.
///
/// ```text
/// f(d) = c · exp(-k1 · d) · A    for 0 <= d <= root_depth
/// f(d) = 0                       for d > root_depth
/// ```
///
/// where `c` is the surface concentration [g/cm²], `k1` the decay constant
/// [1/cm] and `A` the cell area [cm²]; `f` is a mass per unit depth [g/cm].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootDistribution {
    surface: f64,
    k1: f64,
    root_depth: f64,
    surface_area: f64,
}

impl RootDistribution {
    /// Profile with concentration `surface` at depth 0.
    pub fn new(surface: f64, params: &Parameters) -> Result<Self, ColumnError> {
        ColumnError::check_non_negative("surface_biomass", surface)?;
        Ok(Self {
            surface,
            k1: params.distribution_k1,
            root_depth: params.root_depth,
            surface_area: params.surface_area,
        })
    }

    /// Profile whose concentration at `depth` is `concentration`.
    ///
    /// The exponential is memoryless, so a layer that only knows the
    /// concentration at its own top can still recover the column profile.
    pub fn anchored(
        concentration: f64,
        depth: f64,
        params: &Parameters,
    ) -> Result<Self, ColumnError> {
        ColumnError::check_non_negative("surface_biomass", concentration)?;
        ColumnError::check_non_negative("depth", depth)?;
        let depth = depth.min(params.root_depth);
        Self::new(concentration * (params.distribution_k1 * depth).exp(), params)
    }

    /// Surface concentration this profile is bound to [g/cm²].
    #[inline]
    pub fn surface(&self) -> f64 {
        self.surface
    }

    /// Maximum rooting depth [cm].
    #[inline]
    pub fn root_depth(&self) -> f64 {
        self.root_depth
    }

    #[inline]
    fn unclipped(&self, depth: f64) -> f64 {
        self.surface * (-self.k1 * depth).exp() * self.surface_area
    }

    /// Root mass per unit depth at `depth` [g/cm].
    pub fn density(&self, depth: f64) -> Result<f64, ColumnError> {
        ColumnError::check_non_negative("depth", depth)?;
        if depth > self.root_depth {
            return Ok(0.0);
        }
        Ok(self.unclipped(depth))
    }

    /// Root concentration at `depth` [g/cm²].
    ///
    /// This is the surface signal handed to a layer whose top sits at
    /// `depth`.
    pub fn concentration(&self, depth: f64) -> Result<f64, ColumnError> {
        Ok(self.density(depth)? / self.surface_area)
    }

    /// Root mass between the boundaries of `interval` [g].
    ///
    /// Closed form `(f(d1) - f(d0)) / -k1` with both depths clipped to the
    /// root depth.
    pub fn integral(&self, interval: &DepthInterval) -> f64 {
        let d0 = interval.top().min(self.root_depth);
        let d1 = interval.bottom().min(self.root_depth);
        if d1 <= d0 {
            return 0.0;
        }
        (self.unclipped(d1) - self.unclipped(d0)) / -self.k1
    }

    /// Root mass between `top` and `bottom`, validating the bounds.
    pub fn integrate(&self, top: f64, bottom: f64) -> Result<f64, ColumnError> {
        Ok(self.integral(&DepthInterval::new(top, bottom)?))
    }
}
