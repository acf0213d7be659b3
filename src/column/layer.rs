//! A single slice of the sediment column and its one-step mass balance.

use log::debug;
use serde::Serialize;

use crate::biomass::{Biomass, BiomassModel};
use crate::error::ColumnError;
use crate::sediment::{SedimentModel, Sediments};
use crate::stock::{Fluxes, Stock};
use crate::types::{DEPTH_TOLERANCE, DepthInterval, Material, snap_to_zero};

/// Upper bound on the root/extent fixed-point iterations of one advance.
const MAX_SETTLE_ITERATIONS: usize = 100;

/// Thickness change [cm] below which the root/extent iteration stops.
const SETTLE_TOLERANCE: f64 = 1e-13;

/// Read-only snapshot of a layer, one row of the layer log.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayerRecord {
    pub top: f64,
    pub bottom: f64,
    pub depth: f64,
    pub biomass_weight: f64,
    pub labile_weight: f64,
    pub refractory_weight: f64,
    pub inorganic_weight: f64,
}

/// Depth interval with its live roots and sediment pools.
///
/// Layers are values: [`Layer::advance`] returns a new layer and leaves the
/// receiver untouched. A layer's thickness is always the length of its roots
/// plus the length of its sediment.
#[derive(Clone, Debug)]
pub struct Layer {
    interval: DepthInterval,
    biomass: Biomass,
    sediments: Sediments,
}

impl Layer {
    pub fn new(interval: DepthInterval, biomass: Biomass, sediments: Sediments) -> Self {
        Self {
            interval,
            biomass,
            sediments,
        }
    }

    /// Seed layer spanning the initial column.
    ///
    /// Roots follow the initial surface concentration; the rest of the
    /// interval is sediment of deposit composition.
    pub fn initial(biomass: &BiomassModel, sediment: &SedimentModel) -> Result<Self, ColumnError> {
        let params = biomass.params();
        let interval = DepthInterval::from_surface(params.initial_depth())?;
        let roots = Biomass::build(biomass, params.initial_surface_biomass, &interval)?;
        let sediments = Sediments::from_length(sediment, interval.depth() - roots.length())?;
        Ok(Self::new(interval, roots, sediments))
    }

    /// New top layer holding `deposition` cm of fresh deposit plus the roots
    /// growing in it at surface concentration `surface`.
    ///
    /// The roots fill the whole layer, deposit and roots together, so the
    /// layer below starts exactly where the profile leaves off. Non-positive
    /// deposition yields an empty layer.
    pub fn seed(
        biomass: &BiomassModel,
        sediment: &SedimentModel,
        surface: f64,
        deposition: f64,
    ) -> Result<Self, ColumnError> {
        let deposition = deposition.max(0.0);
        let sediments = Sediments::from_length(sediment, deposition)?;

        let mut extent = deposition;
        let mut roots = Biomass::build(biomass, surface, &DepthInterval::from_surface(extent)?)?;
        for _ in 0..MAX_SETTLE_ITERATIONS {
            let next = deposition + roots.length();
            let done = (next - extent).abs() <= SETTLE_TOLERANCE;
            extent = next;
            if done {
                break;
            }
            roots = Biomass::build(biomass, surface, &DepthInterval::from_surface(extent)?)?;
        }
        Ok(Self::new(DepthInterval::from_surface(extent)?, roots, sediments))
    }

    #[inline]
    pub fn interval(&self) -> &DepthInterval {
        &self.interval
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.interval.top()
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.interval.bottom()
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.interval.depth()
    }

    pub fn biomass(&self) -> &Biomass {
        &self.biomass
    }

    pub fn sediments(&self) -> &Sediments {
        &self.sediments
    }

    /// Total mass of roots and sediment [g].
    pub fn weight(&self) -> f64 {
        self.biomass.weight() + self.sediments.weight()
    }

    pub fn record(&self) -> LayerRecord {
        let w = self.sediments.weights();
        LayerRecord {
            top: self.top(),
            bottom: self.bottom(),
            depth: self.depth(),
            biomass_weight: self.biomass.weight(),
            labile_weight: w.labile,
            refractory_weight: w.refractory,
            inorganic_weight: w.inorganic,
        }
    }

    /// Advance the layer by one time step.
    ///
    /// * `deposition` - net deposition [cm]; negative values erode the layer
    ///   from its top and must not exceed its depth
    /// * `surface_biomass` - root concentration at the top of the layer
    ///   [g/cm²], from the profile of the new surface concentration
    /// * `duration` - step length [yr]
    /// * `is_top_layer` - whether this layer receives positive deposition
    ///   directly
    ///
    /// Fluxes are applied in a fixed order: turnover with burial or root
    /// erosion, sediment transfers, detrital gains, sediment erosion,
    /// deposition, root rebuild, and finally reconciliation of live roots that
    /// vanished without being eroded or buried.
    ///
    /// A lone layer cannot see the rest of the column, so roots are rebuilt
    /// where its own deposition or erosion leaves it: at the surface after
    /// erosion, in place for the top layer and `deposition` deeper otherwise.
    /// [`Layer::advance_at`] takes the exact position instead.
    ///
    /// The bottom of the interval stays fixed, except for a surface layer
    /// that grows: it would rise above depth 0, so it is re-placed with its
    /// top at the surface and its bottom moves down.
    pub fn advance(
        &self,
        deposition: f64,
        surface_biomass: f64,
        duration: f64,
        is_top_layer: bool,
    ) -> Result<Self, ColumnError> {
        ColumnError::check_finite("deposition", deposition)?;
        ColumnError::check_non_negative("surface_biomass", surface_biomass)?;

        let surface = self
            .biomass
            .tools()
            .model()
            .bind_at(surface_biomass, self.top())?
            .distribution()
            .surface();
        let position = if deposition < 0.0 {
            0.0
        } else if is_top_layer {
            self.top()
        } else {
            self.top() + deposition
        };

        let (biomass, sediments, depth) =
            self.balance(deposition, surface, duration, is_top_layer, position)?;
        Ok(Self {
            interval: self.resized(depth)?,
            biomass,
            sediments,
        })
    }

    /// Advance the layer knowing where it ends up in the column.
    ///
    /// `surface` is the surface concentration of the whole column [g/cm²]
    /// and `top` the depth of the layer's top once every layer above it has
    /// been advanced. Roots are rebuilt from the column profile over the
    /// layer's final interval, which is returned in place.
    pub fn advance_at(
        &self,
        deposition: f64,
        surface: f64,
        duration: f64,
        is_top_layer: bool,
        top: f64,
    ) -> Result<Self, ColumnError> {
        ColumnError::check_non_negative("top", top)?;
        let (biomass, sediments, depth) =
            self.balance(deposition, surface, duration, is_top_layer, top)?;
        Ok(Self {
            interval: DepthInterval::from_surface(depth)?.placed_at(top)?,
            biomass,
            sediments,
        })
    }

    /// One-step mass balance with roots rebuilt from the column profile at
    /// `surface`, starting at depth `position`.
    ///
    /// Returns the new roots, the new pools and the new thickness.
    fn balance(
        &self,
        deposition: f64,
        surface: f64,
        duration: f64,
        is_top_layer: bool,
        position: f64,
    ) -> Result<(Biomass, Sediments, f64), ColumnError> {
        ColumnError::check_non_negative("duration", duration)?;
        ColumnError::check_non_negative("surface_biomass", surface)?;
        ColumnError::check_finite("deposition", deposition)?;

        let depth = self.depth();
        let erosion = (-deposition).max(0.0);
        if erosion > depth + DEPTH_TOLERANCE {
            return Err(ColumnError::ErosionExceedsDepth { erosion, depth });
        }
        if erosion > 0.0 && erosion >= depth - DEPTH_TOLERANCE {
            debug!("layer {} eroded away", self.interval);
            return Ok((
                Biomass::empty(self.biomass.tools().clone()),
                Sediments::empty(self.sediments.model()),
                0.0,
            ));
        }

        let tools = self.biomass.tools();
        let model = tools.model();
        let roots = self.biomass.weight();

        // Burial needs deposition, root erosion needs erosion; never both.
        let turnover = tools.turnover(roots, duration)?;
        let (buried, eroded) = if deposition >= 0.0 {
            let buried = tools.burial(&self.interval, deposition)?;
            (capped(buried, roots), Fluxes::ZERO)
        } else {
            let eroded = tools.erosion(&self.interval, erosion)?;
            (Fluxes::ZERO, capped(eroded, roots))
        };
        let eroded_length = self
            .biomass
            .converter()
            .to_length(eroded.total(), Material::Biomass);

        let sediments = self
            .sediments
            .transfers(duration)?
            .update(turnover + buried)?;

        let sediment_erosion = erosion - eroded_length;
        let sediments = sediments.erosion(sediments.weight_of_length(sediment_erosion))?;

        let sediments = if is_top_layer && deposition > 0.0 {
            sediments.update(sediments.model().deposit_length(deposition))?
        } else {
            sediments
        };

        // Roots that were neither eroded nor buried but are no longer
        // supported by the profile die into the detrital pools.
        let expected = roots - eroded.total() - buried.total();

        let settle = |extent: f64| -> Result<(Biomass, Sediments), ColumnError> {
            let span = DepthInterval::new(position, position + extent)?;
            let rebuilt = Biomass::build(model, surface, &span)?;
            let dieback = expected - rebuilt.weight();
            let pools = if dieback > 0.0 {
                sediments.update(model.split_with_ash(dieback))?
            } else {
                sediments.clone()
            };
            Ok((rebuilt, pools))
        };

        // The rebuilt roots depend on the layer's extent and the extent on
        // the roots. The map is increasing and bounded, so iterating from the
        // provisional depth converges monotonically.
        let mut extent =
            snap_to_zero(depth - eroded_length + sediments.length() - self.sediments.length())
                .max(0.0);
        let (mut rebuilt, mut pools) = settle(extent)?;
        for _ in 0..MAX_SETTLE_ITERATIONS {
            let next = rebuilt.length() + pools.length();
            let done = (next - extent).abs() <= SETTLE_TOLERANCE;
            extent = next;
            if done {
                break;
            }
            (rebuilt, pools) = settle(extent)?;
        }
        Ok((rebuilt, pools, extent))
    }

    /// Interval with the new thickness, bottom fixed.
    ///
    /// A surface layer that grows would poke above depth 0; it is pushed down
    /// instead.
    fn resized(&self, depth: f64) -> Result<DepthInterval, ColumnError> {
        let shrink = self.depth() - depth;
        if self.top() + shrink >= -DEPTH_TOLERANCE {
            self.interval.with_top_moved(shrink)
        } else {
            DepthInterval::from_surface(depth)
        }
    }
}

/// Limit a root flux to the roots actually present.
fn capped(fluxes: Fluxes, available: f64) -> Fluxes {
    let total = fluxes.total();
    if total > available && total > 0.0 {
        fluxes.scaled(available / total)
    } else {
        fluxes
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.interval.approx_eq(&other.interval)
            && self.biomass == other.biomass
            && self.sediments == other.sediments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameters;
    use approx::assert_relative_eq;

    fn models() -> (BiomassModel, SedimentModel) {
        let p = Parameters::default();
        (BiomassModel::new(&p), SedimentModel::new(&p))
    }

    fn initial() -> Layer {
        let (b, s) = models();
        Layer::initial(&b, &s).unwrap()
    }

    #[test]
    fn test_initial_layer_reference_values() {
        let layer = initial();
        assert_eq!(layer.depth(), 30.0);
        assert!((layer.biomass().weight() - 0.10).abs() < 0.005);
        assert!((layer.sediments().weight() - 2.19).abs() < 0.005);
        assert!((layer.sediments().length() - 28.61).abs() < 0.005);
    }

    #[test]
    fn test_zero_step_is_identity() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        assert_eq!(layer.advance(0.0, sb, 0.0, false).unwrap(), layer);
        assert_eq!(layer.advance(0.0, sb, 0.0, true).unwrap(), layer);
    }

    #[test]
    fn test_erode_whole_layer() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        let eroded = layer.advance(-layer.depth(), sb, 1.0, true).unwrap();
        assert_eq!(eroded.depth(), 0.0);
        assert_eq!(eroded.bottom(), layer.bottom());
        assert_eq!(eroded.weight(), 0.0);
    }

    #[test]
    fn test_erosion_beyond_depth_fails() {
        let layer = initial();
        let err = layer.advance(-31.0, 0.01, 1.0, false).unwrap_err();
        assert!(matches!(err, ColumnError::ErosionExceedsDepth { .. }));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let layer = initial();
        assert!(layer.advance(0.0, 0.01, -1.0, false).is_err());
        assert!(layer.advance(0.0, -0.01, 1.0, false).is_err());
        assert!(layer.advance(f64::NAN, 0.01, 1.0, false).is_err());
    }

    #[test]
    fn test_partial_erosion_removes_thickness() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        let eroded = layer.advance(-5.0, sb, 0.0, true).unwrap();
        assert!(eroded.depth() < layer.depth());
        assert!(eroded.weight() < layer.weight());
        assert_eq!(eroded.bottom(), layer.bottom());
    }

    #[test]
    fn test_top_layer_takes_deposition() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        let with = layer.advance(1.0, sb, 0.0, true).unwrap();
        let without = layer.advance(1.0, sb, 0.0, false).unwrap();
        assert!(with.sediments().weight() > without.sediments().weight());
        // the fresh deposit plus the sliver of roots buried below 30 cm
        let gained = with.sediments().length() - layer.sediments().length();
        assert!(gained >= 1.0 && gained < 1.01);
    }

    #[test]
    fn test_only_growing_surface_layer_moves_bottom() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;

        let grown = layer.advance(1.0, sb, 0.0, true).unwrap();
        assert_eq!(grown.top(), 0.0);
        assert!(grown.bottom() > layer.bottom());

        let shrunk = layer.advance(-5.0, sb, 0.0, true).unwrap();
        assert_eq!(shrunk.bottom(), layer.bottom());
    }

    #[test]
    fn test_decomposition_shrinks_labile() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        let next = layer.advance(0.0, sb, 1.0, false).unwrap();
        assert!(
            next.sediments().labile().weight() < layer.sediments().labile().weight() + 1e-3
        );
        assert!(next.sediments().refractory().weight() > layer.sediments().refractory().weight());
    }

    #[test]
    fn test_losing_surface_biomass_kills_roots() {
        let layer = initial();
        let next = layer.advance(0.0, 0.0, 0.0, false).unwrap();
        assert_eq!(next.biomass().weight(), 0.0);
        // dead roots stay in the layer as detritus
        assert_relative_eq!(next.weight(), layer.weight(), max_relative = 1e-12);
    }

    #[test]
    fn test_seed_layer() {
        let (b, s) = models();
        let layer = Layer::seed(&b, &s, 0.0105, 0.5).unwrap();
        assert_relative_eq!(layer.sediments().length(), 0.5, max_relative = 1e-12);
        assert_relative_eq!(
            layer.depth(),
            0.5 + layer.biomass().length(),
            max_relative = 1e-12
        );

        let empty = Layer::seed(&b, &s, 0.0105, -0.5).unwrap();
        assert_eq!(empty.depth(), 0.0);
        assert_eq!(empty.weight(), 0.0);
    }

    #[test]
    fn test_seed_roots_fill_layer() {
        let (b, s) = models();
        let layer = Layer::seed(&b, &s, 0.0105, 2.0).unwrap();
        let profile = b.distribution(0.0105).unwrap();
        assert_relative_eq!(
            layer.biomass().weight(),
            profile.integral(layer.interval()),
            max_relative = 1e-9
        );
        assert!(layer.depth() > 2.0);
    }

    #[test]
    fn test_advance_at_rebuilds_roots_in_place() {
        let layer = initial();
        let sb = Parameters::default().initial_surface_biomass;
        let profile = models().0.distribution(sb).unwrap();

        let next = layer.advance_at(0.0, sb, 0.0, false, 2.0).unwrap();
        assert_eq!(next.top(), 2.0);
        assert_relative_eq!(
            next.biomass().weight(),
            profile.integral(next.interval()),
            max_relative = 1e-9
        );
        // roots pushed out of the root zone die back into the sediment
        assert!(next.biomass().weight() < layer.biomass().weight());
        assert_relative_eq!(next.weight(), layer.weight(), max_relative = 1e-12);
        assert_relative_eq!(
            next.depth(),
            next.biomass().length() + next.sediments().length(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_advance_at_rejects_negative_top() {
        let layer = initial();
        assert!(layer.advance_at(0.0, 0.01, 0.0, false, -1.0).is_err());
    }

    #[test]
    fn test_record_matches_layer() {
        let layer = initial();
        let r = layer.record();
        assert_eq!(r.depth, layer.depth());
        assert_eq!(r.biomass_weight, layer.biomass().weight());
        assert_relative_eq!(
            r.labile_weight + r.refractory_weight + r.inorganic_weight,
            layer.sediments().weight()
        );
    }
}
