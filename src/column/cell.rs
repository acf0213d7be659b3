//! Sub-stepped advance of a whole sediment column.

use log::{debug, info, warn};

use super::layer::{Layer, LayerRecord};
use crate::biomass::BiomassModel;
use crate::error::ColumnError;
use crate::params::Parameters;
use crate::sediment::SedimentModel;

/// One marsh cell: a stack of layers plus the surface state.
///
/// Layers are stored oldest first, so the bottom of the column is index 0
/// and the surface layer is the last element. After every sub-step the
/// top of each layer equals the summed depth of the layers above it.
///
/// # Example
///
/// ```
/// use marsh_rs::column::Cell;
/// use marsh_rs::params::Parameters;
///
/// let mut cell = Cell::new(&Parameters::default()).unwrap();
/// cell.advance(0.5, 0.0105, 1.0, 4).unwrap();
/// assert_eq!(cell.layer_count(), 5);
/// assert!((cell.elevation() - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Cell {
    id: u32,
    surface_biomass: f64,
    elevation: f64,
    elapsed: f64,
    layers: Vec<Layer>,
    biomass_model: BiomassModel,
    sediment_model: SedimentModel,
}

impl Cell {
    /// Validate `params` and build a cell holding the initial layer.
    pub fn new(params: &Parameters) -> Result<Self, ColumnError> {
        params.validate()?;
        let biomass_model = BiomassModel::new(params);
        let sediment_model = SedimentModel::new(params);
        let initial = Layer::initial(&biomass_model, &sediment_model)?;

        info!(
            "cell {}: initial layer {} with {:.4} g roots, {:.4} g sediment",
            params.id,
            initial.interval(),
            initial.biomass().weight(),
            initial.sediments().weight()
        );

        Ok(Self {
            id: params.id,
            surface_biomass: params.initial_surface_biomass,
            elevation: params.top_elevation,
            elapsed: 0.0,
            layers: vec![initial],
            biomass_model,
            sediment_model,
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Current surface root concentration [g/cm²].
    #[inline]
    pub fn surface_biomass(&self) -> f64 {
        self.surface_biomass
    }

    /// Ground elevation [cm].
    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Simulated time since construction [yr].
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Layers, oldest (bottom) first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Surface layer.
    pub fn top_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn params(&self) -> &Parameters {
        self.biomass_model.params()
    }

    /// Thickness of the whole column [cm].
    pub fn depth(&self) -> f64 {
        self.layers.iter().map(Layer::depth).sum()
    }

    /// Live root mass in the column [g].
    pub fn biomass_weight(&self) -> f64 {
        self.layers.iter().map(|l| l.biomass().weight()).sum()
    }

    /// Sediment mass in the column [g].
    pub fn sediment_weight(&self) -> f64 {
        self.layers.iter().map(|l| l.sediments().weight()).sum()
    }

    /// Snapshots of every layer, oldest first.
    pub fn records(&self) -> Vec<LayerRecord> {
        self.layers.iter().map(Layer::record).collect()
    }

    /// Advance the column by one external time step.
    ///
    /// * `deposition` - net deposition over the step [cm], negative for
    ///   erosion
    /// * `surface_biomass` - surface root concentration at the end of the
    ///   step [g/cm²]
    /// * `duration` - step length [yr]
    /// * `sub_steps` - number of equal sub-steps
    ///
    /// Deposition and duration are split evenly over the sub-steps and the
    /// surface concentration moves linearly to its new value. Every sub-step
    /// appends one layer. On error the cell is left unchanged.
    ///
    /// A sub-step may not exceed [`SedimentModel::max_step`] (5 yr with the
    /// reference decay rate); longer ones fail with
    /// [`ColumnError::StepTooLong`], which names the sub-step count needed.
    pub fn advance(
        &mut self,
        deposition: f64,
        surface_biomass: f64,
        duration: f64,
        sub_steps: usize,
    ) -> Result<(), ColumnError> {
        ColumnError::check_non_negative("duration", duration)?;
        ColumnError::check_non_negative("surface_biomass", surface_biomass)?;
        ColumnError::check_finite("deposition", deposition)?;
        if sub_steps == 0 {
            return Err(ColumnError::NoSubSteps);
        }

        let n = sub_steps as f64;
        let limit = self.sediment_model.max_step();
        if duration / n > limit {
            return Err(ColumnError::StepTooLong {
                step: duration / n,
                limit,
                sub_steps: (duration / limit).ceil() as usize,
            });
        }

        let start = self.surface_biomass;
        let mut next = self.clone();
        for k in 0..sub_steps {
            let target = if k + 1 == sub_steps {
                surface_biomass
            } else {
                start + (surface_biomass - start) * (k + 1) as f64 / n
            };
            next.sub_step(deposition / n, target, duration / n, k > 0)?;
        }
        next.elapsed += duration;
        *self = next;
        Ok(())
    }

    fn sub_step(
        &mut self,
        deposition: f64,
        target: f64,
        years: f64,
        later: bool,
    ) -> Result<(), ColumnError> {
        // On later sub-steps the surface layer takes the deposit itself;
        // otherwise it goes into the new seed layer.
        let absorbed = later && deposition > 0.0;
        let leftover = if absorbed { 0.0 } else { deposition };
        let seed = Layer::seed(&self.biomass_model, &self.sediment_model, target, leftover)?;

        // Walk down from the surface. Every layer above is already advanced,
        // so `top` is where the current layer sits at the end of the sub-step.
        let mut advanced = Vec::with_capacity(self.layers.len() + 1);
        let mut remaining = deposition;
        let mut top = seed.depth();

        for (i, layer) in self.layers.iter().rev().enumerate() {
            let share = if remaining < 0.0 {
                remaining.max(-layer.depth())
            } else {
                remaining
            };
            let is_top_layer = i == 0 && later;

            let next = layer.advance_at(share, target, years, is_top_layer, top)?;
            top += next.depth();
            advanced.push(next);

            if remaining < 0.0 {
                remaining -= share;
            }
        }

        let realized = if deposition < 0.0 {
            if remaining < 0.0 {
                warn!(
                    "cell {}: column exhausted, {:.4} cm of erosion not realized",
                    self.id, -remaining
                );
            }
            deposition - remaining
        } else {
            deposition
        };

        advanced.reverse();
        advanced.push(seed);

        self.layers = advanced;
        self.elevation += realized;
        self.surface_biomass = target;

        debug!(
            "cell {}: {} layers, elevation {:.4} cm, surface biomass {:.5}",
            self.id,
            self.layers.len(),
            self.elevation,
            self.surface_biomass
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cell() -> Cell {
        Cell::new(&Parameters::default()).unwrap()
    }

    #[test]
    fn test_new_cell() {
        let c = cell();
        assert_eq!(c.layer_count(), 1);
        assert_eq!(c.elevation(), 0.0);
        assert_eq!(c.depth(), 30.0);
        assert_eq!(c.surface_biomass(), 0.0105);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let p = Parameters {
            root_depth: 50.0,
            ..Parameters::default()
        };
        assert!(matches!(
            Cell::new(&p),
            Err(ColumnError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_zero_advance_adds_one_layer() {
        let mut c = cell();
        c.advance(0.0, 0.0, 0.0, 1).unwrap();
        assert_eq!(c.layer_count(), 2);
        assert_eq!(c.layers()[1].depth(), 0.0);
    }

    #[test]
    fn test_sub_steps_add_layers() {
        let mut c = cell();
        c.advance(1.0, 0.0105, 1.0, 5).unwrap();
        assert_eq!(c.layer_count(), 6);
        assert_relative_eq!(c.elevation(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(c.elapsed(), 1.0);
    }

    #[test]
    fn test_invalid_advance_leaves_cell_unchanged() {
        let mut c = cell();
        assert_eq!(c.advance(0.0, 0.01, 1.0, 0), Err(ColumnError::NoSubSteps));
        assert!(c.advance(0.0, 0.01, -1.0, 1).is_err());
        assert!(c.advance(0.0, -0.01, 1.0, 1).is_err());
        assert_eq!(c.layer_count(), 1);
    }

    #[test]
    fn test_long_sub_step_rejected() {
        let mut c = cell();
        assert_eq!(
            c.advance(0.0, 0.0105, 10.0, 1),
            Err(ColumnError::StepTooLong {
                step: 10.0,
                limit: 5.0,
                sub_steps: 2,
            })
        );
        assert_eq!(c.layer_count(), 1);

        c.advance(0.0, 0.0105, 10.0, 4).unwrap();
        assert_eq!(c.layer_count(), 5);
        assert_relative_eq!(c.elapsed(), 10.0);
    }

    #[test]
    fn test_layers_restacked() {
        let mut c = cell();
        c.advance(2.0, 0.012, 1.0, 3).unwrap();
        c.advance(-1.5, 0.011, 1.0, 2).unwrap();

        let mut running = 0.0;
        for layer in c.layers().iter().rev() {
            assert_relative_eq!(layer.top(), running, epsilon = 1e-12);
            running += layer.depth();
        }
        assert_eq!(c.top_layer().unwrap().top(), 0.0);
    }

    #[test]
    fn test_erosion_exhausts_column() {
        let mut c = cell();
        c.advance(-100.0, 0.0105, 1.0, 1).unwrap();
        assert_relative_eq!(c.elevation(), -30.0, epsilon = 1e-9);
        assert!(c.depth() < 1e-9);
    }
}
