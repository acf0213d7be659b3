//! Multi-cell orchestration.
//!
//! A [`Marsh`] owns one [`Cell`] per parameter set and fans per-cell inputs
//! out to them each time step. Cells share no state, so with the `parallel`
//! feature they can be stepped concurrently with
//! [`Marsh::advance_parallel`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use marsh_rs::marsh::{CellInput, Marsh};
//! use marsh_rs::params::Parameters;
//!
//! let mut marsh = Marsh::new(&[Parameters::with_id(1), Parameters::with_id(2)]).unwrap();
//! let inputs = BTreeMap::from([(1, CellInput::new(0.3, 0.0105))]);
//! marsh.advance(&inputs, 1.0, 2).unwrap();
//! assert!((marsh.cell(1).unwrap().elevation() - 0.3).abs() < 1e-12);
//! assert_eq!(marsh.cell(2).unwrap().elevation(), 0.0);
//! ```

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::column::Cell;
use crate::error::ColumnError;
use crate::params::{ParameterError, Parameters, validate_all};

/// Errors raised while building or stepping a marsh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarshError {
    /// Parameter sets are inconsistent.
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// A cell rejected its update.
    #[error("cell {id}: {source}")]
    Column {
        id: u32,
        #[source]
        source: ColumnError,
    },

    /// Input addressed to a cell that does not exist.
    #[error("no cell with id {0}")]
    UnknownCell(u32),
}

/// External forcing for one cell over one time step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellInput {
    /// Net deposition over the step [cm], negative for erosion.
    pub deposition: f64,
    /// Surface root concentration at the end of the step [g/cm²].
    pub surface_biomass: f64,
}

impl CellInput {
    pub fn new(deposition: f64, surface_biomass: f64) -> Self {
        Self {
            deposition,
            surface_biomass,
        }
    }

    /// No deposition and an unchanged surface concentration.
    pub fn idle(cell: &Cell) -> Self {
        Self::new(0.0, cell.surface_biomass())
    }
}

/// Collection of independent cells keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Marsh {
    cells: BTreeMap<u32, Cell>,
}

impl Marsh {
    /// Validate every parameter set and build one cell per set.
    pub fn new(params: &[Parameters]) -> Result<Self, MarshError> {
        validate_all(params)?;
        let cells = params
            .iter()
            .map(|p| {
                Cell::new(p)
                    .map(|cell| (p.id, cell))
                    .map_err(|source| MarshError::Column { id: p.id, source })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        info!("marsh built with {} cells", cells.len());
        Ok(Self { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.keys().copied()
    }

    pub fn cell(&self, id: u32) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Cells in id order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Advance every cell by `years`.
    ///
    /// Cells without an entry in `inputs` see no deposition and keep their
    /// surface concentration. The marsh is left unchanged if any cell
    /// fails.
    pub fn advance(
        &mut self,
        inputs: &BTreeMap<u32, CellInput>,
        years: f64,
        sub_steps: usize,
    ) -> Result<(), MarshError> {
        self.check_inputs(inputs)?;
        let stepped = self
            .cells
            .iter()
            .map(|(&id, cell)| step_cell(id, cell, inputs.get(&id), years, sub_steps))
            .collect::<Result<Vec<_>, _>>()?;
        self.cells.extend(stepped);
        Ok(())
    }

    /// Parallel version of [`Marsh::advance`] using Rayon.
    #[cfg(feature = "parallel")]
    pub fn advance_parallel(
        &mut self,
        inputs: &BTreeMap<u32, CellInput>,
        years: f64,
        sub_steps: usize,
    ) -> Result<(), MarshError> {
        use rayon::prelude::*;

        self.check_inputs(inputs)?;
        let stepped = self
            .cells
            .par_iter()
            .map(|(&id, cell)| step_cell(id, cell, inputs.get(&id), years, sub_steps))
            .collect::<Result<Vec<_>, _>>()?;
        self.cells.extend(stepped);
        Ok(())
    }

    fn check_inputs(&self, inputs: &BTreeMap<u32, CellInput>) -> Result<(), MarshError> {
        match inputs.keys().find(|id| !self.cells.contains_key(id)) {
            Some(&id) => Err(MarshError::UnknownCell(id)),
            None => Ok(()),
        }
    }
}

fn step_cell(
    id: u32,
    cell: &Cell,
    input: Option<&CellInput>,
    years: f64,
    sub_steps: usize,
) -> Result<(u32, Cell), MarshError> {
    let input = input.copied().unwrap_or_else(|| CellInput::idle(cell));
    let mut next = cell.clone();
    next.advance(input.deposition, input.surface_biomass, years, sub_steps)
        .map_err(|source| MarshError::Column { id, source })?;
    Ok((id, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marsh() -> Marsh {
        Marsh::new(&[Parameters::with_id(1), Parameters::with_id(2)]).unwrap()
    }

    #[test]
    fn test_build() {
        let m = marsh();
        assert_eq!(m.len(), 2);
        assert_eq!(m.ids().collect::<Vec<_>>(), vec![1, 2]);
        assert!(m.cell(3).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Marsh::new(&[Parameters::with_id(4), Parameters::with_id(4)]);
        assert!(matches!(
            result,
            Err(MarshError::Parameters(ParameterError::DuplicateId(4)))
        ));
    }

    #[test]
    fn test_unknown_cell_rejected() {
        let mut m = marsh();
        let inputs = BTreeMap::from([(9, CellInput::new(0.1, 0.01))]);
        assert_eq!(m.advance(&inputs, 1.0, 1), Err(MarshError::UnknownCell(9)));
        assert_eq!(m.cell(1).unwrap().layer_count(), 1);
    }

    #[test]
    fn test_inputs_fan_out() {
        let mut m = marsh();
        let inputs = BTreeMap::from([
            (1, CellInput::new(0.5, 0.0105)),
            (2, CellInput::new(-0.5, 0.0105)),
        ]);
        m.advance(&inputs, 1.0, 1).unwrap();
        assert!((m.cell(1).unwrap().elevation() - 0.5).abs() < 1e-12);
        assert!((m.cell(2).unwrap().elevation() + 0.5).abs() < 1e-12);
        assert!(m.cells().all(|c| c.layer_count() == 2));
    }

    #[test]
    fn test_failure_leaves_marsh_unchanged() {
        let mut m = marsh();
        let inputs = BTreeMap::from([
            (1, CellInput::new(0.5, 0.0105)),
            (2, CellInput::new(0.5, -1.0)),
        ]);
        assert!(matches!(
            m.advance(&inputs, 1.0, 1),
            Err(MarshError::Column { id: 2, .. })
        ));
        assert_eq!(m.cell(1).unwrap().elevation(), 0.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let inputs = BTreeMap::from([
            (1, CellInput::new(0.5, 0.011)),
            (2, CellInput::new(-0.2, 0.009)),
        ]);
        let mut serial = marsh();
        let mut parallel = marsh();
        serial.advance(&inputs, 1.0, 3).unwrap();
        parallel.advance_parallel(&inputs, 1.0, 3).unwrap();
        for (a, b) in serial.cells().zip(parallel.cells()) {
            assert_eq!(a.layers(), b.layers());
            assert_eq!(a.elevation(), b.elevation());
        }
    }
}
