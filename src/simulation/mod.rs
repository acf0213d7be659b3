//! Simulation runner abstraction.
//!
//! This module provides a high-level interface for running a cell through
//! a forcing time series that ties together:
//! - The column stepping engine ([`crate::column::Cell`])
//! - Forcing input ([`crate::io::ForcingSeries`])
//! - Callbacks, e.g. for layer logging
//!
//! # Example
//! ```ignore
//! use marsh_rs::column::Cell;
//! use marsh_rs::io::{CellLog, read_forcing_file};
//! use marsh_rs::simulation::Simulation;
//!
//! let mut cell = Cell::new(&params)?;
//! let mut log = CellLog::new(cell.id());
//!
//! let result = Simulation::new(read_forcing_file(path)?)
//!     .with_sub_steps(4)
//!     .run_with_callback(&mut cell, |cell, _time| log.record(cell));
//! ```

mod runner;

pub use runner::{Simulation, SimulationConfig, SimulationResult};
