//! I/O utilities for reading inputs and writing layer logs.
//!
//! This module provides:
//! - **Parameter files**: TOML (or JSON) description of every cell in a marsh
//! - **Forcing files**: per-cell deposition and surface biomass time series
//! - **Layer logs**: per-step layer snapshots written as CSV
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use marsh_rs::column::Cell;
//! use marsh_rs::io::{CellLog, read_forcing_file, read_parameter_file};
//!
//! let params = read_parameter_file(Path::new("marsh.toml"))?;
//! let forcing = read_forcing_file(Path::new("cell_1.txt"))?;
//!
//! let mut cell = Cell::new(&params[0])?;
//! let mut log = CellLog::new(cell.id());
//! log.record(&cell);
//! for step in forcing.steps() {
//!     cell.advance(step.deposition, step.surface_biomass, step.duration, 4)?;
//!     log.record(&cell);
//! }
//! log.write_csv(Path::new("cell_1.csv"))?;
//! ```

mod forcing_reader;
mod layer_log;
mod parameter_file;

pub use forcing_reader::{
    ForcingFileError, ForcingRecord, ForcingSeries, ForcingStep, parse_forcing,
    read_forcing_file,
};
pub use layer_log::{CSV_HEADER, CellLog, LayerLogError, LayerLogRow, MarshLog};
pub use parameter_file::{
    ParameterFileError, parse_ids, parse_parameters, parse_parameters_json, parse_var,
    read_parameter_file,
};
