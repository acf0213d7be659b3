//! # marsh-rs
//!
//! A sediment-column accretion engine for marsh wetlands.
//!
//! Each marsh cell is a stack of depth layers. Every layer tracks live
//! below-ground biomass and three sediment pools (labile organic, refractory
//! organic and inorganic). Deposition, erosion, root turnover, burial,
//! decomposition and ash uptake move mass between the pools, and the crate
//! produces a time series of layer depths and stock compositions per cell.
//!
//! This crate provides:
//! - Parameter sets and their validation
//! - Mass / depth-equivalent conversion shared by every stock
//! - Root distribution, turnover, erosion and burial (biomass model)
//! - Decomposition, ash uptake and deposition (sediment model)
//! - The column stepping engine (layers and cells)
//! - Multi-cell orchestration, parameter and forcing files, CSV layer logs
//!
//! # Example
//!
//! ```
//! use marsh_rs::{Cell, Parameters};
//!
//! let mut cell = Cell::new(&Parameters::default()).unwrap();
//! for _ in 0..10 {
//!     cell.advance(0.3, 0.0105, 1.0, 4).unwrap();
//! }
//! assert_eq!(cell.layer_count(), 41);
//! assert!((cell.elevation() - 3.0).abs() < 1e-9);
//! ```

pub mod biomass;
pub mod column;
pub mod error;
pub mod io;
pub mod marsh;
pub mod params;
pub mod sediment;
pub mod simulation;
pub mod stock;
pub mod types;

// Re-export main types for convenience
pub use biomass::{Biomass, BiomassModel, BiomassTools, RootDistribution};
pub use column::{Cell, Layer, LayerRecord};
pub use error::ColumnError;
pub use io::{
    CellLog, ForcingSeries, MarshLog, read_forcing_file, read_parameter_file,
};
pub use marsh::{CellInput, Marsh, MarshError};
pub use params::{ParameterError, Parameters};
pub use sediment::{Sediment, SedimentModel, Sediments};
pub use simulation::{Simulation, SimulationConfig, SimulationResult};
pub use stock::{Converter, Fluxes, Stock};
pub use types::{DepthInterval, Material, Measurement};
