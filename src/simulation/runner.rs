//! Simulation runner implementation.
//!
//! Drives a cell through a forcing series, one forcing step at a time.

use log::{Level, log};

use crate::column::Cell;
use crate::io::ForcingSeries;

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Sub-steps per forcing step.
    pub sub_steps: usize,
    /// Interval for calling callbacks (in simulation years).
    pub callback_interval: Option<f64>,
    /// Maximum number of forcing steps.
    pub max_steps: Option<usize>,
    /// Log progress at info level instead of debug.
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sub_steps: 1,
            callback_interval: None,
            max_steps: None,
            verbose: false,
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Result of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time reached [yr].
    pub final_time: f64,
    /// Number of forcing steps taken.
    pub n_steps: usize,
    /// Ground elevation at the end of the run [cm].
    pub final_elevation: f64,
    /// Number of layers at the end of the run.
    pub layer_count: usize,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Whether the simulation completed successfully.
    pub success: bool,
    /// Error message if simulation failed.
    pub error: Option<String>,
}

impl SimulationResult {
    /// Create a successful result.
    pub fn success(final_time: f64, n_steps: usize, cell: &Cell, wall_time: f64) -> Self {
        Self {
            final_time,
            n_steps,
            final_elevation: cell.elevation(),
            layer_count: cell.layer_count(),
            wall_time,
            success: true,
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(final_time: f64, n_steps: usize, cell: &Cell, error: String) -> Self {
        Self {
            final_time,
            n_steps,
            final_elevation: cell.elevation(),
            layer_count: cell.layer_count(),
            wall_time: 0.0,
            success: false,
            error: Some(error),
        }
    }
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Drives a [`Cell`] through a [`ForcingSeries`].
///
/// Each pair of consecutive forcing records becomes one call to
/// [`Cell::advance`] with the configured number of sub-steps.
#[derive(Clone, Debug)]
pub struct Simulation {
    forcing: ForcingSeries,
    config: SimulationConfig,
}

impl Simulation {
    /// Create a new simulation over `forcing`.
    pub fn new(forcing: ForcingSeries) -> Self {
        Self {
            forcing,
            config: SimulationConfig::default(),
        }
    }

    /// Set the number of sub-steps per forcing step.
    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.config.sub_steps = sub_steps;
        self
    }

    /// Set the callback interval.
    pub fn with_callback_interval(mut self, interval: f64) -> Self {
        self.config.callback_interval = Some(interval);
        self
    }

    /// Set the maximum number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = Some(max_steps);
        self
    }

    /// Log progress at info level.
    pub fn verbose(mut self) -> Self {
        self.config.verbose = true;
        self
    }

    pub fn forcing(&self) -> &ForcingSeries {
        &self.forcing
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the whole forcing series.
    pub fn run(&self, cell: &mut Cell) -> SimulationResult {
        self.run_with_callback(cell, |_, _| {})
    }

    /// Run the whole forcing series with a callback.
    ///
    /// The callback receives the cell and the forcing time, once before the
    /// first step and then at the configured interval (or after every step
    /// if none is set).
    pub fn run_with_callback<F>(&self, cell: &mut Cell, mut callback: F) -> SimulationResult
    where
        F: FnMut(&Cell, f64),
    {
        let start_wall = std::time::Instant::now();
        let level = if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        };

        let (t_start, t_end) = self.forcing.time_range();
        let mut t = t_start;
        let mut n_steps = 0;
        let mut last_callback_time = t_start;

        callback(cell, t);

        log!(
            level,
            "Starting simulation of cell {}: t = {:.3} to {:.3} yr, {} sub-steps",
            cell.id(),
            t_start,
            t_end,
            self.config.sub_steps
        );

        for step in self.forcing.steps() {
            if let Some(max_steps) = self.config.max_steps
                && n_steps >= max_steps
            {
                return SimulationResult::failure(
                    t,
                    n_steps,
                    cell,
                    format!("Maximum step limit ({}) reached", max_steps),
                );
            }

            if let Err(err) = cell.advance(
                step.deposition,
                step.surface_biomass,
                step.duration,
                self.config.sub_steps,
            ) {
                return SimulationResult::failure(t, n_steps, cell, err.to_string());
            }

            t = step.time;
            n_steps += 1;

            let should_callback = match self.config.callback_interval {
                Some(interval) => t - last_callback_time >= interval,
                None => true,
            };
            if should_callback {
                callback(cell, t);
                last_callback_time = t;
            }

            if n_steps % 100 == 0 {
                log!(
                    level,
                    "  Step {}: t = {:.3} yr, elevation = {:.4} cm",
                    n_steps,
                    t,
                    cell.elevation()
                );
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        log!(
            level,
            "Simulation of cell {} complete: {} steps, {} layers, elevation {:.4} cm, {:.2}s",
            cell.id(),
            n_steps,
            cell.layer_count(),
            cell.elevation(),
            wall_time
        );

        SimulationResult::success(t, n_steps, cell, wall_time)
    }
}
