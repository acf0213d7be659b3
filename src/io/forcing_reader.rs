//! Reader for per-cell forcing time series.
//!
//! A forcing file drives one cell through time. Each data row gives the
//! deposition accumulated since the previous row and the surface root
//! concentration reached at that time.
//!
//! # File Format
//!
//! ```text
//! # Forcing for the creek-bank cell
//! # cell: 3
//! # columns: time(yr) deposition(cm) surface_biomass(g/cm2)
//! 0.0 0.0 0.0105
//! 1.0 0.4 0.0110
//! 2.0 -0.1 0.0108
//! ```
//!
//! Time values must be strictly increasing. The first row only fixes the
//! start time; its deposition is not applied.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Error type for forcing file parsing.
#[derive(Debug, Error)]
pub enum ForcingFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// No data records
    #[error("Forcing file contains no data")]
    EmptyFile,

    /// Time not strictly increasing
    #[error("Non-monotonic time at line {line}")]
    NonMonotonic { line: usize },
}

/// One row of a forcing file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForcingRecord {
    /// Time [yr]
    pub time: f64,
    /// Net deposition since the previous record [cm], negative for erosion
    pub deposition: f64,
    /// Surface root concentration at `time` [g/cm²]
    pub surface_biomass: f64,
}

impl ForcingRecord {
    pub fn new(time: f64, deposition: f64, surface_biomass: f64) -> Self {
        Self {
            time,
            deposition,
            surface_biomass,
        }
    }
}

/// One step of a forcing series, ready to hand to [`crate::column::Cell::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForcingStep {
    /// Time at the end of the step [yr]
    pub time: f64,
    /// Step length [yr]
    pub duration: f64,
    pub deposition: f64,
    pub surface_biomass: f64,
}

/// Time-ordered forcing records for one cell.
#[derive(Clone, Debug, Default)]
pub struct ForcingSeries {
    /// Cell id from the `# cell:` header, if present
    pub cell: Option<u32>,
    records: Vec<ForcingRecord>,
}

impl ForcingSeries {
    /// Build a series from records, checking they are non-empty and strictly
    /// increasing in time.
    pub fn from_records(records: Vec<ForcingRecord>) -> Result<Self, ForcingFileError> {
        if records.is_empty() {
            return Err(ForcingFileError::EmptyFile);
        }
        if let Some(i) = records.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(ForcingFileError::NonMonotonic { line: i + 2 });
        }
        Ok(Self {
            cell: None,
            records,
        })
    }

    /// Set the cell id.
    pub fn with_cell(mut self, id: u32) -> Self {
        self.cell = Some(id);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ForcingRecord] {
        &self.records
    }

    /// First and last time, or `(0, 0)` when empty.
    pub fn time_range(&self) -> (f64, f64) {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    pub fn duration(&self) -> f64 {
        let (t0, t1) = self.time_range();
        t1 - t0
    }

    /// Consecutive steps between records.
    pub fn steps(&self) -> impl Iterator<Item = ForcingStep> + '_ {
        self.records.windows(2).map(|w| ForcingStep {
            time: w[1].time,
            duration: w[1].time - w[0].time,
            deposition: w[1].deposition,
            surface_biomass: w[1].surface_biomass,
        })
    }

    /// Total net deposition applied by [`ForcingSeries::steps`] [cm].
    pub fn total_deposition(&self) -> f64 {
        self.records.iter().skip(1).map(|r| r.deposition).sum()
    }
}

/// Read a forcing file.
///
/// # Example
///
/// ```ignore
/// use marsh_rs::io::read_forcing_file;
/// use std::path::Path;
///
/// let forcing = read_forcing_file(Path::new("cell_3.txt"))?;
/// for step in forcing.steps() {
///     cell.advance(step.deposition, step.surface_biomass, step.duration, 4)?;
/// }
/// ```
pub fn read_forcing_file(path: &Path) -> Result<ForcingSeries, ForcingFileError> {
    let content = fs::read_to_string(path)?;
    parse_forcing(&content)
}

/// Parse a forcing series from a string.
pub fn parse_forcing(content: &str) -> Result<ForcingSeries, ForcingFileError> {
    let mut cell = None;
    let mut records = Vec::new();
    let mut last_time: Option<f64> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        let line_no = line_num + 1;

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let comment = line.trim_start_matches('#').trim();
            if let Some(id) = comment.strip_prefix("cell:")
                && let Ok(id) = id.trim().parse()
            {
                cell = Some(id);
            }
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(ForcingFileError::ParseError {
                line: line_no,
                message: "Expected: time deposition surface_biomass".into(),
            });
        }

        let time = parse_field(parts[0], "time", line_no)?;
        let deposition = parse_field(parts[1], "deposition", line_no)?;
        let surface_biomass = parse_field(parts[2], "surface_biomass", line_no)?;
        if surface_biomass < 0.0 {
            return Err(ForcingFileError::ParseError {
                line: line_no,
                message: format!("Negative surface_biomass {}", surface_biomass),
            });
        }

        if let Some(prev) = last_time
            && time <= prev
        {
            return Err(ForcingFileError::NonMonotonic { line: line_no });
        }
        last_time = Some(time);

        records.push(ForcingRecord::new(time, deposition, surface_biomass));
    }

    if records.is_empty() {
        return Err(ForcingFileError::EmptyFile);
    }

    Ok(ForcingSeries { cell, records })
}

fn parse_field(token: &str, name: &str, line: usize) -> Result<f64, ForcingFileError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ForcingFileError::ParseError {
            line,
            message: format!("Invalid {} value '{}'", name, token),
        })
}
