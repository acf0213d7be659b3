//! Per-step layer logs and their CSV output.
//!
//! A [`CellLog`] collects one row per layer every time it is asked to record
//! a cell, so a run produces the full history of layer depths and stock
//! compositions. A [`MarshLog`] keeps one such log per cell id.
//!
//! # File Format
//!
//! ```text
//! step,time,layer,top,bottom,depth,biomass_weight,labile_weight,refractory_weight,inorganic_weight
//! 0,0,0,0,30,30,0.09977...,1.64...,0.41...,0.13...
//! ```
//!
//! Layer 0 is the oldest (deepest) layer.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::column::{Cell, LayerRecord};
use crate::marsh::Marsh;

/// Column names of the CSV output.
pub const CSV_HEADER: &str = "step,time,layer,top,bottom,depth,biomass_weight,\
labile_weight,refractory_weight,inorganic_weight";

/// Error type for layer logging.
#[derive(Debug, Error)]
pub enum LayerLogError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record for a cell the log does not track
    #[error("no log registered for cell {0}")]
    UnknownCell(u32),

    /// A cell registered twice
    #[error("cell {0} is already registered")]
    DuplicateCell(u32),
}

/// One logged layer snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerLogRow {
    /// Index of the recording call
    pub step: usize,
    /// Cell time at recording [yr]
    pub time: f64,
    /// Layer index, oldest first
    pub layer: usize,
    pub record: LayerRecord,
}

impl LayerLogRow {
    fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let r = &self.record;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            self.step,
            self.time,
            self.layer,
            r.top,
            r.bottom,
            r.depth,
            r.biomass_weight,
            r.labile_weight,
            r.refractory_weight,
            r.inorganic_weight
        )
    }
}

/// History of one cell's layers.
#[derive(Clone, Debug, Default)]
pub struct CellLog {
    id: u32,
    steps: usize,
    rows: Vec<LayerLogRow>,
}

impl CellLog {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            steps: 0,
            rows: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of recorded snapshots.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn rows(&self) -> &[LayerLogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one snapshot.
    pub fn step(&self, step: usize) -> impl Iterator<Item = &LayerLogRow> {
        self.rows.iter().filter(move |r| r.step == step)
    }

    /// Append one row per layer of `cell`.
    pub fn record(&mut self, cell: &Cell) {
        let step = self.steps;
        let time = cell.elapsed();
        self.rows.extend(
            cell.records()
                .into_iter()
                .enumerate()
                .map(|(layer, record)| LayerLogRow {
                    step,
                    time,
                    layer,
                    record,
                }),
        );
        self.steps += 1;
    }

    /// Write the header and every row as CSV.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), LayerLogError> {
        writeln!(out, "{}", CSV_HEADER)?;
        for row in &self.rows {
            row.write_csv(out)?;
        }
        Ok(())
    }

    /// Write the log to a CSV file.
    pub fn write_csv(&self, path: &Path) -> Result<(), LayerLogError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// One [`CellLog`] per cell id.
#[derive(Clone, Debug, Default)]
pub struct MarshLog {
    logs: BTreeMap<u32, CellLog>,
}

impl MarshLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log registered for every cell of `marsh`.
    pub fn for_marsh(marsh: &Marsh) -> Self {
        Self {
            logs: marsh.ids().map(|id| (id, CellLog::new(id))).collect(),
        }
    }

    pub fn register(&mut self, id: u32) -> Result<(), LayerLogError> {
        if self.logs.contains_key(&id) {
            return Err(LayerLogError::DuplicateCell(id));
        }
        self.logs.insert(id, CellLog::new(id));
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&CellLog> {
        self.logs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Record a single registered cell.
    pub fn record_cell(&mut self, cell: &Cell) -> Result<(), LayerLogError> {
        self.logs
            .get_mut(&cell.id())
            .ok_or(LayerLogError::UnknownCell(cell.id()))?
            .record(cell);
        Ok(())
    }

    /// Record every cell of `marsh`.
    pub fn record(&mut self, marsh: &Marsh) -> Result<(), LayerLogError> {
        for cell in marsh.cells() {
            self.record_cell(cell)?;
        }
        Ok(())
    }

    /// Write `cell_<id>.csv` for every cell into `dir`, creating it if
    /// needed. Returns the written paths in id order.
    pub fn write_csv_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, LayerLogError> {
        fs::create_dir_all(dir)?;
        self.logs
            .values()
            .map(|log| {
                let path = dir.join(format!("cell_{}.csv", log.id()));
                log.write_csv(&path)?;
                Ok(path)
            })
            .collect()
    }
}
