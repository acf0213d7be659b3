//! Reader for marsh parameter files.
//!
//! A parameter file describes every cell of a marsh at once, as a TOML
//! document or, for files ending in `.json`, a JSON object. Each field is
//! either a scalar, applied to all cells, or a list with one entry per cell.
//! Fields left out keep their reference value from [`Parameters::default`].
//!
//! # File Format
//!
//! ```toml
//! ids = [1, "...", 4]
//! surface_area = [1.0, "..."]
//! top_elevation = [0.0, 0.5, 1.0, 1.5]
//! bottom_elevation = -30.0
//! organic_fraction = 0.94
//! inorganic_fraction = 0.06
//! ```
//!
//! Both formats are read into the same tree, so the rules below apply to
//! either.
//!
//! Lists accept an ellipsis shorthand:
//! - `ids`: `[first, "...", last]` expands to every id from `first` to
//!   `last` inclusive
//! - other fields: `[value, "..."]` repeats `value` for every cell
//!
//! `inorganic_fraction` and `labile_fraction` are optional; when present
//! they must sum to one with `organic_fraction` and `refractory_fraction`.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::params::{ParameterError, Parameters, validate_all};

const ELLIPSIS: &str = "...";

/// Error type for parameter file parsing.
#[derive(Debug, Error)]
pub enum ParameterFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Top level is not a table
    #[error("Parameter file must contain a table of fields")]
    NotAnObject,

    /// Required field absent
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// Field name not recognized
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Value of the wrong type
    #[error("Type error in '{field}': {message}")]
    TypeError { field: String, message: String },

    /// Value of the right type but unusable shape or content
    #[error("Invalid '{field}': {message}")]
    ValueError { field: String, message: String },

    /// Parameters parsed but inconsistent
    #[error(transparent)]
    Invalid(#[from] ParameterError),
}

type Setter = fn(&mut Parameters, f64);

/// Per-cell numeric fields and where they land in [`Parameters`].
const FIELDS: [(&str, Setter); 16] = [
    ("surface_area", |p, v| p.surface_area = v),
    ("top_elevation", |p, v| p.top_elevation = v),
    ("bottom_elevation", |p, v| p.bottom_elevation = v),
    ("organic_bulk_density", |p, v| p.organic_bulk_density = v),
    ("inorganic_bulk_density", |p, v| p.inorganic_bulk_density = v),
    ("organic_fraction", |p, v| p.organic_fraction = v),
    ("decay_rate", |p, v| p.decay_rate = v),
    ("refractory_fraction", |p, v| p.refractory_fraction = v),
    ("initial_surface_biomass", |p, v| p.initial_surface_biomass = v),
    ("root_depth", |p, v| p.root_depth = v),
    ("distribution_k1", |p, v| p.distribution_k1 = v),
    ("turnover_rate_k2", |p, v| p.turnover_rate_k2 = v),
    ("ash_fraction_k3", |p, v| p.ash_fraction_k3 = v),
    ("stem_to_biomass_ratio", |p, v| p.stem_to_biomass_ratio = v),
    ("litter_ratio", |p, v| p.litter_ratio = v),
    ("litter_transport_factor", |p, v| p.litter_transport_factor = v),
];

/// Optional complements, checked against their stored partner.
const COMPLEMENTS: [(&str, &str, fn(&Parameters) -> f64); 2] = [
    ("inorganic_fraction", "organic_fraction", |p| p.organic_fraction),
    ("labile_fraction", "refractory_fraction", |p| p.refractory_fraction),
];

/// Read and validate a parameter file.
///
/// Files with a `.json` extension are read as JSON, everything else as TOML.
///
/// # Example
///
/// ```ignore
/// use marsh_rs::io::read_parameter_file;
/// use marsh_rs::marsh::Marsh;
/// use std::path::Path;
///
/// let params = read_parameter_file(Path::new("marsh.toml"))?;
/// let marsh = Marsh::new(&params)?;
/// ```
pub fn read_parameter_file(path: &Path) -> Result<Vec<Parameters>, ParameterFileError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_parameters_json(&content)
    } else {
        parse_parameters(&content)
    }
}

/// Parse and validate parameters from a TOML string.
pub fn parse_parameters(content: &str) -> Result<Vec<Parameters>, ParameterFileError> {
    let table: toml::Table = content.parse()?;
    parameters_from_value(&serde_json::to_value(table)?)
}

/// Parse and validate parameters from a JSON string.
pub fn parse_parameters_json(content: &str) -> Result<Vec<Parameters>, ParameterFileError> {
    let value: Value = serde_json::from_str(content)?;
    parameters_from_value(&value)
}

fn parameters_from_value(value: &Value) -> Result<Vec<Parameters>, ParameterFileError> {
    let object = value.as_object().ok_or(ParameterFileError::NotAnObject)?;

    if let Some(key) = object.keys().find(|k| !is_known(k)) {
        return Err(ParameterFileError::UnknownField(key.clone()));
    }

    let ids = parse_ids(object.get("ids").ok_or(ParameterFileError::MissingField("ids"))?)?;
    let n = ids.len();
    let mut params: Vec<Parameters> = ids.into_iter().map(Parameters::with_id).collect();

    for (name, set) in FIELDS {
        if let Some(value) = object.get(name) {
            for (p, v) in params.iter_mut().zip(parse_var(name, value, n)?) {
                set(p, v);
            }
        }
    }

    check_complements(object, &params)?;
    validate_all(&params)?;
    Ok(params)
}

fn is_known(key: &str) -> bool {
    key == "ids"
        || FIELDS.iter().any(|(name, _)| *name == key)
        || COMPLEMENTS.iter().any(|(name, _, _)| *name == key)
}

fn check_complements(
    object: &Map<String, Value>,
    params: &[Parameters],
) -> Result<(), ParameterFileError> {
    for (name, partner, stored) in COMPLEMENTS {
        if let Some(value) = object.get(name) {
            for (p, v) in params.iter().zip(parse_var(name, value, params.len())?) {
                Parameters::check_complement(p.id, (partner, stored(p)), (name, v))?;
            }
        }
    }
    Ok(())
}

fn is_ellipsis(value: &Value) -> bool {
    value.as_str() == Some(ELLIPSIS)
}

fn as_id(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

/// Expand the `ids` field.
pub fn parse_ids(value: &Value) -> Result<Vec<u32>, ParameterFileError> {
    let field = || "ids".to_string();
    let items = match value {
        Value::Array(items) => items,
        other => {
            return as_id(other).map(|id| vec![id]).ok_or_else(|| {
                ParameterFileError::TypeError {
                    field: field(),
                    message: format!("expected an integer or a list, got {}", other),
                }
            });
        }
    };

    match items.iter().position(is_ellipsis) {
        Some(pos) => {
            if pos != 1 || items.len() != 3 {
                return Err(ParameterFileError::ValueError {
                    field: field(),
                    message: "expected [first, \"...\", last]".into(),
                });
            }
            let (first, last) = match (as_id(&items[0]), as_id(&items[2])) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    return Err(ParameterFileError::TypeError {
                        field: field(),
                        message: "range bounds must be non-negative integers".into(),
                    });
                }
            };
            if last < first {
                return Err(ParameterFileError::ValueError {
                    field: field(),
                    message: format!("range {}..={} is empty", first, last),
                });
            }
            Ok((first..=last).collect())
        }
        None => items
            .iter()
            .map(|item| {
                as_id(item).ok_or_else(|| ParameterFileError::ValueError {
                    field: field(),
                    message: format!("{} is not a non-negative integer", item),
                })
            })
            .collect(),
    }
}

/// Expand a per-cell numeric field to `n` values.
pub fn parse_var(name: &str, value: &Value, n: usize) -> Result<Vec<f64>, ParameterFileError> {
    let number = |item: &Value| {
        item.as_f64().ok_or_else(|| ParameterFileError::TypeError {
            field: name.to_string(),
            message: format!("{} is not a number", item),
        })
    };

    let items = match value {
        Value::Array(items) => items,
        other => return Ok(vec![number(other)?; n]),
    };

    match items.iter().position(is_ellipsis) {
        Some(pos) => {
            if pos != 1 || items.len() != 2 {
                return Err(ParameterFileError::ValueError {
                    field: name.to_string(),
                    message: "expected [value, \"...\"]".into(),
                });
            }
            Ok(vec![number(&items[0])?; n])
        }
        None => {
            if items.len() != n {
                return Err(ParameterFileError::ValueError {
                    field: name.to_string(),
                    message: format!("expected {} values, got {}", n, items.len()),
                });
            }
            items.iter().map(number).collect()
        }
    }
}
