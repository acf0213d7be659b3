//! Strongly-typed domain types shared across the column engine.
//!
//! - [`DepthInterval`]: validated `(top, bottom)` depth range of a layer
//! - [`Material`]: which pool a stock belongs to
//! - [`Measurement`]: whether a value is a mass or a depth equivalent
//!
//! # Example
//!
//! ```
//! use marsh_rs::types::{DepthInterval, Material, Measurement};
//!
//! let interval = DepthInterval::from_surface(30.0).unwrap();
//! assert_eq!(interval.depth(), 30.0);
//! assert!(Material::Labile.is_organic());
//! assert_eq!(Measurement::Weight.to_string(), "g");
//! ```

mod material;
mod physical;

pub use material::{Material, Measurement};
pub use physical::{DEPTH_TOLERANCE, DepthInterval};
pub(crate) use physical::snap_to_zero;
