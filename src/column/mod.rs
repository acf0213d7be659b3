//! Column stepping engine.
//!
//! A [`Cell`] is an ordered stack of [`Layer`]s. Each external time step is
//! split into sub-steps. In every sub-step the cell builds a fresh surface
//! layer from the leftover deposit, then walks its layers from the surface
//! down. Each layer gets its share of erosion (or the full deposition), the
//! surface root concentration and the top it will have in the new stack,
//! where it rebuilds its roots.
//!
//! ```text
//!   depth 0  ┌──────────────┐  newest layer (last in the Vec)
//!            ├──────────────┤
//!            │      ...     │
//!            ├──────────────┤
//!            │ initial seed │  oldest layer (index 0)
//!            └──────────────┘
//! ```

mod cell;
mod layer;

pub use cell::Cell;
pub use layer::{Layer, LayerRecord};
