//! Depth interval of a layer within the sediment column.
//!
//! Depths are measured in centimetres **below the ground surface** and are
//! always non-negative: the surface is at depth 0 and depth grows downward.

use std::fmt;

use crate::error::ColumnError;

/// Tolerance used when comparing depths.
pub const DEPTH_TOLERANCE: f64 = 1e-9;

// =============================================================================
// DepthInterval
// =============================================================================

/// Upper and lower boundary of a layer, `0 <= top <= bottom` [cm].
///
/// # Example
///
/// ```
/// use marsh_rs::types::DepthInterval;
///
/// let interval = DepthInterval::new(2.0, 5.0).unwrap();
/// assert_eq!(interval.depth(), 3.0);
/// assert!(DepthInterval::new(5.0, 2.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthInterval {
    top: f64,
    bottom: f64,
}

impl DepthInterval {
    /// Create a validated interval.
    ///
    /// Fails with [`ColumnError::InvalidInterval`] if either boundary is
    /// negative or the interval is descending.
    pub fn new(top: f64, bottom: f64) -> Result<Self, ColumnError> {
        if top >= 0.0 && bottom >= top {
            Ok(Self { top, bottom })
        } else {
            Err(ColumnError::InvalidInterval { top, bottom })
        }
    }

    /// Interval from the surface down to `depth`.
    pub fn from_surface(depth: f64) -> Result<Self, ColumnError> {
        Self::new(0.0, depth)
    }

    /// Upper boundary [cm].
    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Lower boundary [cm].
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Thickness `bottom - top` [cm].
    #[inline]
    pub fn depth(&self) -> f64 {
        self.bottom - self.top
    }

    /// Same bottom, with the top moved down by `shrink` (or up when negative).
    ///
    /// Keeps the top bit-identical when `shrink` is zero.
    pub fn with_top_moved(&self, shrink: f64) -> Result<Self, ColumnError> {
        let top = self.top + shrink;
        let top = if (top - self.bottom).abs() < DEPTH_TOLERANCE {
            self.bottom
        } else {
            top
        };
        Self::new(snap_to_zero(top), self.bottom)
    }

    /// Same thickness, with the top placed at `top`.
    pub fn placed_at(&self, top: f64) -> Result<Self, ColumnError> {
        Self::new(top, top + self.depth())
    }

    /// Approximate equality of both boundaries.
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.top - other.top).abs() <= DEPTH_TOLERANCE
            && (self.bottom - other.bottom).abs() <= DEPTH_TOLERANCE
    }
}

impl fmt::Display for DepthInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}] cm", self.top, self.bottom)
    }
}

/// Round-off guard: values within tolerance of zero become exactly zero.
#[inline]
pub(crate) fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < DEPTH_TOLERANCE { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_validation() {
        assert!(DepthInterval::new(0.0, 0.0).is_ok());
        assert!(DepthInterval::new(1.0, 0.5).is_err());
        assert!(DepthInterval::new(-1.0, 1.0).is_err());
        assert!(DepthInterval::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_with_top_moved_keeps_bottom() {
        let interval = DepthInterval::new(2.0, 10.0).unwrap();
        let grown = interval.with_top_moved(-1.0).unwrap();
        assert_eq!(grown.bottom(), 10.0);
        assert!((grown.top() - 1.0).abs() < 1e-12);

        let emptied = interval.with_top_moved(8.0 + 1e-12).unwrap();
        assert_eq!(emptied.depth(), 0.0);
    }

    #[test]
    fn test_with_top_moved_zero_is_identity() {
        let interval = DepthInterval::new(0.3, 7.1).unwrap();
        assert_eq!(interval.with_top_moved(0.0).unwrap(), interval);
    }

    #[test]
    fn test_placed_at() {
        let interval = DepthInterval::new(0.0, 4.0).unwrap();
        let moved = interval.placed_at(3.0).unwrap();
        assert_eq!(moved.top(), 3.0);
        assert_eq!(moved.bottom(), 7.0);
    }
}
