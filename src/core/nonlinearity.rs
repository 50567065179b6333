#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest f32 strictly below 1.0. Saturated outputs are clamped here so the
/// squash range stays open in floating point.
pub const SQUASH_LIMIT: f32 = 1.0 - f32::EPSILON / 2.0;

/// Bounded sigmoid with range (-1, 1):
/// `2 / (1 + exp(-slope * (x - midpoint))) - 1`.
#[inline]
pub fn squash(x: f32, slope: f32, midpoint: f32) -> f32 {
    let y = 2.0 / (1.0 + (-slope * (x - midpoint)).exp()) - 1.0;
    y.clamp(-SQUASH_LIMIT, SQUASH_LIMIT)
}

/// Slope/midpoint pair for one layer's squash.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Squash {
    pub slope: f32,
    pub midpoint: f32,
}

impl Squash {
    pub const fn new(slope: f32, midpoint: f32) -> Self {
        Self { slope, midpoint }
    }

    /// A zero slope flattens the function to a constant 0; non-finite values
    /// would propagate NaNs through every later layer.
    pub fn is_valid(&self) -> bool {
        self.slope.is_finite() && self.slope != 0.0 && self.midpoint.is_finite()
    }

    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        squash(x, self.slope, self.midpoint)
    }

    pub fn apply_in_place(&self, xs: &mut [f32]) {
        for x in xs {
            *x = self.apply(*x);
        }
    }
}
