#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in the 2D action space.
pub type Point = [f32; 2];

/// Scalar reward signal.
pub type Reward = f32;

/// Half-width of the conventional action-space square around the origin.
/// Used for overlays only; actions are not clipped to it.
pub const ACTION_BOUND: f32 = 1.0;

/// One isotropic Gaussian bump: `height * exp(-|p - center|² / spread²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianBump {
    pub height: f32,
    pub center: Point,
    pub spread: f32,
}

impl GaussianBump {
    pub const fn new(height: f32, center: Point, spread: f32) -> Self {
        Self {
            height,
            center,
            spread,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.spread.is_finite() && self.spread > 0.0) {
            return Err(Error::DegenerateLandscape("spread must be finite and > 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::DegenerateLandscape("height must be finite and > 0"));
        }
        if !(self.center[0].is_finite() && self.center[1].is_finite()) {
            return Err(Error::DegenerateLandscape("center must be finite"));
        }
        Ok(())
    }

    #[inline]
    pub fn eval(&self, p: Point) -> Reward {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        self.height * (-(dx * dx + dy * dy) / (self.spread * self.spread)).exp()
    }
}

/// Stationary reward field: the sum of one or more Gaussian bumps.
///
/// Deserialization goes through [`RewardLandscape::new`], so a loaded
/// landscape is validated like a constructed one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "LandscapeBumps", into = "LandscapeBumps")
)]
pub struct RewardLandscape {
    bumps: Vec<GaussianBump>,
}

// Wire form of a landscape: `{"bumps": [...]}`.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct LandscapeBumps {
    bumps: Vec<GaussianBump>,
}

#[cfg(feature = "serde")]
impl TryFrom<LandscapeBumps> for RewardLandscape {
    type Error = Error;

    fn try_from(raw: LandscapeBumps) -> Result<Self> {
        Self::new(raw.bumps)
    }
}

#[cfg(feature = "serde")]
impl From<RewardLandscape> for LandscapeBumps {
    fn from(land: RewardLandscape) -> Self {
        Self { bumps: land.bumps }
    }
}

impl RewardLandscape {
    pub fn new(bumps: Vec<GaussianBump>) -> Result<Self> {
        if bumps.is_empty() {
            return Err(Error::DegenerateLandscape("at least one bump is required"));
        }
        for b in &bumps {
            b.validate()?;
        }
        Ok(Self { bumps })
    }

    pub fn single(height: f32, center: Point, spread: f32) -> Result<Self> {
        Self::new(vec![GaussianBump::new(height, center, spread)])
    }

    /// One bump of height 1 at (-0.9, 0.9) with spread 0.8.
    pub fn reference() -> Self {
        Self {
            bumps: vec![GaussianBump::new(1.0, [-0.9, 0.9], 0.8)],
        }
    }

    /// The reference hill plus a small narrow decoy at (-0.5, 0.2).
    pub fn reference_with_decoy() -> Self {
        Self {
            bumps: vec![
                GaussianBump::new(1.0, [-0.9, 0.9], 0.8),
                GaussianBump::new(0.2, [-0.5, 0.2], 0.2),
            ],
        }
    }

    pub fn bumps(&self) -> &[GaussianBump] {
        &self.bumps
    }

    pub fn reward(&self, action: Point) -> Reward {
        self.bumps.iter().map(|b| b.eval(action)).sum()
    }

    /// Evaluate the landscape on a regular `resolution x resolution` grid.
    /// Both ranges are inclusive at their ends.
    pub fn reward_grid(
        &self,
        x_range: (f32, f32),
        y_range: (f32, f32),
        resolution: usize,
    ) -> Result<RewardGrid> {
        if resolution < 2 {
            return Err(Error::InvalidConfig("grid resolution must be >= 2"));
        }
        let xs = linspace(x_range, resolution);
        let ys = linspace(y_range, resolution);

        let mut values = Vec::with_capacity(resolution * resolution);
        for &y in &ys {
            for &x in &xs {
                values.push(self.reward([x, y]));
            }
        }

        Ok(RewardGrid { xs, ys, values })
    }
}

/// Landscape sampled on a grid; `values[iy * xs.len() + ix]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardGrid {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub values: Vec<Reward>,
}

impl RewardGrid {
    pub fn at(&self, ix: usize, iy: usize) -> Reward {
        self.values[iy * self.xs.len() + ix]
    }
}

fn linspace((lo, hi): (f32, f32), n: usize) -> Vec<f32> {
    let step = (hi - lo) / (n - 1) as f32;
    (0..n)
        .map(|i| if i + 1 == n { hi } else { lo + step * i as f32 })
        .collect()
}
