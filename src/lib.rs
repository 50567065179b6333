//! # songpath
//!
//! Reward-driven learning in a four-layer feedforward pathway modeled on the
//! songbird sensorimotor circuit (HVC → basal ganglia → RA → motor output).
//!
//! The pathway acts in a 2D action space scored by a stationary reward
//! landscape. Only the first projection is plastic; it learns through a
//! reward-modulated Hebbian rule gated by reward minus a trailing baseline,
//! while Gaussian noise on the first hidden layer drives exploration.
//!
//! ## Quick Start
//!
//! ```
//! use songpath::prelude::*;
//!
//! let mut lp = LearningLoop::new(
//!     PathwayConfig::default().with_seed(42),
//!     RewardLandscape::reference(),
//!     LoopConfig::default(),
//! )?;
//!
//! let mut cue = vec![0.0; 100];
//! cue[1] = 1.0;
//! lp.run(200, 0.1, &cue)?;
//!
//! assert_eq!(lp.rewards().len(), 200);
//! # Ok::<(), songpath::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization of configs, records and snapshots
//!
//! ## Modules
//!
//! - [`nonlinearity`]: Bounded (-1, 1) squash
//! - [`landscape`]: Gaussian-bump reward landscapes
//! - [`pathway`]: The channelized four-layer model
//! - [`learning`]: Trial loop, baseline, observers
//! - [`observer`]: Read-only snapshots for plotting
//! - [`experiments`]: The reference experiment

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/matrix.rs"]
pub mod matrix;

#[path = "core/nonlinearity.rs"]
pub mod nonlinearity;

#[path = "core/landscape.rs"]
pub mod landscape;

#[path = "core/pathway.rs"]
pub mod pathway;

#[path = "core/learning.rs"]
pub mod learning;

pub mod experiments;

pub mod observer;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use songpath::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::landscape::{GaussianBump, Point, Reward, RewardLandscape, ACTION_BOUND};
    pub use crate::learning::{
        Action, LearningLoop, LoopConfig, LoopState, ProgressObserver, RunSummary, TrialObserver,
        TrialRecord,
    };
    pub use crate::nonlinearity::{squash, Squash};
    pub use crate::observer::{LoopAdapter, LoopSnapshot};
    pub use crate::pathway::{Activation, PathwayConfig, PathwayModel, Weight};
}
