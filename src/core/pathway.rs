use rand_distr::{Distribution, Normal, Uniform};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{expect_len, Error, Result};
use crate::matrix::Matrix;
use crate::nonlinearity::Squash;
use crate::prng::Prng;

/// Type alias for synaptic weights.
pub type Weight = f32;

/// Type alias for unit activations, always in (-1, 1) after squashing.
pub type Activation = f32;

/// Layer widths, channel layout, and numeric parameters of the pathway.
///
/// Layers, in order: input (HVC-like), hidden-1 (basal-ganglia-like),
/// hidden-2 (RA-like), output (motor command).
///
/// Hidden-1 and hidden-2 are each split into contiguous equal-size clusters.
/// Cluster `i` of hidden-1 projects only to cluster `i` of hidden-2, which
/// projects only to output unit `i`. Each such chain is one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathwayConfig {
    pub input_width: usize,
    pub hidden1_width: usize,
    pub hidden2_width: usize,
    pub output_width: usize,

    pub hidden1_clusters: usize,
    pub hidden2_clusters: usize,

    pub hidden1_squash: Squash,
    pub hidden2_squash: Squash,
    pub output_squash: Squash,

    /// Std-dev of the Gaussian exploration noise added to hidden-1 drive.
    pub noise_std: f32,

    // If set, makes construction and noise reproducible.
    pub seed: Option<u64>,
}

impl Default for PathwayConfig {
    /// 100 → 50 → 100 → 2 with two channels.
    ///
    /// - Hidden-1 squash is shallow (slope 5): slower, smoother learning
    /// - Hidden-2 is steep (slope 15)
    /// - Output is steeper still (slope 20) so actions can reach the corners
    fn default() -> Self {
        Self {
            input_width: 100,
            hidden1_width: 50,
            hidden2_width: 100,
            output_width: 2,
            hidden1_clusters: 2,
            hidden2_clusters: 2,
            hidden1_squash: Squash::new(5.0, 0.0),
            hidden2_squash: Squash::new(15.0, 0.0),
            output_squash: Squash::new(20.0, 0.0),
            noise_std: 0.1,
            seed: None,
        }
    }
}

impl PathwayConfig {
    /// Set the input, hidden-1 and hidden-2 widths.
    pub fn with_layers(mut self, input: usize, hidden1: usize, hidden2: usize) -> Self {
        self.input_width = input;
        self.hidden1_width = hidden1;
        self.hidden2_width = hidden2;
        self
    }

    /// Use `channels` parallel sub-pathways. Sets both cluster counts and the
    /// output width, which must all agree.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.hidden1_clusters = channels;
        self.hidden2_clusters = channels;
        self.output_width = channels;
        self
    }

    pub fn with_squash(mut self, hidden1: Squash, hidden2: Squash, output: Squash) -> Self {
        self.hidden1_squash = hidden1;
        self.hidden2_squash = hidden2;
        self.output_squash = output;
        self
    }

    pub fn with_noise(mut self, std: f32) -> Self {
        self.noise_std = std;
        self
    }

    /// Set the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.input_width == 0 {
            return Err("input_width must be >= 1");
        }
        if self.hidden1_width == 0 || self.hidden2_width == 0 {
            return Err("hidden widths must be >= 1");
        }
        if self.output_width == 0 {
            return Err("output_width must be >= 1");
        }
        if self.hidden1_clusters == 0 || self.hidden2_clusters == 0 {
            return Err("cluster counts must be >= 1");
        }
        if self.hidden1_width % self.hidden1_clusters != 0 {
            return Err("hidden1_width must be divisible by hidden1_clusters");
        }
        if self.hidden2_width % self.hidden2_clusters != 0 {
            return Err("hidden2_width must be divisible by hidden2_clusters");
        }
        if self.hidden1_clusters != self.hidden2_clusters {
            return Err("hidden1_clusters must equal hidden2_clusters");
        }
        if self.output_width != self.hidden2_clusters {
            return Err("output_width must equal the cluster count");
        }
        if !self.hidden1_squash.is_valid() {
            return Err("hidden1 squash needs a finite non-zero slope and finite midpoint");
        }
        if !self.hidden2_squash.is_valid() {
            return Err("hidden2 squash needs a finite non-zero slope and finite midpoint");
        }
        if !self.output_squash.is_valid() {
            return Err("output squash needs a finite non-zero slope and finite midpoint");
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err("noise_std must be finite and >= 0");
        }
        Ok(())
    }

    /// Number of parallel channels.
    pub fn channels(&self) -> usize {
        self.hidden2_clusters
    }

    pub fn hidden1_cluster_size(&self) -> usize {
        self.hidden1_width / self.hidden1_clusters
    }

    pub fn hidden2_cluster_size(&self) -> usize {
        self.hidden2_width / self.hidden2_clusters
    }
}

/// The four-layer feedforward pathway.
///
/// Only the input → hidden-1 projection is plastic. The two downstream
/// projections are sampled once in channel block form and never change.
#[derive(Debug, Clone)]
pub struct PathwayModel {
    cfg: PathwayConfig,

    w_in_h1: Matrix,
    w_h1_h2: Matrix,
    w_h2_out: Matrix,

    rng: Prng,
    noise: Normal<f32>,

    // Hidden-1 activation of the latest forward pass; the update's post term.
    hidden1: Vec<Activation>,
    has_activity: bool,

    // Scratch, overwritten every pass.
    noise_buf: Vec<f32>,
    hidden1_scaled: Vec<f32>,
    hidden2: Vec<Activation>,
}

impl PathwayModel {
    pub fn new(cfg: PathwayConfig) -> Result<Self> {
        cfg.validate().map_err(Error::InvalidConfig)?;
        let noise = Normal::new(0.0, cfg.noise_std)
            .map_err(|_| Error::InvalidConfig("noise_std must be finite and >= 0"))?;

        let mut rng = Prng::new(cfg.seed.unwrap_or(1));

        let signed = Uniform::new(-1.0_f32, 1.0);
        let unsigned = Uniform::new(0.0_f32, 1.0);

        let w_in_h1 = Matrix::from_fn(cfg.input_width, cfg.hidden1_width, |_, _| {
            signed.sample(&mut rng)
        });

        // Channel blocks: cross-channel entries are never sampled.
        let c1 = cfg.hidden1_cluster_size();
        let c2 = cfg.hidden2_cluster_size();
        let w_h1_h2 = Matrix::from_fn(cfg.hidden1_width, cfg.hidden2_width, |i, j| {
            if i / c1 == j / c2 {
                unsigned.sample(&mut rng)
            } else {
                0.0
            }
        });
        let w_h2_out = Matrix::from_fn(cfg.hidden2_width, cfg.output_width, |i, k| {
            if i / c2 == k {
                unsigned.sample(&mut rng)
            } else {
                0.0
            }
        });

        debug!(
            input = cfg.input_width,
            hidden1 = cfg.hidden1_width,
            hidden2 = cfg.hidden2_width,
            output = cfg.output_width,
            channels = cfg.channels(),
            seed = ?cfg.seed,
            "pathway constructed"
        );

        Ok(Self {
            w_in_h1,
            w_h1_h2,
            w_h2_out,
            rng,
            noise,
            hidden1: vec![0.0; cfg.hidden1_width],
            has_activity: false,
            noise_buf: vec![0.0; cfg.hidden1_width],
            hidden1_scaled: vec![0.0; cfg.hidden1_width],
            hidden2: vec![0.0; cfg.hidden2_width],
            cfg,
        })
    }

    pub fn config(&self) -> &PathwayConfig {
        &self.cfg
    }

    /// Plastic input → hidden-1 weights, `[input x hidden1]`.
    pub fn input_weights(&self) -> &Matrix {
        &self.w_in_h1
    }

    /// Fixed hidden-1 → hidden-2 channel weights, `[hidden1 x hidden2]`.
    pub fn channel_weights(&self) -> &Matrix {
        &self.w_h1_h2
    }

    /// Fixed hidden-2 → output weights, `[hidden2 x output]`.
    pub fn output_weights(&self) -> &Matrix {
        &self.w_h2_out
    }

    /// Hidden-1 activation retained from the most recent forward pass.
    pub fn last_hidden1(&self) -> Option<&[Activation]> {
        self.has_activity.then_some(self.hidden1.as_slice())
    }

    pub fn channel_count(&self) -> usize {
        self.cfg.channels()
    }

    pub fn hidden1_cluster_size(&self) -> usize {
        self.cfg.hidden1_cluster_size()
    }

    pub fn hidden2_cluster_size(&self) -> usize {
        self.cfg.hidden2_cluster_size()
    }

    /// Forward pass with fresh exploration noise on hidden-1.
    pub fn forward(&mut self, input: &[f32]) -> Result<Vec<Activation>> {
        // Check before drawing so a rejected call leaves the noise stream alone.
        expect_len("input", self.cfg.input_width, input.len())?;

        let normal = self.noise;
        for n in self.noise_buf.iter_mut() {
            *n = normal.sample(&mut self.rng);
        }

        let noise = std::mem::take(&mut self.noise_buf);
        let out = self.forward_with_noise(input, &noise);
        self.noise_buf = noise;
        out
    }

    /// Forward pass with caller-supplied hidden-1 noise.
    ///
    /// With `noise` held fixed this is a pure function of `input` and the
    /// current input weights (apart from retaining hidden-1).
    pub fn forward_with_noise(&mut self, input: &[f32], noise: &[f32]) -> Result<Vec<Activation>> {
        expect_len("input", self.cfg.input_width, input.len())?;
        expect_len("noise", self.cfg.hidden1_width, noise.len())?;

        // 1. Input layer is an identity echo.
        // 2. hidden1 = squash(input · W_in_h1 + noise)
        self.w_in_h1.vec_mul_into(input, &mut self.hidden1);
        for (h, n) in self.hidden1.iter_mut().zip(noise) {
            *h += n;
        }
        self.cfg.hidden1_squash.apply_in_place(&mut self.hidden1);
        self.has_activity = true;

        // 3. hidden2 = squash((hidden1 / hidden1_width) · W_h1_h2)
        let width = self.cfg.hidden1_width as f32;
        for (s, h) in self.hidden1_scaled.iter_mut().zip(&self.hidden1) {
            *s = h / width;
        }
        self.w_h1_h2
            .vec_mul_into(&self.hidden1_scaled, &mut self.hidden2);
        self.cfg.hidden2_squash.apply_in_place(&mut self.hidden2);

        // 4. output = squash(W_h2_outᵀ · hidden2 / hidden1_cluster_size)
        let mut output = vec![0.0; self.cfg.output_width];
        self.w_h2_out.transpose_mul_into(&self.hidden2, &mut output);
        let norm = self.cfg.hidden1_cluster_size() as f32;
        for o in output.iter_mut() {
            *o /= norm;
        }
        self.cfg.output_squash.apply_in_place(&mut output);

        Ok(output)
    }

    /// Reward-modulated Hebbian step on the input → hidden-1 projection:
    /// `W_in_h1 += signal * outer(input, hidden1)` using the hidden-1
    /// activation of the latest forward pass.
    ///
    /// `signal` is `learning_rate * (reward - baseline)`; its sign decides
    /// whether the latest co-activation pattern is reinforced or suppressed.
    pub fn reinforce(&mut self, input: &[f32], signal: f32) -> Result<()> {
        expect_len("input", self.cfg.input_width, input.len())?;
        if !self.has_activity {
            return Err(Error::NoActivity);
        }
        self.w_in_h1.add_outer(signal, input, &self.hidden1);
        Ok(())
    }
}
