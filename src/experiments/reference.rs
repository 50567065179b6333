use tracing::info;

use crate::error::{Error, Result};
use crate::landscape::{Reward, RewardLandscape};
use crate::learning::{LearningLoop, LoopConfig, ProgressObserver, RunSummary};
use crate::pathway::PathwayConfig;

/// The reference experiment: a 100 → 50 → 100 → 2 pathway with two channels
/// learning to hit a single reward hill at (-0.9, 0.9) from a one-hot cue.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceConfig {
    /// Total training trials.
    pub trials: usize,
    pub learning_rate: f32,
    pub seed: u64,
    /// Which input unit the one-hot cue activates.
    pub cue_index: usize,
    /// Trials averaged for the early/late comparison in the report.
    pub summary_window: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            learning_rate: 0.1,
            seed: 42,
            cue_index: 1,
            summary_window: 100,
        }
    }
}

impl ReferenceConfig {
    pub fn pathway(&self) -> PathwayConfig {
        PathwayConfig::default().with_seed(self.seed)
    }

    pub fn cue(&self) -> Result<Vec<f32>> {
        one_hot(self.pathway().input_width, self.cue_index)
    }

    pub fn build(&self) -> Result<LearningLoop> {
        LearningLoop::new(
            self.pathway(),
            RewardLandscape::reference(),
            LoopConfig::default(),
        )
    }
}

/// Unit vector of length `width` with a 1 at `index`.
pub fn one_hot(width: usize, index: usize) -> Result<Vec<f32>> {
    if index >= width {
        return Err(Error::InvalidConfig("cue index must be < input width"));
    }
    let mut v = vec![0.0; width];
    v[index] = 1.0;
    Ok(v)
}

/// How one run went, for comparing seeds.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub seed: u64,
    pub summary: RunSummary,
    pub early_mean_reward: Reward,
    pub late_mean_reward: Reward,
    /// Distance of the first and last action from the landscape's peak.
    pub initial_distance: f32,
    pub final_distance: f32,
}

/// Smallest rise in mean reward that counts as learning.
pub const MIN_REWARD_GAIN: Reward = 0.05;

/// Smallest approach to the peak that counts as learning.
pub const MIN_DISTANCE_GAIN: f32 = 0.05;

impl Outcome {
    /// Whether the run learned: late reward clearly above early reward and
    /// the final action clearly closer to the peak. Noise-level drift in the
    /// flat tail does not count.
    pub fn improved(&self) -> bool {
        self.late_mean_reward - self.early_mean_reward > MIN_REWARD_GAIN
            && self.initial_distance - self.final_distance > MIN_DISTANCE_GAIN
    }
}

/// Run the reference experiment with progress logging.
pub fn run(cfg: &ReferenceConfig) -> Result<(LearningLoop, Outcome)> {
    let mut lp = cfg.build()?;
    let cue = cfg.cue()?;

    info!(
        trials = cfg.trials,
        learning_rate = cfg.learning_rate,
        seed = cfg.seed,
        "reference run"
    );
    let mut progress = ProgressObserver::for_trials(cfg.trials);
    let summary = lp.run_observed(cfg.trials, cfg.learning_rate, &cue, &mut progress)?;

    let outcome = outcome(&lp, cfg.seed, summary, cfg.summary_window);
    info!(
        early = outcome.early_mean_reward,
        late = outcome.late_mean_reward,
        initial_distance = outcome.initial_distance,
        final_distance = outcome.final_distance,
        "reference run done"
    );
    Ok((lp, outcome))
}

/// Run the reference experiment once per seed, without progress logging.
///
/// Runs that start deep in the landscape's flat tail see almost no reward
/// gradient and can stall; a sweep shows how often that happens.
pub fn sweep(cfg: &ReferenceConfig, seeds: impl IntoIterator<Item = u64>) -> Result<Vec<Outcome>> {
    let mut out = Vec::new();
    for seed in seeds {
        let cfg = ReferenceConfig { seed, ..*cfg };
        let mut lp = cfg.build()?;
        let summary = lp.run(cfg.trials, cfg.learning_rate, &cfg.cue()?)?;
        let o = outcome(&lp, seed, summary, cfg.summary_window);
        info!(
            seed,
            improved = o.improved(),
            early = o.early_mean_reward,
            late = o.late_mean_reward,
            "sweep"
        );
        out.push(o);
    }
    Ok(out)
}

fn outcome(lp: &LearningLoop, seed: u64, summary: RunSummary, window: usize) -> Outcome {
    let rewards = lp.rewards();
    let actions = lp.actions();
    let peak = peak_of(lp.landscape());
    let dist = |a: [f32; 2]| ((a[0] - peak[0]).powi(2) + (a[1] - peak[1]).powi(2)).sqrt();

    let early = &rewards[..window.min(rewards.len())];
    let late = &rewards[rewards.len().saturating_sub(window)..];

    Outcome {
        seed,
        summary,
        early_mean_reward: mean(early),
        late_mean_reward: mean(late),
        initial_distance: actions.first().map_or(0.0, |&a| dist(a)),
        final_distance: actions.last().map_or(0.0, |&a| dist(a)),
    }
}

// Center of the tallest bump.
fn peak_of(landscape: &RewardLandscape) -> [f32; 2] {
    landscape
        .bumps()
        .iter()
        .max_by(|a, b| a.height.total_cmp(&b.height))
        .map_or([0.0, 0.0], |b| b.center)
}

fn mean(xs: &[Reward]) -> Reward {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<Reward>() / xs.len() as Reward
}
