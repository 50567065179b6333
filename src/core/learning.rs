#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{expect_len, Error, Result};
use crate::landscape::{Point, Reward, RewardLandscape};
use crate::pathway::{PathwayConfig, PathwayModel};

/// An action is the pathway's output read as a point in the 2D action space.
pub type Action = Point;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopConfig {
    /// Number of most recent rewards averaged into the baseline.
    pub baseline_window: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { baseline_window: 10 }
    }
}

impl LoopConfig {
    pub fn with_baseline_window(mut self, window: usize) -> Self {
        self.baseline_window = window;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.baseline_window == 0 {
            return Err("baseline_window must be >= 1");
        }
        Ok(())
    }
}

/// Everything that happened in one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialRecord {
    /// Index into the loop's history (keeps counting across chained runs).
    pub trial: usize,
    pub action: Action,
    pub reward: Reward,
    pub baseline: Reward,
}

/// Hook called after every trial, once the weight update has been applied.
///
/// Observers see the trial; they cannot steer the loop.
pub trait TrialObserver {
    fn on_trial(&mut self, record: &TrialRecord);
}

impl<F: FnMut(&TrialRecord)> TrialObserver for F {
    fn on_trial(&mut self, record: &TrialRecord) {
        self(record)
    }
}

/// Logs a progress line through `tracing` every `every` trials, starting with
/// the first trial of the run.
#[derive(Debug, Clone)]
pub struct ProgressObserver {
    every: usize,
    seen: usize,
}

impl ProgressObserver {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
        }
    }

    /// Ten reports spread over a run of `num_trials`.
    pub fn for_trials(num_trials: usize) -> Self {
        Self::new(num_trials / 10)
    }
}

impl TrialObserver for ProgressObserver {
    fn on_trial(&mut self, record: &TrialRecord) {
        if self.seen % self.every == 0 {
            info!(
                trial = record.trial,
                x = record.action[0],
                y = record.action[1],
                reward = record.reward,
                baseline = record.baseline,
                "trial"
            );
        }
        self.seen += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoopState {
    /// No trial has run yet.
    Idle,
    /// At least one `run` has returned. Further runs keep accumulating.
    Completed,
}

/// Outcome of a single `run` call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    pub trials: usize,
    pub mean_reward: Reward,
    pub final_action: Action,
    pub final_reward: Reward,
}

/// Drives trials against a fixed reward landscape and owns the only copy of
/// the pathway it trains.
///
/// Calling [`LearningLoop::run`] again does not reset anything: histories keep
/// growing and the input weights continue from their adapted state. That is
/// what chained experiments rely on.
#[derive(Debug, Clone)]
pub struct LearningLoop {
    cfg: LoopConfig,
    model: PathwayModel,
    landscape: RewardLandscape,

    rewards: Vec<Reward>,
    actions: Vec<Action>,

    state: LoopState,
}

impl LearningLoop {
    pub fn new(
        pathway: PathwayConfig,
        landscape: RewardLandscape,
        cfg: LoopConfig,
    ) -> Result<Self> {
        Self::from_model(PathwayModel::new(pathway)?, landscape, cfg)
    }

    pub fn from_model(
        model: PathwayModel,
        landscape: RewardLandscape,
        cfg: LoopConfig,
    ) -> Result<Self> {
        cfg.validate().map_err(Error::InvalidConfig)?;
        if model.config().output_width != 2 {
            return Err(Error::InvalidConfig(
                "output_width must be 2 to act in a 2D landscape",
            ));
        }
        Ok(Self {
            cfg,
            model,
            landscape,
            rewards: Vec::new(),
            actions: Vec::new(),
            state: LoopState::Idle,
        })
    }

    pub fn config(&self) -> &LoopConfig {
        &self.cfg
    }

    pub fn model(&self) -> &PathwayModel {
        &self.model
    }

    pub fn landscape(&self) -> &RewardLandscape {
        &self.landscape
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Reward of every trial so far, in order.
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Action of every trial so far, in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn trials_completed(&self) -> usize {
        self.rewards.len()
    }

    /// Baseline that was in effect at trial `t`: the mean of
    /// `rewards[max(0, t + 1 - W)..=t]`.
    pub fn baseline_at(&self, t: usize) -> Option<Reward> {
        if t >= self.rewards.len() {
            return None;
        }
        Some(window_mean(&self.rewards[..=t], self.cfg.baseline_window))
    }

    /// Run `num_trials` trials with the same `input` every time.
    pub fn run(&mut self, num_trials: usize, learning_rate: f32, input: &[f32]) -> Result<RunSummary> {
        self.run_observed(num_trials, learning_rate, input, &mut |_: &TrialRecord| {})
    }

    /// [`LearningLoop::run`] with an observer invoked after every trial.
    ///
    /// All arguments are checked before the first trial, so a rejected call
    /// leaves the histories and weights untouched.
    pub fn run_observed<O: TrialObserver + ?Sized>(
        &mut self,
        num_trials: usize,
        learning_rate: f32,
        input: &[f32],
        observer: &mut O,
    ) -> Result<RunSummary> {
        if num_trials == 0 {
            return Err(Error::InvalidConfig("num_trials must be >= 1"));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConfig("learning_rate must be finite and > 0"));
        }
        expect_len("input", self.model.config().input_width, input.len())?;

        self.rewards.reserve(num_trials);
        self.actions.reserve(num_trials);

        let mut total = 0.0_f64;
        let mut last = None;
        for _ in 0..num_trials {
            let record = self.trial(learning_rate, input)?;
            total += record.reward as f64;
            observer.on_trial(&record);
            last = Some(record);
        }
        self.state = LoopState::Completed;

        let last = last.ok_or(Error::InvalidConfig("num_trials must be >= 1"))?;
        Ok(RunSummary {
            trials: num_trials,
            mean_reward: (total / num_trials as f64) as Reward,
            final_action: last.action,
            final_reward: last.reward,
        })
    }

    fn trial(&mut self, learning_rate: f32, input: &[f32]) -> Result<TrialRecord> {
        // 1. act
        let output = self.model.forward(input)?;
        let action: Action = [output[0], output[1]];

        // 2. evaluate
        let reward = self.landscape.reward(action);

        // 3. record
        let trial = self.rewards.len();
        self.rewards.push(reward);
        self.actions.push(action);

        // 4. baseline over the trailing window, this trial included
        let baseline = window_mean(&self.rewards, self.cfg.baseline_window);

        // 5. reward-modulated Hebbian update on the input projection only
        self.model
            .reinforce(input, learning_rate * (reward - baseline))?;

        Ok(TrialRecord {
            trial,
            action,
            reward,
            baseline,
        })
    }
}

/// Mean of the last `window` entries (all of them if there are fewer).
fn window_mean(xs: &[Reward], window: usize) -> Reward {
    let start = xs.len().saturating_sub(window);
    let tail = &xs[start..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<Reward>() / tail.len() as Reward
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue() -> Vec<f32> {
        let mut v = vec![0.0; 100];
        v[1] = 1.0;
        v
    }

    fn make_loop(seed: u64) -> LearningLoop {
        LearningLoop::new(
            PathwayConfig::default().with_seed(seed),
            RewardLandscape::reference(),
            LoopConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn window_mean_uses_available_prefix() {
        assert_eq!(window_mean(&[], 10), 0.0);
        assert_eq!(window_mean(&[2.0], 10), 2.0);
        assert_eq!(window_mean(&[1.0, 2.0, 3.0], 10), 2.0);
        assert_eq!(window_mean(&[100.0, 1.0, 2.0, 3.0], 3), 2.0);
    }

    #[test]
    fn histories_grow_by_trial_count() {
        let mut lp = make_loop(1);
        assert_eq!(lp.state(), LoopState::Idle);
        let summary = lp.run(37, 0.1, &cue()).unwrap();
        assert_eq!(summary.trials, 37);
        assert_eq!(lp.rewards().len(), 37);
        assert_eq!(lp.actions().len(), 37);
        assert_eq!(lp.state(), LoopState::Completed);
        assert_eq!(summary.final_action, lp.actions()[36]);
        assert_eq!(summary.final_reward, lp.rewards()[36]);
    }

    #[test]
    fn histories_are_appended_in_call_order() {
        let mut lp = make_loop(4);
        let mut seen = Vec::new();
        lp.run_observed(25, 0.1, &cue(), &mut |r: &TrialRecord| seen.push(*r))
            .unwrap();

        assert_eq!(seen.len(), 25);
        for (i, r) in seen.iter().enumerate() {
            assert_eq!(r.trial, i);
            assert_eq!(lp.actions()[i], r.action);
            assert_eq!(lp.rewards()[i], r.reward);
            assert_eq!(r.reward, lp.landscape().reward(r.action));
        }
    }

    #[test]
    fn baseline_is_trailing_window_mean() {
        let window = 10;
        let mut lp = make_loop(2);
        let mut baselines = Vec::new();
        lp.run_observed(40, 0.1, &cue(), &mut |r: &TrialRecord| baselines.push(r.baseline))
            .unwrap();

        let rewards = lp.rewards();
        for (t, &b) in baselines.iter().enumerate() {
            let lo = (t + 1).saturating_sub(window);
            let slice = &rewards[lo..=t];
            let mean = slice.iter().map(|&r| r as f64).sum::<f64>() / slice.len() as f64;
            assert!((b as f64 - mean).abs() < 1e-6, "trial {t}: {b} vs {mean}");
            assert_eq!(lp.baseline_at(t), Some(b));
        }
        assert_eq!(lp.baseline_at(40), None);
    }

    #[test]
    fn custom_window_is_respected() {
        let mut lp = LearningLoop::new(
            PathwayConfig::default().with_seed(3),
            RewardLandscape::reference(),
            LoopConfig::default().with_baseline_window(3),
        )
        .unwrap();
        let mut baselines = Vec::new();
        lp.run_observed(8, 0.1, &cue(), &mut |r: &TrialRecord| baselines.push(r.baseline))
            .unwrap();
        let r = lp.rewards();
        assert_eq!(baselines[0], r[0]);
        let expected = (r[5] + r[6] + r[7]) / 3.0;
        assert!((baselines[7] - expected).abs() < 1e-6);
    }

    #[test]
    fn only_input_projection_changes() {
        let mut lp = make_loop(9);
        let w_in = lp.model().input_weights().clone();
        let w_mid = lp.model().channel_weights().clone();
        let w_out = lp.model().output_weights().clone();

        lp.run(500, 0.1, &cue()).unwrap();

        assert_ne!(lp.model().input_weights(), &w_in);
        assert_eq!(
            lp.model().channel_weights().as_slice(),
            w_mid.as_slice(),
            "hidden1 → hidden2 weights must never change"
        );
        assert_eq!(lp.model().output_weights().as_slice(), w_out.as_slice());
        // bit-level, not just float-equal
        for (a, b) in lp.model().channel_weights().as_slice().iter().zip(w_mid.as_slice()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        for (a, b) in lp.model().output_weights().as_slice().iter().zip(w_out.as_slice()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn one_hot_input_only_updates_its_row() {
        let mut lp = make_loop(12);
        let before = lp.model().input_weights().clone();
        lp.run(50, 0.1, &cue()).unwrap();
        let after = lp.model().input_weights();
        for r in (0..100).filter(|&r| r != 1) {
            assert_eq!(after.row(r), before.row(r));
        }
    }

    #[test]
    fn second_run_continues_instead_of_resetting() {
        let mut chained = make_loop(5);
        chained.run(30, 0.1, &cue()).unwrap();
        let adapted = chained.model().input_weights().clone();
        chained.run(20, 0.1, &cue()).unwrap();

        assert_eq!(chained.rewards().len(), 50);
        assert_eq!(chained.state(), LoopState::Completed);
        assert_ne!(chained.model().input_weights(), &adapted);

        // Same as one uninterrupted run of 50.
        let mut straight = make_loop(5);
        straight.run(50, 0.1, &cue()).unwrap();
        assert_eq!(chained.rewards(), straight.rewards());
        assert_eq!(chained.actions(), straight.actions());
    }

    #[test]
    fn identical_seeds_give_identical_histories() {
        let mut a = make_loop(42);
        let mut b = make_loop(42);
        a.run(300, 0.1, &cue()).unwrap();
        b.run(300, 0.1, &cue()).unwrap();

        let bits = |xs: &[Reward]| xs.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(a.rewards()), bits(b.rewards()));
        assert_eq!(a.actions(), b.actions());

        let mut c = make_loop(43);
        c.run(300, 0.1, &cue()).unwrap();
        assert_ne!(a.actions(), c.actions());
    }

    #[test]
    fn invalid_runs_touch_nothing() {
        let mut lp = make_loop(1);
        let w = lp.model().input_weights().clone();

        assert!(matches!(lp.run(0, 0.1, &cue()), Err(Error::InvalidConfig(_))));
        assert!(matches!(lp.run(5, 0.0, &cue()), Err(Error::InvalidConfig(_))));
        assert!(matches!(lp.run(5, f32::NAN, &cue()), Err(Error::InvalidConfig(_))));
        assert_eq!(
            lp.run(5, 0.1, &[1.0; 3]),
            Err(Error::ShapeMismatch {
                what: "input",
                expected: 100,
                actual: 3
            })
        );

        assert!(lp.rewards().is_empty());
        assert!(lp.actions().is_empty());
        assert_eq!(lp.model().input_weights(), &w);
        assert_eq!(lp.state(), LoopState::Idle);
    }

    #[test]
    fn loop_requires_two_dimensional_actions() {
        let cfg = PathwayConfig::default().with_layers(10, 30, 30).with_channels(3);
        let err = LearningLoop::new(cfg, RewardLandscape::reference(), LoopConfig::default());
        assert!(matches!(err, Err(Error::InvalidConfig(_))));

        let err = LearningLoop::new(
            PathwayConfig::default(),
            RewardLandscape::reference(),
            LoopConfig::default().with_baseline_window(0),
        );
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn progress_observer_reports_ten_times() {
        let mut p = ProgressObserver::for_trials(100);
        let mut reported = 0;
        for t in 0..100 {
            if p.seen % p.every == 0 {
                reported += 1;
            }
            p.on_trial(&TrialRecord {
                trial: t,
                action: [0.0, 0.0],
                reward: 0.0,
                baseline: 0.0,
            });
        }
        assert_eq!(reported, 10);
        assert_eq!(ProgressObserver::for_trials(3).every, 1);
    }
}
