#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::landscape::{Reward, RewardGrid, ACTION_BOUND};
use crate::learning::{Action, LearningLoop, LoopState};

/// A read-only snapshot of what a learning loop has done.
///
/// Design intent:
/// - Observers cannot mutate or steer the loop.
/// - Snapshotting is *on-demand* and allocates; the trial loop stays unchanged.
/// - Plotting lives outside this crate and reads only what is here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopSnapshot {
    pub state: LoopState,
    pub trials: usize,

    pub rewards: Vec<Reward>,
    /// Every `stride`-th action, plus the final one.
    pub trajectory: Vec<Action>,
    pub stride: usize,

    pub initial_action: Option<Action>,
    pub final_action: Option<Action>,

    /// Mean reward over the first / last `summary_window` trials.
    pub early_mean_reward: Reward,
    pub late_mean_reward: Reward,
    pub summary_window: usize,
}

pub struct LoopAdapter<'a> {
    lp: &'a LearningLoop,
}

impl<'a> LoopAdapter<'a> {
    pub fn new(lp: &'a LearningLoop) -> Self {
        Self { lp }
    }

    /// Snapshot with the trajectory thinned to every `stride`-th action and
    /// early/late reward means over `summary_window` trials.
    pub fn snapshot(&self, stride: usize, summary_window: usize) -> LoopSnapshot {
        let rewards = self.lp.rewards();
        let actions = self.lp.actions();

        LoopSnapshot {
            state: self.lp.state(),
            trials: self.lp.trials_completed(),
            rewards: rewards.to_vec(),
            trajectory: thin(actions, stride),
            stride: stride.max(1),
            initial_action: actions.first().copied(),
            final_action: actions.last().copied(),
            early_mean_reward: mean(&rewards[..summary_window.min(rewards.len())]),
            late_mean_reward: mean(&rewards[rewards.len().saturating_sub(summary_window)..]),
            summary_window,
        }
    }

    /// The loop's reward landscape sampled over `[-2, 2]²`, for contouring
    /// under the trajectory.
    pub fn landscape_grid(&self, resolution: usize) -> Result<RewardGrid> {
        let span = 2.0 * ACTION_BOUND;
        self.lp
            .landscape()
            .reward_grid((-span, span), (-span, span), resolution)
    }
}

fn thin(actions: &[Action], stride: usize) -> Vec<Action> {
    let stride = stride.max(1);
    let mut out: Vec<Action> = actions.iter().step_by(stride).copied().collect();
    if let Some(&last) = actions.last() {
        if (actions.len() - 1) % stride != 0 {
            out.push(last);
        }
    }
    out
}

fn mean(xs: &[Reward]) -> Reward {
    if xs.is_empty() {
        0.0
    } else {
        (xs.iter().map(|&x| x as f64).sum::<f64>() / xs.len() as f64) as Reward
    }
}
