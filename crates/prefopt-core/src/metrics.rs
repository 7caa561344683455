//! Batch summaries of the DPO objective for logging.

use serde::{Deserialize, Serialize};

use crate::error::{PrefOptError, Result};
use crate::loss::PreferenceLogProbs;

/// DPO metrics over a batch of preference pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpoMetrics {
    /// DPO loss value.
    pub loss: f64,
    /// Average reward for chosen responses.
    pub chosen_reward: f64,
    /// Average reward for rejected responses.
    pub rejected_reward: f64,
    /// Reward margin (chosen - rejected).
    pub reward_margin: f64,
    /// Accuracy (fraction where chosen_reward > rejected_reward).
    pub accuracy: f64,
}

impl DpoMetrics {
    /// Compute metrics from per-pair implicit rewards.
    ///
    /// # Errors
    /// Fails if the slices differ in length or are empty.
    pub fn compute(loss: f64, chosen_rewards: &[f64], rejected_rewards: &[f64]) -> Result<Self> {
        if chosen_rewards.len() != rejected_rewards.len() {
            return Err(PrefOptError::LengthMismatch {
                expected: chosen_rewards.len(),
                actual: rejected_rewards.len(),
            });
        }
        if chosen_rewards.is_empty() {
            return Err(PrefOptError::EmptyBatch);
        }

        let n = chosen_rewards.len() as f64;
        let chosen_reward = chosen_rewards.iter().sum::<f64>() / n;
        let rejected_reward = rejected_rewards.iter().sum::<f64>() / n;
        let reward_margin = chosen_reward - rejected_reward;

        let correct = chosen_rewards
            .iter()
            .zip(rejected_rewards.iter())
            .filter(|(c, r)| c > r)
            .count();
        let accuracy = correct as f64 / n;

        Ok(Self {
            loss,
            chosen_reward,
            rejected_reward,
            reward_margin,
            accuracy,
        })
    }

    /// Compute the mean loss and reward statistics for `samples`.
    pub fn from_samples(samples: &[PreferenceLogProbs], beta: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(PrefOptError::EmptyBatch);
        }

        let breakdowns: Vec<_> = samples.iter().map(|s| s.breakdown(beta)).collect();
        let loss = breakdowns.iter().map(|b| b.loss).sum::<f64>() / samples.len() as f64;
        let chosen: Vec<f64> = breakdowns.iter().map(|b| b.chosen_reward()).collect();
        let rejected: Vec<f64> = breakdowns.iter().map(|b| b.rejected_reward()).collect();

        let metrics = Self::compute(loss, &chosen, &rejected)?;
        tracing::debug!(
            samples = samples.len(),
            loss = metrics.loss,
            margin = metrics.reward_margin,
            accuracy = metrics.accuracy,
            "DPO batch metrics"
        );
        Ok(metrics)
    }
}
