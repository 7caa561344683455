//! Direct Preference Optimization (DPO) loss.
//!
//! Based on: "Direct Preference Optimization: Your Language Model is Secretly
//! a Reward Model" by Rafailov et al.
//!
//! The DPO loss is:
//! ```text
//! L_DPO = -log(sigmoid(beta * ((log_pi(y_w|x) - log_pi_ref(y_w|x))
//!                              - (log_pi(y_l|x) - log_pi_ref(y_l|x)))))
//! ```
//!
//! Where:
//! - `y_w` is the chosen (winning) response
//! - `y_l` is the rejected (losing) response
//! - `pi` is the policy model (trainable)
//! - `pi_ref` is the reference model (frozen)
//! - `beta` is the temperature parameter
//!
//! The expression is evaluated literally (sigmoid, then negated natural log).
//! When `beta * diff` is very negative the sigmoid underflows to `0.0` and the
//! loss is `+inf`; when it is very positive the sigmoid rounds to `1.0` and the
//! loss is `0.0`.

use serde::{Deserialize, Serialize};

use crate::activation::sigmoid;

/// Compute the DPO loss for a single preference pair.
///
/// # Arguments
/// * `policy_logprob_win` - Policy log prob of the chosen response
/// * `ref_logprob_win` - Reference log prob of the chosen response
/// * `policy_logprob_lose` - Policy log prob of the rejected response
/// * `ref_logprob_lose` - Reference log prob of the rejected response
/// * `beta` - Temperature; `0.0` yields `ln 2` for any finite log probs
///
/// No validation is performed. Use [`crate::DpoConfig::loss`] for a checked call.
#[inline]
pub fn dpo_loss(
    policy_logprob_win: f64,
    ref_logprob_win: f64,
    policy_logprob_lose: f64,
    ref_logprob_lose: f64,
    beta: f64,
) -> f64 {
    let policy_chosen_ratio = policy_logprob_win - ref_logprob_win;
    let policy_rejected_ratio = policy_logprob_lose - ref_logprob_lose;
    let preference_diff = policy_chosen_ratio - policy_rejected_ratio;
    let scaled_diff = beta * preference_diff;
    let alignment_prob = sigmoid(scaled_diff);
    -alignment_prob.ln()
}

/// Log probabilities of one preference pair under the policy and reference models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceLogProbs {
    /// Policy log prob of the chosen response.
    pub policy_chosen: f64,
    /// Reference log prob of the chosen response.
    pub ref_chosen: f64,
    /// Policy log prob of the rejected response.
    pub policy_rejected: f64,
    /// Reference log prob of the rejected response.
    pub ref_rejected: f64,
}

impl PreferenceLogProbs {
    /// Create a preference pair.
    pub fn new(policy_chosen: f64, ref_chosen: f64, policy_rejected: f64, ref_rejected: f64) -> Self {
        Self {
            policy_chosen,
            ref_chosen,
            policy_rejected,
            ref_rejected,
        }
    }

    /// DPO loss for this pair.
    #[inline]
    pub fn loss(&self, beta: f64) -> f64 {
        dpo_loss(
            self.policy_chosen,
            self.ref_chosen,
            self.policy_rejected,
            self.ref_rejected,
            beta,
        )
    }

    /// All intermediate quantities of the loss for this pair.
    pub fn breakdown(&self, beta: f64) -> DpoBreakdown {
        DpoBreakdown::compute(self, beta)
    }

    /// The same pair with chosen and rejected exchanged.
    ///
    /// This negates the preference difference.
    pub fn swapped(&self) -> Self {
        Self {
            policy_chosen: self.policy_rejected,
            ref_chosen: self.ref_rejected,
            policy_rejected: self.policy_chosen,
            ref_rejected: self.ref_chosen,
        }
    }
}

/// Step-by-step evaluation of the DPO loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpoBreakdown {
    /// Temperature used for scaling.
    pub beta: f64,
    /// `policy_chosen - ref_chosen`.
    pub policy_chosen_ratio: f64,
    /// `policy_rejected - ref_rejected`.
    pub policy_rejected_ratio: f64,
    /// `policy_chosen_ratio - policy_rejected_ratio`.
    pub preference_diff: f64,
    /// `beta * preference_diff`.
    pub scaled_diff: f64,
    /// `sigmoid(scaled_diff)`.
    pub alignment_prob: f64,
    /// `-ln(alignment_prob)`.
    pub loss: f64,
}

impl DpoBreakdown {
    /// Evaluate every step of the loss for `sample`.
    ///
    /// `loss` is bit-identical to [`dpo_loss`] on the same inputs.
    pub fn compute(sample: &PreferenceLogProbs, beta: f64) -> Self {
        let policy_chosen_ratio = sample.policy_chosen - sample.ref_chosen;
        let policy_rejected_ratio = sample.policy_rejected - sample.ref_rejected;
        let preference_diff = policy_chosen_ratio - policy_rejected_ratio;
        let scaled_diff = beta * preference_diff;
        let alignment_prob = sigmoid(scaled_diff);
        let loss = -alignment_prob.ln();

        Self {
            beta,
            policy_chosen_ratio,
            policy_rejected_ratio,
            preference_diff,
            scaled_diff,
            alignment_prob,
            loss,
        }
    }

    /// True when the policy favours the rejected response relative to the reference.
    pub fn prefers_rejected(&self) -> bool {
        self.preference_diff < 0.0
    }

    /// Implicit reward of the chosen response (`beta * policy_chosen_ratio`).
    pub fn chosen_reward(&self) -> f64 {
        self.beta * self.policy_chosen_ratio
    }

    /// Implicit reward of the rejected response (`beta * policy_rejected_ratio`).
    pub fn rejected_reward(&self) -> f64 {
        self.beta * self.policy_rejected_ratio
    }
}
