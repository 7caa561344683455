//! Direct Preference Optimization (DPO) loss for preference learning.
//!
//! This crate computes the DPO objective from log probabilities produced by a
//! trainable policy model and a frozen reference model. It does not run models,
//! load data or compute gradients; it only evaluates the loss.
//!
//! # Overview
//!
//! For a preference pair (chosen `y_w`, rejected `y_l`) the loss is:
//! 1. `chosen_ratio = log_pi(y_w) - log_pi_ref(y_w)`
//! 2. `rejected_ratio = log_pi(y_l) - log_pi_ref(y_l)`
//! 3. `loss = -ln(sigmoid(beta * (chosen_ratio - rejected_ratio)))`
//!
//! # Key Properties
//!
//! - **Monotonic**: the loss falls as the policy favours the chosen response more
//! - **Antisymmetric swap**: exchanging chosen and rejected negates the preference difference
//! - **Beta zero**: `beta = 0` yields `ln 2` for any finite inputs
//!
//! # Example
//!
//! ```rust
//! use prefopt_core::{dpo_loss, DpoConfig, PreferenceLogProbs};
//!
//! let loss = dpo_loss(-1.5, -1.2, -1.0, -1.8, 0.1);
//! assert!((loss - 0.7497).abs() < 1e-3);
//!
//! let sample = PreferenceLogProbs::new(-1.5, -1.2, -1.0, -1.8);
//! let checked = DpoConfig::new(0.1).loss(&sample).unwrap();
//! assert_eq!(loss, checked);
//! ```
//!
//! Batches of any shape broadcast like NumPy arrays:
//!
//! ```rust
//! use ndarray::array;
//! use prefopt_core::dpo_loss_batch;
//!
//! let policy_chosen = array![-1.5, -0.7].into_dyn();
//! let ref_chosen = array![-1.2].into_dyn();
//! let policy_rejected = array![-1.0, -2.1].into_dyn();
//! let ref_rejected = array![-1.8].into_dyn();
//!
//! let losses = dpo_loss_batch(
//!     policy_chosen.view(),
//!     ref_chosen.view(),
//!     policy_rejected.view(),
//!     ref_rejected.view(),
//!     0.1,
//! )
//! .unwrap();
//! assert_eq!(losses.shape(), &[2]);
//! ```
//!
//! # References
//!
//! - [DPO Paper](https://arxiv.org/abs/2305.18290): "Direct Preference Optimization:
//!   Your Language Model is Secretly a Reward Model"

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activation;
pub mod batch;
pub mod config;
pub mod error;
pub mod loss;
pub mod metrics;

// Re-exports for convenience
pub use activation::{sigmoid, sigmoid_array};
pub use batch::{broadcast_shape, dpo_loss_batch, dpo_loss_mean};
pub use config::DpoConfig;
pub use error::{PrefOptError, Result};
pub use loss::{dpo_loss, DpoBreakdown, PreferenceLogProbs};
pub use metrics::DpoMetrics;

/// Version of the prefopt implementation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default temperature (beta = 0.1 as per paper).
pub const DEFAULT_BETA: f64 = 0.1;

/// Prelude module for convenient imports.
pub mod prelude {
    //! Convenient re-exports for common usage.
    pub use crate::batch::{dpo_loss_batch, dpo_loss_mean};
    pub use crate::config::DpoConfig;
    pub use crate::loss::{dpo_loss, DpoBreakdown, PreferenceLogProbs};
    pub use crate::metrics::DpoMetrics;
}
