//! Training infrastructure for gradient boosting.
//!
//! ## Shared Infrastructure
//!
//! - [`Gradients`]: gradient/hessian storage
//! - [`ObjectiveFn`], [`Objective`]: loss functions
//! - [`MetricFn`], [`Metric`], [`EvalSet`]: evaluation during training
//! - [`EarlyStopping`]: stops when the validation metric plateaus
//! - [`TrainingLogger`], [`Verbosity`]: progress output
//!
//! ## Model-Specific Training
//!
//! - [`gbdt`]: histogram-based tree boosting

mod callback;
mod eval;
pub mod gbdt;
mod gradients;
mod logger;
mod metrics;
mod objectives;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use eval::{EvalSet, Evaluator, MetricValue};
pub use gradients::Gradients;
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{Mae, Metric, MetricFn, Rmse};
pub use objectives::{AbsoluteLoss, Objective, ObjectiveFn, SquaredLoss};

pub use gbdt::{GBDTParams, GBDTTrainer, GainParams, GrowthStrategy, TrainError, TrainOutcome};
