#![deny(missing_docs)]

//! Inference engine handle and the closed-form reference estimator.

/// Engine state machine and record accumulation.
pub mod engine;
/// Linear-Gaussian estimator and its fitted model artifact.
pub mod estimator;
/// Dense Cholesky and triangular-solve helpers.
pub mod linalg;

pub use engine::{EngineState, InferenceEngine};
pub use estimator::{LinearGaussian, LinearGaussianModel};
