#![deny(missing_docs)]

//! Posterior wrapper binding a trained conditional density to a prior.

/// Posterior construction, rejection sampling and log-density queries.
pub mod posterior;

pub use posterior::{PinnedPosterior, Posterior, SampleReport};
