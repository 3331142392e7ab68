use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::StandardNormal;

use sbi_core::errors::ErrorInfo;
use sbi_core::{Density, Distribution, RngHandle, SbiError};

use crate::box_uniform::check_dim;

const LN_TWO_PI: f64 = 1.837_877_066_409_345_3;

/// Independent normal distribution with per-dimension mean and scale.
///
/// Supported on all of `R^D`, so the posterior rejection policy never
/// discards a draw under this prior.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagNormal {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl DiagNormal {
    /// Creates a diagonal normal prior from means and standard deviations.
    pub fn new(mean: Array1<f64>, std: Array1<f64>) -> Result<Self, SbiError> {
        if mean.len() != std.len() {
            return Err(SbiError::Prior(
                ErrorInfo::new("normal-params-len", "mean and std disagree in length")
                    .with_context("mean", mean.len().to_string())
                    .with_context("std", std.len().to_string()),
            ));
        }
        if mean.is_empty() {
            return Err(SbiError::Prior(ErrorInfo::new(
                "normal-empty",
                "normal prior needs at least one dimension",
            )));
        }
        for (idx, &sigma) in std.iter().enumerate() {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(SbiError::Prior(
                    ErrorInfo::new("normal-scale", "standard deviations must be finite and positive")
                        .with_context("dimension", idx.to_string())
                        .with_context("std", sigma.to_string()),
                ));
            }
        }
        Ok(Self { mean, std })
    }
}

impl Density for DiagNormal {
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
        check_dim(theta.len(), self.dim())?;
        let mut total = 0.0;
        for ((&value, &mu), &sigma) in theta.iter().zip(self.mean.iter()).zip(self.std.iter()) {
            let z = (value - mu) / sigma;
            total += -0.5 * LN_TWO_PI - sigma.ln() - 0.5 * z * z;
        }
        Ok(total)
    }
}

impl Distribution for DiagNormal {
    fn sample(&self, num_samples: usize, rng: &mut RngHandle) -> Result<Array2<f64>, SbiError> {
        let mut draws = Array2::zeros((num_samples, self.dim()));
        for mut row in draws.rows_mut() {
            for (value, (&mu, &sigma)) in row.iter_mut().zip(self.mean.iter().zip(self.std.iter()))
            {
                let z: f64 = rng.sample(StandardNormal);
                *value = mu + sigma * z;
            }
        }
        Ok(draws)
    }

    fn contains(&self, theta: ArrayView1<'_, f64>) -> bool {
        theta.len() == self.dim() && theta.iter().all(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn log_prob_matches_standard_normal_at_origin() {
        let prior = DiagNormal::new(array![0.0], array![1.0]).unwrap();
        let value = prior.log_prob(array![0.0].view()).unwrap();
        assert!((value - (-0.5 * LN_TWO_PI)).abs() < 1e-12);
    }

    #[test]
    fn sample_mean_converges_roughly() {
        let prior = DiagNormal::new(array![3.0, -1.0], array![0.5, 2.0]).unwrap();
        let mut rng = RngHandle::from_seed(5);
        let draws = prior.sample(4096, &mut rng).unwrap();
        let mean0 = draws.column(0).sum() / draws.nrows() as f64;
        let mean1 = draws.column(1).sum() / draws.nrows() as f64;
        assert!((mean0 - 3.0).abs() < 0.1);
        assert!((mean1 + 1.0).abs() < 0.2);
    }

    #[test]
    fn rejects_non_positive_scale() {
        let err = DiagNormal::new(array![0.0], array![0.0]).unwrap_err();
        assert_eq!(err.info().code, "normal-scale");
    }
}
