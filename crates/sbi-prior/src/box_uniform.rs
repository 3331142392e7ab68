use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;

use sbi_core::errors::ErrorInfo;
use sbi_core::{Density, Distribution, RngHandle, SbiError};

/// Independent uniform distribution over an axis-aligned box.
///
/// The support is the closed box `[low_i, high_i]` in every dimension; the
/// log-density is constant inside the box and `-∞` outside.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxUniform {
    low: Array1<f64>,
    high: Array1<f64>,
    log_volume: f64,
}

impl BoxUniform {
    /// Creates a box prior from per-dimension bounds.
    pub fn new(low: Array1<f64>, high: Array1<f64>) -> Result<Self, SbiError> {
        if low.len() != high.len() {
            return Err(SbiError::Prior(
                ErrorInfo::new("box-bounds-len", "lower and upper bounds disagree in length")
                    .with_context("low", low.len().to_string())
                    .with_context("high", high.len().to_string()),
            ));
        }
        if low.is_empty() {
            return Err(SbiError::Prior(ErrorInfo::new(
                "box-empty",
                "box prior needs at least one dimension",
            )));
        }
        for (idx, (&lo, &hi)) in low.iter().zip(high.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(SbiError::Prior(
                    ErrorInfo::new("box-bounds-order", "bounds must be finite with low < high")
                        .with_context("dimension", idx.to_string())
                        .with_context("low", lo.to_string())
                        .with_context("high", hi.to_string()),
                ));
            }
        }
        let log_volume = low
            .iter()
            .zip(high.iter())
            .map(|(&lo, &hi)| (hi - lo).ln())
            .sum();
        Ok(Self {
            low,
            high,
            log_volume,
        })
    }

    /// Creates the symmetric cube `[-half_extent, half_extent]^dim`.
    pub fn symmetric(half_extent: f64, dim: usize) -> Result<Self, SbiError> {
        Self::new(
            Array1::from_elem(dim, -half_extent),
            Array1::from_elem(dim, half_extent),
        )
    }

    /// Lower bounds of the box.
    pub fn low(&self) -> &Array1<f64> {
        &self.low
    }

    /// Upper bounds of the box.
    pub fn high(&self) -> &Array1<f64> {
        &self.high
    }
}

impl Density for BoxUniform {
    fn dim(&self) -> usize {
        self.low.len()
    }

    fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
        check_dim(theta.len(), self.dim())?;
        if self.contains(theta) {
            Ok(-self.log_volume)
        } else {
            Ok(f64::NEG_INFINITY)
        }
    }
}

impl Distribution for BoxUniform {
    fn sample(&self, num_samples: usize, rng: &mut RngHandle) -> Result<Array2<f64>, SbiError> {
        let dim = self.dim();
        let mut draws = Array2::zeros((num_samples, dim));
        for mut row in draws.rows_mut() {
            for (value, (&lo, &hi)) in row.iter_mut().zip(self.low.iter().zip(self.high.iter())) {
                *value = rng.gen_range(lo..hi);
            }
        }
        Ok(draws)
    }

    fn contains(&self, theta: ArrayView1<'_, f64>) -> bool {
        theta.len() == self.dim()
            && theta
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(&value, (&lo, &hi))| value >= lo && value <= hi)
    }
}

pub(crate) fn check_dim(got: usize, expected: usize) -> Result<(), SbiError> {
    if got != expected {
        return Err(SbiError::Shape(
            ErrorInfo::new("theta-dim", "parameter vector has unexpected dimensionality")
                .with_context("expected", expected.to_string())
                .with_context("got", got.to_string()),
        ));
    }
    Ok(())
}
