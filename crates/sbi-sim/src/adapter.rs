use ndarray::{Array2, ArrayView1, ArrayView2};

use sbi_core::errors::ErrorInfo;
use sbi_core::{RngHandle, SbiError, Simulator};

/// Adapts a per-row closure into the batched [`Simulator`] convention.
///
/// The wrapped function maps one parameter vector to one observation vector;
/// the adapter applies it row by row, validating the declared observation
/// arity on every output. Any row failure fails the whole batch.
pub struct SimulatorFn<F> {
    theta_dim: usize,
    obs_dim: usize,
    func: F,
}

impl<F> SimulatorFn<F>
where
    F: Fn(ArrayView1<'_, f64>, &mut RngHandle) -> Result<Vec<f64>, SbiError> + Send + Sync,
{
    /// Wraps `func` with the declared input and output dimensionalities.
    pub fn new(theta_dim: usize, obs_dim: usize, func: F) -> Self {
        Self {
            theta_dim,
            obs_dim,
            func,
        }
    }
}

impl<F> Simulator for SimulatorFn<F>
where
    F: Fn(ArrayView1<'_, f64>, &mut RngHandle) -> Result<Vec<f64>, SbiError> + Send + Sync,
{
    fn theta_dim(&self) -> usize {
        self.theta_dim
    }

    fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    fn simulate_batch(
        &self,
        thetas: ArrayView2<'_, f64>,
        rng: &mut RngHandle,
    ) -> Result<Array2<f64>, SbiError> {
        if thetas.ncols() != self.theta_dim {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-dim", "simulator received unexpected parameter width")
                    .with_context("expected", self.theta_dim.to_string())
                    .with_context("got", thetas.ncols().to_string()),
            ));
        }
        let mut xs = Array2::zeros((thetas.nrows(), self.obs_dim));
        for (row_index, theta) in thetas.rows().into_iter().enumerate() {
            let observation = (self.func)(theta, rng).map_err(|err| {
                SbiError::Simulator(
                    ErrorInfo::new("row-failure", err.to_string())
                        .with_context("row", row_index.to_string()),
                )
            })?;
            if observation.len() != self.obs_dim {
                return Err(SbiError::Simulator(
                    ErrorInfo::new("row-arity", "simulator output width disagrees with declaration")
                        .with_context("row", row_index.to_string())
                        .with_context("expected", self.obs_dim.to_string())
                        .with_context("got", observation.len().to_string()),
                ));
            }
            for (slot, value) in xs.row_mut(row_index).iter_mut().zip(observation) {
                *slot = value;
            }
        }
        Ok(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn maps_rows_in_order() {
        let simulator = SimulatorFn::new(2, 1, |theta: ArrayView1<'_, f64>, _rng: &mut RngHandle| {
            Ok(vec![theta[0] + theta[1]])
        });
        let mut rng = RngHandle::from_seed(0);
        let xs = simulator
            .simulate_batch(array![[1.0, 2.0], [3.0, 4.0]].view(), &mut rng)
            .unwrap();
        assert_eq!(xs, array![[3.0], [7.0]]);
    }

    #[test]
    fn arity_mismatch_fails_whole_batch() {
        let simulator =
            SimulatorFn::new(1, 2, |_theta: ArrayView1<'_, f64>, _rng: &mut RngHandle| {
                Ok(vec![0.0])
            });
        let mut rng = RngHandle::from_seed(0);
        let err = simulator
            .simulate_batch(array![[1.0]].view(), &mut rng)
            .unwrap_err();
        assert_eq!(err.info().code, "row-arity");
    }

    #[test]
    fn row_failure_propagates_without_partial_results() {
        let simulator = SimulatorFn::new(1, 1, |theta: ArrayView1<'_, f64>, _rng: &mut RngHandle| {
            if theta[0] < 0.0 {
                Err(SbiError::Simulator(ErrorInfo::new(
                    "negative-input",
                    "simulator rejects negative parameters",
                )))
            } else {
                Ok(vec![theta[0]])
            }
        });
        let mut rng = RngHandle::from_seed(0);
        let err = simulator
            .simulate_batch(array![[1.0], [-1.0]].view(), &mut rng)
            .unwrap_err();
        assert_eq!(err.info().code, "row-failure");
    }
}
