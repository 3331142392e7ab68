//! Grid-based conditional density evaluation and correlation diagnostics.
//!
//! Conditionals are computed by pinning all but one or two dimensions of a
//! [`Density`] to a condition vector and evaluating the remainder on an
//! evenly spaced grid: `p(θ_i | θ_rest) ∝ p(θ_i, θ_rest)`, so the joint
//! evaluated on the grid is enough up to normalization.

use ndarray::{Array1, Array2, ArrayView1};

use sbi_core::errors::ErrorInfo;
use sbi_core::{Density, SbiError};

/// Grid evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Number of grid points per axis.
    pub resolution: usize,
    /// Margin kept inside each limit to avoid evaluating exactly on a bound.
    pub eps_margin: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            resolution: 50,
            eps_margin: 1e-32,
        }
    }
}

/// A [`Density`] restricted to a subset of free dimensions.
///
/// Free values are spliced into the fixed condition vector before the inner
/// density is evaluated, so the inner density always sees full-width
/// parameter vectors.
pub struct ConditionedDensity<'a> {
    inner: &'a dyn Density,
    condition: Array1<f64>,
    free_dims: Vec<usize>,
}

impl std::fmt::Debug for ConditionedDensity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionedDensity")
            .field("condition", &self.condition)
            .field("free_dims", &self.free_dims)
            .finish_non_exhaustive()
    }
}

impl<'a> ConditionedDensity<'a> {
    /// Restricts `inner` to `free_dims`, pinning the rest to `condition`.
    pub fn new(
        inner: &'a dyn Density,
        condition: Array1<f64>,
        free_dims: Vec<usize>,
    ) -> Result<Self, SbiError> {
        if condition.len() != inner.dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("condition-dim", "condition width disagrees with the density")
                    .with_context("expected", inner.dim().to_string())
                    .with_context("got", condition.len().to_string()),
            ));
        }
        if free_dims.is_empty() {
            return Err(SbiError::Shape(ErrorInfo::new(
                "no-free-dims",
                "at least one dimension must remain free",
            )));
        }
        let mut seen = vec![false; condition.len()];
        for &dim in &free_dims {
            if dim >= condition.len() || seen[dim] {
                return Err(SbiError::Shape(
                    ErrorInfo::new("free-dims", "free dimensions must be unique and in range")
                        .with_context("dimension", dim.to_string())
                        .with_context("width", condition.len().to_string()),
                ));
            }
            seen[dim] = true;
        }
        Ok(Self {
            inner,
            condition,
            free_dims,
        })
    }
}

impl Density for ConditionedDensity<'_> {
    fn dim(&self) -> usize {
        self.free_dims.len()
    }

    fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
        if theta.len() != self.free_dims.len() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-dim", "free parameter width disagrees with restriction")
                    .with_context("expected", self.free_dims.len().to_string())
                    .with_context("got", theta.len().to_string()),
            ));
        }
        let mut full = self.condition.clone();
        for (&dim, &value) in self.free_dims.iter().zip(theta.iter()) {
            full[dim] = value;
        }
        self.inner.log_prob(full.view())
    }
}

/// Evenly spaced grid inside `[low + eps, high - eps]`.
fn axis_grid(low: f64, high: f64, options: &GridOptions) -> Array1<f64> {
    let lo = low + options.eps_margin;
    let hi = high - options.eps_margin;
    let n = options.resolution.max(2);
    Array1::from_iter((0..n).map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64))
}

fn check_dims(
    density: &dyn Density,
    condition: ArrayView1<'_, f64>,
    limits: &[(f64, f64)],
    dims: &[usize],
) -> Result<(), SbiError> {
    if condition.len() != density.dim() || limits.len() != density.dim() {
        return Err(SbiError::Shape(
            ErrorInfo::new(
                "condition-limits-dim",
                "condition and limits must cover every density dimension",
            )
            .with_context("density", density.dim().to_string())
            .with_context("condition", condition.len().to_string())
            .with_context("limits", limits.len().to_string()),
        ));
    }
    for &dim in dims {
        if dim >= density.dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("grid-dim", "grid dimension out of range")
                    .with_context("dimension", dim.to_string())
                    .with_context("width", density.dim().to_string()),
            ));
        }
    }
    Ok(())
}

/// Unnormalized conditional along one dimension, rescaled by the grid maximum.
///
/// All dimensions other than `dim` are pinned to `condition`; the returned
/// vector holds `exp(log p - max log p)` at `resolution` grid points, which
/// keeps the values finite even for sharply peaked densities.
pub fn eval_conditional_1d(
    density: &dyn Density,
    condition: ArrayView1<'_, f64>,
    limits: &[(f64, f64)],
    dim: usize,
    options: &GridOptions,
) -> Result<Array1<f64>, SbiError> {
    check_dims(density, condition, limits, &[dim])?;
    let grid = axis_grid(limits[dim].0, limits[dim].1, options);
    let mut log_probs = Array1::zeros(grid.len());
    let mut point = condition.to_owned();
    for (slot, &value) in log_probs.iter_mut().zip(grid.iter()) {
        point[dim] = value;
        *slot = density.log_prob(point.view())?;
    }
    Ok(rescale_by_max(log_probs))
}

/// Unnormalized conditional over two dimensions, rescaled by the grid maximum.
///
/// Entry `[i, j]` holds the value at `dim1 = grid1[i]`, `dim2 = grid2[j]`.
pub fn eval_conditional_2d(
    density: &dyn Density,
    condition: ArrayView1<'_, f64>,
    limits: &[(f64, f64)],
    dim1: usize,
    dim2: usize,
    options: &GridOptions,
) -> Result<Array2<f64>, SbiError> {
    check_dims(density, condition, limits, &[dim1, dim2])?;
    if dim1 == dim2 {
        return Err(SbiError::Shape(
            ErrorInfo::new("grid-dims-equal", "2-D evaluation needs two distinct dimensions")
                .with_context("dimension", dim1.to_string()),
        ));
    }
    let grid1 = axis_grid(limits[dim1].0, limits[dim1].1, options);
    let grid2 = axis_grid(limits[dim2].0, limits[dim2].1, options);
    let mut log_probs = Array2::zeros((grid1.len(), grid2.len()));
    let mut point = condition.to_owned();
    for (i, &value1) in grid1.iter().enumerate() {
        point[dim1] = value1;
        for (j, &value2) in grid2.iter().enumerate() {
            point[dim2] = value2;
            log_probs[[i, j]] = density.log_prob(point.view())?;
        }
    }
    let max = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        // Whole grid outside the support.
        log_probs.fill(0.0);
        return Ok(log_probs);
    }
    log_probs.mapv_inplace(|value| (value - max).exp());
    Ok(log_probs)
}

fn rescale_by_max(mut log_probs: Array1<f64>) -> Array1<f64> {
    let max = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        log_probs.fill(0.0);
        return log_probs;
    }
    log_probs.mapv_inplace(|value| (value - max).exp());
    log_probs
}

/// Conditional Pearson correlation matrix of a density.
///
/// For every pair of dimensions in `subset` (all dimensions when `None`),
/// all other dimensions are pinned to `condition` and the correlation of the
/// remaining two is computed from a grid evaluation. The result is symmetric
/// with a unit diagonal.
pub fn conditional_corrcoeff(
    density: &dyn Density,
    limits: &[(f64, f64)],
    condition: ArrayView1<'_, f64>,
    subset: Option<&[usize]>,
    options: &GridOptions,
) -> Result<Array2<f64>, SbiError> {
    let all_dims: Vec<usize> = (0..density.dim()).collect();
    let dims = subset.unwrap_or(&all_dims);
    check_dims(density, condition, limits, dims)?;

    let mut matrix = Array2::eye(dims.len());
    for (a, &dim1) in dims.iter().enumerate() {
        for (b, &dim2) in dims.iter().enumerate().skip(a + 1) {
            let probs = eval_conditional_2d(density, condition, limits, dim1, dim2, options)?;
            let rho = grid_corrcoeff(&probs, limits[dim1], limits[dim2]);
            matrix[[a, b]] = rho;
            matrix[[b, a]] = rho;
        }
    }
    Ok(matrix)
}

/// Pearson correlation from a 2-D grid of unnormalized probabilities.
fn grid_corrcoeff(probs: &Array2<f64>, limits1: (f64, f64), limits2: (f64, f64)) -> f64 {
    let (n1, n2) = probs.dim();
    let grid1 = Array1::from_iter(
        (0..n1).map(|i| limits1.0 + (limits1.1 - limits1.0) * i as f64 / (n1 - 1) as f64),
    );
    let grid2 = Array1::from_iter(
        (0..n2).map(|j| limits2.0 + (limits2.1 - limits2.0) * j as f64 / (n2 - 1) as f64),
    );

    let total: f64 = probs.sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut mean1 = 0.0;
    let mut mean2 = 0.0;
    for i in 0..n1 {
        for j in 0..n2 {
            let weight = probs[[i, j]] / total;
            mean1 += grid1[i] * weight;
            mean2 += grid2[j] * weight;
        }
    }

    let mut covariance = 0.0;
    let mut variance1 = 0.0;
    let mut variance2 = 0.0;
    for i in 0..n1 {
        for j in 0..n2 {
            let weight = probs[[i, j]] / total;
            let d1 = grid1[i] - mean1;
            let d2 = grid2[j] - mean2;
            covariance += d1 * d2 * weight;
            variance1 += d1 * d1 * weight;
            variance2 += d2 * d2 * weight;
        }
    }

    if variance1 <= 0.0 || variance2 <= 0.0 {
        0.0
    } else {
        covariance / (variance1 * variance2).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CorrelatedGaussian {
        rho: f64,
    }

    impl Density for CorrelatedGaussian {
        fn dim(&self) -> usize {
            2
        }

        fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
            let (x, y) = (theta[0], theta[1]);
            let denom = 1.0 - self.rho * self.rho;
            Ok(-0.5 * (x * x - 2.0 * self.rho * x * y + y * y) / denom)
        }
    }

    #[test]
    fn grid_correlation_recovers_rho() {
        let density = CorrelatedGaussian { rho: 0.8 };
        let limits = [(-5.0, 5.0), (-5.0, 5.0)];
        let condition = Array1::zeros(2);
        let options = GridOptions {
            resolution: 80,
            eps_margin: 1e-32,
        };
        let matrix =
            conditional_corrcoeff(&density, &limits, condition.view(), None, &options).unwrap();
        assert_eq!(matrix[[0, 0]], 1.0);
        assert!((matrix[[0, 1]] - 0.8).abs() < 0.05);
        assert_eq!(matrix[[0, 1]], matrix[[1, 0]]);
    }

    #[test]
    fn one_dimensional_grid_peaks_at_the_mode() {
        let density = CorrelatedGaussian { rho: 0.0 };
        let limits = [(-3.0, 3.0), (-3.0, 3.0)];
        let condition = Array1::zeros(2);
        let options = GridOptions::default();
        let probs =
            eval_conditional_1d(&density, condition.view(), &limits, 0, &options).unwrap();
        assert_eq!(probs.len(), options.resolution);
        let max_index = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
            .unwrap();
        // The mode of a centered Gaussian sits in the middle of the grid.
        assert!((max_index as i64 - (options.resolution as i64 - 1) / 2).abs() <= 1);
    }
}
