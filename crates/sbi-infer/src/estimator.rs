//! Closed-form linear-Gaussian conditional density estimator.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sbi_core::errors::ErrorInfo;
use sbi_core::{
    utc_timestamp, ConditionalDensity, DensityEstimator, RngHandle, RunProvenance, SbiError,
    SchemaVersion, SimulationSet,
};

use crate::linalg;

const LN_TWO_PI: f64 = 1.837_877_066_409_345_3;

/// Estimator fitting `p(θ | x) = N(W·x + b, Σ)` by ridge least squares.
///
/// The fit is closed form: regression coefficients come from the normal
/// equations of θ on `[x, 1]`, and Σ is the residual covariance stabilised
/// with a diagonal jitter. There is no iterative training loop; calling
/// `fit` twice on the same records produces the same model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGaussian {
    /// Ridge strength added to the normal equations.
    #[serde(default = "default_ridge")]
    pub ridge: f64,
    /// Diagonal jitter added to the residual covariance.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_ridge() -> f64 {
    1e-6
}

fn default_jitter() -> f64 {
    1e-9
}

impl Default for LinearGaussian {
    fn default() -> Self {
        Self {
            ridge: default_ridge(),
            jitter: default_jitter(),
        }
    }
}

impl LinearGaussian {
    /// Fits the concrete model artifact; the trait impl delegates here.
    pub fn fit_model(
        &self,
        records: &SimulationSet,
        seed: u64,
    ) -> Result<LinearGaussianModel, SbiError> {
        if records.is_empty() {
            return Err(SbiError::Train(ErrorInfo::new(
                "empty-records",
                "cannot fit a density estimator on zero records",
            )));
        }
        let thetas = records.thetas();
        let xs = records.xs();
        let n = records.len();
        let theta_dim = records.theta_dim();
        let x_dim = records.obs_dim();

        // Design matrix [x | 1] and normal equations A = GᵀG + ridge·I.
        let mut design = Array2::ones((n, x_dim + 1));
        design.slice_mut(ndarray::s![.., ..x_dim]).assign(xs);
        let mut gram = design.t().dot(&design);
        for i in 0..(x_dim + 1) {
            gram[[i, i]] += self.ridge;
        }
        let gram_factor = linalg::cholesky(&gram)?;
        let moments = design.t().dot(thetas);

        // One SPD solve per θ column; first x_dim rows are Wᵀ, last is b.
        let mut coeffs = Array2::zeros((x_dim + 1, theta_dim));
        for (column, moment) in moments.axis_iter(Axis(1)).enumerate() {
            let solution = linalg::solve_spd(&gram_factor, moment);
            coeffs.column_mut(column).assign(&solution);
        }

        let residuals = thetas - &design.dot(&coeffs);
        let mut covariance = residuals.t().dot(&residuals) / n as f64;
        for i in 0..theta_dim {
            covariance[[i, i]] += self.jitter;
        }
        let chol_cov = linalg::cholesky(&covariance)?;
        let log_det_cov = linalg::log_det_from_cholesky(&chol_cov);

        let weights = coeffs.slice(ndarray::s![..x_dim, ..]).t().to_owned();
        let intercept = coeffs.row(x_dim).to_owned();

        let provenance = RunProvenance {
            input_hash: settings_hash(self)?,
            records_hash: records.canonical_hash()?,
            num_records: n,
            seed,
            created_at: utc_timestamp(),
            tool_versions: [(
                "sbi-infer".to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            )]
            .into_iter()
            .collect(),
        };

        Ok(LinearGaussianModel {
            schema_version: SchemaVersion::default(),
            provenance,
            weights,
            intercept,
            chol_cov,
            log_det_cov,
        })
    }
}

impl DensityEstimator for LinearGaussian {
    fn fit(
        &self,
        records: &SimulationSet,
        seed: u64,
    ) -> Result<Box<dyn ConditionalDensity>, SbiError> {
        Ok(Box::new(self.fit_model(records, seed)?))
    }

    fn name(&self) -> &'static str {
        "linear-gaussian"
    }
}

/// Fitted linear-Gaussian conditional density artifact.
///
/// Immutable once built; retraining produces a fresh model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGaussianModel {
    schema_version: SchemaVersion,
    provenance: RunProvenance,
    weights: Array2<f64>,
    intercept: Array1<f64>,
    chol_cov: Array2<f64>,
    log_det_cov: f64,
}

impl LinearGaussianModel {
    /// Conditional mean `W·x + b`.
    pub fn mean(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>, SbiError> {
        if x.len() != self.x_dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("x-dim", "observation has unexpected dimensionality")
                    .with_context("expected", self.x_dim().to_string())
                    .with_context("got", x.len().to_string()),
            ));
        }
        Ok(self.weights.dot(&x) + &self.intercept)
    }

    /// Provenance recorded when the model was fitted.
    pub fn provenance(&self) -> &RunProvenance {
        &self.provenance
    }

    /// Writes the model to a JSON file.
    pub fn store(&self, path: &Path) -> Result<(), SbiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SbiError::Serde(
                    ErrorInfo::new("model-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("model-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("model-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Restores a model from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SbiError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("model-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("model-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

impl ConditionalDensity for LinearGaussianModel {
    fn theta_dim(&self) -> usize {
        self.intercept.len()
    }

    fn x_dim(&self) -> usize {
        self.weights.ncols()
    }

    fn sample(
        &self,
        num_samples: usize,
        x: ArrayView1<'_, f64>,
        rng: &mut RngHandle,
    ) -> Result<Array2<f64>, SbiError> {
        let mean = self.mean(x)?;
        let dim = self.theta_dim();
        let mut draws = Array2::zeros((num_samples, dim));
        let mut noise = Array1::zeros(dim);
        for mut row in draws.rows_mut() {
            for slot in noise.iter_mut() {
                *slot = rng.sample(StandardNormal);
            }
            let correlated = self.chol_cov.dot(&noise);
            for (value, (&mu, &offset)) in
                row.iter_mut().zip(mean.iter().zip(correlated.iter()))
            {
                *value = mu + offset;
            }
        }
        Ok(draws)
    }

    fn log_prob(
        &self,
        theta: ArrayView1<'_, f64>,
        x: ArrayView1<'_, f64>,
    ) -> Result<f64, SbiError> {
        if theta.len() != self.theta_dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-dim", "parameter has unexpected dimensionality")
                    .with_context("expected", self.theta_dim().to_string())
                    .with_context("got", theta.len().to_string()),
            ));
        }
        let mean = self.mean(x)?;
        let centered = &theta.to_owned() - &mean;
        let whitened = linalg::solve_lower(&self.chol_cov, centered.view());
        let mahalanobis = whitened.dot(&whitened);
        let dim = self.theta_dim() as f64;
        Ok(-0.5 * (dim * LN_TWO_PI + self.log_det_cov + mahalanobis))
    }

    fn family(&self) -> &'static str {
        "linear-gaussian"
    }
}

fn settings_hash(settings: &LinearGaussian) -> Result<String, SbiError> {
    let bytes = serde_json::to_vec(settings)
        .map_err(|err| SbiError::Serde(ErrorInfo::new("settings-hash", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
