//! Append-only storage for aligned (parameter, observation) simulation pairs.

use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, SbiError};

/// Aligned collection of simulated (θ, x) pairs.
///
/// Row `i` of the parameter block corresponds to row `i` of the observation
/// block for every stored record. Dimensionalities are locked by the first
/// non-empty append; later appends must agree. A rejected append leaves the
/// stored state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSet {
    thetas: Array2<f64>,
    xs: Array2<f64>,
}

impl SimulationSet {
    /// Creates an empty record set with undetermined dimensionalities.
    pub fn new() -> Self {
        Self {
            thetas: Array2::zeros((0, 0)),
            xs: Array2::zeros((0, 0)),
        }
    }

    /// Appends a batch of aligned records.
    pub fn append(
        &mut self,
        thetas: ArrayView2<'_, f64>,
        xs: ArrayView2<'_, f64>,
    ) -> Result<(), SbiError> {
        if thetas.nrows() != xs.nrows() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-x-rows", "parameter and observation row counts disagree")
                    .with_context("thetas", thetas.nrows().to_string())
                    .with_context("xs", xs.nrows().to_string()),
            ));
        }
        if thetas.ncols() == 0 || xs.ncols() == 0 {
            return Err(SbiError::Shape(
                ErrorInfo::new("zero-dimension", "records must have at least one column")
                    .with_context("theta_dim", thetas.ncols().to_string())
                    .with_context("obs_dim", xs.ncols().to_string()),
            ));
        }
        if !self.is_empty() {
            if thetas.ncols() != self.theta_dim() {
                return Err(SbiError::Shape(
                    ErrorInfo::new("theta-dim", "parameter dimensionality changed")
                        .with_context("expected", self.theta_dim().to_string())
                        .with_context("got", thetas.ncols().to_string()),
                ));
            }
            if xs.ncols() != self.obs_dim() {
                return Err(SbiError::Shape(
                    ErrorInfo::new("obs-dim", "observation dimensionality changed")
                        .with_context("expected", self.obs_dim().to_string())
                        .with_context("got", xs.ncols().to_string()),
                ));
            }
        }
        if !thetas.iter().all(|value| value.is_finite()) {
            return Err(SbiError::Shape(ErrorInfo::new(
                "non-finite-theta",
                "parameter batch contains NaN or infinite entries",
            )));
        }
        if !xs.iter().all(|value| value.is_finite()) {
            return Err(SbiError::Shape(ErrorInfo::new(
                "non-finite-obs",
                "observation batch contains NaN or infinite entries",
            )));
        }

        if self.is_empty() {
            self.thetas = thetas.to_owned();
            self.xs = xs.to_owned();
            return Ok(());
        }

        let thetas_owned = thetas.to_owned();
        let xs_owned = xs.to_owned();
        let merged_thetas =
            ndarray::concatenate(Axis(0), &[self.thetas.view(), thetas_owned.view()])
                .map_err(|err| concat_error("theta", err))?;
        let merged_xs = ndarray::concatenate(Axis(0), &[self.xs.view(), xs_owned.view()])
            .map_err(|err| concat_error("obs", err))?;
        self.thetas = merged_thetas;
        self.xs = merged_xs;
        Ok(())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.thetas.nrows()
    }

    /// Whether the set holds no records yet.
    pub fn is_empty(&self) -> bool {
        self.thetas.nrows() == 0
    }

    /// Parameter dimensionality (0 until the first append).
    pub fn theta_dim(&self) -> usize {
        self.thetas.ncols()
    }

    /// Observation dimensionality (0 until the first append).
    pub fn obs_dim(&self) -> usize {
        self.xs.ncols()
    }

    /// Stored parameter block, one record per row.
    pub fn thetas(&self) -> &Array2<f64> {
        &self.thetas
    }

    /// Stored observation block, aligned with [`SimulationSet::thetas`].
    pub fn xs(&self) -> &Array2<f64> {
        &self.xs
    }

    /// Canonical content hash of the record set.
    pub fn canonical_hash(&self) -> Result<String, SbiError> {
        let bytes = serde_json::to_vec(self).map_err(|err| {
            SbiError::Serde(ErrorInfo::new("records-hash-encode", err.to_string()))
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Writes the record set to a JSON file.
    pub fn store(&self, path: &Path) -> Result<(), SbiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SbiError::Serde(
                    ErrorInfo::new("records-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("records-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("records-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Restores a record set from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SbiError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("records-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("records-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

impl Default for SimulationSet {
    fn default() -> Self {
        Self::new()
    }
}

fn concat_error(block: &str, err: ndarray::ShapeError) -> SbiError {
    SbiError::Shape(
        ErrorInfo::new("records-concat", err.to_string()).with_context("block", block.to_string()),
    )
}
