use ndarray::Array1;
use serde::{Deserialize, Serialize};

use sbi_core::{Distribution, SbiError};

use crate::{BoxUniform, DiagNormal};

/// Declarative prior description used by configuration files.
///
/// Mirrors the constructors of the concrete priors; `build` performs the same
/// validation and returns a boxed [`Distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PriorSpec {
    /// Uniform over an axis-aligned box.
    BoxUniform {
        /// Per-dimension lower bounds.
        low: Vec<f64>,
        /// Per-dimension upper bounds.
        high: Vec<f64>,
    },
    /// Independent normal with per-dimension mean and scale.
    DiagNormal {
        /// Per-dimension means.
        mean: Vec<f64>,
        /// Per-dimension standard deviations.
        std: Vec<f64>,
    },
}

impl PriorSpec {
    /// Dimensionality the described prior will have.
    pub fn dim(&self) -> usize {
        match self {
            PriorSpec::BoxUniform { low, .. } => low.len(),
            PriorSpec::DiagNormal { mean, .. } => mean.len(),
        }
    }

    /// Builds the described prior, validating its parameters.
    pub fn build(&self) -> Result<Box<dyn Distribution>, SbiError> {
        match self {
            PriorSpec::BoxUniform { low, high } => {
                let prior =
                    BoxUniform::new(Array1::from(low.clone()), Array1::from(high.clone()))?;
                Ok(Box::new(prior))
            }
            PriorSpec::DiagNormal { mean, std } => {
                let prior =
                    DiagNormal::new(Array1::from(mean.clone()), Array1::from(std.clone()))?;
                Ok(Box::new(prior))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_tag_roundtrip() {
        let spec = PriorSpec::BoxUniform {
            low: vec![-2.0; 3],
            high: vec![2.0; 3],
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("box-uniform"));
        let back: PriorSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn build_validates_parameters() {
        let spec = PriorSpec::DiagNormal {
            mean: vec![0.0],
            std: vec![-1.0],
        };
        assert!(spec.build().is_err());
    }
}
