use serde::{Deserialize, Serialize};

/// Parameters governing one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateConfig {
    /// Number of (θ, x) pairs to produce.
    pub num_simulations: usize,
    /// Number of parameter rows handed to the simulator per invocation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Worker threads for batch fan-out; 0 runs everything on the caller's thread.
    #[serde(default)]
    pub workers: usize,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_batch_size() -> usize {
    64
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            num_simulations: 0,
            batch_size: default_batch_size(),
            workers: 0,
            seed_policy: SeedPolicy::default(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests alongside the seed.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05B1_5EED_CA11_AB1E_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: SimulateConfig =
            serde_json::from_str(r#"{"num_simulations": 500}"#).unwrap();
        assert_eq!(config.num_simulations, 500);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.workers, 0);
        assert_eq!(config.seed_policy.master_seed, 0x05B1_5EED_CA11_AB1E);
    }
}
