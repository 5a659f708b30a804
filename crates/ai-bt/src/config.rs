#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-instance tree settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TreeConfig {
    /// Seed of the RNG behind the random composites. A library derives one seed per created instance
    /// from its own config's seed.
    pub seed: u64,

    /// Emit a `trace`-level event for every status assignment.
    pub log_status_updates: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            log_status_updates: false,
        }
    }
}

impl TreeConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_status_logging(mut self, enabled: bool) -> Self {
        self.log_status_updates = enabled;
        self
    }

    /// Parse a YAML document; missing fields keep their defaults.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_yaml_str(yaml: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
