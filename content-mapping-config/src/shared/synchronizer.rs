use serde::{Deserialize, Serialize};

use crate::shared::{BatchConfig, ValidationError};

/// Configuration of a single synchronization job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SynchronizerConfig {
    /// Record class passed to the destination to scope iteration and object creation.
    pub class_name: String,
    /// Rewrite every matched record even when the mapper sees no change.
    #[serde(default)]
    pub force: bool,
    /// Write batching for destinations that buffer their writes.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl SynchronizerConfig {
    /// Validates the job configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.class_name.trim().is_empty() {
            return Err(ValidationError::EmptyClassName);
        }

        self.batch.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(class_name: &str) -> SynchronizerConfig {
        SynchronizerConfig {
            class_name: class_name.to_string(),
            force: false,
            batch: BatchConfig::default(),
        }
    }

    #[test]
    fn blank_class_name_is_rejected() {
        assert_eq!(config("  ").validate(), Err(ValidationError::EmptyClassName));
    }

    #[test]
    fn invalid_batch_is_reported() {
        let mut config = config("articles");
        config.batch.max_size = 0;

        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn valid_config_passes() {
        assert!(config("articles").validate().is_ok());
    }
}
