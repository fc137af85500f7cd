//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.classifier.threshold) {
            return Err(ConfigError::ValidationError(
                "classifier.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.general.list_limit == 0 {
            return Err(ConfigError::ValidationError(
                "general.list_limit must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "limits.supported_formats must not be empty".into(),
            ));
        }
        if self.vision.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "vision.timeout_ms must be > 0".into(),
            ));
        }
        if self.vision.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "vision.max_results must be > 0".into(),
            ));
        }
        if self.storage.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "storage.timeout_ms must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got {:?}",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = Config::default();
        config.classifier.threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));

        config.classifier.threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_validate_accepts_threshold_bounds() {
        let mut config = Config::default();
        config.classifier.threshold = 0.0;
        assert!(config.validate().is_ok());
        config.classifier.threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.vision.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vision.timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_formats() {
        let mut config = Config::default();
        config.limits.supported_formats.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("supported_formats"));
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }
}
