//! # Runtime Configuration
//!
//! Everything the host reads from the environment, grouped by concern.
//!
//! ## Security Requirements
//!
//! - `PIPELINE_SECRET_KEY` MUST be set when the stage is `production`

use pipeline_core::PipelineConfig;
use pipeline_telemetry::TelemetryConfig;
use shared_crypto::KeyringConfig;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Channel naming.
    pub pipeline: PipelineConfig,
    /// Encryption keys.
    pub keyring: KeyringConfig,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No default key configured for a production stage.
    #[error(
        "SECURITY VIOLATION: no secret key configured for stage {stage}. \
         Set PIPELINE_SECRET_KEY environment variable."
    )]
    MissingSecretKey { stage: String },
}

impl RuntimeConfig {
    /// Load every section from the environment.
    pub fn from_env() -> Self {
        Self {
            pipeline: PipelineConfig::from_env(),
            keyring: KeyringConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.pipeline.stage == "production"
    }

    /// Validate configuration for production readiness.
    ///
    /// # Errors
    ///
    /// `MissingSecretKey` if the stage is production and no default key is set.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.keyring.secret_key_hex.is_none() {
            return Err(ConfigError::MissingSecretKey {
                stage: self.pipeline.stage.clone(),
            });
        }
        Ok(())
    }
}
