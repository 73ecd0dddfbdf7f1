//! Pipeline configuration from environment variables.

use std::env;

/// Default channel namespace.
pub const DEFAULT_NAMESPACE: &str = "harrys";

/// Default deployment stage.
pub const DEFAULT_STAGE: &str = "development";

/// Settings that shape channel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// First segment of every channel name
    pub namespace: String,

    /// Deployment stage (development, test, production)
    pub stage: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            stage: DEFAULT_STAGE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PIPELINE_NAMESPACE`: Channel namespace (default: harrys)
    /// - `PIPELINE_STAGE` or `APP_ENV`: Deployment stage (default: development)
    pub fn from_env() -> Self {
        Self {
            namespace: env::var("PIPELINE_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),

            stage: env::var("PIPELINE_STAGE")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| DEFAULT_STAGE.to_string()),
        }
    }

    /// Override the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Override the stage.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }
}
