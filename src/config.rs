//! Configuration for the question-answering pipeline.
//!
//! Per-request timeouts are not configured here: each HTTP adapter owns
//! its client and takes a timeout at construction time.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Configuration parameters for the QA pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaConfig {
    /// Number of top context units retrieved per question.
    pub top_k: usize,
    /// Expected embedding dimensionality; must match the store's index.
    pub dimensions: usize,
    /// Maximum number of sentences grouped into one unit.
    ///
    /// Sizes the pipeline's default chunker; an explicitly injected chunker
    /// takes precedence over this field.
    pub max_unit_sentences: usize,
    /// Soft cap on characters per unit. Like `max_unit_sentences`, this
    /// sizes the default chunker only.
    pub max_unit_chars: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { top_k: 3, dimensions: 1024, max_unit_sentences: 3, max_unit_chars: 512 }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the number of top context units retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the expected embedding dimensionality.
    pub fn dimensions(mut self, dims: usize) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set the maximum number of sentences per unit.
    pub fn max_unit_sentences(mut self, n: usize) -> Self {
        self.config.max_unit_sentences = n;
        self
    }

    /// Set the character cap per unit.
    pub fn max_unit_chars(mut self, n: usize) -> Self {
        self.config.max_unit_chars = n;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if `top_k`, `dimensions`,
    /// `max_unit_sentences`, or `max_unit_chars` is zero.
    pub fn build(self) -> Result<QaConfig> {
        if self.config.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.dimensions == 0 {
            return Err(QaError::Config("dimensions must be greater than zero".to_string()));
        }
        if self.config.max_unit_sentences == 0 {
            return Err(QaError::Config(
                "max_unit_sentences must be greater than zero".to_string(),
            ));
        }
        if self.config.max_unit_chars == 0 {
            return Err(QaError::Config("max_unit_chars must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
