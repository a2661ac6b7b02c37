//! Generation request types
//!
//! A [`JobRequest`] can only be built from a valid [`GenerationInput`], so
//! anything that reaches the network has already passed validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Image encoding requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Webp,
}

impl OutputFormat {
    /// File extension for saved outputs
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(ValidationError::UnknownOutputFormat(other.to_string())),
        }
    }
}

/// Errors raised when a generation request is malformed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("model version must not be empty")]
    EmptyModelVersion,

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{0} must be greater than 0")]
    ZeroCount(&'static str),

    #[error("output quality must be between 0 and 100 (got {0})")]
    InvalidQuality(u8),

    #[error("guidance scale must be a finite, non-negative number (got {0})")]
    InvalidGuidanceScale(f32),

    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
}

/// Prompt and rendering options sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInput {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub num_outputs: u32,
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
    pub seed: Option<u64>,
    pub output_format: OutputFormat,
    pub output_quality: u8,
}

impl GenerationInput {
    /// Creates an input with the default rendering options
    /// (1024x768, one output, 28 steps, guidance 3.5, PNG at quality 80)
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: 1024,
            height: 768,
            num_outputs: 1,
            guidance_scale: 3.5,
            num_inference_steps: 28,
            seed: None,
            output_format: OutputFormat::Png,
            output_quality: 80,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_output_quality(mut self, quality: u8) -> Self {
        self.output_quality = quality;
        self
    }

    /// Checks the input against the constraints the remote model accepts
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }

        if self.width == 0 || self.height == 0 {
            return Err(ValidationError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.num_outputs == 0 {
            return Err(ValidationError::ZeroCount("num_outputs"));
        }

        if self.num_inference_steps == 0 {
            return Err(ValidationError::ZeroCount("num_inference_steps"));
        }

        if self.output_quality > 100 {
            return Err(ValidationError::InvalidQuality(self.output_quality));
        }

        if !self.guidance_scale.is_finite() || self.guidance_scale < 0.0 {
            return Err(ValidationError::InvalidGuidanceScale(self.guidance_scale));
        }

        Ok(())
    }
}

/// Validated request for one generation job
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    model_version: String,
    input: GenerationInput,
}

impl JobRequest {
    /// Builds a request, rejecting invalid input
    pub fn new(
        model_version: impl Into<String>,
        input: GenerationInput,
    ) -> Result<Self, ValidationError> {
        let model_version = model_version.into();
        if model_version.trim().is_empty() {
            return Err(ValidationError::EmptyModelVersion);
        }

        input.validate()?;

        Ok(Self {
            model_version,
            input,
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn input(&self) -> &GenerationInput {
        &self.input
    }
}
