//! sketch-records: persisted shapes for image generation.
//!
//! Design rules:
//! - A prompt-history record carries every parameter sent for one generation.
//! - A result record carries the returned images, the raw parameter JSON and
//!   the info string, and points back at its prompt record.
//! - Records are validated before they are logged; everything is serializable.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Schema version written into saved logs.
pub const RECORD_SCHEMA_VERSION: &str = "1.0";

/// Seed value meaning "pick a random seed".
pub const RANDOM_SEED: i64 = -1;

pub const MIN_DIMENSION: u32 = 64;
pub const MAX_DIMENSION: u32 = 2048;
pub const MAX_STEPS: u32 = 150;

/// Parameters of one generation request, as stored in prompt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptHistoryRecord {
    pub id: Uuid,
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    pub sampler: String,
    pub steps: u32,
    pub cfg_scale: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoising_strength: Option<f32>,

    /// Encoded input images (sketch exports, uploads, fed-back results).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<i32>,
}

impl PromptHistoryRecord {
    /// A text-only request with the usual defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            negative_prompt: String::new(),
            width: 512,
            height: 512,
            seed: RANDOM_SEED,
            sampler: "Euler a".into(),
            steps: 20,
            cfg_scale: 7.0,
            denoising_strength: None,
            init_images: None,
            control_mode: None,
            resize_mode: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = negative.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Attach a sketch or image to generate from.
    pub fn with_init_image(mut self, image: impl Into<String>, denoising_strength: f32) -> Self {
        self.init_images
            .get_or_insert_with(Vec::new)
            .push(image.into());
        self.denoising_strength = Some(denoising_strength);
        self
    }

    pub fn is_img2img(&self) -> bool {
        self.init_images.as_ref().is_some_and(|v| !v.is_empty())
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.prompt.trim().is_empty() {
            tracing::error!(record_id = %self.id, "prompt is empty");
            return Err(RecordError::EmptyPrompt);
        }

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) || value % 8 != 0 {
                tracing::error!(field, value, "dimension out of range or not a multiple of 8");
                return Err(RecordError::InvalidDimension {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(1..=MAX_STEPS).contains(&self.steps) {
            return Err(RecordError::StepsOutOfRange(self.steps));
        }

        if !(1.0..=30.0).contains(&self.cfg_scale) {
            return Err(RecordError::CfgScaleOutOfRange(self.cfg_scale));
        }

        if let Some(strength) = self.denoising_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(RecordError::DenoisingOutOfRange(strength));
            }
        }

        if let Some(mode) = self.control_mode {
            if !(0..=2).contains(&mode) {
                return Err(RecordError::InvalidMode {
                    field: "control_mode".into(),
                    value: mode,
                });
            }
        }

        if let Some(mode) = self.resize_mode {
            if !(0..=3).contains(&mode) {
                return Err(RecordError::InvalidMode {
                    field: "resize_mode".into(),
                    value: mode,
                });
            }
        }

        Ok(())
    }
}

/// What came back for one prompt-history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResultRecord {
    pub id: Uuid,
    pub prompt_history_id: Uuid,
    pub images: Vec<String>,
    /// Free-form parameter blob echoed by the generation service.
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default)]
    pub info: String,
}

impl GenerationResultRecord {
    pub fn new(
        prompt_history_id: Uuid,
        images: Vec<String>,
        parameters: serde_json::Value,
        info: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt_history_id,
            images,
            parameters,
            info: info.into(),
        }
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("invalid {field}: {value} (must be 64..=2048 and a multiple of 8)")]
    InvalidDimension { field: String, value: u32 },

    #[error("steps out of range: {0} (1..=150)")]
    StepsOutOfRange(u32),

    #[error("cfg scale out of range: {0} (1.0..=30.0)")]
    CfgScaleOutOfRange(f32),

    #[error("denoising strength out of range: {0} (0.0..=1.0)")]
    DenoisingOutOfRange(f32),

    #[error("invalid {field}: {value}")]
    InvalidMode { field: String, value: i32 },

    #[error("unknown prompt record: {id}")]
    UnknownPromptRecord { id: Uuid },

    #[error("result for {id} has no images")]
    EmptyResult { id: Uuid },
}

pub mod log;

pub use log::{load_log, save_log, GenerationLog, LogEntry, LOG_FILE_EXT};
