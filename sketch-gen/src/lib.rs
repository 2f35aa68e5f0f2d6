// This defines the JSON we send to and accept from the Stable Diffusion web API.
// Build request bodies from prompt-history records, parse and validate responses,
// and turn them into result records the rest of the app understands.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sketch_records::{GenerationResultRecord, PromptHistoryRecord, RecordError};
use thiserror::Error;
use uuid::Uuid;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Txt2Img,
    Img2Img,
}

impl GenerationMode {
    /// API route the request body belongs to.
    pub fn route(&self) -> &'static str {
        match self {
            GenerationMode::Txt2Img => "/sdapi/v1/txt2img",
            GenerationMode::Img2Img => "/sdapi/v1/img2img",
        }
    }
}

/// Request body for txt2img/img2img.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    #[serde(skip)]
    pub mode: GenerationMode,
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    pub sampler_name: String,
    pub steps: u32,
    pub cfg_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denoising_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alwayson_scripts: Option<Value>,
}

impl GenerationRequest {
    /// Build the body for a validated record.
    ///
    /// With a control mode the first input image drives a ControlNet unit on
    /// txt2img; otherwise input images make it an img2img request.
    pub fn from_record(record: &PromptHistoryRecord) -> Result<Self, GenError> {
        record.validate()?;

        let images = record.init_images.clone().unwrap_or_default();
        let mut request = Self {
            mode: GenerationMode::Txt2Img,
            prompt: record.prompt.clone(),
            negative_prompt: record.negative_prompt.clone(),
            width: record.width,
            height: record.height,
            seed: record.seed,
            sampler_name: record.sampler.clone(),
            steps: record.steps,
            cfg_scale: record.cfg_scale,
            denoising_strength: None,
            init_images: None,
            resize_mode: None,
            alwayson_scripts: None,
        };

        match (record.control_mode, images.first()) {
            (Some(control_mode), Some(image)) => {
                request.alwayson_scripts = Some(json!({
                    "controlnet": {
                        "args": [{
                            "input_image": image,
                            "control_mode": control_mode,
                            "resize_mode": record.resize_mode.unwrap_or(1),
                        }]
                    }
                }));
            }
            (Some(_), None) => return Err(GenError::MissingControlImage),
            (None, Some(_)) => {
                request.mode = GenerationMode::Img2Img;
                request.denoising_strength = record.denoising_strength;
                request.resize_mode = record.resize_mode;
                request.init_images = Some(images);
            }
            (None, None) => {}
        }

        tracing::debug!(
            mode = ?request.mode,
            route = request.mode.route(),
            width = request.width,
            height = request.height,
            "generation request built"
        );
        Ok(request)
    }

    pub fn to_json(&self) -> Result<String, GenError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Response body from txt2img/img2img.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationResponse {
    pub images: Vec<String>,
    #[serde(default)]
    pub parameters: Value,
    /// JSON document encoded as a string.
    #[serde(default)]
    pub info: String,
}

impl GenerationResponse {
    pub fn parse(body: &str) -> Result<Self, GenError> {
        let response: Self = serde_json::from_str(body)?;
        if response.images.is_empty() {
            tracing::warn!("generation response carried no images");
            return Err(GenError::NoImages);
        }
        Ok(response)
    }

    pub fn info(&self) -> Result<GenerationInfo, GenError> {
        GenerationInfo::parse(&self.info)
    }

    /// Convert into the persisted result for `prompt_history_id`. Images are
    /// normalized to data URIs so they can be fed straight back to a board.
    pub fn into_result_record(self, prompt_history_id: Uuid) -> GenerationResultRecord {
        let images = self.images.iter().map(|i| as_data_uri(i)).collect();
        GenerationResultRecord::new(prompt_history_id, images, self.parameters, self.info)
    }
}

/// The parts of the `info` document worth reading back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationInfo {
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub all_seeds: Vec<i64>,
    #[serde(default)]
    pub sampler_name: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub cfg_scale: Option<f32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl GenerationInfo {
    pub fn parse(info: &str) -> Result<Self, GenError> {
        if info.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(info).map_err(GenError::InvalidInfo)
    }
}

/// Return `image` as a PNG data URI, leaving existing data URIs untouched.
pub fn as_data_uri(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("{PNG_DATA_URI_PREFIX}{image}")
    }
}

/// Strip a data-URI header, leaving the bare base64 payload.
pub fn strip_data_uri(image: &str) -> &str {
    match image.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, payload)| payload),
        None => image,
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid prompt record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("control mode set but no input image to condition on")]
    MissingControlImage,

    #[error("malformed generation json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed info document: {0}")]
    InvalidInfo(serde_json::Error),

    #[error("generation returned no images")]
    NoImages,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_record_is_txt2img() {
        let record = PromptHistoryRecord::new("a red fox").with_seed(7);
        let request = GenerationRequest::from_record(&record).unwrap();
        assert_eq!(request.mode, GenerationMode::Txt2Img);

        let body: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(body["sampler_name"], "Euler a");
        assert_eq!(body["seed"], 7);
        assert!(body.get("init_images").is_none());
        assert!(body.get("mode").is_none());
    }

    #[test]
    fn input_image_makes_img2img() {
        let record = PromptHistoryRecord::new("a red fox").with_init_image("data:image/png;base64,AA", 0.4);
        let request = GenerationRequest::from_record(&record).unwrap();
        assert_eq!(request.mode, GenerationMode::Img2Img);
        assert_eq!(request.mode.route(), "/sdapi/v1/img2img");
        assert_eq!(request.denoising_strength, Some(0.4));
        assert_eq!(request.init_images.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn control_mode_uses_controlnet_unit() {
        let mut record = PromptHistoryRecord::new("a red fox").with_init_image("sketch", 0.5);
        record.control_mode = Some(2);
        let request = GenerationRequest::from_record(&record).unwrap();
        assert_eq!(request.mode, GenerationMode::Txt2Img);
        assert!(request.init_images.is_none());
        let unit = &request.alwayson_scripts.as_ref().unwrap()["controlnet"]["args"][0];
        assert_eq!(unit["input_image"], "sketch");
        assert_eq!(unit["control_mode"], 2);

        record.init_images = None;
        assert!(matches!(
            GenerationRequest::from_record(&record),
            Err(GenError::MissingControlImage)
        ));
    }

    #[test]
    fn invalid_record_is_rejected() {
        let record = PromptHistoryRecord::new("fox").with_size(10, 10);
        assert!(matches!(
            GenerationRequest::from_record(&record),
            Err(GenError::InvalidRecord(RecordError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn data_uri_helpers() {
        assert_eq!(as_data_uri("AAAA"), "data:image/png;base64,AAAA");
        assert_eq!(as_data_uri("data:image/jpeg;base64,BB"), "data:image/jpeg;base64,BB");
        assert_eq!(strip_data_uri("data:image/png;base64,CC"), "CC");
        assert_eq!(strip_data_uri("CC"), "CC");
    }

    #[test]
    fn empty_info_is_default() {
        assert_eq!(GenerationInfo::parse("  ").unwrap(), GenerationInfo::default());
        assert!(matches!(GenerationInfo::parse("{nope"), Err(GenError::InvalidInfo(_))));
    }
}
