use crate::cache::ModelCache;
use crate::encode::encode_data_uri;
use crate::error::{WorkerError, diagnostic_chain};
use crate::fetch::ImageSource;
use crate::invoke::run_inference;
use crate::model::{EditParams, MODEL_ID, ModelLoader};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The job's `input` mapping with defaults applied to every optional field.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_steps")]
    pub num_inference_steps: u32,
    #[serde(default = "default_true_cfg_scale")]
    pub true_cfg_scale: f64,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    #[serde(default)]
    pub seed: i64,
}

fn default_steps() -> u32 {
    EditParams::default().num_inference_steps
}

fn default_true_cfg_scale() -> f64 {
    EditParams::default().true_cfg_scale
}

fn default_guidance_scale() -> f64 {
    EditParams::default().guidance_scale
}

impl JobInput {
    /// The fully resolved parameter set for this job.
    pub fn params(&self) -> EditParams {
        EditParams {
            num_inference_steps: self.num_inference_steps,
            true_cfg_scale: self.true_cfg_scale,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
        }
    }
}

/// Payload returned when a job completes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Data URI of the edited image.
    pub image_url: String,
    /// Identical to `image_url`; kept for consumer compatibility.
    pub image: String,
    pub prompt: String,
    pub model: &'static str,
    pub status: &'static str,
    pub input_image_size: [u32; 2],
    pub output_image_size: [u32; 2],
}

/// Payload returned when any stage fails.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Full diagnostic chain. Omitted for validation failures, which carry
    /// no cause beyond the message itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Top-level orchestrator: one job in, one well-formed response out.
///
/// Sequences validation, model lookup, fetch, inference, and encoding, and
/// converts any failure into the uniform error payload. The serving runtime
/// always receives a return value, never a propagated fault.
pub struct JobHandler<L: ModelLoader, S: ImageSource> {
    models: ModelCache<L>,
    source: S,
}

impl<L: ModelLoader, S: ImageSource> JobHandler<L, S> {
    pub fn new(loader: L, source: S) -> Self {
        Self {
            models: ModelCache::new(loader),
            source,
        }
    }

    /// Processes one job end to end. Never returns an error shape other
    /// than [`ErrorResponse`], and never panics on malformed input.
    pub fn handle(&self, job: &Value) -> Value {
        match self.process(job) {
            Ok(response) => to_json(&response),
            Err(err) => {
                log::error!("Error in handler: {}", diagnostic_chain(&err));
                let details = match &err {
                    WorkerError::MissingParameter(_) => None,
                    _ => Some(diagnostic_chain(&err)),
                };
                to_json(&ErrorResponse {
                    error: err.to_string(),
                    details,
                })
            }
        }
    }

    fn process(&self, job: &Value) -> Result<SuccessResponse, WorkerError> {
        let input = parse_input(job)?;
        let params = input.params();

        log::info!(
            "Processing request - Prompt: '{}', Image: {}",
            input.prompt,
            input.image
        );
        log::info!(
            "Parameters - Steps: {}, CFG Scale: {}, Guidance: {}, Seed: {}",
            params.num_inference_steps,
            params.true_cfg_scale,
            params.guidance_scale,
            params.seed
        );

        let model = self.models.get()?;

        let source_image = self.source.fetch(&input.image).map_err(|e| {
            WorkerError::Fetch {
                source: Box::new(e),
            }
        })?;
        let (in_w, in_h) = source_image.dimensions();
        log::info!("Input image size: {in_w}x{in_h}");

        let output_image = run_inference(model.as_ref(), source_image, &input.prompt, params)?;
        let (out_w, out_h) = output_image.dimensions();
        log::info!("Generation complete. Output image size: {out_w}x{out_h}");

        let encoded = encode_data_uri(&output_image)?;

        Ok(SuccessResponse {
            image_url: encoded.clone(),
            image: encoded,
            prompt: input.prompt,
            model: MODEL_ID,
            status: "completed",
            input_image_size: [in_w, in_h],
            output_image_size: [out_w, out_h],
        })
    }
}

/// Extracts and validates the job's `input` mapping.
///
/// Validation runs before any resource use: a rejected job triggers no
/// model load and no network call.
fn parse_input(job: &Value) -> Result<JobInput, WorkerError> {
    let input = job
        .get("input")
        .ok_or_else(|| WorkerError::InvalidPayload("missing \"input\" object".to_string()))?;
    let input: JobInput = serde_json::from_value(input.clone())
        .map_err(|e| WorkerError::InvalidPayload(e.to_string()))?;

    if input.prompt.is_empty() {
        return Err(WorkerError::MissingParameter("prompt"));
    }
    if input.image.is_empty() {
        return Err(WorkerError::MissingParameter("image (URL)"));
    }
    Ok(input)
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Failed to serialize response: {e}") })
    })
}
