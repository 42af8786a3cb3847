use image::RgbImage;

/// Model identifier echoed in every success response.
pub const MODEL_ID: &str = "qwen-image-edit-2511";

/// Named pretrained artifact the worker loads.
pub const MODEL_REPO: &str = "Qwen/Qwen-Image-Edit-2511";

/// Numeric knobs for one edit, with the worker's defaults applied.
///
/// A job that omits every optional field resolves to exactly
/// `EditParams::default()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditParams {
    pub num_inference_steps: u32,
    pub true_cfg_scale: f64,
    pub guidance_scale: f64,
    /// Seed committed to the pipeline's random generator. 0 is a valid seed,
    /// not "unseeded": runs are reproducible by default.
    pub seed: i64,
}

impl Default for EditParams {
    fn default() -> Self {
        Self {
            num_inference_steps: 40,
            true_cfg_scale: 4.0,
            guidance_scale: 1.0,
            seed: 0,
        }
    }
}

/// The full argument set the pipeline expects for one call.
pub struct EditRequest {
    /// Source images in order. The pipeline interface takes a sequence even
    /// when a single image is edited.
    pub images: Vec<RgbImage>,
    pub prompt: String,
    /// The pipeline requires a negative prompt to be present; callers that
    /// have none pass a single-space placeholder.
    pub negative_prompt: String,
    pub params: EditParams,
    /// Edited images requested per prompt. The worker always asks for one.
    pub num_images_per_prompt: u32,
}

/// Result of one pipeline call.
pub struct EditOutput {
    /// Edited images in order. Contains at least `num_images_per_prompt`
    /// entries by contract of the wrapped pipeline.
    pub images: Vec<RgbImage>,
}

/// The image-editing inference capability.
///
/// Implementations wrap the actual pipeline and are treated as an opaque
/// function from (images, prompt, parameters) to edited images. Calls take
/// `&self`: the loaded model is stateless per call and shared read-only
/// across jobs. Implementations must run without gradient tracking; a job
/// is an inference, never a training step.
pub trait EditModel {
    /// The error type that can be returned during inference.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs one edit and returns the output images or an error.
    fn edit(&self, request: EditRequest) -> Result<EditOutput, Self::Error>;
}

/// Constructs the inference capability and answers its hardware precondition.
///
/// The [`ModelCache`](crate::ModelCache) consults `accelerator_available`
/// before the first (and only) `load` in the process's lifetime. Any
/// compatibility shims the underlying library needs belong inside `load`,
/// not in the worker.
pub trait ModelLoader {
    /// The model type produced by this loader.
    type Model: EditModel;
    /// The error type that can be returned during construction.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether an accelerator-capable device is present.
    fn accelerator_available(&self) -> bool;

    /// Human-readable device/loader description, logged once at load time.
    fn describe(&self) -> String;

    /// Constructs the model and binds it to the accelerator.
    fn load(&self) -> Result<Self::Model, Self::Error>;
}
