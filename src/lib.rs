//! Serverless job worker for the Qwen-Image-Edit-2511 pipeline.
//!
//! One job carries a text prompt and a source image URL; the worker fetches
//! the image, runs the editing pipeline, and returns the result base64
//! encoded as a PNG data URI. The pipeline itself, the serving runtime, and
//! the HTTP transport stay behind traits ([`EditModel`], [`ModelLoader`],
//! [`ImageSource`]) so the request lifecycle can be exercised without a GPU.
//!
//! [`JobHandler::handle`] is the whole surface: it validates the job,
//! initializes the model on first use (once, even under concurrent jobs),
//! and converts every failure into a structured error payload instead of
//! letting a fault reach the runtime.

pub mod cache;
pub mod encode;
pub mod error;
pub mod fetch;
pub mod handler;
mod invoke;
pub mod model;

pub use cache::ModelCache;
pub use encode::{DATA_URI_PREFIX, encode_data_uri};
pub use error::{BoxError, WorkerError, diagnostic_chain};
pub use fetch::{FETCH_TIMEOUT, FetchError, HttpImageSource, ImageSource};
pub use handler::{ErrorResponse, JobHandler, JobInput, SuccessResponse};
pub use invoke::run_inference;
pub use model::{
    EditModel, EditOutput, EditParams, EditRequest, MODEL_ID, MODEL_REPO, ModelLoader,
};
