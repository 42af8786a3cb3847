use thiserror::Error;

/// Boxed error type used where a collaborator's concrete error is opaque.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures that can occur while processing a single job.
///
/// Every variant is contained at the [`JobHandler`](crate::JobHandler)
/// boundary and converted into the uniform error response shape; none escape
/// to the serving runtime.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A required job field was absent or empty. Detected before any
    /// resource use, so no model load or network call has happened yet.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The job payload was not the expected `{ "input": { .. } }` mapping.
    #[error("Invalid job payload: {0}")]
    InvalidPayload(String),

    /// No accelerator device was present when the model was first needed.
    #[error("{0}")]
    HardwarePrecondition(String),

    /// The pretrained pipeline failed to construct.
    #[error("Failed to load model: {source}")]
    ModelLoad {
        #[source]
        source: BoxError,
    },

    /// Network, status, or decode failure while retrieving the source image.
    #[error("Failed to download image: {source}")]
    Fetch {
        #[source]
        source: BoxError,
    },

    /// The inference capability failed, including resource exhaustion.
    #[error("Inference failed: {source}")]
    Inference {
        #[source]
        source: BoxError,
    },

    /// The edited image could not be serialized for transport.
    #[error("Failed to encode output image: {source}")]
    Encoding {
        #[source]
        source: image::ImageError,
    },
}

/// Renders an error and its full `source()` chain, one cause per line.
///
/// This is the `details` field of the error response: operators get the
/// complete diagnostic trail while the `error` field stays a single message.
pub fn diagnostic_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(src) = cause {
        rendered.push_str("\ncaused by: ");
        rendered.push_str(&src.to_string());
        cause = src.source();
    }
    rendered
}
