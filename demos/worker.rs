use argh::FromArgs;
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use qwen_edit_worker::{
    EditModel, EditOutput, EditRequest, HttpImageSource, JobHandler, ModelLoader,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::{convert::Infallible, sync::Arc};

// defaults for the worker endpoint
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Standalone HTTP front for the edit worker, standing in for the job-queue
/// runtime: POST a job to /run and get the handler's response back.
struct WorkerArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,
}

// Demo pipeline that echoes the source image back unchanged. Swap in a real
// ModelLoader to serve the actual pipeline.
struct IdentityEdit;

impl EditModel for IdentityEdit {
    type Error = Infallible;

    fn edit(&self, request: EditRequest) -> Result<EditOutput, Self::Error> {
        Ok(EditOutput {
            images: request.images,
        })
    }
}

struct IdentityLoader;

impl ModelLoader for IdentityLoader {
    type Model = IdentityEdit;
    type Error = Infallible;

    fn accelerator_available(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "identity demo pipeline (cpu)".to_string()
    }

    fn load(&self) -> Result<IdentityEdit, Infallible> {
        Ok(IdentityEdit)
    }
}

type DemoHandler = JobHandler<IdentityLoader, HttpImageSource>;

async fn run_job(
    State(handler): State<Arc<DemoHandler>>,
    Json(job): Json<Value>,
) -> impl IntoResponse {
    // The handler does blocking I/O and (with a real model) GPU work.
    let result = tokio::task::spawn_blocking(move || handler.handle(&job)).await;

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("worker task failed: {e}") })),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: WorkerArgs = argh::from_env();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let handler = Arc::new(JobHandler::new(IdentityLoader, HttpImageSource::new()?));

    let app = Router::new()
        .route("/", get(|| async { "qwen-edit-worker" }))
        .route("/run", post(run_job))
        .with_state(handler);

    log::info!("🚀 Starting the worker");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
