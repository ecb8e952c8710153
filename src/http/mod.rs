//! HTTP surface: the synchronous `/solve` endpoint, the asynchronous
//! `/start-solve` + `/job-status/{jobId}` job pair, and service metadata.
//!
//! This is plumbing around the engine in `crate::solver` — see that
//! module's docs for the actual constraint-optimization work. Everything
//! here is request/response wiring, job bookkeeping, and error mapping.

pub mod dto;
pub mod error;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::Method;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::jobs::{Job, JobStatus, JobTracker};
use crate::solver::{self, SolveOutcome};
use crate::validation::validate_request;

pub use dto::{HealthResponse, RootResponse, SolverRequest, StartSolveResponse};
pub use error::AppError;

/// Shared state every handler closes over: the process-wide job registry.
/// Cheap to clone (an `Arc` around a `parking_lot::RwLock`).
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobTracker,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            jobs: JobTracker::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the full axum router: service metadata, health, and the solve
/// surface, with permissive CORS and request tracing layered on top for
/// development use.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/solve", post(solve))
        .route("/start-solve", post(start_solve))
        .route("/job-status/{job_id}", get(job_status))
        // A full school's lessons/classes payload can run well past axum's
        // default 2 MB body limit; raised to 20 MB rather than disabled.
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "timetable-solver",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Runs validation then the phased solve on a blocking thread, since the
/// solve is CPU-bound and may run for minutes — keeping it off the async
/// runtime's worker threads is what makes the rest of the server remain
/// responsive while a solve is in flight.
async fn run_solve(request: SolverRequest) -> Result<SolveOutcome, AppError> {
    tokio::task::spawn_blocking(move || -> Result<SolveOutcome, AppError> {
        validate_request(&request.school_config, &request.lessons, &request.classes)?;
        let outcome = solver::solve(
            &request.school_config,
            &request.lessons,
            &request.classes,
            request.max_time_limit as f64,
            request.allow_relaxation,
        )?;
        Ok(outcome)
    })
    .await
    .map_err(|err| AppError::Internal(format!("solver task panicked: {err}")))?
}

/// `POST /solve` — synchronous solve. Returns a `SolverResponse` body
/// directly; an engine exception becomes HTTP 500 `{detail}` via
/// `AppError`'s `IntoResponse`, matching the error-handling design's
/// propagation policy.
async fn solve(
    State(_state): State<Arc<AppState>>,
    Json(request): Json<SolverRequest>,
) -> Result<Json<SolveOutcome>, AppError> {
    let outcome = run_solve(request).await?;
    Ok(Json(outcome))
}

/// `POST /start-solve` — asynchronous solve. Creates a job in `starting`
/// state, spawns a worker that owns it exclusively from here on, and
/// returns the job id immediately.
async fn start_solve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SolverRequest>,
) -> Json<StartSolveResponse> {
    let job_id = state.jobs.create_job();
    let jobs = state.jobs.clone();
    let worker_job_id = job_id.clone();

    tokio::spawn(async move {
        jobs.set_progress(&worker_job_id, JobStatus::Processing, "solving");
        match run_solve(request).await {
            Ok(outcome) => {
                info!(job_id = %worker_job_id, status = ?outcome.status, "job completed");
                let result = serde_json::to_value(&outcome).unwrap_or(serde_json::json!({}));
                jobs.complete_job(&worker_job_id, result);
            }
            Err(err) => {
                warn!(job_id = %worker_job_id, error = %err, "job failed");
                jobs.fail_job(&worker_job_id, err.to_string());
            }
        }
    });

    Json(StartSolveResponse {
        job_id,
        status: "started",
        message: "solve started".to_string(),
    })
}

/// `GET /job-status/{jobId}` — 404 if the id is unknown, matching the
/// external interface's explicit not-found case.
async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, AppError> {
    state
        .jobs
        .get_job(&job_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("unknown job id: {job_id}")))
}
