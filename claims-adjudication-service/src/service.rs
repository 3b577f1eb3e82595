use async_trait::async_trait;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use stage_flow::{InMemoryRunStorage, Pacing, ProgressSink, RunStorage};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    models::{ClaimRecord, ClaimStageResult, Evaluation, StageDetail},
    pipeline::{ClaimEvaluator, LocalPipelineEvaluator, RemoteEvaluator, build_claim_pipeline},
    remote::ScoringClient,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "evaluation_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<dyn ClaimEvaluator>,
    pub evaluations: Arc<dyn RunStorage<Evaluation>>,
}

/// Persists an evaluation snapshot on every stage transition, so progress
/// reads see the run as it happens
struct StorageProgressSink {
    storage: Arc<dyn RunStorage<Evaluation>>,
    evaluation: tokio::sync::Mutex<Evaluation>,
}

impl StorageProgressSink {
    fn new(storage: Arc<dyn RunStorage<Evaluation>>, evaluation: Evaluation) -> Self {
        Self {
            storage,
            evaluation: tokio::sync::Mutex::new(evaluation),
        }
    }
}

#[async_trait]
impl ProgressSink<StageDetail> for StorageProgressSink {
    async fn update(&self, stages: &[ClaimStageResult]) {
        let mut evaluation = self.evaluation.lock().await;
        evaluation.stages = stages.to_vec();

        let snapshot = evaluation.clone();
        // progress persistence is best effort; the run itself must not stop
        if let Err(e) = self.storage.save(snapshot.id.clone(), snapshot).await {
            warn!(error = %e, "Failed to persist evaluation progress");
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let app_state = create_app_state(config)?;
    Ok(build_router(app_state))
}

pub fn create_app_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let pacing = if config.pacing {
        Pacing::Simulated
    } else {
        Pacing::Disabled
    };
    let pipeline = Arc::new(build_claim_pipeline(pacing));

    let evaluator: Arc<dyn ClaimEvaluator> = match &config.scoring_service_url {
        Some(url) => {
            info!("Using remote scoring service at {} (local fallback armed)", url);
            let client = ScoringClient::new(url.clone(), config.scoring_timeout)?;
            Arc::new(RemoteEvaluator::new(client, pipeline))
        }
        None => {
            info!("Using local evaluation pipeline (set SCORING_SERVICE_URL for remote scoring)");
            Arc::new(LocalPipelineEvaluator::new(pipeline))
        }
    };

    Ok(AppState {
        evaluator,
        evaluations: Arc::new(InMemoryRunStorage::new()),
    })
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/claims/evaluate", post(evaluate_claim))
        .route("/claims/evaluations/{id}", get(get_evaluation))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Claims Adjudication Service",
        "version": "1.0.0",
        "description": "Staged evaluation of motor insurance claims with optional remote scoring",
        "endpoints": {
            "POST /claims/evaluate": "Evaluate a claim and return the decision",
            "GET /claims/evaluations/{id}": "Get an evaluation's stages and decision",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn evaluate_claim(
    State(state): State<AppState>,
    Json(claim): Json<ClaimRecord>,
) -> ApiResult<Evaluation> {
    let mut evaluation = Evaluation::new(claim.clone(), state.evaluator.mode());
    info!(
        evaluation_id = %evaluation.id,
        reference = %evaluation.reference,
        mode = ?evaluation.mode,
        "Processing claim evaluation"
    );

    save_evaluation(&state, evaluation.clone()).await?;

    let sink = StorageProgressSink::new(state.evaluations.clone(), evaluation.clone());
    let outcome = state.evaluator.evaluate(&claim, &sink).await;

    evaluation.complete(outcome);
    save_evaluation(&state, evaluation.clone()).await?;

    info!(
        evaluation_id = %evaluation.id,
        approved = evaluation.decision.as_ref().map(|d| d.approved),
        "Claim evaluation completed"
    );

    Ok(Json(evaluation))
}

async fn save_evaluation(state: &AppState, evaluation: Evaluation) -> Result<(), ApiError> {
    let id = evaluation.id.clone();
    state.evaluations.save(id, evaluation).await.map_err(|e| {
        error!("Failed to persist evaluation: {}", e);
        internal_error("Failed to persist evaluation", &e.to_string())
    })
}

async fn get_evaluation(
    State(state): State<AppState>,
    Path(evaluation_id): Path<String>,
) -> ApiResult<Evaluation> {
    info!(evaluation_id = %evaluation_id, "Getting evaluation");

    match state.evaluations.get(&evaluation_id).await {
        Ok(Some(evaluation)) => Ok(Json(evaluation)),
        Ok(None) => Err(not_found_error("Evaluation not found", &evaluation_id)),
        Err(e) => {
            error!("Failed to load evaluation {}: {}", evaluation_id, e);
            Err(internal_error("Failed to load evaluation", &e.to_string()))
        }
    }
}
