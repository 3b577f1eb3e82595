pub mod config;
pub mod currency;
pub mod decision;
pub mod models;
pub mod pipeline;
pub mod remote;
pub mod service;
pub mod stages;
pub mod wire;

pub use config::ServiceConfig;
pub use models::*;
pub use pipeline::{
    ClaimEvaluator, ClaimPipeline, LocalPipelineEvaluator, RemoteEvaluator, build_claim_pipeline,
};
pub use remote::{ScoringClient, ScoringResponse};
pub use service::{AppState, build_router, create_app, create_app_state};
