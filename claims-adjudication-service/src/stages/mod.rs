// Claim evaluation stages, in pipeline order
pub mod intake;
pub mod documents;
pub mod fraud;
pub mod policy;
pub mod damage;

// Re-export stage implementations
pub use intake::IntakeStage;
pub use documents::DocumentVerifierStage;
pub use fraud::FraudDetectionStage;
pub use policy::PolicyMatcherStage;
pub use damage::DamageEstimatorStage;
