//! Generation pipeline: stage registry, job state and the orchestrator.
//!
//! # Architecture
//!
//! ```text
//! GenerationOrchestrator::start_job(validated, tier)
//!        │
//!        ├─ JobTable (Arc<Mutex<…>>)   ← current_state / cancel / artifact_for
//!        │
//!        └─ tokio::spawn(drive)
//!              │
//!              ├─ for stage in all_stages():
//!              │     StageWorker::step().await  × (100 / progress_step)
//!              │
//!              └─ Succeeded → GeneratedArtifact
//!
//! broadcast::Sender<Job>  ──▶  subscribe()  (one snapshot per transition)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use video_studio::config::AppConfig;
//! use video_studio::entitlement::Tier;
//! use video_studio::pipeline::GenerationOrchestrator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let orchestrator = GenerationOrchestrator::simulated(&config);
//!     let mut events = orchestrator.subscribe();
//!
//!     let job = config.defaults.job_config("Welcome to the channel!");
//!     let handle = orchestrator.submit(job, Tier::Free).unwrap();
//!
//!     while let Ok(snapshot) = events.recv().await {
//!         println!("{} {}%", snapshot.overall_status, snapshot.overall_progress());
//!         if snapshot.overall_status.is_terminal() {
//!             break;
//!         }
//!     }
//!     handle.finished().await;
//! }
//! ```

pub mod runner;
pub mod stage;
pub mod state;
pub mod worker;

pub use runner::{GenerationOrchestrator, JobHandle, OrchestratorError};
pub use stage::{all_stages, stage, PipelineStage, StageId};
pub use state::{
    GeneratedArtifact, Job, JobId, JobStatus, ShareMessage, StageFailure, StageRun, StageStatus,
};
pub use worker::{SimulatedWorker, StageError, StageWorker};
