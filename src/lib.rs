//! Rep Engine Library
//!
//! A pose-driven repetition counting engine that converts streams of
//! body-landmark frames into rep counts and human-readable exercise
//! feedback.
//!
//! # Design Philosophy
//!
//! This library is built on several core principles:
//!
//! - **Per-frame state, not errors**: no-pose and missing-keypoint frames
//!   are expected at 30-60 fps and are reported as ordinary state; nothing
//!   recoverable crosses `analyze` as an error.
//! - **Calibrate, then count**: working thresholds are derived from an
//!   observed baseline window, never from a fixed midpoint, so natural
//!   postural sway cannot false-trigger.
//! - **Hysteresis by construction**: distinct up/down boundaries mean a
//!   rep requires a full descent and return; boundary jitter never counts.
//! - **Definitions are data**: externally authored exercises pass a
//!   validation gate and are interpreted by the one audited state machine;
//!   nothing supplied from outside is ever executed.
//!
//! # Example
//!
//! ```ignore
//! use rep_engine::{ExerciseRegistry, ExerciseRunner};
//!
//! let registry = ExerciseRegistry::default();
//! let mut runner = ExerciseRunner::from_registry(&registry, "squat").unwrap();
//!
//! // One call per pose-estimator frame; None means no pose detected.
//! let state = runner.analyze(Some(&frame));
//! println!("{} reps - {}", state.reps, state.feedback);
//! ```

pub mod angle;
pub mod calibration;
pub mod registry;
pub mod repository;
pub mod runner;
pub mod state_machine;
pub mod types;

mod integration_tests;

// Re-export the common API surface
pub use angle::joint_angle;
pub use calibration::{CalibrationConfig, CalibrationResult, CalibrationStage};
pub use registry::{
    DefinitionError, ExerciseDefinition, ExerciseDefinitionRecord, ExerciseRegistry,
    MIN_HYSTERESIS_GAP_DEG,
};
pub use repository::{ExerciseRepository, InMemoryExerciseRepository, RepositoryError};
pub use runner::{ExerciseRunner, RunnerConfig};
pub use state_machine::RepStateMachine;
pub use types::{
    DebugSnapshot, Feedback, JointAngleSpec, Landmark, LandmarkFrame, MachineState, PoseLandmark,
    RunnerPhase, RunnerState, LANDMARK_COUNT,
};
