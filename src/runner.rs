//! Exercise runner: the composition root of the engine.
//!
//! Owns one exercise definition, one calibration stage, and one rep state
//! machine, and drives them from the external per-frame loop. Exactly one
//! `analyze` call per landmark frame; the call is synchronous, does no I/O,
//! and completes in bounded time so it can keep pace with 15-60 fps input.
//!
//! Per-frame conditions (no pose, missing keypoints, stalled calibration)
//! are ordinary state in the returned snapshot, never errors: they are
//! expected and frequent, and must not disturb the frame loop. The only
//! fallible operations are the construction paths that go through the
//! definition validation gate.

use crate::angle::joint_angle;
use crate::calibration::{CalibrationConfig, CalibrationStage};
use crate::registry::{
    DefinitionError, ExerciseDefinition, ExerciseDefinitionRecord, ExerciseRegistry,
};
use crate::state_machine::RepStateMachine;
use crate::types::{DebugSnapshot, Feedback, LandmarkFrame, RunnerPhase, RunnerState};

/// Configuration for a runner session.
///
/// Bundles the calibration stage configuration with the runner's own
/// landmark acceptance policy.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Calibration window configuration.
    pub calibration: CalibrationConfig,
    /// Confidence floor below which a landmark counts as missing.
    pub min_visibility: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            min_visibility: 0.5,
        }
    }
}

/// Per-exercise analysis session.
///
/// A runner owns independent, non-shared mutable state; several may exist
/// concurrently (e.g. when a UI switches between exercises) without any
/// cross-instance synchronization. Dropping the runner ends the session.
pub struct ExerciseRunner {
    config: RunnerConfig,
    definition: ExerciseDefinition,
    calibration: CalibrationStage,
    machine: RepStateMachine,
}

impl ExerciseRunner {
    /// Creates a runner for a validated definition with default
    /// configuration.
    pub fn new(definition: ExerciseDefinition) -> Self {
        Self::with_config(definition, RunnerConfig::default())
    }

    /// Creates a runner with explicit configuration.
    pub fn with_config(definition: ExerciseDefinition, config: RunnerConfig) -> Self {
        let machine = RepStateMachine::new(
            definition.up_threshold_deg,
            definition.down_threshold_deg,
        );
        Self {
            config,
            definition,
            calibration: CalibrationStage::new(config.calibration),
            machine,
        }
    }

    /// Creates a runner from a built-in (or previously registered)
    /// template. Returns `None` when the registry has no such exercise.
    pub fn from_registry(registry: &ExerciseRegistry, name: &str) -> Option<Self> {
        registry.lookup(name).cloned().map(Self::new)
    }

    /// Creates a runner from an externally supplied record, applying the
    /// validation gate first. An invalid record never reaches the state
    /// machine.
    pub fn from_record(record: ExerciseDefinitionRecord) -> Result<Self, DefinitionError> {
        Ok(Self::new(record.into_definition()?))
    }

    /// Analyzes one landmark frame and returns the session snapshot.
    ///
    /// `None` means the pose estimator found no pose at all this frame.
    pub fn analyze(&mut self, frame: Option<&LandmarkFrame>) -> RunnerState {
        let Some(frame) = frame else {
            let phase = self.current_phase();
            return self.snapshot(None, Feedback::NoPose, phase);
        };

        let angle = self.measure_angle(frame);

        if !self.calibration.is_calibrated() {
            if let Some(result) = self.calibration.observe(angle).copied() {
                self.machine.apply_calibration(&result);
            }
            let feedback = match angle {
                Some(_) => {
                    let (seen, window) = self.calibration.progress();
                    Feedback::Calibrating { seen, window }
                }
                None => Feedback::MissingKeypoints,
            };
            // The completing frame still reports the calibration phase;
            // the machine goes live on the next frame.
            return self.snapshot(angle, feedback, RunnerPhase::Calibrating);
        }

        let feedback = match angle {
            Some(deg) => self.machine.step(deg),
            None => Feedback::MissingKeypoints,
        };
        self.snapshot(angle, feedback, RunnerPhase::Active)
    }

    /// Clears the rep counter and calibration and restarts the session
    /// with the same exercise definition.
    pub fn reset(&mut self) {
        self.calibration.reset();
        self.machine = RepStateMachine::new(
            self.definition.up_threshold_deg,
            self.definition.down_threshold_deg,
        );
    }

    /// The exercise this runner scores.
    pub fn definition(&self) -> &ExerciseDefinition {
        &self.definition
    }

    /// Completed repetitions so far.
    pub fn reps(&self) -> u32 {
        self.machine.reps()
    }

    fn measure_angle(&self, frame: &LandmarkFrame) -> Option<f32> {
        let [p1, vertex, p2] = self.definition.joint_angle_spec.indices();
        let min = self.config.min_visibility;

        let p1 = frame.landmark_if_visible(p1, min)?;
        let vertex = frame.landmark_if_visible(vertex, min)?;
        let p2 = frame.landmark_if_visible(p2, min)?;
        Some(joint_angle(p1, vertex, p2))
    }

    fn current_phase(&self) -> RunnerPhase {
        if self.calibration.is_calibrated() {
            RunnerPhase::Active
        } else {
            RunnerPhase::Calibrating
        }
    }

    fn snapshot(&self, angle_deg: Option<f32>, feedback: Feedback, phase: RunnerPhase) -> RunnerState {
        RunnerState {
            reps: self.machine.reps(),
            phase,
            machine_state: self.machine.state(),
            feedback,
            debug: DebugSnapshot {
                angle_deg,
                up_threshold_deg: self.machine.up_threshold_deg(),
                down_threshold_deg: self.machine.down_threshold_deg(),
            },
        }
    }
}
