//! Repetition counting state machine.
//!
//! Three states (Waiting, Up, Down) driven once per frame by the measured
//! joint angle. The up and down boundaries are distinct: the angle must
//! fully cross into the opposite region before a transition is honored, so
//! estimator jitter near a single boundary can never register as
//! repetitions. A rep is counted exactly on the Down -> Up transition.
//!
//! Missing-keypoint and no-pose conditions are short-circuited by the
//! runner before the machine is stepped; the machine itself is total over
//! angles.

use tracing::debug;

use crate::calibration::CalibrationResult;
use crate::types::{Feedback, MachineState};

/// Hysteresis state machine over a stream of joint angles.
#[derive(Debug, Clone)]
pub struct RepStateMachine {
    state: MachineState,
    reps: u32,
    up_threshold_deg: f32,
    down_threshold_deg: f32,
}

impl RepStateMachine {
    /// Creates a machine in `Waiting` with the given (typically seed)
    /// thresholds.
    pub fn new(up_threshold_deg: f32, down_threshold_deg: f32) -> Self {
        Self {
            state: MachineState::Waiting,
            reps: 0,
            up_threshold_deg,
            down_threshold_deg,
        }
    }

    /// Installs calibrated thresholds and the starting state matching the
    /// observed posture.
    pub fn apply_calibration(&mut self, result: &CalibrationResult) {
        self.up_threshold_deg = result.dynamic_up_deg;
        self.down_threshold_deg = result.dynamic_down_deg;
        self.state = result.initial_state;
    }

    /// Advances the machine by one frame's angle.
    pub fn step(&mut self, angle_deg: f32) -> Feedback {
        match self.state {
            // Waiting behaves like Up once the machine is being stepped:
            // the first crossing into the flexed region arms the rep.
            MachineState::Waiting | MachineState::Up => {
                if angle_deg < self.down_threshold_deg {
                    self.state = MachineState::Down;
                    Feedback::GoingDown
                } else {
                    self.state = MachineState::Up;
                    Feedback::InStartPosition
                }
            }
            MachineState::Down => {
                if angle_deg > self.up_threshold_deg {
                    self.state = MachineState::Up;
                    self.reps += 1;
                    debug!(reps = self.reps, "rep complete");
                    Feedback::RepComplete(self.reps)
                } else {
                    Feedback::Hold
                }
            }
        }
    }

    /// Completed repetitions.
    pub fn reps(&self) -> u32 {
        self.reps
    }

    /// Current machine state.
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Active extended-region boundary (degrees).
    pub fn up_threshold_deg(&self) -> f32 {
        self.up_threshold_deg
    }

    /// Active flexed-region boundary (degrees).
    pub fn down_threshold_deg(&self) -> f32 {
        self.down_threshold_deg
    }
}
