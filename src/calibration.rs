//! Baseline posture calibration.
//!
//! Observes a fixed window of frames immediately after a reset, collecting
//! the joint angle each frame, then derives per-user working thresholds
//! from the mean. A fixed single midpoint threshold would false-trigger on
//! natural postural sway; asymmetric thresholds anchored to an observed
//! baseline avoid that without asking the user to perform an explicit
//! calibration rep.
//!
//! No repetition can be counted and no machine transition can complete
//! while the window is open.

use tracing::debug;

use crate::types::MachineState;

/// Configuration for the calibration stage.
///
/// The branch boundary and margins are empirically tuned values carried
/// over from observed behavior; they are configuration rather than
/// hard-coded invariants so a domain expert can review or override them.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationConfig {
    /// Frames to observe before deriving thresholds.
    pub window_size: usize,
    /// Mean angle above which the starting posture counts as extended
    /// (standing); at or below it counts as flexed (degrees).
    pub extended_boundary_deg: f32,
    /// Margin between the baseline and the near threshold (degrees).
    pub near_margin_deg: f32,
    /// Margin between the baseline and the far threshold (degrees).
    pub far_margin_deg: f32,
    /// Whether frames with no measurable angle advance the window. They
    /// never contribute to the baseline average either way.
    pub count_missing_frames: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_size: 30,             // ~1s at 30fps
            extended_boundary_deg: 130.0,
            near_margin_deg: 15.0,
            far_margin_deg: 40.0,
            count_missing_frames: false,
        }
    }
}

/// Thresholds and initial machine state derived from the baseline window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    /// Mean of the collected angles (degrees).
    pub baseline_deg: f32,
    /// Derived extended-region boundary (degrees).
    pub dynamic_up_deg: f32,
    /// Derived flexed-region boundary (degrees).
    pub dynamic_down_deg: f32,
    /// Machine state matching the observed starting posture.
    pub initial_state: MachineState,
}

/// Calibration stage: collects angles for one window, completes once.
#[derive(Debug, Clone)]
pub struct CalibrationStage {
    config: CalibrationConfig,
    frames_seen: usize,
    angles: Vec<f32>,
    result: Option<CalibrationResult>,
}

impl CalibrationStage {
    /// Creates a stage ready to observe a fresh window.
    pub fn new(config: CalibrationConfig) -> Self {
        let capacity = config.window_size;
        Self {
            config,
            frames_seen: 0,
            angles: Vec::with_capacity(capacity),
            result: None,
        }
    }

    /// Feeds one frame's measurement into the window.
    ///
    /// `None` means the angle could not be measured this frame; by default
    /// such frames do not advance the window. Returns the derived result
    /// once the window completes, and keeps returning it afterwards.
    ///
    /// Edge case: a window that fills without a single measurable angle
    /// (possible only with `count_missing_frames`) keeps waiting rather
    /// than deriving thresholds from an empty sample.
    pub fn observe(&mut self, angle: Option<f32>) -> Option<&CalibrationResult> {
        if self.result.is_none() {
            match angle {
                Some(deg) => {
                    self.angles.push(deg);
                    self.frames_seen += 1;
                }
                None if self.config.count_missing_frames => {
                    self.frames_seen += 1;
                }
                None => {}
            }

            if self.frames_seen >= self.config.window_size && !self.angles.is_empty() {
                let result = self.derive_thresholds();
                debug!(
                    baseline_deg = result.baseline_deg,
                    dynamic_up_deg = result.dynamic_up_deg,
                    dynamic_down_deg = result.dynamic_down_deg,
                    "calibration complete"
                );
                self.result = Some(result);
            }
        }
        self.result.as_ref()
    }

    /// Derived thresholds, once the window has completed.
    pub fn result(&self) -> Option<&CalibrationResult> {
        self.result.as_ref()
    }

    /// Returns true once thresholds have been derived.
    pub fn is_calibrated(&self) -> bool {
        self.result.is_some()
    }

    /// Window progress as (frames seen, frames required), clamped so the
    /// all-missing-frames edge case never reports past the window.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.frames_seen.min(self.config.window_size),
            self.config.window_size,
        )
    }

    /// Discards all collected state and reopens the window.
    pub fn reset(&mut self) {
        self.frames_seen = 0;
        self.angles.clear();
        self.result = None;
    }

    fn derive_thresholds(&self) -> CalibrationResult {
        let sum: f32 = self.angles.iter().sum();
        let baseline = sum / self.angles.len() as f32;

        if baseline > self.config.extended_boundary_deg {
            // Starting posture is extended (e.g. standing before a squat):
            // reps dip below the baseline, so both thresholds sit under it.
            CalibrationResult {
                baseline_deg: baseline,
                dynamic_up_deg: baseline - self.config.near_margin_deg,
                dynamic_down_deg: baseline - self.config.far_margin_deg,
                initial_state: MachineState::Up,
            }
        } else {
            // Starting posture is flexed: reps rise above the baseline.
            CalibrationResult {
                baseline_deg: baseline,
                dynamic_up_deg: baseline + self.config.far_margin_deg,
                dynamic_down_deg: baseline + self.config.near_margin_deg,
                initial_state: MachineState::Down,
            }
        }
    }
}
