//! Core data types for the repetition counting engine.
//!
//! This module defines the fundamental types used throughout the
//! pose-analysis pipeline: landmarks as delivered by the external pose
//! estimator, the joint specification that selects three of them, and the
//! per-frame state snapshot the engine hands back to its caller.
//!
//! Design principle: Types should make intent obvious. If a concept exists,
//! it gets a type. Never pass raw tuples or untyped collections across
//! boundaries. Landmark positions are referred to by named indices, not
//! bare integers, so a registry entry and the angle calculator can never
//! silently disagree about which keypoint is which.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of landmarks per frame under the pose-model convention
/// (MediaPipe-style 33-point body pose).
pub const LANDMARK_COUNT: usize = 33;

/// A single tracked body keypoint.
///
/// Coordinates are normalized image-space values in `[0, 1]` as produced by
/// the external pose estimator. The engine never interprets pixels.
///
/// Design note: We use f32 throughout. The estimator's own jitter is orders
/// of magnitude larger than single-precision error at these scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position (0 = left edge of the image).
    pub x: f32,

    /// Normalized vertical position (0 = top edge of the image).
    pub y: f32,

    /// Optional detection confidence in `[0, 1]`. Estimators that do not
    /// report per-landmark confidence leave this unset.
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Creates a landmark with position only.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    /// Creates a landmark with position and confidence.
    pub fn with_visibility(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }

    /// Returns true if this landmark meets the given confidence floor.
    /// Landmarks without a reported confidence are taken at face value.
    pub fn is_visible(&self, min_visibility: f32) -> bool {
        match self.visibility {
            Some(v) => v >= min_visibility,
            None => true,
        }
    }
}

/// Named landmark indices under the 33-point pose-model convention.
///
/// Used by the built-in exercise registry and by tests so that a joint
/// triple reads as anatomy, not arithmetic. The numeric values follow the
/// estimator's output ordering and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// The landmark's slot index within a frame.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One frame's set of tracked landmarks, slot-indexed by body part.
///
/// Frames are immutable once built: the estimator produces one per video
/// frame and the engine only reads it. Individual slots may be empty when
/// the estimator could not place that keypoint. A frame that is wholly
/// absent ("no pose detected") is represented as `None` at the `analyze`
/// call site, not as an empty frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    landmarks: Vec<Option<Landmark>>,
}

impl LandmarkFrame {
    /// Creates a frame with all slots empty.
    pub fn new() -> Self {
        Self {
            landmarks: vec![None; LANDMARK_COUNT],
        }
    }

    /// Builder-style slot assignment. Indices outside the landmark range
    /// are ignored rather than growing the frame.
    pub fn with(mut self, index: usize, landmark: Landmark) -> Self {
        if index < self.landmarks.len() {
            self.landmarks[index] = Some(landmark);
        }
        self
    }

    /// Returns the landmark in the given slot, if the estimator placed one.
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index).and_then(|slot| slot.as_ref())
    }

    /// Returns the landmark in the given slot only if it meets the
    /// confidence floor. A low-confidence landmark is treated exactly like
    /// a missing one.
    pub fn landmark_if_visible(&self, index: usize, min_visibility: f32) -> Option<&Landmark> {
        self.get(index).filter(|lm| lm.is_visible(min_visibility))
    }

    /// Number of populated slots.
    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// The three landmarks defining a joint angle: the angle is measured at
/// `vertex` between the rays toward `point1` and `point2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointAngleSpec {
    /// First ray endpoint.
    pub point1: usize,
    /// The joint the angle is measured at.
    pub vertex: usize,
    /// Second ray endpoint.
    pub point2: usize,
}

impl JointAngleSpec {
    /// Creates a spec from raw slot indices.
    pub fn new(point1: usize, vertex: usize, point2: usize) -> Self {
        Self {
            point1,
            vertex,
            point2,
        }
    }

    /// Creates a spec from named landmarks.
    pub fn from_landmarks(
        point1: PoseLandmark,
        vertex: PoseLandmark,
        point2: PoseLandmark,
    ) -> Self {
        Self::new(point1.index(), vertex.index(), point2.index())
    }

    /// The three slot indices in evaluation order.
    pub fn indices(&self) -> [usize; 3] {
        [self.point1, self.vertex, self.point2]
    }
}

/// State of the rep counting machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MachineState {
    /// No calibrated thresholds yet, or no usable data so far.
    Waiting,
    /// Joint is in the extended region (above the up threshold band).
    Up,
    /// Joint is in the flexed region (below the down threshold band).
    Down,
}

/// Coarse phase of a runner session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunnerPhase {
    /// Observing the baseline window; no reps can be counted.
    Calibrating,
    /// Thresholds derived; the state machine is live.
    Active,
}

/// Human-readable per-frame feedback.
///
/// Kept as an enum so the 30-60 Hz loop allocates nothing; the UI renders
/// text on demand through `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feedback {
    /// No landmarks at all this frame.
    NoPose,
    /// One or more of the configured joint landmarks is absent or below
    /// the confidence floor.
    MissingKeypoints,
    /// Baseline window in progress.
    Calibrating {
        /// Valid frames observed so far.
        seen: usize,
        /// Total frames required.
        window: usize,
    },
    /// Holding the extended position.
    InStartPosition,
    /// Crossed into the flexed region.
    GoingDown,
    /// Holding the flexed position.
    Hold,
    /// A repetition just completed; carries the new total.
    RepComplete(u32),
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::NoPose => write!(f, "No pose detected"),
            Feedback::MissingKeypoints => write!(f, "Missing keypoints"),
            Feedback::Calibrating { seen, window } => {
                write!(f, "Calibrating... ({}/{})", seen, window)
            }
            Feedback::InStartPosition => write!(f, "In starting position"),
            Feedback::GoingDown => write!(f, "Going down..."),
            Feedback::Hold => write!(f, "Hold..."),
            Feedback::RepComplete(n) => write!(f, "Rep {} complete!", n),
        }
    }
}

/// Measured angle and active thresholds, exposed for UI overlays and
/// debugging. Before calibration completes the thresholds shown are the
/// registry's seed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebugSnapshot {
    /// Joint angle measured this frame, if all three landmarks were usable.
    pub angle_deg: Option<f32>,
    /// Threshold the angle must exceed to complete a rep.
    pub up_threshold_deg: f32,
    /// Threshold the angle must fall below to enter the flexed region.
    pub down_threshold_deg: f32,
}

/// Per-frame output snapshot of a runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerState {
    /// Completed repetitions. Monotonic, non-decreasing within a session.
    pub reps: u32,
    /// Session phase.
    pub phase: RunnerPhase,
    /// Current state of the rep machine.
    pub machine_state: MachineState,
    /// Feedback for this frame.
    pub feedback: Feedback,
    /// Measured angle and active thresholds.
    pub debug: DebugSnapshot,
}
