//! Exercise definition registry.
//!
//! Maps an exercise identifier to the joint triple it is scored on plus
//! seed thresholds used before calibration derives per-user values. Entries
//! come from two places: a built-in table of common exercises, and
//! externally authored records (e.g. from an offline planning step) that
//! must pass the validation gate before they are usable.
//!
//! Externally supplied definitions are consumed strictly as data. The one
//! audited state machine interprets every definition; nothing here is ever
//! evaluated as code.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{JointAngleSpec, PoseLandmark, LANDMARK_COUNT};

/// Minimum gap between the up and down thresholds (degrees). A narrower
/// band would let estimator jitter near a single boundary register as
/// repetitions.
pub const MIN_HYSTERESIS_GAP_DEG: f32 = 10.0;

/// A validated exercise definition.
///
/// Construction goes through [`ExerciseDefinitionRecord::into_definition`]
/// or the built-in table, so holding one implies the invariants hold:
/// landmark indices are in range, thresholds are in `[0, 180]`, and
/// `up − down >= MIN_HYSTERESIS_GAP_DEG`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseDefinition {
    /// Normalized exercise identifier (lowercase, underscores).
    pub name: String,
    /// The joint the exercise is scored on.
    pub joint_angle_spec: JointAngleSpec,
    /// Seed flexed-region boundary (degrees). Fallback before calibration.
    pub down_threshold_deg: f32,
    /// Seed extended-region boundary (degrees). Fallback before calibration.
    pub up_threshold_deg: f32,
}

/// Rejection reasons from the validation gate.
///
/// A rejected definition never reaches a runner; it is the caller's job to
/// surface the rejection. Definitions are never silently repaired.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("exercise name must not be empty")]
    EmptyName,

    #[error("{field} index {index} is outside the landmark range 0..{count}", count = LANDMARK_COUNT)]
    LandmarkOutOfRange { field: &'static str, index: usize },

    #[error("{field} of {value} degrees is outside the valid range [0, 180]")]
    ThresholdOutOfRange { field: &'static str, value: f32 },

    #[error(
        "up threshold must exceed down threshold by at least {min} degrees (gap was {gap})",
        min = MIN_HYSTERESIS_GAP_DEG
    )]
    InsufficientHysteresisGap { gap: f32 },

    #[error("definition record is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Exchange format for externally authored exercise definitions.
///
/// Mirrors the JSON document a planning collaborator produces:
///
/// ```json
/// { "name": "goblet_squat",
///   "primary_angle": { "point1": 24, "vertex": 26, "point2": 28 },
///   "down_threshold": 90.0, "up_threshold": 150.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinitionRecord {
    pub name: String,
    pub primary_angle: AngleRecord,
    pub down_threshold: f32,
    pub up_threshold: f32,
}

/// Joint triple portion of the exchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleRecord {
    pub point1: usize,
    pub vertex: usize,
    pub point2: usize,
}

impl ExerciseDefinitionRecord {
    /// Validation gate: checks every invariant and produces a usable
    /// definition, or the first rejection reason found.
    pub fn into_definition(self) -> Result<ExerciseDefinition, DefinitionError> {
        let name = normalize_key(&self.name);
        if name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        for (field, index) in [
            ("point1", self.primary_angle.point1),
            ("vertex", self.primary_angle.vertex),
            ("point2", self.primary_angle.point2),
        ] {
            if index >= LANDMARK_COUNT {
                return Err(DefinitionError::LandmarkOutOfRange { field, index });
            }
        }

        for (field, value) in [
            ("down threshold", self.down_threshold),
            ("up threshold", self.up_threshold),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(DefinitionError::ThresholdOutOfRange { field, value });
            }
        }

        let gap = self.up_threshold - self.down_threshold;
        if gap < MIN_HYSTERESIS_GAP_DEG {
            return Err(DefinitionError::InsufficientHysteresisGap { gap });
        }

        Ok(ExerciseDefinition {
            name,
            joint_angle_spec: JointAngleSpec::new(
                self.primary_angle.point1,
                self.primary_angle.vertex,
                self.primary_angle.point2,
            ),
            down_threshold_deg: self.down_threshold,
            up_threshold_deg: self.up_threshold,
        })
    }
}

/// Normalizes a lookup key: trimmed, lowercased, spaces and hyphens
/// become underscores.
pub(crate) fn normalize_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Table of known exercise definitions.
///
/// `default()` ships the built-in entries; custom definitions are added
/// through the validation gate and may shadow a built-in of the same name.
#[derive(Debug, Clone)]
pub struct ExerciseRegistry {
    entries: HashMap<String, ExerciseDefinition>,
}

impl ExerciseRegistry {
    /// Creates an empty registry with no built-ins.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Looks up a definition by name. Lookup keys are normalized, so
    /// "Push-Up", "push up" and "push_up" all resolve to the same entry.
    pub fn lookup(&self, name: &str) -> Option<&ExerciseDefinition> {
        self.entries.get(&normalize_key(name))
    }

    /// Registers an externally supplied record after validation.
    pub fn register(&mut self, record: ExerciseDefinitionRecord) -> Result<(), DefinitionError> {
        let definition = record.into_definition()?;
        self.entries.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Parses and registers a JSON definition document.
    pub fn register_json(&mut self, json: &str) -> Result<(), DefinitionError> {
        let record: ExerciseDefinitionRecord = serde_json::from_str(json)?;
        self.register(record)
    }

    /// Iterates over the registered exercise names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExerciseRegistry {
    /// Registry pre-populated with the built-in exercise table.
    ///
    /// Seed thresholds are pre-calibration fallbacks, not tuned per-user
    /// values; calibration replaces them before any rep can be counted.
    fn default() -> Self {
        use PoseLandmark::*;

        let builtins = [
            ("squat", (RightHip, RightKnee, RightAnkle), 90.0, 150.0),
            ("deadlift", (RightShoulder, RightHip, RightKnee), 95.0, 165.0),
            ("push_up", (RightShoulder, RightElbow, RightWrist), 90.0, 160.0),
            ("jumping_jacks", (RightElbow, RightShoulder, RightHip), 40.0, 120.0),
            ("bicep_curl", (RightShoulder, RightElbow, RightWrist), 70.0, 150.0),
            ("kettlebell_swing", (RightShoulder, RightHip, RightKnee), 100.0, 165.0),
            ("long_cycle", (RightShoulder, RightElbow, RightWrist), 80.0, 150.0),
        ];

        let mut entries = HashMap::new();
        for (name, (point1, vertex, point2), down, up) in builtins {
            entries.insert(
                name.to_string(),
                ExerciseDefinition {
                    name: name.to_string(),
                    joint_angle_spec: JointAngleSpec::from_landmarks(point1, vertex, point2),
                    down_threshold_deg: down,
                    up_threshold_deg: up,
                },
            );
        }

        Self { entries }
    }
}
