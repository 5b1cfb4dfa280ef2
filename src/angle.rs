//! Joint angle calculation.
//!
//! Computes the planar angle subtended at a vertex landmark by two adjacent
//! landmarks, e.g. the knee angle from hip, knee, and ankle positions.

use crate::types::Landmark;

/// Calculate the joint angle at `vertex` in degrees, always in `[0, 180]`.
///
/// Uses the atan2 of each ray and normalizes reflex results to their
/// explement, so hip-knee-ankle reads the same whether the subject faces
/// left or right.
///
/// Pure function. Callers are responsible for short-circuiting on missing
/// landmarks before invoking it; collinear or coincident points yield 180
/// or 0 rather than an error.
pub fn joint_angle(p1: &Landmark, vertex: &Landmark, p2: &Landmark) -> f32 {
    let ray1 = (p1.y - vertex.y).atan2(p1.x - vertex.x);
    let ray2 = (p2.y - vertex.y).atan2(p2.x - vertex.x);

    let mut degrees = (ray2 - ray1).to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    degrees
}
