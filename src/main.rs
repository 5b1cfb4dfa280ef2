//! Rep Engine
//!
//! Pose-driven repetition counting engine for exercise analysis.
//!
//! This is the entry point for the standalone demo binary: it replays a
//! synthetic squat session through the engine and prints each frame's
//! feedback. For library use, see lib.rs.

use rep_engine::{
    ExerciseRegistry, ExerciseRunner, JointAngleSpec, Landmark, LandmarkFrame,
};

/// Build a frame realizing the requested joint angle for the given triple.
fn frame_at(spec: &JointAngleSpec, angle_deg: f32) -> LandmarkFrame {
    let vertex = (0.5_f32, 0.5_f32);
    let theta = (angle_deg - 90.0).to_radians();
    LandmarkFrame::new()
        .with(spec.point1, Landmark::new(0.5, 0.2))
        .with(spec.vertex, Landmark::new(vertex.0, vertex.1))
        .with(
            spec.point2,
            Landmark::new(vertex.0 + 0.3 * theta.cos(), vertex.1 + 0.3 * theta.sin()),
        )
}

fn main() {
    tracing_subscriber::fmt::init();

    let registry = ExerciseRegistry::default();
    let mut runner =
        ExerciseRunner::from_registry(&registry, "squat").expect("built-in squat entry");

    println!("Rep Engine v0.1.0");
    println!("Exercise: {}", runner.definition().name);

    let spec = runner.definition().joint_angle_spec;

    // Baseline window: standing posture.
    for _ in 0..30 {
        runner.analyze(Some(&frame_at(&spec, 170.0)));
    }

    // Three squats with a tracking dropout in the middle.
    let session: [Option<f32>; 7] = [
        Some(80.0),
        Some(162.0),
        Some(78.0),
        None,
        Some(165.0),
        Some(81.0),
        Some(160.0),
    ];

    for angle in session {
        let frame = angle.map(|deg| frame_at(&spec, deg));
        let state = runner.analyze(frame.as_ref());
        match state.debug.angle_deg {
            Some(deg) => println!("angle {:>6.1}  reps {}  {}", deg, state.reps, state.feedback),
            None => println!("angle     --  reps {}  {}", state.reps, state.feedback),
        }
    }
}
