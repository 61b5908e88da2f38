// Pairwise Newtonian gravity between all bodies.

use crate::domain::body::Body;
use glam::DVec2;

/// Gravitational constant, N·m²/kg².
pub const G: f64 = 6.6720e-11;

/// Bearing from `a` to `b` in the inertial frame.
pub fn bearing(a: &Body, b: &Body) -> f64 {
    let delta = b.displacement - a.displacement;
    delta.y.atan2(delta.x)
}

/// Force that `b` exerts on `a`: `G·mA·mB/d²` directed from `a` towards `b`.
///
/// Returns `None` when the centres coincide.
pub fn gravitational_force(a: &Body, b: &Body) -> Option<DVec2> {
    let delta = b.displacement - a.displacement;
    let distance_sq = delta.length_squared();
    if !(distance_sq > 0.0) {
        return None;
    }

    let magnitude = G * a.mass() * b.mass() / distance_sq;
    let force = delta / distance_sq.sqrt() * magnitude;
    force.is_finite().then_some(force)
}

/// Accumulates gravity for every unordered pair. The same force vector is
/// applied to both bodies with opposite signs at the A→B bearing.
pub fn apply_gravity(bodies: &mut [Body]) {
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let Some(force) = gravitational_force(a, b) else {
                continue;
            };
            let theta = bearing(a, b);
            a.accelerate(force, theta);
            b.accelerate(-force, theta);
        }
    }
}
