// Continuous (sub-tick) collision detection and response between circular bodies.
//
// Every unordered pair is checked in enumeration order. A colliding pair is
// advanced to the moment of impact, its normal velocities exchanged with a
// partially inelastic 1-D law, then advanced for the rest of the tick.
// Bodies that collided with nobody are advanced by the full tick afterwards.
//
// Pairs are resolved independently: a body hit by two partners in the same
// tick is mutated by each resolution in turn, so the result depends on pair
// order. That is accepted for the small body counts simulated here.

use crate::domain::body::Body;
use glam::DVec2;
use tracing::debug;

/// Restitution used by the simulation: mostly inelastic bounces.
pub const RESTITUTION: f64 = 0.1;

// Below this |v_rel|² the pair is treated as not closing at all.
const MIN_CLOSING_SPEED_SQ: f64 = 1e-18;

/// Earliest time within `[0, dt]` at which the two surfaces touch, assuming
/// constant relative velocity over the tick.
///
/// Relative acceleration is ignored. Returns `None` for parallel motion, a
/// negative discriminant, a non-finite root or a root outside the tick.
pub fn time_of_impact(a: &Body, b: &Body, dt: f64) -> Option<f64> {
    let displacement = a.displacement - b.displacement;
    let velocity = a.velocity - b.velocity;
    let radius_sum = a.radius() + b.radius();

    let qa = velocity.length_squared();
    let qb = 2.0 * displacement.dot(velocity);
    let qc = displacement.length_squared() - radius_sum * radius_sum;

    if qa < MIN_CLOSING_SPEED_SQ {
        return None;
    }
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-qb - discriminant.sqrt()) / (2.0 * qa);
    if !t.is_finite() || !(0.0..=dt).contains(&t) {
        return None;
    }
    Some(t)
}

/// Splits `velocity` into its components along `normal` and the tangent
/// `(-n.y, n.x)`. `normal` must be a unit vector.
pub fn decompose(velocity: DVec2, normal: DVec2) -> (f64, f64) {
    (velocity.dot(normal), velocity.dot(normal.perp()))
}

/// 1-D collision law on the normal components: momentum-conserving base term
/// plus a restitution correction. `r = 1` is elastic, `r = 0` sticks.
pub fn exchange_normal_velocities(
    mass_a: f64,
    va: f64,
    mass_b: f64,
    vb: f64,
    restitution: f64,
) -> (f64, f64) {
    let total = mass_a + mass_b;
    let momentum = mass_a * va + mass_b * vb;
    (
        (momentum + restitution * mass_b * (vb - va)) / total,
        (momentum + restitution * mass_a * (va - vb)) / total,
    )
}

/// Checks one pair and, on impact within `dt`, resolves it fully: both bodies
/// end the call advanced by the whole tick.
///
/// Returns the time of impact when the pair collided.
pub fn resolve_collision(a: &mut Body, b: &mut Body, dt: f64, restitution: f64) -> Option<f64> {
    let t = time_of_impact(a, b, dt)?;

    a.advance(t);
    b.advance(t);

    let Some(normal) = (a.displacement - b.displacement).try_normalize() else {
        // Touching at impact implies separated centres; finish the tick plainly.
        a.advance(dt - t);
        b.advance(dt - t);
        return Some(t);
    };
    let tangent = normal.perp();

    let (va_n, va_t) = decompose(a.velocity, normal);
    let (vb_n, vb_t) = decompose(b.velocity, normal);
    let (va_n, vb_n) = exchange_normal_velocities(a.mass(), va_n, b.mass(), vb_n, restitution);

    a.velocity = normal * va_n + tangent * va_t;
    b.velocity = normal * vb_n + tangent * vb_t;

    a.advance(dt - t);
    b.advance(dt - t);
    Some(t)
}

/// A pair of body indices resolved during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub a: usize,
    pub b: usize,
    pub time_of_impact: f64,
}

/// Runs the collision pass over every pair, then advances every body that was
/// not part of a collision by the full `dt`.
pub fn resolve_and_advance(bodies: &mut [Body], dt: f64, restitution: f64) -> Vec<Collision> {
    let mut collisions = Vec::new();
    let mut moved = vec![false; bodies.len()];

    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for (offset, b) in tail.iter_mut().enumerate() {
            let j = i + 1 + offset;
            if let Some(t) = resolve_collision(a, b, dt, restitution) {
                debug!(a = %a.name, b = %b.name, time_of_impact = t, "collision");
                moved[i] = true;
                moved[j] = true;
                collisions.push(Collision {
                    a: i,
                    b: j,
                    time_of_impact: t,
                });
            }
        }
    }

    for (body, already_moved) in bodies.iter_mut().zip(moved) {
        if !already_moved {
            body.advance(dt);
        }
    }

    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::body::{BodyKind, Kinematics};

    fn ball(name: &str, mass: f64, radius: f64, position: DVec2, velocity: DVec2) -> Body {
        Body::new(
            name,
            [200, 200, 200],
            mass,
            radius,
            Kinematics {
                displacement: position,
                velocity,
                ..Default::default()
            },
            BodyKind::Entity,
        )
        .unwrap()
    }

    fn head_on() -> (Body, Body) {
        (
            ball("A", 1.0, 5.0, DVec2::new(0.0, 0.0), DVec2::ZERO),
            ball("B", 1.0, 5.0, DVec2::new(20.0, 0.0), DVec2::new(-10.0, 0.0)),
        )
    }

    #[test]
    fn when_gap_of_ten_closes_at_ten_then_impact_after_one_second() {
        let (a, b) = head_on();

        let t = time_of_impact(&a, &b, 5.0).unwrap();

        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn when_impact_is_found_then_surfaces_touch_at_that_time() {
        let a = ball("A", 1.0, 3.0, DVec2::new(-7.0, 2.0), DVec2::new(4.0, 1.0));
        let b = ball("B", 1.0, 2.0, DVec2::new(9.0, -1.0), DVec2::new(-6.0, 0.5));
        let dt = 3.0;

        let t = time_of_impact(&a, &b, dt).unwrap();

        assert!((0.0..=dt).contains(&t));
        let pa = a.displacement + a.velocity * t;
        let pb = b.displacement + b.velocity * t;
        assert!(((pa - pb).length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn when_impact_is_after_tick_then_none() {
        let (a, b) = head_on();

        assert_eq!(time_of_impact(&a, &b, 0.5), None);
    }

    #[test]
    fn when_bodies_separate_then_none() {
        let a = ball("A", 1.0, 1.0, DVec2::ZERO, DVec2::new(-1.0, 0.0));
        let b = ball("B", 1.0, 1.0, DVec2::new(5.0, 0.0), DVec2::new(1.0, 0.0));

        assert_eq!(time_of_impact(&a, &b, 100.0), None);
    }

    #[test]
    fn when_relative_velocity_is_zero_then_none() {
        let a = ball("A", 1.0, 1.0, DVec2::ZERO, DVec2::new(3.0, 3.0));
        let b = ball("B", 1.0, 1.0, DVec2::new(1.5, 0.0), DVec2::new(3.0, 3.0));

        assert_eq!(time_of_impact(&a, &b, 1.0), None);
    }

    #[test]
    fn when_paths_miss_then_discriminant_rejects() {
        let a = ball("A", 1.0, 1.0, DVec2::new(0.0, 10.0), DVec2::new(5.0, 0.0));
        let b = ball("B", 1.0, 1.0, DVec2::new(20.0, 0.0), DVec2::ZERO);

        assert_eq!(time_of_impact(&a, &b, 10.0), None);
    }

    #[test]
    fn when_restitution_is_one_then_normal_momentum_is_conserved() {
        let (va, vb) = exchange_normal_velocities(3.0, 4.0, 7.0, -2.0, 1.0);

        assert!(((3.0 * va + 7.0 * vb) - (3.0 * 4.0 + 7.0 * -2.0)).abs() < 1e-12);
        // Elastic: relative normal velocity flips.
        assert!(((va - vb) - -(4.0 - -2.0)).abs() < 1e-12);
    }

    #[test]
    fn when_restitution_is_zero_then_normal_velocities_match() {
        let (va, vb) = exchange_normal_velocities(2.0, 5.0, 6.0, -1.0, 0.0);

        assert!((va - vb).abs() < 1e-12);
        assert!(((2.0 * va + 6.0 * vb) - (2.0 * 5.0 + 6.0 * -1.0)).abs() < 1e-12);
    }

    #[test]
    fn when_bodies_collide_obliquely_then_tangential_components_survive() {
        for restitution in [0.0, RESTITUTION, 0.5, 1.0] {
            let mut a = ball("A", 2.0, 1.0, DVec2::new(0.0, 0.0), DVec2::new(3.0, 1.0));
            let mut b = ball("B", 5.0, 1.0, DVec2::new(4.0, 1.0), DVec2::new(-1.0, -0.5));
            let t = time_of_impact(&a, &b, 2.0).unwrap();

            // Normal at impact, from the pre-collision straight-line motion.
            let normal = ((a.displacement + a.velocity * t) - (b.displacement + b.velocity * t))
                .normalize();
            let (_, before_a_t) = decompose(a.velocity, normal);
            let (_, before_b_t) = decompose(b.velocity, normal);
            let before_normal_momentum =
                2.0 * decompose(a.velocity, normal).0 + 5.0 * decompose(b.velocity, normal).0;

            resolve_collision(&mut a, &mut b, 2.0, restitution).unwrap();

            let (after_a_n, after_a_t) = decompose(a.velocity, normal);
            let (after_b_n, after_b_t) = decompose(b.velocity, normal);
            assert!((after_a_t - before_a_t).abs() < 1e-9);
            assert!((after_b_t - before_b_t).abs() < 1e-9);
            assert!((2.0 * after_a_n + 5.0 * after_b_n - before_normal_momentum).abs() < 1e-9);
        }
    }

    #[test]
    fn when_pair_collides_then_both_end_the_tick_and_others_move_fully() {
        let (a, b) = head_on();
        let bystander = ball("C", 1.0, 1.0, DVec2::new(0.0, 500.0), DVec2::new(1.0, 0.0));
        let mut bodies = vec![a, b, bystander];

        let collisions = resolve_and_advance(&mut bodies, 5.0, RESTITUTION);

        assert_eq!(collisions.len(), 1);
        assert_eq!((collisions[0].a, collisions[0].b), (0, 1));
        assert!((collisions[0].time_of_impact - 1.0).abs() < 1e-12);
        assert_eq!(bodies[2].displacement, DVec2::new(5.0, 500.0));

        // Equal masses, R = 0.1: v' = (-10 ± 0.1 * 10) / 2 along x.
        assert!((bodies[0].velocity.x - -5.5).abs() < 1e-9);
        assert!((bodies[1].velocity.x - -4.5).abs() < 1e-9);
        // A stood still for 1s then moved at -5.5 for 4s.
        assert!((bodies[0].displacement.x - -22.0).abs() < 1e-9);
        // B reached x=10 at impact then moved at -4.5 for 4s.
        assert!((bodies[1].displacement.x - -8.0).abs() < 1e-9);
    }

    #[test]
    fn when_nothing_collides_then_every_body_advances_once() {
        let mut bodies = vec![
            ball("A", 1.0, 1.0, DVec2::ZERO, DVec2::new(1.0, 0.0)),
            ball("B", 1.0, 1.0, DVec2::new(0.0, 50.0), DVec2::new(0.0, 1.0)),
        ];

        let collisions = resolve_and_advance(&mut bodies, 2.0, RESTITUTION);

        assert!(collisions.is_empty());
        assert_eq!(bodies[0].displacement, DVec2::new(2.0, 0.0));
        assert_eq!(bodies[1].displacement, DVec2::new(0.0, 52.0));
    }
}
