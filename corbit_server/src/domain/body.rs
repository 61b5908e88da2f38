// Rigid circular bodies and the per-tick kinematic integrator.

use super::engine::EngineSystem;
use super::errors::BodyError;
use glam::DVec2;
use std::collections::BTreeMap;

/// Engine systems keyed by engine class ("rcs", "main engines", ...).
pub type EngineSystems = BTreeMap<String, EngineSystem>;

/// What kind of body this is. Habitats carry propulsion and their fuel has mass.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Entity,
    Habitat { engine_systems: EngineSystems },
}

/// Position, velocity and rotation of a body in the shared inertial frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    pub displacement: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    pub angular_position: f64,
    pub angular_speed: f64,
    pub angular_acceleration: f64,
}

/// A rigid circular body: a free-flying entity or a player habitat.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Display-only.
    pub color: [u8; 3],
    dry_mass: f64,
    radius: f64,

    pub displacement: DVec2,
    pub velocity: DVec2,
    // Transient accumulators, cleared by `advance`.
    pub acceleration: DVec2,

    pub angular_position: f64,
    pub angular_speed: f64,
    pub angular_acceleration: f64,

    pub kind: BodyKind,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        color: [u8; 3],
        dry_mass: f64,
        radius: f64,
        kinematics: Kinematics,
        kind: BodyKind,
    ) -> Result<Self, BodyError> {
        if !(dry_mass > 0.0) {
            return Err(BodyError::NonPositiveMass(dry_mass));
        }
        if !(radius > 0.0) {
            return Err(BodyError::NonPositiveRadius(radius));
        }

        Ok(Self {
            name: name.into(),
            color,
            dry_mass,
            radius,
            displacement: kinematics.displacement,
            velocity: kinematics.velocity,
            acceleration: kinematics.acceleration,
            angular_position: kinematics.angular_position,
            angular_speed: kinematics.angular_speed,
            angular_acceleration: kinematics.angular_acceleration,
            kind,
        })
    }

    pub fn dry_mass(&self) -> f64 {
        self.dry_mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Current mass. For habitats this includes the fuel left in every tank,
    /// so it must be recomputed rather than cached while engines burn.
    pub fn mass(&self) -> f64 {
        match &self.kind {
            BodyKind::Entity => self.dry_mass,
            BodyKind::Habitat { engine_systems } => {
                self.dry_mass + engine_systems.values().map(|s| s.fuel).sum::<f64>()
            }
        }
    }

    /// Moment of inertia of a uniform solid sphere of this mass and radius.
    pub fn moment_of_inertia(&self) -> f64 {
        (2.0 * self.mass() * self.radius * self.radius) / 5.0
    }

    pub fn is_habitat(&self) -> bool {
        matches!(self.kind, BodyKind::Habitat { .. })
    }

    pub fn engine_system(&self, class: &str) -> Option<&EngineSystem> {
        match &self.kind {
            BodyKind::Habitat { engine_systems } => engine_systems.get(class),
            BodyKind::Entity => None,
        }
    }

    pub fn engine_system_mut(&mut self, class: &str) -> Option<&mut EngineSystem> {
        match &mut self.kind {
            BodyKind::Habitat { engine_systems } => engine_systems.get_mut(class),
            BodyKind::Entity => None,
        }
    }

    /// Accumulates the effect of `force` applied at bearing `angle` on the hull.
    ///
    /// The linear part scales the force by `|cos(angle - F_theta)|` and the
    /// torque is `|F| * r * sin(angle - F_theta)`, where `F_theta` is the
    /// force's own bearing. Callers pass hull angles already offset by
    /// `angular_position` when they mean a point fixed to the body.
    pub fn accelerate(&mut self, force: DVec2, angle: f64) {
        let force_theta = force.y.atan2(force.x);
        let offset = angle - force_theta;

        let central = force * offset.cos().abs();
        self.acceleration += central / self.mass();

        let torque = force.length() * self.radius * offset.sin();
        self.angular_acceleration += torque / self.moment_of_inertia();
    }

    /// Semi-implicit Euler step. Consumes and clears the accumulated accelerations.
    pub fn advance(&mut self, dt: f64) {
        self.velocity += self.acceleration * dt;
        self.acceleration = DVec2::ZERO;
        self.displacement += self.velocity * dt;

        self.angular_speed += self.angular_acceleration * dt;
        self.angular_acceleration = 0.0;
        self.angular_position += self.angular_speed * dt;
    }
}

/// Returns the index of the first body called `name`.
pub fn find_body(bodies: &[Body], name: &str) -> Option<usize> {
    bodies.iter().position(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::Placement;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn rock(mass: f64, radius: f64) -> Body {
        Body::new("rock", [0, 255, 0], mass, radius, Kinematics::default(), BodyKind::Entity)
            .unwrap()
    }

    fn habitat() -> Body {
        let mut engine_systems = EngineSystems::new();
        engine_systems.insert(
            "rcs".to_string(),
            EngineSystem::new(
                100.0,
                5.0,
                3000.0,
                vec![Placement::new(0.0, DVec2::new(-1.0, 0.0)).unwrap()],
            )
            .unwrap(),
        );
        engine_systems.insert(
            "main engines".to_string(),
            EngineSystem::new(
                1000.0,
                100.0,
                100.0,
                vec![Placement::new(PI, DVec2::new(1.0, 0.0)).unwrap()],
            )
            .unwrap(),
        );
        Body::new(
            "AC",
            [255, 0, 0],
            100.0,
            8.0,
            Kinematics::default(),
            BodyKind::Habitat { engine_systems },
        )
        .unwrap()
    }

    #[test]
    fn when_mass_is_not_positive_then_construction_fails() {
        let result = Body::new("x", [0; 3], 0.0, 1.0, Kinematics::default(), BodyKind::Entity);

        assert_eq!(result, Err(BodyError::NonPositiveMass(0.0)));
    }

    #[test]
    fn when_radius_is_not_positive_then_construction_fails() {
        let result = Body::new("x", [0; 3], 1.0, -2.0, Kinematics::default(), BodyKind::Entity);

        assert_eq!(result, Err(BodyError::NonPositiveRadius(-2.0)));
    }

    #[test]
    fn when_body_is_habitat_then_mass_includes_fuel() {
        let mut hab = habitat();

        assert_eq!(hab.mass(), 1200.0);

        hab.engine_system_mut("rcs").unwrap().pulse(1.0, 1.0);
        assert_eq!(hab.mass(), 1195.0);
        assert_eq!(hab.dry_mass(), 100.0);
    }

    #[test]
    fn when_computing_inertia_then_uses_solid_sphere() {
        let body = rock(10.0, 2.0);

        assert_eq!(body.moment_of_inertia(), 16.0);
    }

    #[test]
    fn when_force_is_aligned_with_angle_then_only_linear_acceleration() {
        let mut body = rock(2.0, 1.0);

        body.accelerate(DVec2::new(4.0, 0.0), 0.0);

        assert_eq!(body.acceleration, DVec2::new(2.0, 0.0));
        assert_eq!(body.angular_acceleration, 0.0);
    }

    #[test]
    fn when_force_is_tangential_then_only_torque() {
        let mut body = rock(5.0, 2.0);

        // Force points +y, applied at the front (angle 0): offset is -pi/2.
        body.accelerate(DVec2::new(0.0, 10.0), 0.0);

        assert!(body.acceleration.length() < 1e-12);
        let inertia = body.moment_of_inertia();
        assert!((body.angular_acceleration - (-10.0 * 2.0 / inertia)).abs() < 1e-12);
    }

    #[test]
    fn when_force_is_opposite_to_angle_then_linear_part_keeps_force_direction() {
        let mut body = rock(1.0, 1.0);

        body.accelerate(DVec2::new(-3.0, 0.0), 0.0);

        assert!((body.acceleration - DVec2::new(-3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn when_force_is_oblique_then_linear_part_is_cosine_scaled() {
        let mut body = rock(1.0, 1.0);
        let force = DVec2::new(0.0, 2.0);

        body.accelerate(force, FRAC_PI_2 / 3.0 + FRAC_PI_2);

        let expected = force * (FRAC_PI_2 / 3.0).cos();
        assert!((body.acceleration - expected).length() < 1e-12);
    }

    #[test]
    fn when_advancing_then_semi_implicit_euler_and_accumulators_clear() {
        let mut body = rock(1.0, 1.0);
        body.velocity = DVec2::new(1.0, 0.0);
        body.acceleration = DVec2::new(0.0, 2.0);
        body.angular_speed = 0.5;
        body.angular_acceleration = 1.0;

        body.advance(2.0);

        assert_eq!(body.velocity, DVec2::new(1.0, 4.0));
        assert_eq!(body.displacement, DVec2::new(2.0, 8.0));
        assert_eq!(body.acceleration, DVec2::ZERO);
        assert_eq!(body.angular_speed, 2.5);
        assert_eq!(body.angular_position, 5.0);
        assert_eq!(body.angular_acceleration, 0.0);
    }

    #[test]
    fn when_finding_by_name_then_returns_first_match() {
        let bodies = vec![rock(1.0, 1.0), habitat(), habitat()];

        assert_eq!(find_body(&bodies, "AC"), Some(1));
        assert_eq!(find_body(&bodies, "missing"), None);
    }

    #[test]
    fn when_body_is_entity_then_has_no_engines() {
        let mut body = rock(1.0, 1.0);

        assert!(!body.is_habitat());
        assert!(body.engine_system_mut("rcs").is_none());
    }
}
