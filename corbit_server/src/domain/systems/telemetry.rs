// Read-only flight quantities of a craft relative to a reference body.

use super::gravity::G;
use crate::domain::body::Body;

pub fn distance(a: &Body, b: &Body) -> f64 {
    a.displacement.distance(b.displacement)
}

/// Surface-to-surface distance.
pub fn altitude(a: &Body, b: &Body) -> f64 {
    distance(a, b) - a.radius() - b.radius()
}

/// Magnitude of the relative velocity.
pub fn speed(a: &Body, b: &Body) -> f64 {
    (a.velocity - b.velocity).length()
}

/// Relative velocity component perpendicular to the line of centres.
pub fn tangential_speed(a: &Body, b: &Body) -> f64 {
    let Some(normal) = (a.displacement - b.displacement).try_normalize() else {
        return 0.0;
    };
    (a.velocity - b.velocity).dot(normal.perp())
}

/// Speed of a circular orbit of `a` around `b` at the current distance.
pub fn orbital_speed(a: &Body, b: &Body) -> f64 {
    let (ma, mb) = (a.mass(), b.mass());
    (mb * mb * G / ((ma + mb) * distance(a, b))).sqrt()
}

fn standard_parameter(a: &Body, b: &Body) -> f64 {
    G * (a.mass() + b.mass())
}

fn specific_energy(a: &Body, b: &Body) -> f64 {
    let mu = standard_parameter(a, b);
    speed(a, b).powi(2) / 2.0 - mu / distance(a, b)
}

pub fn semimajor_axis(a: &Body, b: &Body) -> f64 {
    -standard_parameter(a, b) / (2.0 * specific_energy(a, b))
}

pub fn eccentricity(a: &Body, b: &Body) -> f64 {
    let mu = standard_parameter(a, b);
    let energy = specific_energy(a, b);
    let h = distance(a, b) * tangential_speed(a, b);
    (1.0 + 2.0 * energy * h * h / (mu * mu)).max(0.0).sqrt()
}

/// Closest approach of the current orbit, or 0 when it intersects the reference.
pub fn periapsis(a: &Body, b: &Body) -> f64 {
    let peri = (1.0 - eccentricity(a, b)) * semimajor_axis(a, b);
    if peri <= a.radius() + b.radius() { 0.0 } else { peri }
}

/// Furthest point of the current orbit, or 0 when it intersects the reference.
pub fn apoapsis(a: &Body, b: &Body) -> f64 {
    let apo = (1.0 + eccentricity(a, b)) * semimajor_axis(a, b);
    if apo <= a.radius() + b.radius() { 0.0 } else { apo }
}

/// Everything a pilot HUD shows about `craft` relative to `reference`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub distance: f64,
    pub altitude: f64,
    pub speed: f64,
    pub orbital_speed: f64,
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    pub periapsis: f64,
    pub apoapsis: f64,
    pub angular_speed: f64,
    pub fuel: f64,
}

pub fn telemetry(craft: &Body, reference: &Body) -> Telemetry {
    Telemetry {
        distance: distance(craft, reference),
        altitude: altitude(craft, reference),
        speed: speed(craft, reference),
        orbital_speed: orbital_speed(craft, reference),
        semimajor_axis: semimajor_axis(craft, reference),
        eccentricity: eccentricity(craft, reference),
        periapsis: periapsis(craft, reference),
        apoapsis: apoapsis(craft, reference),
        angular_speed: craft.angular_speed,
        fuel: craft.mass() - craft.dry_mass(),
    }
}
