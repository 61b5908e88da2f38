// Fuel-limited thrust sources mounted on habitats.

use super::errors::BodyError;
use glam::DVec2;
use std::f64::consts::TAU;

/// Engine-class name of the reaction control system.
pub const RCS: &str = "rcs";
/// Engine-class name of the main propulsion system.
pub const MAIN_ENGINES: &str = "main engines";

/// Where a single thruster sits on the hull and which way it pushes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Mount angle on the hull, radians in `[0, 2π)`, 0 being the front.
    pub angle: f64,
    /// Unit thrust direction.
    pub direction: DVec2,
}

impl Placement {
    pub fn new(angle: f64, direction: DVec2) -> Result<Self, BodyError> {
        let direction = direction.try_normalize().ok_or(BodyError::DegenerateThrustDirection)?;
        Ok(Self {
            angle: angle.rem_euclid(TAU),
            direction,
        })
    }
}

/// A group of thrusters sharing one tank, e.g. the RCS or the main engines.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSystem {
    /// Remaining fuel in kg. Never negative.
    pub fuel: f64,
    /// Fuel flow at 100% throttle, kg/s.
    pub rated_fuel_flow: f64,
    /// Effective exhaust velocity, m/s.
    pub specific_impulse: f64,
    /// Not clamped here; callers police the range.
    pub throttle: f64,
    placements: Vec<Placement>,
}

impl EngineSystem {
    pub fn new(
        fuel: f64,
        rated_fuel_flow: f64,
        specific_impulse: f64,
        placements: Vec<Placement>,
    ) -> Result<Self, BodyError> {
        if !(fuel >= 0.0) {
            return Err(BodyError::NegativeFuel(fuel));
        }
        if !(rated_fuel_flow > 0.0) {
            return Err(BodyError::NonPositiveFuelFlow(rated_fuel_flow));
        }

        Ok(Self {
            fuel,
            rated_fuel_flow,
            specific_impulse,
            throttle: 0.0,
            placements,
        })
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Burns fuel at the stored throttle for `dt` seconds and returns the
    /// thrust each placement receives.
    pub fn thrust(&mut self, dt: f64) -> f64 {
        self.pulse(dt, self.throttle)
    }

    /// Burns fuel at `throttle` for `dt` seconds without touching the stored
    /// throttle, returning the per-placement thrust in newtons.
    ///
    /// When the tank cannot cover the burn, whatever is left is spent over
    /// `dt` and the thrust tapers accordingly. The sign of `throttle` carries
    /// through to the result; the fuel drawn is always `|usage| * dt`.
    pub fn pulse(&mut self, dt: f64, throttle: f64) -> f64 {
        if self.placements.is_empty() || !(dt > 0.0) {
            return 0.0;
        }

        let mut fuel_usage = self.rated_fuel_flow * throttle;
        let fuel_needed = fuel_usage.abs() * dt;

        if self.fuel >= fuel_needed {
            self.fuel -= fuel_needed;
        } else {
            fuel_usage = (self.fuel / dt).copysign(fuel_usage);
            self.fuel = 0.0;
        }

        self.specific_impulse * fuel_usage / self.placements.len() as f64
    }
}
