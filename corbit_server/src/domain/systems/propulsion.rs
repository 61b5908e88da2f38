// Turns engine burns into forces on a habitat.

use crate::domain::body::Body;
use crate::domain::engine::{MAIN_ENGINES, RCS};
use crate::domain::errors::MissingEngineSystem;
use glam::DVec2;

// Burns `class` for `dt` (at `throttle`, or the stored throttle when `None`)
// and returns the per-placement share plus the world-frame placement bearings.
fn burn(
    body: &mut Body,
    class: &'static str,
    dt: f64,
    throttle: Option<f64>,
) -> Result<(f64, Vec<f64>), MissingEngineSystem> {
    let heading = body.angular_position;
    let name = body.name.clone();
    let system = body
        .engine_system_mut(class)
        .ok_or(MissingEngineSystem { body: name, class })?;

    let share = match throttle {
        Some(throttle) => system.pulse(dt, throttle),
        None => system.thrust(dt),
    };
    let bearings = system
        .placements()
        .iter()
        .map(|p| p.angle + heading)
        .collect();
    Ok((share, bearings))
}

/// Applies one tick of main-engine thrust at the stored throttle, pushing
/// along the current heading from every placement.
pub fn burn_main_engines(body: &mut Body, dt: f64) -> Result<(), MissingEngineSystem> {
    let (share, bearings) = burn(body, MAIN_ENGINES, dt, None)?;
    if share == 0.0 {
        return Ok(());
    }

    let force = DVec2::from_angle(body.angular_position) * share;
    for bearing in bearings {
        body.accelerate(force, bearing);
    }
    Ok(())
}

/// Fires the RCS at full throttle for one tick along `direction`, measured
/// from the habitat's heading.
pub fn fire_rcs(body: &mut Body, direction: f64, dt: f64) -> Result<(), MissingEngineSystem> {
    let (share, bearings) = burn(body, RCS, dt, Some(1.0))?;

    let force = DVec2::from_angle(direction + body.angular_position) * share;
    for bearing in bearings {
        body.accelerate(force, bearing);
    }
    Ok(())
}

/// One-shot vernier burn of the RCS scaled by `amount`. Each placement pushes
/// tangentially to the hull, so the habitat spins; the sign of `amount`
/// picks the direction.
pub fn fire_verniers(body: &mut Body, amount: f64, dt: f64) -> Result<(), MissingEngineSystem> {
    let (share, bearings) = burn(body, RCS, dt, Some(amount))?;

    for bearing in bearings {
        let force = DVec2::new(-bearing.sin(), bearing.cos()) * share;
        body.accelerate(force, bearing);
    }
    Ok(())
}
