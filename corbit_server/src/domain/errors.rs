use std::fmt;

// Domain-level errors raised while constructing bodies and engine systems.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyError {
    NonPositiveMass(f64),
    NonPositiveRadius(f64),
    NegativeFuel(f64),
    NonPositiveFuelFlow(f64),
    DegenerateThrustDirection,
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::NonPositiveMass(mass) => write!(f, "mass must be positive, got {mass}"),
            BodyError::NonPositiveRadius(radius) => {
                write!(f, "radius must be positive, got {radius}")
            }
            BodyError::NegativeFuel(fuel) => write!(f, "fuel must not be negative, got {fuel}"),
            BodyError::NonPositiveFuelFlow(flow) => {
                write!(f, "rated fuel flow must be positive, got {flow}")
            }
            BodyError::DegenerateThrustDirection => {
                write!(f, "engine placement has a zero-length thrust direction")
            }
        }
    }
}

impl std::error::Error for BodyError {}

// Raised when a propulsion command targets a body without the needed engines.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingEngineSystem {
    pub body: String,
    pub class: &'static str,
}

impl fmt::Display for MissingEngineSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body {} has no {} engine system", self.body, self.class)
    }
}

impl std::error::Error for MissingEngineSystem {}
