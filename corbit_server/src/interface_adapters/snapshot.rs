// Persisted snapshot document: DTOs, decode/encode and the file-backed store.

use crate::domain::{
    Body, BodyError, BodyKind, EngineSystem, EngineSystems, Kinematics, Placement, SnapshotStore,
};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, fs, io, path::Path};
use tracing::warn;

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Json(serde_json::Error),
    // A record parsed but describes a body that cannot be simulated.
    InvalidBody { name: String, source: BodyError },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "snapshot io error: {e}"),
            SnapshotError::Json(e) => write!(f, "snapshot is not valid json: {e}"),
            SnapshotError::InvalidBody { name, source } => {
                write!(f, "body {name} is invalid: {source}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Json(e) => Some(e),
            SnapshotError::InvalidBody { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Json(e)
    }
}

/// One free-flying body record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDto {
    pub name: String,
    pub color: [u8; 3],
    pub mass: f64,
    pub radius: f64,
    pub displacement: [f64; 2],
    pub velocity: [f64; 2],
    pub acceleration: [f64; 2],
    // Older saves predate rotation.
    #[serde(rename = "angular position", default)]
    pub angular_position: f64,
    #[serde(rename = "angular speed", default)]
    pub angular_speed: f64,
    #[serde(rename = "angular acceleration", default)]
    pub angular_acceleration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSystemDto {
    pub class: String,
    pub fuel: f64,
    #[serde(rename = "rated fuel flow")]
    pub rated_fuel_flow: f64,
    #[serde(rename = "specific impulse")]
    pub specific_impulse: f64,
    #[serde(default)]
    pub throttle: f64,
    /// `[mount angle, [dx, dy]]` pairs.
    pub placements: Vec<(f64, [f64; 2])>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitatDto {
    #[serde(flatten)]
    pub entity: EntityDto,
    #[serde(rename = "engine systems")]
    pub engine_systems: Vec<EngineSystemDto>,
}

/// The whole document as written on export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotDto {
    pub entities: Vec<EntityDto>,
    pub habitats: Vec<HabitatDto>,
}

// Records stay untyped until each one is decoded on its own.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    habitats: Vec<Value>,
}

impl From<&Body> for EntityDto {
    fn from(body: &Body) -> Self {
        Self {
            name: body.name.clone(),
            color: body.color,
            mass: body.dry_mass(),
            radius: body.radius(),
            displacement: body.displacement.to_array(),
            velocity: body.velocity.to_array(),
            acceleration: body.acceleration.to_array(),
            angular_position: body.angular_position,
            angular_speed: body.angular_speed,
            angular_acceleration: body.angular_acceleration,
        }
    }
}

impl EntityDto {
    fn kinematics(&self) -> Kinematics {
        Kinematics {
            displacement: DVec2::from_array(self.displacement),
            velocity: DVec2::from_array(self.velocity),
            acceleration: DVec2::from_array(self.acceleration),
            angular_position: self.angular_position,
            angular_speed: self.angular_speed,
            angular_acceleration: self.angular_acceleration,
        }
    }

    pub fn into_body(self, kind: BodyKind) -> Result<Body, BodyError> {
        let kinematics = self.kinematics();
        Body::new(
            self.name,
            self.color,
            self.mass,
            self.radius,
            kinematics,
            kind,
        )
    }
}

impl From<(&str, &EngineSystem)> for EngineSystemDto {
    fn from((class, system): (&str, &EngineSystem)) -> Self {
        Self {
            class: class.to_string(),
            fuel: system.fuel,
            rated_fuel_flow: system.rated_fuel_flow,
            specific_impulse: system.specific_impulse,
            throttle: system.throttle,
            placements: system
                .placements()
                .iter()
                .map(|p| (p.angle, p.direction.to_array()))
                .collect(),
        }
    }
}

impl EngineSystemDto {
    pub fn into_engine_system(self) -> Result<(String, EngineSystem), BodyError> {
        let placements = self
            .placements
            .into_iter()
            .map(|(angle, direction)| Placement::new(angle, DVec2::from_array(direction)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut system = EngineSystem::new(
            self.fuel,
            self.rated_fuel_flow,
            self.specific_impulse,
            placements,
        )?;
        system.throttle = self.throttle;
        Ok((self.class, system))
    }
}

impl HabitatDto {
    pub fn into_body(self) -> Result<Body, BodyError> {
        let engine_systems = self
            .engine_systems
            .into_iter()
            .map(EngineSystemDto::into_engine_system)
            .collect::<Result<EngineSystems, _>>()?;
        self.entity.into_body(BodyKind::Habitat { engine_systems })
    }
}

impl From<&[Body]> for SnapshotDto {
    fn from(bodies: &[Body]) -> Self {
        let mut dto = SnapshotDto::default();
        for body in bodies {
            let entity = EntityDto::from(body);
            match &body.kind {
                BodyKind::Entity => dto.entities.push(entity),
                BodyKind::Habitat { engine_systems } => dto.habitats.push(HabitatDto {
                    entity,
                    engine_systems: engine_systems
                        .iter()
                        .map(|(class, system)| EngineSystemDto::from((class.as_str(), system)))
                        .collect(),
                }),
            }
        }
        dto
    }
}

/// Parses a snapshot document. Records missing required fields are skipped
/// with a warning; a record describing an impossible body fails the load.
pub fn decode_snapshot(text: &str) -> Result<Vec<Body>, SnapshotError> {
    let raw: RawDocument = serde_json::from_str(text)?;
    let mut bodies = Vec::with_capacity(raw.entities.len() + raw.habitats.len());

    for record in raw.entities {
        let Some(dto) = decode_record::<EntityDto>(record, "entity") else {
            continue;
        };
        let name = dto.name.clone();
        let body = dto
            .into_body(BodyKind::Entity)
            .map_err(|source| SnapshotError::InvalidBody { name, source })?;
        bodies.push(body);
    }

    for record in raw.habitats {
        let Some(dto) = decode_record::<HabitatDto>(record, "habitat") else {
            continue;
        };
        let name = dto.entity.name.clone();
        let body = dto
            .into_body()
            .map_err(|source| SnapshotError::InvalidBody { name, source })?;
        bodies.push(body);
    }

    Ok(bodies)
}

fn decode_record<T: for<'de> Deserialize<'de>>(record: Value, kind: &'static str) -> Option<T> {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();
    match serde_json::from_value(record) {
        Ok(dto) => Some(dto),
        Err(e) => {
            warn!(kind, body = %name, error = %e, "skipping malformed snapshot record");
            None
        }
    }
}

/// Entities first, then habitats, in list order.
pub fn encode_snapshot(bodies: &[Body]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SnapshotDto::from(bodies))
}

pub fn read_snapshot_file(path: impl AsRef<Path>) -> Result<Vec<Body>, SnapshotError> {
    let text = fs::read_to_string(path)?;
    decode_snapshot(&text)
}

pub fn write_snapshot_file(path: impl AsRef<Path>, bodies: &[Body]) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&SnapshotDto::from(bodies))?;
    fs::write(path, text)?;
    Ok(())
}

/// Snapshot store over JSON files on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotFiles;

impl SnapshotStore for JsonSnapshotFiles {
    fn load(&self, path: &str) -> Result<Vec<Body>, String> {
        read_snapshot_file(path).map_err(|e| e.to_string())
    }

    fn save(&self, path: &str, bodies: &[Body]) -> Result<(), String> {
        write_snapshot_file(path, bodies).map_err(|e| e.to_string())
    }
}
