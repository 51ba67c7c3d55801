use std::f32::consts::PI;

use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, Float3, Quat, SerdeErr,
};

use super::{angle_axis, IncomingMessage, NetworkMessage};

// send type counts, in the order they are packed
const SEND_TYPE_MAXES: [u32; 5] = [3, 4, 3, 3, 2];

const POSITION_INTEGER_BITS: u8 = 11;
const POSITION_FRACTION_BITS: u8 = 8;
const FORWARD_2D_BITS: u8 = 8;
const FORWARD_YAW_BITS: u8 = 9;
const FORWARD_PITCH_BITS: u8 = 8;
const ANGLE_BITS: u8 = 10;
const AXIS_YAW_BITS: u8 = 11;
const AXIS_PITCH_BITS: u8 = 10;
const VELOCITY_LENGTH_FRACTION_BITS: u8 = 8;

/// Smallest record: VLE entity id plus the packed send types.
pub const MIN_RECORD_BITS: u64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionUpdate {
    #[default]
    None,
    /// Signed fixed point, 11 integer and 8 fraction bits per axis.
    Compact(Float3),
    Full(Float3),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationUpdate {
    #[default]
    None,
    /// Facing direction in the XZ plane.
    Forward2D(Float3),
    Forward(Float3),
    /// Quantized angle and axis.
    Orientation(Quat),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleUpdate {
    #[default]
    None,
    Uniform(f32),
    Full(Float3),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VelocityUpdate {
    #[default]
    None,
    /// Up to 8 units per second.
    Small(Float3),
    /// Up to 1024 units per second.
    Large(Float3),
}

impl VelocityUpdate {
    fn integer_bits(&self) -> u8 {
        match self {
            VelocityUpdate::Large(_) => 10,
            _ => 3,
        }
    }
}

/// Physics state of one entity. Only the parts that are not `None` are on
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidBodyUpdate {
    pub entity_id: u32,
    pub position: PositionUpdate,
    pub rotation: RotationUpdate,
    pub scale: ScaleUpdate,
    pub velocity: VelocityUpdate,
    /// Rotation applied per second.
    pub angular_velocity: Option<Quat>,
}

impl RigidBodyUpdate {
    pub fn new(entity_id: u32) -> Self {
        Self {
            entity_id,
            ..Self::default()
        }
    }

    /// Whether the placement (position, rotation or scale) changes.
    pub fn moves(&self) -> bool {
        self.position != PositionUpdate::None
            || self.rotation != RotationUpdate::None
            || self.scale != ScaleUpdate::None
    }

    fn send_types(&self) -> [u32; 5] {
        let position = match self.position {
            PositionUpdate::None => 0,
            PositionUpdate::Compact(_) => 1,
            PositionUpdate::Full(_) => 2,
        };
        let rotation = match self.rotation {
            RotationUpdate::None => 0,
            RotationUpdate::Forward2D(_) => 1,
            RotationUpdate::Forward(_) => 2,
            RotationUpdate::Orientation(_) => 3,
        };
        let scale = match self.scale {
            ScaleUpdate::None => 0,
            ScaleUpdate::Uniform(_) => 1,
            ScaleUpdate::Full(_) => 2,
        };
        let velocity = match self.velocity {
            VelocityUpdate::None => 0,
            VelocityUpdate::Small(_) => 1,
            VelocityUpdate::Large(_) => 2,
        };
        let angular = u32::from(self.angular_velocity.is_some());
        [position, rotation, scale, velocity, angular]
    }

    pub fn write(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_vle(self.entity_id)?;
        let types = self.send_types();
        let pairs: Vec<(u32, u32)> = types.iter().copied().zip(SEND_TYPE_MAXES).collect();
        writer.write_arithmetic_encoded(8, &pairs)?;

        match self.position {
            PositionUpdate::None => {}
            PositionUpdate::Compact(pos) => {
                for value in [pos.x, pos.y, pos.z] {
                    writer.write_signed_fixed_point(POSITION_INTEGER_BITS, POSITION_FRACTION_BITS, value)?;
                }
            }
            PositionUpdate::Full(pos) => write_float3(writer, pos)?,
        }

        match self.rotation {
            RotationUpdate::None => {}
            RotationUpdate::Forward2D(forward) => {
                writer.write_quantized_float(-PI, PI, FORWARD_2D_BITS, forward.z.atan2(forward.x))?;
            }
            RotationUpdate::Forward(forward) => {
                let dir = normalize(forward);
                writer.write_normalized_vector3(dir.x, dir.y, dir.z, FORWARD_YAW_BITS, FORWARD_PITCH_BITS)?;
            }
            RotationUpdate::Orientation(orientation) => write_angle_axis(writer, orientation)?,
        }

        match self.scale {
            ScaleUpdate::None => {}
            ScaleUpdate::Uniform(scale) => writer.write_f32(scale)?,
            ScaleUpdate::Full(scale) => write_float3(writer, scale)?,
        }

        match self.velocity {
            VelocityUpdate::None => {}
            VelocityUpdate::Small(velocity) | VelocityUpdate::Large(velocity) => {
                let length = (velocity.x * velocity.x + velocity.y * velocity.y + velocity.z * velocity.z).sqrt();
                let pattern = writer.write_unsigned_fixed_point(
                    self.velocity.integer_bits(),
                    VELOCITY_LENGTH_FRACTION_BITS,
                    length,
                )?;
                if pattern != 0 {
                    writer.write_normalized_vector3(
                        velocity.x / length,
                        velocity.y / length,
                        velocity.z / length,
                        AXIS_YAW_BITS,
                        AXIS_PITCH_BITS,
                    )?;
                }
            }
        }

        if let Some(angular) = self.angular_velocity {
            write_angle_axis(writer, angular)?;
        }
        Ok(())
    }

    pub fn read(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let entity_id = reader.read_vle()?;
        let types = reader.read_arithmetic_encoded(8, &SEND_TYPE_MAXES)?;
        let mut update = Self::new(entity_id);

        update.position = match types[0] {
            1 => {
                let mut axes = [0.0; 3];
                for axis in axes.iter_mut() {
                    *axis = reader.read_signed_fixed_point(POSITION_INTEGER_BITS, POSITION_FRACTION_BITS)?;
                }
                PositionUpdate::Compact(Float3::new(axes[0], axes[1], axes[2]))
            }
            2 => PositionUpdate::Full(read_float3(reader)?),
            _ => PositionUpdate::None,
        };

        update.rotation = match types[1] {
            1 => {
                let (x, z) = reader.read_normalized_vector2(FORWARD_2D_BITS)?;
                RotationUpdate::Forward2D(Float3::new(x, 0.0, z))
            }
            2 => {
                let (x, y, z) = reader.read_normalized_vector3(FORWARD_YAW_BITS, FORWARD_PITCH_BITS)?;
                RotationUpdate::Forward(Float3::new(x, y, z))
            }
            3 => RotationUpdate::Orientation(read_angle_axis(reader)?),
            _ => RotationUpdate::None,
        };

        update.scale = match types[2] {
            1 => ScaleUpdate::Uniform(reader.read_f32()?),
            2 => ScaleUpdate::Full(read_float3(reader)?),
            _ => ScaleUpdate::None,
        };

        update.velocity = match types[3] {
            1 => VelocityUpdate::Small(read_velocity(reader, 3)?),
            2 => VelocityUpdate::Large(read_velocity(reader, 10)?),
            _ => VelocityUpdate::None,
        };

        if types[4] == 1 {
            update.angular_velocity = Some(read_angle_axis(reader)?);
        }
        Ok(update)
    }
}

fn write_float3(writer: &mut dyn BitWrite, value: Float3) -> Result<(), SerdeErr> {
    writer.write_f32(value.x)?;
    writer.write_f32(value.y)?;
    writer.write_f32(value.z)
}

fn read_float3(reader: &mut Deserializer) -> Result<Float3, SerdeErr> {
    Ok(Float3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?))
}

// a zero angle carries no axis
fn write_angle_axis(writer: &mut dyn BitWrite, orientation: Quat) -> Result<(), SerdeErr> {
    let (angle, axis) = angle_axis(orientation);
    let pattern = writer.write_quantized_float(0.0, PI, ANGLE_BITS, angle)?;
    if pattern != 0 {
        writer.write_normalized_vector3(axis.x, axis.y, axis.z, AXIS_YAW_BITS, AXIS_PITCH_BITS)?;
    }
    Ok(())
}

fn read_angle_axis(reader: &mut Deserializer) -> Result<Quat, SerdeErr> {
    let pattern = reader.read_bits(ANGLE_BITS)?;
    if pattern == 0 {
        return Ok(Quat::IDENTITY);
    }
    let angle = pattern as f32 * PI / 1023.0;
    let (x, y, z) = reader.read_normalized_vector3(AXIS_YAW_BITS, AXIS_PITCH_BITS)?;
    Ok(Quat::from_axis_angle(Float3::new(x, y, z), angle))
}

fn read_velocity(reader: &mut Deserializer, integer_bits: u8) -> Result<Float3, SerdeErr> {
    let (x, y, z) = reader.read_vector3(AXIS_YAW_BITS, AXIS_PITCH_BITS, integer_bits, VELOCITY_LENGTH_FRACTION_BITS)?;
    Ok(Float3::new(x, y, z))
}

fn normalize(v: Float3) -> Float3 {
    let length = (v.x * v.x + v.y * v.y + v.z * v.z).sqrt();
    if length == 0.0 {
        return Float3::new(0.0, 0.0, 1.0);
    }
    Float3::new(v.x / length, v.y / length, v.z / length)
}

/// Server-authoritative physics updates, any number of entities packed
/// back to back on bit boundaries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RigidBodyUpdateMessage {
    pub updates: Vec<RigidBodyUpdate>,
}

impl NetworkMessage for RigidBodyUpdateMessage {
    fn id(&self) -> MessageId {
        message_id::RIGID_BODY_UPDATE
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        for update in &self.updates {
            update.write(writer)?;
        }
        Ok(())
    }
}

impl IncomingMessage for RigidBodyUpdateMessage {
    const ID: MessageId = message_id::RIGID_BODY_UPDATE;

    /// Reads records while a whole one can still follow. Padding at the end
    /// of the last byte is shorter than that.
    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let mut updates = Vec::new();
        while reader.bits_left() >= MIN_RECORD_BITS {
            updates.push(RigidBodyUpdate::read(reader)?);
        }
        Ok(Self { updates })
    }
}
