use std::f32::consts::PI;

use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, Float3, Quat, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

const POSITION_FULL: u32 = 2;
const POSITION_SEND_TYPES: u32 = 3;
const ROTATION_ANGLE_AXIS: u32 = 3;
const ROTATION_SEND_TYPES: u32 = 4;
const ANGLE_BITS: u8 = 10;
const AXIS_YAW_BITS: u8 = 11;
const AXIS_PITCH_BITS: u8 = 10;

/// Where the client looks from, for the server's interest management.
/// Always sent as a full position and a quantized angle-axis rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPositionMessage {
    pub position: Float3,
    pub orientation: Quat,
}

impl ObserverPositionMessage {
    pub fn new(position: Float3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// Angle in `[0, PI]` and unit axis of a rotation. Angles past PI are
/// folded by flipping the axis.
pub fn angle_axis(orientation: Quat) -> (f32, Float3) {
    let q = orientation.normalized();
    let mut angle = q.w.clamp(-1.0, 1.0).acos() * 2.0;
    let sin = (angle * 0.5).sin();
    let mut axis = if sin.abs() > 0.00001 {
        Float3::new(q.x / sin, q.y / sin, q.z / sin)
    } else {
        angle = 0.0;
        Float3::new(1.0, 0.0, 0.0)
    };
    if angle >= PI {
        axis = Float3::new(-axis.x, -axis.y, -axis.z);
        angle = 2.0 * PI - angle;
    }
    (angle, axis)
}

impl NetworkMessage for ObserverPositionMessage {
    fn id(&self) -> MessageId {
        message_id::OBSERVER_POSITION
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        // scene id
        writer.write_vle(0)?;
        writer.write_arithmetic_encoded(
            8,
            &[
                (POSITION_FULL, POSITION_SEND_TYPES),
                (ROTATION_ANGLE_AXIS, ROTATION_SEND_TYPES),
            ],
        )?;
        writer.write_f32(self.position.x)?;
        writer.write_f32(self.position.y)?;
        writer.write_f32(self.position.z)?;

        let (angle, axis) = angle_axis(self.orientation);
        writer.write_quantized_float(0.0, PI, ANGLE_BITS, angle)?;
        writer.write_normalized_vector3(axis.x, axis.y, axis.z, AXIS_YAW_BITS, AXIS_PITCH_BITS)
    }
}

impl IncomingMessage for ObserverPositionMessage {
    const ID: MessageId = message_id::OBSERVER_POSITION;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let _scene_id = reader.read_vle()?;
        let _send_types = reader.read_arithmetic_encoded(8, &[POSITION_SEND_TYPES, ROTATION_SEND_TYPES])?;
        let position = Float3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?);
        let angle = reader.read_quantized_float(0.0, PI, ANGLE_BITS)?;
        let (x, y, z) = reader.read_normalized_vector3(AXIS_YAW_BITS, AXIS_PITCH_BITS)?;
        Ok(Self::new(position, Quat::from_axis_angle(Float3::new(x, y, z), angle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, tolerance: f32) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn layout_and_size() {
        let message = ObserverPositionMessage::new(Float3::new(1.0, 2.0, 3.0), Quat::IDENTITY)
            .serialize()
            .unwrap();
        // id 16 + scene 8 + types 8 + position 96 + angle 10 + axis 21 bits
        assert_eq!(message.len(), 20);
        let bytes = message.buffer().unwrap();
        assert_eq!(&bytes[..4], &[105, 0, 0, 2 * 4 + 3]);
        assert_eq!(&bytes[4..8], &1.0f32.to_le_bytes());
    }

    #[test]
    fn rotation_survives_quantization() {
        let orientation = Quat::from_axis_angle(Float3::new(0.0, 1.0, 0.0), 1.0);
        let message = ObserverPositionMessage::new(Float3::new(-4.5, 0.0, 12.25), orientation)
            .serialize()
            .unwrap();
        let bytes = message.buffer().unwrap();
        let read = ObserverPositionMessage::deserialize(&mut Deserializer::new(&bytes[2..])).unwrap();
        assert_eq!(read.position, Float3::new(-4.5, 0.0, 12.25));
        assert!(close(read.orientation.w, orientation.w, 0.01));
        assert!(close(read.orientation.y, orientation.y, 0.01));
    }

    #[test]
    fn large_angles_flip_the_axis() {
        let orientation = Quat::from_axis_angle(Float3::new(0.0, 0.0, 1.0), 1.5 * PI);
        let (angle, axis) = angle_axis(orientation);
        assert!(close(angle, 0.5 * PI, 0.001));
        assert!(close(axis.z, -1.0, 0.001));

        let (angle, axis) = angle_axis(Quat::IDENTITY);
        assert_eq!(angle, 0.0);
        assert_eq!(axis, Float3::new(1.0, 0.0, 0.0));
    }
}
