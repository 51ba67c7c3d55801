use tundra_serde::{BitWrite, Deserializer, SerdeErr, StringHeader};

use super::type_id::AttributeTypeId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Float3 {
    pub const ZERO: Float3 = Float3::new(0.0, 0.0, 0.0);
    pub const ONE: Float3 = Float3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Linear color, components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation of `angle` radians around a unit `axis`.
    pub fn from_axis_angle(axis: Float3, angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
            w: cos,
        }
    }

    /// From Euler angles in degrees, applied in Z, Y, X order.
    pub fn from_euler_degrees(euler: Float3) -> Self {
        let (s1, c1) = (euler.x.to_radians() * 0.5).sin_cos();
        let (s2, c2) = (euler.y.to_radians() * 0.5).sin_cos();
        let (s3, c3) = (euler.z.to_radians() * 0.5).sin_cos();
        Self {
            x: s1 * c2 * c3 - c1 * s2 * s3,
            y: c1 * s2 * c3 + s1 * c2 * s3,
            z: c1 * c2 * s3 - s1 * s2 * c3,
            w: c1 * c2 * c3 + s1 * s2 * s3,
        }
    }

    /// Euler angles in degrees, inverse of `from_euler_degrees`.
    pub fn to_euler_degrees(self) -> Float3 {
        let q = self.normalized();
        let m11 = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
        let m12 = 2.0 * (q.x * q.y - q.w * q.z);
        let m21 = 2.0 * (q.x * q.y + q.w * q.z);
        let m22 = 1.0 - 2.0 * (q.x * q.x + q.z * q.z);
        let m31 = 2.0 * (q.x * q.z - q.w * q.y);
        let m32 = 2.0 * (q.y * q.z + q.w * q.x);
        let m33 = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
        euler_from_matrix(m11, m12, m21, m22, m31, m32, m33)
    }

    pub fn normalized(self) -> Self {
        let length = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if length == 0.0 {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / length,
            y: self.y / length,
            z: self.z / length,
            w: self.w / length,
        }
    }
}

// Z, Y, X order extraction from rotation matrix elements, in degrees
fn euler_from_matrix(m11: f32, m12: f32, m21: f32, m22: f32, m31: f32, m32: f32, m33: f32) -> Float3 {
    let y = (-m31.clamp(-1.0, 1.0)).asin();
    let (x, z) = if m31.abs() < 0.999_999_9 {
        (m32.atan2(m33), m21.atan2(m11))
    } else {
        (0.0, (-m12).atan2(m22))
    };
    Float3::new(x.to_degrees() % 360.0, y.to_degrees() % 360.0, z.to_degrees() % 360.0)
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position, Euler rotation in degrees and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pos: Float3,
    pub rot: Float3,
    pub scale: Float3,
}

impl Transform {
    pub fn new(pos: Float3, rot: Float3, scale: Float3) -> Self {
        Self { pos, rot, scale }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler_degrees(self.rot)
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.rot = orientation.to_euler_degrees();
    }

    /// Turns the transform to face along `forward`, +Y up.
    pub fn look_at(&mut self, forward: Float3) {
        // basis columns: z points away from the target
        let mut z = normalize([-forward.x, -forward.y, -forward.z]);
        if z == [0.0; 3] {
            z = [0.0, 0.0, 1.0];
        }
        let mut x = cross([0.0, 1.0, 0.0], z);
        if length(x) == 0.0 {
            // forward parallel to up
            z[2] += 0.0001;
            z = normalize(z);
            x = cross([0.0, 1.0, 0.0], z);
        }
        let x = normalize(x);
        let y = cross(z, x);
        self.rot = euler_from_matrix(x[0], y[0], x[1], y[1], x[2], y[2], z[2]);
    }
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = length(v);
    if len == 0.0 {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pos: Float3::ZERO,
            rot: Float3::ZERO,
            scale: Float3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Typed payload of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    None,
    String(String),
    Int(i32),
    Real(f32),
    Color(Color),
    Float2(Float2),
    Float3(Float3),
    Float4(Float4),
    Bool(bool),
    UInt(u32),
    Quat(Quat),
    AssetReference(String),
    AssetReferenceList(Vec<String>),
    EntityReference(String),
    Variant(String),
    VariantList(Vec<String>),
    Transform(Transform),
    Point(Point),
}

impl AttributeValue {
    pub fn type_id(&self) -> AttributeTypeId {
        match self {
            AttributeValue::None => AttributeTypeId::None,
            AttributeValue::String(_) => AttributeTypeId::String,
            AttributeValue::Int(_) => AttributeTypeId::Int,
            AttributeValue::Real(_) => AttributeTypeId::Real,
            AttributeValue::Color(_) => AttributeTypeId::Color,
            AttributeValue::Float2(_) => AttributeTypeId::Float2,
            AttributeValue::Float3(_) => AttributeTypeId::Float3,
            AttributeValue::Float4(_) => AttributeTypeId::Float4,
            AttributeValue::Bool(_) => AttributeTypeId::Bool,
            AttributeValue::UInt(_) => AttributeTypeId::UInt,
            AttributeValue::Quat(_) => AttributeTypeId::Quat,
            AttributeValue::AssetReference(_) => AttributeTypeId::AssetReference,
            AttributeValue::AssetReferenceList(_) => AttributeTypeId::AssetReferenceList,
            AttributeValue::EntityReference(_) => AttributeTypeId::EntityReference,
            AttributeValue::Variant(_) => AttributeTypeId::Variant,
            AttributeValue::VariantList(_) => AttributeTypeId::VariantList,
            AttributeValue::Transform(_) => AttributeTypeId::Transform,
            AttributeValue::Point(_) => AttributeTypeId::Point,
        }
    }

    /// The empty value of a type.
    pub fn default_for(type_id: AttributeTypeId) -> Self {
        match type_id {
            AttributeTypeId::None => AttributeValue::None,
            AttributeTypeId::String => AttributeValue::String(String::new()),
            AttributeTypeId::Int => AttributeValue::Int(0),
            AttributeTypeId::Real => AttributeValue::Real(0.0),
            AttributeTypeId::Color => AttributeValue::Color(Color::default()),
            AttributeTypeId::Float2 => AttributeValue::Float2(Float2::default()),
            AttributeTypeId::Float3 => AttributeValue::Float3(Float3::default()),
            AttributeTypeId::Float4 => AttributeValue::Float4(Float4::default()),
            AttributeTypeId::Bool => AttributeValue::Bool(false),
            AttributeTypeId::UInt => AttributeValue::UInt(0),
            AttributeTypeId::Quat => AttributeValue::Quat(Quat::IDENTITY),
            AttributeTypeId::AssetReference => AttributeValue::AssetReference(String::new()),
            AttributeTypeId::AssetReferenceList => AttributeValue::AssetReferenceList(Vec::new()),
            AttributeTypeId::EntityReference => AttributeValue::EntityReference(String::new()),
            AttributeTypeId::Variant => AttributeValue::Variant(String::new()),
            AttributeTypeId::VariantList => AttributeValue::VariantList(Vec::new()),
            AttributeTypeId::Transform => AttributeValue::Transform(Transform::default()),
            AttributeTypeId::Point => AttributeValue::Point(Point::default()),
        }
    }

    /// Decodes a value of `type_id` from the reader.
    pub fn from_binary(type_id: AttributeTypeId, reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        Ok(match type_id {
            AttributeTypeId::None => AttributeValue::None,
            AttributeTypeId::String => AttributeValue::String(reader.read_string_u16()?),
            AttributeTypeId::Int => AttributeValue::Int(reader.read_i32()?),
            AttributeTypeId::Real => AttributeValue::Real(reader.read_f32()?),
            AttributeTypeId::Color => AttributeValue::Color(Color {
                r: reader.read_f32()?,
                g: reader.read_f32()?,
                b: reader.read_f32()?,
                a: reader.read_f32()?,
            }),
            AttributeTypeId::Float2 => AttributeValue::Float2(Float2 {
                x: reader.read_f32()?,
                y: reader.read_f32()?,
            }),
            AttributeTypeId::Float3 => AttributeValue::Float3(read_float3(reader)?),
            AttributeTypeId::Float4 => AttributeValue::Float4(Float4 {
                x: reader.read_f32()?,
                y: reader.read_f32()?,
                z: reader.read_f32()?,
                w: reader.read_f32()?,
            }),
            AttributeTypeId::Bool => AttributeValue::Bool(reader.read_bool()?),
            AttributeTypeId::UInt => AttributeValue::UInt(reader.read_u32()?),
            AttributeTypeId::Quat => AttributeValue::Quat(Quat {
                x: reader.read_f32()?,
                y: reader.read_f32()?,
                z: reader.read_f32()?,
                w: reader.read_f32()?,
            }),
            AttributeTypeId::AssetReference => AttributeValue::AssetReference(reader.read_string_u8()?),
            AttributeTypeId::EntityReference => AttributeValue::EntityReference(reader.read_string_u8()?),
            AttributeTypeId::Variant => AttributeValue::Variant(reader.read_string_u8()?),
            AttributeTypeId::AssetReferenceList => {
                AttributeValue::AssetReferenceList(read_string_list(reader)?)
            }
            AttributeTypeId::VariantList => AttributeValue::VariantList(read_string_list(reader)?),
            AttributeTypeId::Transform => AttributeValue::Transform(Transform {
                pos: read_float3(reader)?,
                rot: read_float3(reader)?,
                scale: read_float3(reader)?,
            }),
            AttributeTypeId::Point => AttributeValue::Point(Point {
                x: reader.read_i32()?,
                y: reader.read_i32()?,
            }),
        })
    }

    /// Encodes the value without any type tag.
    pub fn to_binary(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        match self {
            AttributeValue::None => Ok(()),
            AttributeValue::String(value) => writer.write_string_u16(value),
            AttributeValue::Int(value) => writer.write_i32(*value),
            AttributeValue::Real(value) => writer.write_f32(*value),
            AttributeValue::Color(color) => {
                write_floats(writer, &[color.r, color.g, color.b, color.a])
            }
            AttributeValue::Float2(value) => write_floats(writer, &[value.x, value.y]),
            AttributeValue::Float3(value) => write_floats(writer, &[value.x, value.y, value.z]),
            AttributeValue::Float4(value) => {
                write_floats(writer, &[value.x, value.y, value.z, value.w])
            }
            AttributeValue::Bool(value) => writer.write_bool(*value),
            AttributeValue::UInt(value) => writer.write_u32(*value),
            AttributeValue::Quat(value) => {
                write_floats(writer, &[value.x, value.y, value.z, value.w])
            }
            AttributeValue::AssetReference(value)
            | AttributeValue::EntityReference(value)
            | AttributeValue::Variant(value) => writer.write_string_u8(value),
            AttributeValue::AssetReferenceList(values) | AttributeValue::VariantList(values) => {
                write_string_list(writer, values)
            }
            AttributeValue::Transform(transform) => write_floats(
                writer,
                &[
                    transform.pos.x,
                    transform.pos.y,
                    transform.pos.z,
                    transform.rot.x,
                    transform.rot.y,
                    transform.rot.z,
                    transform.scale.x,
                    transform.scale.y,
                    transform.scale.z,
                ],
            ),
            AttributeValue::Point(point) => {
                writer.write_i32(point.x)?;
                writer.write_i32(point.y)
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value)
            | AttributeValue::AssetReference(value)
            | AttributeValue::EntityReference(value)
            | AttributeValue::Variant(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f32> {
        match self {
            AttributeValue::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float3(&self) -> Option<Float3> {
        match self {
            AttributeValue::Float3(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<Transform> {
        match self {
            AttributeValue::Transform(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::AssetReferenceList(values) | AttributeValue::VariantList(values) => {
                Some(values)
            }
            _ => None,
        }
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::UInt(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Real(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<Float3> for AttributeValue {
    fn from(value: Float3) -> Self {
        AttributeValue::Float3(value)
    }
}

impl From<Quat> for AttributeValue {
    fn from(value: Quat) -> Self {
        AttributeValue::Quat(value)
    }
}

impl From<Color> for AttributeValue {
    fn from(value: Color) -> Self {
        AttributeValue::Color(value)
    }
}

impl From<Transform> for AttributeValue {
    fn from(value: Transform) -> Self {
        AttributeValue::Transform(value)
    }
}

impl From<Point> for AttributeValue {
    fn from(value: Point) -> Self {
        AttributeValue::Point(value)
    }
}

fn read_float3(reader: &mut Deserializer) -> Result<Float3, SerdeErr> {
    Ok(Float3 {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
    })
}

fn read_string_list(reader: &mut Deserializer) -> Result<Vec<String>, SerdeErr> {
    let count = reader.read_u8()?;
    (0..count).map(|_| reader.read_string_u8()).collect()
}

fn write_floats(writer: &mut dyn BitWrite, values: &[f32]) -> Result<(), SerdeErr> {
    writer.check_capacity(values.len() as u64 * 32)?;
    for value in values {
        writer.write_f32(*value)?;
    }
    Ok(())
}

fn write_string_list(writer: &mut dyn BitWrite, values: &[String]) -> Result<(), SerdeErr> {
    let count = u8::try_from(values.len()).map_err(|_| SerdeErr::StringTooLong {
        byte_len: values.len(),
        header_bytes: 1,
    })?;
    let mut bits = 8u64;
    for value in values {
        bits += (StringHeader::U8.size_bytes(value.len())? + value.len()) as u64 * 8;
    }
    writer.check_capacity(bits)?;

    writer.write_u8(count)?;
    for value in values {
        writer.write_string_u8(value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tundra_serde::{BitCounter, Serializer};

    use super::*;

    fn round_trip(value: &AttributeValue) -> AttributeValue {
        let mut counter = BitCounter::new();
        value.to_binary(&mut counter).unwrap();
        let mut writer = Serializer::new(counter.bytes_needed());
        value.to_binary(&mut writer).unwrap();
        assert_eq!(writer.bytes_left(), 0);

        let bytes = writer.into_bytes();
        let mut reader = Deserializer::new(&bytes);
        let decoded = AttributeValue::from_binary(value.type_id(), &mut reader).unwrap();
        assert_eq!(reader.bytes_left(), 0);
        decoded
    }

    #[test]
    fn boundary_values_round_trip() {
        let values = vec![
            AttributeValue::String(String::new()),
            AttributeValue::String("päivää €".to_string()),
            AttributeValue::Int(i32::MIN),
            AttributeValue::Int(i32::MAX),
            AttributeValue::UInt(u32::MAX),
            AttributeValue::Real(f32::INFINITY),
            AttributeValue::Bool(true),
            AttributeValue::Color(Color::new(1.0, 0.5, 0.25, 1.0)),
            AttributeValue::Quat(Quat::IDENTITY),
            AttributeValue::AssetReference("local://mesh.mesh".to_string()),
            AttributeValue::AssetReferenceList(vec!["a.png".to_string(), String::new()]),
            AttributeValue::VariantList(Vec::new()),
            AttributeValue::Transform(Transform::new(
                Float3::new(1.0, -2.0, 3.5),
                Float3::new(0.0, 90.0, 0.0),
                Float3::ONE,
            )),
            AttributeValue::Point(Point { x: -1, y: i32::MAX }),
        ];
        for value in &values {
            assert_eq!(&round_trip(value), value);
        }
    }

    #[test]
    fn nan_round_trips_bitwise() {
        let decoded = round_trip(&AttributeValue::Real(f32::NAN));
        assert!(decoded.as_real().unwrap().is_nan());
    }

    #[test]
    fn fixed_sizes_match_type_table() {
        for type_id in AttributeTypeId::ALL {
            if let Some(size) = type_id.size_bytes() {
                let mut counter = BitCounter::new();
                AttributeValue::default_for(type_id).to_binary(&mut counter).unwrap();
                assert_eq!(counter.bytes_needed(), size, "{}", type_id);
            }
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(
            AttributeValue::default_for(AttributeTypeId::Transform).as_transform().unwrap().scale,
            Float3::ONE
        );
        assert_eq!(
            AttributeValue::default_for(AttributeTypeId::Quat),
            AttributeValue::Quat(Quat::IDENTITY)
        );
        for type_id in AttributeTypeId::ALL {
            assert_eq!(AttributeValue::default_for(type_id).type_id(), type_id);
        }
    }

    #[test]
    fn list_partial_write_leaves_writer_untouched() {
        let mut writer = Serializer::new(4);
        let value = AttributeValue::AssetReferenceList(vec!["abcdef".to_string()]);
        assert!(value.to_binary(&mut writer).is_err());
        assert_eq!(writer.filled_bytes(), 0);
    }

    fn close(a: Float3, b: Float3) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3 && (a.z - b.z).abs() < 1e-3
    }

    #[test]
    fn euler_quat_conversion() {
        let euler = Float3::new(10.0, 20.0, 30.0);
        assert!(close(Quat::from_euler_degrees(euler).to_euler_degrees(), euler));
        assert_eq!(Quat::from_euler_degrees(Float3::ZERO), Quat::IDENTITY);

        let turn = Quat::from_axis_angle(Float3::new(0.0, 1.0, 0.0), 60f32.to_radians());
        let mut transform = Transform::default();
        transform.set_orientation(turn);
        assert!(close(transform.rot, Float3::new(0.0, 60.0, 0.0)));
    }

    #[test]
    fn look_at_forward() {
        let mut transform = Transform::default();
        transform.look_at(Float3::new(0.0, 0.0, -1.0));
        assert!(close(transform.rot, Float3::ZERO));
        transform.look_at(Float3::new(1.0, 0.0, 0.0));
        assert!(close(transform.rot, Float3::new(0.0, -90.0, 0.0)));
    }
}
