//! Text form of attribute values, as found in scene documents and editor fields.

use super::{
    type_id::AttributeTypeId,
    value::{AttributeValue, Color, Float2, Float3, Float4, Point, Quat, Transform},
};

impl AttributeValue {
    /// Parses `text` as a value of `type_id`. `None` if the text does not fit
    /// the type.
    pub fn from_text(type_id: AttributeTypeId, text: &str) -> Option<Self> {
        let trimmed = text.trim();
        Some(match type_id {
            AttributeTypeId::None => AttributeValue::None,
            AttributeTypeId::String => AttributeValue::String(text.to_string()),
            AttributeTypeId::AssetReference => AttributeValue::AssetReference(text.to_string()),
            AttributeTypeId::EntityReference => AttributeValue::EntityReference(text.to_string()),
            AttributeTypeId::Variant => AttributeValue::Variant(text.to_string()),
            AttributeTypeId::AssetReferenceList => AttributeValue::AssetReferenceList(split_list(text)),
            AttributeTypeId::VariantList => AttributeValue::VariantList(split_list(text)),
            AttributeTypeId::Int => AttributeValue::Int(parse_int(trimmed)?),
            AttributeTypeId::UInt => AttributeValue::UInt(trimmed.parse().ok()?),
            AttributeTypeId::Real => AttributeValue::Real(trimmed.parse().ok()?),
            AttributeTypeId::Bool => AttributeValue::Bool(parse_bool(trimmed)?),
            AttributeTypeId::Float2 => {
                let [x, y] = parse_floats::<2>(trimmed)?;
                AttributeValue::Float2(Float2 { x, y })
            }
            AttributeTypeId::Float3 => {
                let [x, y, z] = parse_floats::<3>(trimmed)?;
                AttributeValue::Float3(Float3 { x, y, z })
            }
            AttributeTypeId::Float4 => {
                let [x, y, z, w] = parse_floats::<4>(trimmed)?;
                AttributeValue::Float4(Float4 { x, y, z, w })
            }
            AttributeTypeId::Quat => {
                let [x, y, z, w] = parse_floats::<4>(trimmed)?;
                AttributeValue::Quat(Quat { x, y, z, w })
            }
            AttributeTypeId::Color => AttributeValue::Color(parse_color(trimmed)?),
            AttributeTypeId::Transform => AttributeValue::Transform(parse_transform(trimmed)?),
            AttributeTypeId::Point => {
                let mut parts = trimmed.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty());
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                AttributeValue::Point(Point { x, y })
            }
        })
    }

    /// Formats the value so that [`AttributeValue::from_text`] reads it back.
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::None => String::new(),
            AttributeValue::String(value)
            | AttributeValue::AssetReference(value)
            | AttributeValue::EntityReference(value)
            | AttributeValue::Variant(value) => value.clone(),
            AttributeValue::AssetReferenceList(values) | AttributeValue::VariantList(values) => {
                values.join(";")
            }
            AttributeValue::Int(value) => value.to_string(),
            AttributeValue::UInt(value) => value.to_string(),
            AttributeValue::Real(value) => value.to_string(),
            AttributeValue::Bool(value) => value.to_string(),
            AttributeValue::Float2(value) => join_floats(&[value.x, value.y], " "),
            AttributeValue::Float3(value) => join_floats(&[value.x, value.y, value.z], " "),
            AttributeValue::Float4(value) => join_floats(&[value.x, value.y, value.z, value.w], " "),
            AttributeValue::Quat(value) => join_floats(&[value.x, value.y, value.z, value.w], " "),
            AttributeValue::Color(color) => join_floats(&[color.r, color.g, color.b, color.a], " "),
            AttributeValue::Transform(transform) => join_floats(
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
                ",",
            ),
            AttributeValue::Point(point) => format!("{} {}", point.x, point.y),
        }
    }
}

fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(';').map(str::to_string).collect()
}

fn parse_int(text: &str) -> Option<i32> {
    text.parse().ok().or_else(|| {
        // whole-valued reals are accepted for ints
        let real: f64 = text.parse().ok()?;
        (real.fract() == 0.0 && real >= f64::from(i32::MIN) && real <= f64::from(i32::MAX))
            .then_some(real as i32)
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Numbers separated by commas or whitespace.
fn parse_float_list(text: &str) -> Option<Vec<f32>> {
    let separator = if text.contains(',') { ',' } else { ' ' };
    text.split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f32>().ok())
        .collect()
}

fn parse_floats<const N: usize>(text: &str) -> Option<[f32; N]> {
    parse_float_list(text)?.try_into().ok()
}

fn parse_color(text: &str) -> Option<Color> {
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| -> Option<f32> {
            u8::from_str_radix(&hex[range], 16).ok().map(|v| f32::from(v) / 255.0)
        };
        return Some(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0));
    }
    if let Some(inner) = lower.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
        let [r, g, b] = parse_floats::<3>(inner)?;
        let scale = |v: f32| if v > 1.0 { v / 255.0 } else { v };
        return Some(Color::new(scale(r), scale(g), scale(b), 1.0));
    }
    match parse_float_list(text)?.as_slice() {
        [r, g, b] => Some(Color::new(*r, *g, *b, 1.0)),
        [r, g, b, a] => Some(Color::new(*r, *g, *b, *a)),
        _ => None,
    }
}

fn parse_transform(text: &str) -> Option<Transform> {
    let values = parse_float_list(text)?;
    let float3 = |at: usize| Float3::new(values[at], values[at + 1], values[at + 2]);
    let mut transform = Transform::default();
    match values.len() {
        3 => transform.pos = float3(0),
        6 => {
            transform.pos = float3(0);
            transform.rot = float3(3);
        }
        9 => {
            transform.pos = float3(0);
            transform.rot = float3(3);
            transform.scale = float3(6);
        }
        _ => return None,
    }
    Some(transform)
}

fn join_floats(values: &[f32], separator: &str) -> String {
    values
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
