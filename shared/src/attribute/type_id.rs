use std::fmt;

/// Wire type of an attribute. Ids and names are fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeTypeId {
    None,
    String,
    Int,
    Real,
    Color,
    Float2,
    Float3,
    Float4,
    Bool,
    UInt,
    Quat,
    AssetReference,
    AssetReferenceList,
    EntityReference,
    Variant,
    VariantList,
    Transform,
    Point,
}

impl AttributeTypeId {
    pub const ALL: [AttributeTypeId; 18] = [
        AttributeTypeId::None,
        AttributeTypeId::String,
        AttributeTypeId::Int,
        AttributeTypeId::Real,
        AttributeTypeId::Color,
        AttributeTypeId::Float2,
        AttributeTypeId::Float3,
        AttributeTypeId::Float4,
        AttributeTypeId::Bool,
        AttributeTypeId::UInt,
        AttributeTypeId::Quat,
        AttributeTypeId::AssetReference,
        AttributeTypeId::AssetReferenceList,
        AttributeTypeId::EntityReference,
        AttributeTypeId::Variant,
        AttributeTypeId::VariantList,
        AttributeTypeId::Transform,
        AttributeTypeId::Point,
    ];

    pub fn from_u8(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn to_u8(self) -> u8 {
        match self {
            AttributeTypeId::None => 0,
            AttributeTypeId::String => 1,
            AttributeTypeId::Int => 2,
            AttributeTypeId::Real => 3,
            AttributeTypeId::Color => 4,
            AttributeTypeId::Float2 => 5,
            AttributeTypeId::Float3 => 6,
            AttributeTypeId::Float4 => 7,
            AttributeTypeId::Bool => 8,
            AttributeTypeId::UInt => 9,
            AttributeTypeId::Quat => 10,
            AttributeTypeId::AssetReference => 11,
            AttributeTypeId::AssetReferenceList => 12,
            AttributeTypeId::EntityReference => 13,
            AttributeTypeId::Variant => 14,
            AttributeTypeId::VariantList => 15,
            AttributeTypeId::Transform => 16,
            AttributeTypeId::Point => 17,
        }
    }

    /// Canonical type name as used in scene files and on the wire.
    pub fn name(self) -> &'static str {
        match self {
            AttributeTypeId::None => "",
            AttributeTypeId::String => "string",
            AttributeTypeId::Int => "int",
            AttributeTypeId::Real => "real",
            AttributeTypeId::Color => "Color",
            AttributeTypeId::Float2 => "float2",
            AttributeTypeId::Float3 => "float3",
            AttributeTypeId::Float4 => "float4",
            AttributeTypeId::Bool => "bool",
            AttributeTypeId::UInt => "uint",
            AttributeTypeId::Quat => "Quat",
            AttributeTypeId::AssetReference => "AssetReference",
            AttributeTypeId::AssetReferenceList => "AssetReferenceList",
            AttributeTypeId::EntityReference => "EntityReference",
            AttributeTypeId::Variant => "QVariant",
            AttributeTypeId::VariantList => "QVariantList",
            AttributeTypeId::Transform => "Transform",
            AttributeTypeId::Point => "QPoint",
        }
    }

    /// Case-insensitive lookup. `variant`, `variantlist` and `point` are
    /// accepted for the Qt prefixed names.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "variant" => return Some(AttributeTypeId::Variant),
            "variantlist" => return Some(AttributeTypeId::VariantList),
            "point" => return Some(AttributeTypeId::Point),
            "" => return None,
            _ => {}
        }
        Self::ALL
            .iter()
            .skip(1)
            .find(|type_id| type_id.name().eq_ignore_ascii_case(&lower))
            .copied()
    }

    /// Fixed payload size in bytes, `None` for types with a length header.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            AttributeTypeId::Int | AttributeTypeId::Real | AttributeTypeId::UInt => Some(4),
            AttributeTypeId::Bool => Some(1),
            AttributeTypeId::Float2 | AttributeTypeId::Point => Some(8),
            AttributeTypeId::Float3 => Some(12),
            AttributeTypeId::Color | AttributeTypeId::Float4 | AttributeTypeId::Quat => Some(16),
            AttributeTypeId::Transform => Some(36),
            AttributeTypeId::None => Some(0),
            AttributeTypeId::String
            | AttributeTypeId::AssetReference
            | AttributeTypeId::AssetReferenceList
            | AttributeTypeId::EntityReference
            | AttributeTypeId::Variant
            | AttributeTypeId::VariantList => None,
        }
    }

    /// Size of the length header in front of variable sized payloads.
    pub fn header_size_bytes(self) -> usize {
        match self {
            AttributeTypeId::String => 2,
            AttributeTypeId::AssetReference
            | AttributeTypeId::AssetReferenceList
            | AttributeTypeId::EntityReference
            | AttributeTypeId::Variant
            | AttributeTypeId::VariantList => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for AttributeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
