use std::fmt;

use crate::attribute::{Attribute, AttributeTypeId, AttributeValue};

/// Numeric component type as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(pub u32);

impl ComponentTypeId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ComponentTypeId {
    fn from(value: u32) -> Self {
        ComponentTypeId(value)
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One static attribute of a component type.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub type_id: AttributeTypeId,
    pub id: String,
    pub name: String,
    pub default: Option<AttributeValue>,
}

/// Attribute layout of a component type. Declaration order is wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSchema {
    attributes: Vec<AttributeDecl>,
    dynamic: bool,
    implemented: bool,
}

impl ComponentSchema {
    /// A static schema; add attributes with [`ComponentSchema::attribute`].
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            dynamic: false,
            implemented: true,
        }
    }

    /// No static attributes; attributes are created at runtime.
    pub fn dynamic() -> Self {
        Self {
            attributes: Vec::new(),
            dynamic: true,
            implemented: true,
        }
    }

    /// A known type whose attribute layout this client does not know.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, type_id: AttributeTypeId, id: &str, name: &str) -> Self {
        self.attributes.push(AttributeDecl {
            type_id,
            id: id.to_string(),
            name: name.to_string(),
            default: None,
        });
        self
    }

    pub fn attribute_with_default(
        mut self,
        id: &str,
        name: &str,
        default: impl Into<AttributeValue>,
    ) -> Self {
        let default = default.into();
        self.attributes.push(AttributeDecl {
            type_id: default.type_id(),
            id: id.to_string(),
            name: name.to_string(),
            default: Some(default),
        });
        self
    }

    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    /// Fresh attribute slots with their default values.
    pub(crate) fn instantiate_attributes(&self) -> Vec<Option<Attribute>> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(index, decl)| {
                // u8 indices; registration refuses longer schemas
                let mut attribute = Attribute::new(decl.type_id, &decl.id, &decl.name, index as u8);
                if let Some(default) = &decl.default {
                    attribute = attribute.with_value(default.clone());
                }
                Some(attribute)
            })
            .collect()
    }
}
