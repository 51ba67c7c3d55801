mod change;
mod error;
mod text;
mod type_id;
mod value;

pub use change::AttributeChange;
pub use error::AttributeError;
pub use type_id::AttributeTypeId;
pub use value::{AttributeValue, Color, Float2, Float3, Float4, Point, Quat, Transform};

use tundra_serde::{BitWrite, Deserializer, SerdeErr};

/// A typed, named value slot of a component.
///
/// `id` is the stable identifier used in scene documents, `name` the human
/// readable label. Dynamic attributes carry both on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    type_id: AttributeTypeId,
    id: String,
    name: String,
    index: u8,
    dynamic: bool,
    value: AttributeValue,
}

impl Attribute {
    pub fn new(type_id: AttributeTypeId, id: &str, name: &str, index: u8) -> Self {
        Self {
            type_id,
            id: id.to_string(),
            name: if name.is_empty() { id.to_string() } else { name.to_string() },
            index,
            dynamic: false,
            value: AttributeValue::default_for(type_id),
        }
    }

    /// Attribute created at runtime on a dynamic component. Id and name are
    /// the same string.
    pub fn new_dynamic(type_id: AttributeTypeId, name: &str, index: u8) -> Self {
        let mut attribute = Self::new(type_id, name, name, index);
        attribute.dynamic = true;
        attribute
    }

    pub fn with_value(mut self, value: AttributeValue) -> Self {
        if value.type_id() == self.type_id {
            self.value = value;
        } else {
            log::error!(
                "default value of type {} ignored for {} attribute '{}'",
                value.type_id(),
                self.type_id,
                self.id
            );
        }
        self
    }

    pub fn type_id(&self) -> AttributeTypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_id.name()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Stores `value` when its kind matches. Returns the scope listeners
    /// should be told about, `None` when nothing is to be announced.
    ///
    /// `Default` resolves as for a replicated owner; components resolve it
    /// before calling.
    pub fn set(&mut self, value: AttributeValue, change: AttributeChange) -> Option<AttributeChange> {
        match self.try_set(value, change) {
            Ok(resolved) => resolved,
            Err(err) => {
                log::error!("{}", err);
                None
            }
        }
    }

    pub fn try_set(
        &mut self,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, AttributeError> {
        if value.type_id() != self.type_id {
            return Err(AttributeError::TypeMismatch {
                attribute: self.id.clone(),
                expected: self.type_id,
                actual: value.type_id(),
            });
        }
        self.value = value;
        if change.is_disconnected() {
            return Ok(None);
        }
        Ok(Some(change.resolve(false)))
    }

    pub fn set_from_text(&mut self, text: &str, change: AttributeChange) -> Result<Option<AttributeChange>, AttributeError> {
        let value = AttributeValue::from_text(self.type_id, text).ok_or_else(|| {
            AttributeError::InvalidText {
                attribute: self.id.clone(),
                type_id: self.type_id,
                text: text.to_string(),
            }
        })?;
        self.try_set(value, change)
    }

    /// Replaces the value with one decoded from the reader. On error the
    /// value is unchanged.
    pub fn from_binary(&mut self, reader: &mut Deserializer) -> Result<(), SerdeErr> {
        self.value = AttributeValue::from_binary(self.type_id, reader)?;
        Ok(())
    }

    pub fn to_binary(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        self.value.to_binary(writer)
    }

    pub fn to_text(&self) -> String {
        self.value.to_text()
    }
}
