mod builtin;
mod error;
mod listener;
mod registry;
mod schema;

pub use builtin::{
    builtin_schema, placeable, rigid_body, ShapeType, AVATAR, BUILTIN_COMPONENT_TYPES, CAMERA,
    DYNAMIC_COMPONENT, MESH, NAME, PLACEABLE, RIGID_BODY, SCRIPT,
};
pub use error::{ComponentError, RegistryError};
pub use listener::ComponentListener;
pub use registry::{
    custom_type_id, ensure_type_name_with_prefix, strip_type_prefix, ComponentRegistry,
    TYPE_NAME_PREFIX,
};
pub use schema::{AttributeDecl, ComponentSchema, ComponentTypeId};

use std::fmt;

use tundra_serde::{BitWrite, Deserializer, SerdeErr};

use crate::{
    attribute::{Attribute, AttributeChange, AttributeError, AttributeTypeId, AttributeValue},
    entity::{is_local_id, is_unacked_id},
};

/// Highest number of attribute slots a component can hold, bounded by the u8
/// index on the wire.
pub const MAX_ATTRIBUTES: usize = 256;

/// A typed bag of attributes attached to an entity.
///
/// Attribute slots are addressed by their u8 index. Dynamic components may
/// have holes where attributes were removed; the lowest hole is reused first.
pub struct Component {
    type_id: ComponentTypeId,
    type_name: String,
    id: u32,
    name: String,
    attributes: Vec<Option<Attribute>>,
    supports_dynamic_attributes: bool,
    implemented: bool,
    replicated: bool,
    temporary: bool,
    parent_entity: Option<u32>,
    listeners: Vec<Box<dyn ComponentListener>>,
}

impl Component {
    pub(crate) fn from_schema(
        type_id: ComponentTypeId,
        type_name: &str,
        id: u32,
        name: &str,
        schema: &ComponentSchema,
    ) -> Self {
        Self {
            type_id,
            type_name: type_name.to_string(),
            id,
            name: name.to_string(),
            attributes: schema.instantiate_attributes(),
            supports_dynamic_attributes: schema.is_dynamic(),
            implemented: schema.is_implemented(),
            replicated: !is_local_id(id),
            temporary: false,
            parent_entity: None,
            listeners: Vec::new(),
        }
    }

    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    pub fn supports_dynamic_attributes(&self) -> bool {
        self.supports_dynamic_attributes
    }

    pub fn is_replicated(&self) -> bool {
        self.replicated
    }

    pub fn set_replicated(&mut self, replicated: bool) {
        self.replicated = replicated;
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn set_temporary(&mut self, temporary: bool) {
        self.temporary = temporary;
    }

    pub fn parent_entity(&self) -> Option<u32> {
        self.parent_entity
    }

    pub fn is_local(&self) -> bool {
        is_local_id(self.id)
    }

    pub fn is_unacked(&self) -> bool {
        is_unacked_id(self.id)
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub(crate) fn set_parent_entity(&mut self, entity_id: Option<u32>) {
        self.parent_entity = entity_id;
    }

    pub fn add_listener(&mut self, listener: Box<dyn ComponentListener>) {
        self.listeners.push(listener);
    }

    /// `Default` resolves to `LocalOnly` when this component or its entity
    /// is local.
    pub fn resolve_change(&self, change: AttributeChange) -> AttributeChange {
        let local = self.is_local() || self.parent_entity.is_some_and(is_local_id);
        change.resolve(local)
    }

    // Attribute access

    pub fn attribute(&self, index: u8) -> Option<&Attribute> {
        self.attributes.get(usize::from(index)).and_then(Option::as_ref)
    }

    /// Looks up by display name, then by id.
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes()
            .find(|attribute| attribute.name() == name)
            .or_else(|| self.attribute_by_id(name))
    }

    pub fn attribute_by_id(&self, id: &str) -> Option<&Attribute> {
        self.attributes().find(|attribute| attribute.id() == id)
    }

    pub fn attribute_index(&self, name: &str) -> Option<u8> {
        self.attribute_by_name(name).map(Attribute::index)
    }

    pub fn value(&self, index: u8) -> Option<&AttributeValue> {
        self.attribute(index).map(Attribute::value)
    }

    /// Live attributes in index order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flatten()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes().count()
    }

    /// Number of slots including holes.
    pub fn slot_count(&self) -> usize {
        self.attributes.len()
    }

    // Attribute mutation

    /// Assigns a value, logging and returning `None` when the index is
    /// unknown or the value has the wrong kind.
    pub fn set_attribute(&mut self, index: u8, value: AttributeValue, change: AttributeChange) -> Option<AttributeChange> {
        match self.try_set_attribute(index, value, change) {
            Ok(fired) => fired,
            Err(err) => {
                log::error!("{}", err);
                None
            }
        }
    }

    pub fn set_attribute_by_name(
        &mut self,
        name: &str,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Option<AttributeChange> {
        match self.attribute_index(name) {
            Some(index) => self.set_attribute(index, value, change),
            None => {
                log::error!("{}", self.not_found(name));
                None
            }
        }
    }

    /// Assigns a value and notifies component listeners. Returns the scope
    /// the scene should announce, `None` for a disconnected change.
    pub fn try_set_attribute(
        &mut self,
        index: u8,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, ComponentError> {
        let resolved = self.resolve_change(change);
        let Some(attribute) = self.attributes.get_mut(usize::from(index)).and_then(Option::as_mut) else {
            return Err(self.not_found(&index.to_string()));
        };
        let fired = attribute.try_set(value, resolved)?;
        if let Some(scope) = fired {
            for listener in self.listeners.iter_mut() {
                listener.attribute_changed(attribute, scope);
            }
        }
        Ok(fired)
    }

    /// Decodes a new value for one attribute from the reader.
    pub fn read_attribute(
        &mut self,
        index: u8,
        reader: &mut Deserializer,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, ComponentError> {
        let type_id = self
            .attribute(index)
            .map(Attribute::type_id)
            .ok_or_else(|| self.not_found(&index.to_string()))?;
        let value = AttributeValue::from_binary(type_id, reader)?;
        self.try_set_attribute(index, value, change)
    }

    /// Adds a dynamic attribute at the lowest free index.
    pub fn create_attribute(
        &mut self,
        type_id: AttributeTypeId,
        name: &str,
        change: AttributeChange,
    ) -> Result<u8, ComponentError> {
        self.check_dynamic()?;
        let index = match self.attributes.iter().position(Option::is_none) {
            Some(hole) => hole,
            None if self.attributes.len() < MAX_ATTRIBUTES => self.attributes.len(),
            None => {
                return Err(ComponentError::IndexSpaceExhausted {
                    type_name: self.type_name.clone(),
                })
            }
        };
        // index < MAX_ATTRIBUTES
        let index = index as u8;
        self.create_attribute_with_value(index, name, AttributeValue::default_for(type_id), change)?;
        Ok(index)
    }

    /// Adds a dynamic attribute at an explicit index.
    pub fn create_attribute_at(
        &mut self,
        index: u8,
        type_id: AttributeTypeId,
        name: &str,
        change: AttributeChange,
    ) -> Result<(), ComponentError> {
        self.create_attribute_with_value(index, name, AttributeValue::default_for(type_id), change)
    }

    /// Adds a dynamic attribute holding `value`. Listeners see one
    /// `attribute_added` with the value already in place.
    pub fn create_attribute_with_value(
        &mut self,
        index: u8,
        name: &str,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<(), ComponentError> {
        self.check_dynamic()?;
        if name.len() > usize::from(u8::MAX) {
            return Err(ComponentError::NameTooLong {
                type_name: self.type_name.clone(),
                byte_len: name.len(),
            });
        }
        if self.attribute(index).is_some() || self.attribute_by_id(name).is_some() {
            return Err(ComponentError::AttributeAlreadyExists {
                type_name: self.type_name.clone(),
                attribute: name.to_string(),
            });
        }

        let resolved = self.resolve_change(change);
        let mut attribute = Attribute::new_dynamic(value.type_id(), name, index);
        attribute.try_set(value, AttributeChange::Disconnected)?;

        let slot = usize::from(index);
        if self.attributes.len() <= slot {
            self.attributes.resize_with(slot + 1, || None);
        }
        let attribute = self.attributes[slot].insert(attribute);
        if !resolved.is_disconnected() {
            for listener in self.listeners.iter_mut() {
                listener.attribute_added(attribute, resolved);
            }
        }
        Ok(())
    }

    /// Removes a dynamic attribute, leaving a hole at its index.
    pub fn remove_attribute(&mut self, index: u8, change: AttributeChange) -> Result<Attribute, ComponentError> {
        self.check_dynamic()?;
        let resolved = self.resolve_change(change);
        let slot = usize::from(index);
        let Some(attribute) = self.attributes.get(slot).and_then(Option::as_ref) else {
            return Err(self.not_found(&index.to_string()));
        };
        if !resolved.is_disconnected() {
            for listener in self.listeners.iter_mut() {
                listener.attribute_about_to_be_removed(attribute, resolved);
            }
        }
        let removed = self.attributes[slot].take().ok_or_else(|| self.not_found(&index.to_string()))?;
        while matches!(self.attributes.last(), Some(None)) {
            self.attributes.pop();
        }
        Ok(removed)
    }

    pub fn remove_attribute_by_name(&mut self, name: &str, change: AttributeChange) -> Result<Attribute, ComponentError> {
        self.check_dynamic()?;
        let index = self.attribute_index(name).ok_or_else(|| self.not_found(name))?;
        self.remove_attribute(index, change)
    }

    pub(crate) fn notify_attribute_changed(&mut self, index: u8, change: AttributeChange) {
        if change.is_disconnected() {
            return;
        }
        if let Some(attribute) = self.attributes.get(usize::from(index)).and_then(Option::as_ref) {
            for listener in self.listeners.iter_mut() {
                listener.attribute_changed(attribute, change);
            }
        }
    }

    // Binary form

    /// Full-update form: static attribute values in index order, then one
    /// `(index u8, type u8, name, value)` record per dynamic attribute.
    ///
    /// Size the writer with a `BitCounter` first; a failed write may leave
    /// part of the component written.
    pub fn serialize_to_binary(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        for attribute in self.attributes().filter(|attribute| !attribute.is_dynamic()) {
            attribute.to_binary(writer)?;
        }
        for attribute in self.attributes().filter(|attribute| attribute.is_dynamic()) {
            writer.write_u8(attribute.index())?;
            writer.write_u8(attribute.type_id().to_u8())?;
            writer.write_string_u8(attribute.id())?;
            attribute.to_binary(writer)?;
        }
        Ok(())
    }

    /// Applies a full update without notifying listeners. Returns the
    /// indices whose value changed.
    ///
    /// Static attributes are read while bytes remain, so a short update
    /// leaves trailing attributes untouched. Placeholder components skip
    /// the data.
    pub fn deserialize_from_binary(&mut self, reader: &mut Deserializer) -> Result<Vec<u8>, ComponentError> {
        let mut changed = Vec::new();
        if !self.implemented {
            let skipped = reader.read_remaining()?.len();
            log::debug!("skipped {} bytes of unimplemented component {}", skipped, self.type_name);
            return Ok(changed);
        }

        for attribute in self.attributes.iter_mut().flatten().filter(|attribute| !attribute.is_dynamic()) {
            if reader.bytes_left() == 0 {
                break;
            }
            let value = AttributeValue::from_binary(attribute.type_id(), reader)?;
            if attribute.value() != &value {
                attribute.try_set(value, AttributeChange::Disconnected)?;
                changed.push(attribute.index());
            }
        }

        if !self.supports_dynamic_attributes {
            return Ok(changed);
        }
        while reader.bits_left() > 16 {
            let index = reader.read_u8()?;
            let raw_type = reader.read_u8()?;
            let type_id = AttributeTypeId::from_u8(raw_type).ok_or(AttributeError::UnknownType { type_id: raw_type })?;
            let name = reader.read_string_u8()?;
            let value = AttributeValue::from_binary(type_id, reader)?;

            let slot = usize::from(index);
            let same_slot = self
                .attribute(index)
                .is_some_and(|existing| existing.type_id() == type_id && existing.id() == name);
            if same_slot {
                if self.value(index) != Some(&value) {
                    if let Some(existing) = self.attributes[slot].as_mut() {
                        existing.try_set(value, AttributeChange::Disconnected)?;
                    }
                    changed.push(index);
                }
                continue;
            }
            if self.attributes.len() <= slot {
                self.attributes.resize_with(slot + 1, || None);
            }
            let mut attribute = Attribute::new_dynamic(type_id, &name, index);
            attribute.try_set(value, AttributeChange::Disconnected)?;
            self.attributes[slot] = Some(attribute);
            changed.push(index);
        }
        Ok(changed)
    }

    fn check_dynamic(&self) -> Result<(), ComponentError> {
        if self.supports_dynamic_attributes {
            Ok(())
        } else {
            Err(ComponentError::NotDynamic {
                type_name: self.type_name.clone(),
            })
        }
    }

    fn not_found(&self, attribute: &str) -> ComponentError {
        ComponentError::AttributeNotFound {
            type_name: self.type_name.clone(),
            attribute: attribute.to_string(),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("implemented", &self.implemented)
            .field("replicated", &self.replicated)
            .field("temporary", &self.temporary)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
