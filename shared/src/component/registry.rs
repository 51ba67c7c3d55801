use std::collections::{BTreeMap, HashMap};

use crate::protocol::ProtocolError;

use super::{
    builtin::{builtin_schema, BUILTIN_COMPONENT_TYPES},
    error::RegistryError,
    schema::{ComponentSchema, ComponentTypeId},
    Component,
};

/// Prefix some peers put in front of component type names.
pub const TYPE_NAME_PREFIX: &str = "EC_";

#[derive(Debug, Clone, PartialEq)]
struct RegisteredType {
    type_name: String,
    schema: ComponentSchema,
}

/// Maps component type ids to type names and attribute layouts.
///
/// Configured once at startup, then locked and shared with the scene. Types
/// announced by the server after the lock go through
/// [`ComponentRegistry::register_at_runtime`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRegistry {
    types: BTreeMap<u32, RegisteredType>,
    ids_by_name: HashMap<String, u32>,
    locked: bool,
}

impl ComponentRegistry {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Registry holding the built-in Tundra component types.
    pub fn tundra() -> Self {
        let mut registry = Self::builder();
        registry.add_tundra_components();
        registry.build()
    }

    pub fn add_tundra_components(&mut self) -> &mut Self {
        self.check_lock();
        for (type_id, type_name) in BUILTIN_COMPONENT_TYPES {
            self.register(*type_id, type_name, builtin_schema(*type_id));
        }
        self
    }

    /// Registers a component type. Panics on a locked registry or a
    /// conflicting registration; use [`ComponentRegistry::try_register`] to
    /// handle those.
    pub fn register(&mut self, type_id: u32, type_name: &str, schema: ComponentSchema) -> &mut Self {
        self.check_lock();
        if let Err(err) = self.insert(type_id, type_name, schema) {
            panic!("{}", err);
        }
        self
    }

    /// Registers a type under the hashed id of its name.
    pub fn register_custom(&mut self, type_name: &str, schema: ComponentSchema) -> &mut Self {
        let type_id = custom_type_id(type_name);
        self.register(type_id, type_name, schema)
    }

    // Non-panicking builder methods

    pub fn try_add_tundra_components(&mut self) -> Result<&mut Self, RegistryError> {
        self.try_check_lock()?;
        for (type_id, type_name) in BUILTIN_COMPONENT_TYPES {
            self.insert(*type_id, type_name, builtin_schema(*type_id))?;
        }
        Ok(self)
    }

    pub fn try_register(
        &mut self,
        type_id: u32,
        type_name: &str,
        schema: ComponentSchema,
    ) -> Result<&mut Self, RegistryError> {
        self.try_check_lock()?;
        self.insert(type_id, type_name, schema)?;
        Ok(self)
    }

    pub fn try_register_custom(
        &mut self,
        type_name: &str,
        schema: ComponentSchema,
    ) -> Result<&mut Self, RegistryError> {
        self.try_register(custom_type_id(type_name), type_name, schema)
    }

    /// Adds a type while the registry is in use, bypassing the lock.
    ///
    /// Re-registering the same id under the same name replaces the schema.
    /// `type_id` 0 hashes the name. Returns the id used.
    pub fn register_at_runtime(
        &mut self,
        type_id: u32,
        type_name: &str,
        schema: ComponentSchema,
    ) -> Result<u32, RegistryError> {
        let type_name = strip_type_prefix(type_name);
        let type_id = if type_id == 0 {
            custom_type_id(type_name)
        } else {
            type_id
        };
        if let Some(existing) = self.types.get_mut(&type_id) {
            if existing.type_name == type_name {
                log::debug!("replacing schema of component type {} ({})", type_name, type_id);
                existing.schema = schema;
                return Ok(type_id);
            }
        }
        self.insert(type_id, type_name, schema)?;
        Ok(type_id)
    }

    fn insert(&mut self, type_id: u32, type_name: &str, schema: ComponentSchema) -> Result<(), RegistryError> {
        let type_name = strip_type_prefix(type_name);
        if type_id == 0 {
            return Err(RegistryError::ReservedTypeId);
        }
        if type_name.is_empty() {
            return Err(RegistryError::EmptyTypeName);
        }
        if schema.attributes().len() > 256 {
            return Err(RegistryError::TooManyAttributes {
                type_name: type_name.to_string(),
                count: schema.attributes().len(),
            });
        }
        if let Some(existing) = self.types.get(&type_id) {
            return Err(RegistryError::DuplicateTypeId {
                type_id,
                existing: existing.type_name.clone(),
            });
        }
        if let Some(existing) = self.ids_by_name.get(type_name) {
            return Err(RegistryError::DuplicateTypeName {
                type_name: type_name.to_string(),
                existing: *existing,
            });
        }

        self.ids_by_name.insert(type_name.to_string(), type_id);
        self.types.insert(
            type_id,
            RegisteredType {
                type_name: type_name.to_string(),
                schema,
            },
        );
        Ok(())
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if the registry is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if the registry is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Component registry already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    // Lookups

    pub fn type_name(&self, type_id: u32) -> Option<&str> {
        self.types.get(&type_id).map(|entry| entry.type_name.as_str())
    }

    /// Accepts names with or without the `EC_` prefix.
    pub fn type_id(&self, type_name: &str) -> Option<u32> {
        self.ids_by_name.get(strip_type_prefix(type_name)).copied()
    }

    pub fn schema(&self, type_id: u32) -> Option<&ComponentSchema> {
        self.types.get(&type_id).map(|entry| &entry.schema)
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.types.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered `(type id, type name)` pairs in id order.
    pub fn types(&self) -> impl Iterator<Item = (u32, &str)> {
        self.types
            .iter()
            .map(|(type_id, entry)| (*type_id, entry.type_name.as_str()))
    }

    /// Instantiates a component of `type_id`. Unknown types are logged and
    /// returned as an error.
    pub fn create_component(&self, type_id: u32, id: u32, name: &str) -> Result<Component, RegistryError> {
        match self.types.get(&type_id) {
            Some(entry) => Ok(Component::from_schema(
                ComponentTypeId(type_id),
                &entry.type_name,
                id,
                name,
                &entry.schema,
            )),
            None => {
                let err = RegistryError::UnknownTypeId { type_id };
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    pub fn create_component_by_name(&self, type_name: &str, id: u32, name: &str) -> Result<Component, RegistryError> {
        match self.type_id(type_name) {
            Some(type_id) => self.create_component(type_id, id, name),
            None => {
                let err = RegistryError::UnknownTypeName {
                    type_name: type_name.to_string(),
                };
                log::error!("{}", err);
                Err(err)
            }
        }
    }
}

/// Removes a leading `EC_` from a type name.
pub fn strip_type_prefix(type_name: &str) -> &str {
    type_name.strip_prefix(TYPE_NAME_PREFIX).unwrap_or(type_name)
}

/// Type name with the `EC_` prefix, as older peers expect it.
pub fn ensure_type_name_with_prefix(type_name: &str) -> String {
    if type_name.starts_with(TYPE_NAME_PREFIX) {
        type_name.to_string()
    } else {
        format!("{}{}", TYPE_NAME_PREFIX, type_name)
    }
}

/// Stable id for a custom component type: SDBM hash of the lowercased name
/// folded to 16 bits, offset past the built-in range.
pub fn custom_type_id(type_name: &str) -> u32 {
    let mut hash: u32 = 0;
    for c in strip_type_prefix(type_name).to_lowercase().chars() {
        hash = u32::from(c)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash);
    }
    (hash & 0xffff) | 0x10000
}
