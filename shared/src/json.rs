use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    attribute::{Attribute, AttributeChange, AttributeTypeId, AttributeValue},
    component::{Component, ComponentRegistry},
    entity::Entity,
    scene::{Scene, SceneError},
};

/// Errors raised while reading or writing the JSON object form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    /// Input is not valid JSON or does not have the expected shape
    #[error("Malformed scene JSON: {0}")]
    Malformed(String),

    /// Output could not be produced
    #[error("Failed to write scene JSON: {0}")]
    Write(String),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// `{ "id", "type", "value" }` with the value in its text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeJson {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

impl AttributeJson {
    pub fn from_attribute(attribute: &Attribute) -> Self {
        Self {
            id: attribute.id().to_string(),
            type_name: attribute.type_name().to_string(),
            value: attribute.to_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentJson {
    pub id: u32,
    pub type_id: u32,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<bool>,
    #[serde(default)]
    pub attributes: Vec<AttributeJson>,
}

impl ComponentJson {
    pub fn from_component(component: &Component, serialize_temporary: bool) -> Self {
        Self {
            id: component.id(),
            type_id: component.type_id().get(),
            type_name: component.type_name().to_string(),
            name: Some(component.name().to_string()).filter(|name| !name.is_empty()),
            sync: component.is_replicated(),
            temp: temp_flag(component.is_temporary(), serialize_temporary),
            attributes: component.attributes().map(AttributeJson::from_attribute).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityJson {
    pub id: u32,
    #[serde(default)]
    pub sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<bool>,
    #[serde(default)]
    pub components: Vec<ComponentJson>,
}

impl EntityJson {
    /// Temporary components are left out unless `serialize_temporary`.
    pub fn from_entity(entity: &Entity, serialize_temporary: bool) -> Self {
        Self {
            id: entity.id(),
            sync: !entity.is_local(),
            temp: temp_flag(entity.is_temporary(), serialize_temporary),
            components: entity
                .components()
                .filter(|component| serialize_temporary || !component.is_temporary())
                .map(|component| ComponentJson::from_component(component, serialize_temporary))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneJson {
    pub id: u32,
    #[serde(default)]
    pub entities: Vec<EntityJson>,
}

impl SceneJson {
    pub fn from_scene(scene: &Scene, serialize_temporary: bool) -> Self {
        Self {
            id: scene.id(),
            entities: scene
                .entities()
                .filter(|entity| serialize_temporary || !entity.is_temporary())
                .map(|entity| EntityJson::from_entity(entity, serialize_temporary))
                .collect(),
        }
    }
}

fn temp_flag(temporary: bool, serialize_temporary: bool) -> Option<bool> {
    (serialize_temporary && temporary).then_some(true)
}

pub fn scene_to_json(scene: &Scene, serialize_temporary: bool) -> Result<String, JsonError> {
    serde_json::to_string_pretty(&SceneJson::from_scene(scene, serialize_temporary))
        .map_err(|err| JsonError::Write(err.to_string()))
}

/// Creates the entities described by a scene document. Entity and component
/// ids in the document are ignored; fresh ids are allocated. Returns the ids
/// of the created entities.
pub fn load_scene_json(scene: &mut Scene, json: &str, change: AttributeChange) -> Result<Vec<u32>, JsonError> {
    let document: SceneJson = serde_json::from_str(json).map_err(|err| JsonError::Malformed(err.to_string()))?;
    let mut created = Vec::with_capacity(document.entities.len());
    for entity in &document.entities {
        created.push(load_entity(scene, entity, change)?);
    }
    log::debug!("Loaded {} entities from scene JSON", created.len());
    Ok(created)
}

/// Creates one entity from its object form. Unregistered component types and
/// attributes that cannot be parsed are skipped with a warning.
pub fn load_entity(scene: &mut Scene, json: &EntityJson, change: AttributeChange) -> Result<u32, JsonError> {
    let components: Vec<(Component, bool)> = json
        .components
        .iter()
        .filter_map(|component| component_from_json(scene.registry(), component).map(|built| (built, component.sync)))
        .collect();

    let mut entity = if json.sync {
        scene.create_entity(0, change)?
    } else {
        scene.create_local_entity()?
    };
    entity.set_temporary(json.temp.unwrap_or(false));
    for (component, sync) in components {
        let component_change = if sync { change } else { AttributeChange::LocalOnly };
        entity.add_component(component, component_change)?;
    }
    Ok(entity.id())
}

fn component_from_json(registry: &ComponentRegistry, json: &ComponentJson) -> Option<Component> {
    if !registry.contains(json.type_id) {
        log::warn!("Skipping unregistered component {} ({})", json.type_name, json.type_id);
        return None;
    }
    let mut component = registry
        .create_component(json.type_id, 0, json.name.as_deref().unwrap_or(""))
        .ok()?;
    component.set_temporary(json.temp.unwrap_or(false));

    for attribute in &json.attributes {
        if component.supports_dynamic_attributes() {
            load_dynamic_attribute(&mut component, attribute);
        } else {
            load_static_attribute(&mut component, attribute);
        }
    }
    Some(component)
}

fn load_static_attribute(component: &mut Component, json: &AttributeJson) {
    let Some(index) = component.attribute_index(&json.id) else {
        log::warn!("Skipping undeclared attribute {} of {}", json.id, component.type_name());
        return;
    };
    if json.value.is_empty() {
        return;
    }
    let Some(type_id) = component.attribute(index).map(Attribute::type_id) else {
        return;
    };
    match AttributeValue::from_text(type_id, &json.value) {
        Some(value) => {
            component.set_attribute(index, value, AttributeChange::Disconnected);
        }
        None => log::warn!("Cannot parse {:?} as {} for attribute {}", json.value, type_id, json.id),
    }
}

fn load_dynamic_attribute(component: &mut Component, json: &AttributeJson) {
    let Some(type_id) = AttributeTypeId::from_name(&json.type_name) else {
        log::warn!("Unknown attribute type {}, skipping {}", json.type_name, json.id);
        return;
    };
    let value = if json.value.is_empty() {
        AttributeValue::default_for(type_id)
    } else {
        match AttributeValue::from_text(type_id, &json.value) {
            Some(value) => value,
            None => {
                log::warn!("Cannot parse {:?} as {} for attribute {}", json.value, type_id, json.id);
                return;
            }
        }
    };
    if let Err(err) = component
        .create_attribute(type_id, &json.id, AttributeChange::Disconnected)
        .map(|index| component.set_attribute(index, value, AttributeChange::Disconnected))
    {
        log::warn!("Could not create attribute {}: {}", json.id, err);
    }
}
