use tundra_shared::{
    placeable, AttributeChange, AttributeValue, Component, ComponentRegistry, Transform, NAME,
    PLACEABLE,
};

/// Fluent builder for the components of a server side entity
pub struct TestEntityBuilder {
    name: Option<String>,
    transform: Option<Transform>,
}

impl TestEntityBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            transform: None,
        }
    }

    /// Adds a Name component
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Adds a Placeable component
    pub fn placed(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Components with server ids starting from 1
    pub fn build(self, registry: &ComponentRegistry) -> Vec<Component> {
        let mut components = Vec::new();
        let mut next_id = 1;
        if let Some(name) = self.name {
            let mut component = registry.create_component(NAME, next_id, "").unwrap();
            component.set_attribute(0, AttributeValue::from(name), AttributeChange::Disconnected);
            components.push(component);
            next_id += 1;
        }
        if let Some(transform) = self.transform {
            let mut component = registry.create_component(PLACEABLE, next_id, "").unwrap();
            component.set_attribute(placeable::TRANSFORM, transform.into(), AttributeChange::Disconnected);
            components.push(component);
        }
        components
    }
}

impl Default for TestEntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}
