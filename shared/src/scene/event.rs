use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    attribute::{AttributeChange, AttributeValue},
    component::ComponentTypeId,
    entity::EntityAction,
};

/// Something that happened to the scene graph. Events own their data, so
/// listeners never hold borrows into the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    EntityCreated {
        entity_id: u32,
        change: AttributeChange,
    },
    EntityRemoved {
        entity_id: u32,
        change: AttributeChange,
    },
    EntityIdChanged {
        old: u32,
        new: u32,
        change: AttributeChange,
    },
    ComponentAdded {
        entity_id: u32,
        component_id: u32,
        type_id: ComponentTypeId,
        change: AttributeChange,
    },
    ComponentRemoved {
        entity_id: u32,
        component_id: u32,
        type_id: ComponentTypeId,
        change: AttributeChange,
    },
    ComponentIdChanged {
        entity_id: u32,
        old: u32,
        new: u32,
        change: AttributeChange,
    },
    AttributeChanged {
        entity_id: u32,
        component_id: u32,
        index: u8,
        value: AttributeValue,
        change: AttributeChange,
    },
    AttributeAdded {
        entity_id: u32,
        component_id: u32,
        index: u8,
        change: AttributeChange,
    },
    AttributeRemoved {
        entity_id: u32,
        component_id: u32,
        index: u8,
        name: String,
        change: AttributeChange,
    },
    ActionTriggered {
        action: EntityAction,
    },
    ParentChanged {
        entity_id: u32,
        parent: Option<u32>,
        change: AttributeChange,
    },
}

impl SceneEvent {
    /// Entity the event is about, the new id for id changes.
    pub fn entity_id(&self) -> u32 {
        match self {
            SceneEvent::EntityCreated { entity_id, .. }
            | SceneEvent::EntityRemoved { entity_id, .. }
            | SceneEvent::ComponentAdded { entity_id, .. }
            | SceneEvent::ComponentRemoved { entity_id, .. }
            | SceneEvent::ComponentIdChanged { entity_id, .. }
            | SceneEvent::AttributeChanged { entity_id, .. }
            | SceneEvent::AttributeAdded { entity_id, .. }
            | SceneEvent::AttributeRemoved { entity_id, .. }
            | SceneEvent::ParentChanged { entity_id, .. } => *entity_id,
            SceneEvent::EntityIdChanged { new, .. } => *new,
            SceneEvent::ActionTriggered { action } => action.entity_id,
        }
    }

    /// Scope of the change, `None` for actions.
    pub fn change(&self) -> Option<AttributeChange> {
        match self {
            SceneEvent::EntityCreated { change, .. }
            | SceneEvent::EntityRemoved { change, .. }
            | SceneEvent::EntityIdChanged { change, .. }
            | SceneEvent::ComponentAdded { change, .. }
            | SceneEvent::ComponentRemoved { change, .. }
            | SceneEvent::ComponentIdChanged { change, .. }
            | SceneEvent::AttributeChanged { change, .. }
            | SceneEvent::AttributeAdded { change, .. }
            | SceneEvent::AttributeRemoved { change, .. }
            | SceneEvent::ParentChanged { change, .. } => Some(*change),
            SceneEvent::ActionTriggered { .. } => None,
        }
    }
}

/// Observer of scene events. Called synchronously, in registration order.
pub trait SceneListener {
    fn on_scene_event(&mut self, event: &SceneEvent);
}

pub(crate) fn emit(listeners: &mut [Box<dyn SceneListener>], event: SceneEvent) {
    log::trace!("scene event {:?}", event);
    for listener in listeners.iter_mut() {
        listener.on_scene_event(&event);
    }
}

/// Records events for later processing. Clones share one queue, so one
/// clone can be registered on the scene while another is drained.
#[derive(Debug, Clone, Default)]
pub struct SceneEventLog {
    events: Rc<RefCell<VecDeque<SceneEvent>>>,
}

impl SceneEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<SceneEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn pop_front(&self) -> Option<SceneEvent> {
        self.events.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SceneListener for SceneEventLog {
    fn on_scene_event(&mut self, event: &SceneEvent) {
        self.events.borrow_mut().push_back(event.clone());
    }
}
