//! Wire ids of the Tundra protocol messages. Every message starts with its id
//! as a little-endian u16.

pub type MessageId = u16;

pub const LOGIN: MessageId = 100;
pub const LOGIN_REPLY: MessageId = 101;
pub const CLIENT_JOINED: MessageId = 102;
pub const CLIENT_LEFT: MessageId = 103;
pub const OBSERVER_POSITION: MessageId = 105;
pub const CREATE_ENTITY: MessageId = 110;
pub const CREATE_COMPONENTS: MessageId = 111;
pub const CREATE_ATTRIBUTES: MessageId = 112;
pub const EDIT_ATTRIBUTES: MessageId = 113;
pub const REMOVE_ATTRIBUTES: MessageId = 114;
pub const REMOVE_COMPONENTS: MessageId = 115;
pub const REMOVE_ENTITY: MessageId = 116;
pub const CREATE_ENTITY_REPLY: MessageId = 117;
pub const CREATE_COMPONENTS_REPLY: MessageId = 118;
pub const RIGID_BODY_UPDATE: MessageId = 119;
pub const ENTITY_ACTION: MessageId = 120;
pub const ASSET_DISCOVERY: MessageId = 121;
pub const ASSET_DELETED: MessageId = 122;
pub const REGISTER_COMPONENT_TYPE: MessageId = 123;
pub const SET_ENTITY_PARENT: MessageId = 124;

/// Scene messages that carry `scene id, entity id` after the message id.
pub fn is_scene_message(id: MessageId) -> bool {
    (CREATE_ENTITY..=CREATE_COMPONENTS_REPLY).contains(&id)
}

/// Readable name for logs. Unknown ids map to "Unknown".
pub fn message_name(id: MessageId) -> &'static str {
    match id {
        LOGIN => "Login",
        LOGIN_REPLY => "LoginReply",
        CLIENT_JOINED => "ClientJoined",
        CLIENT_LEFT => "ClientLeft",
        OBSERVER_POSITION => "ObserverPosition",
        CREATE_ENTITY => "CreateEntity",
        CREATE_COMPONENTS => "CreateComponents",
        CREATE_ATTRIBUTES => "CreateAttributes",
        EDIT_ATTRIBUTES => "EditAttributes",
        REMOVE_ATTRIBUTES => "RemoveAttributes",
        REMOVE_COMPONENTS => "RemoveComponents",
        REMOVE_ENTITY => "RemoveEntity",
        CREATE_ENTITY_REPLY => "CreateEntityReply",
        CREATE_COMPONENTS_REPLY => "CreateComponentsReply",
        RIGID_BODY_UPDATE => "RigidBodyUpdate",
        ENTITY_ACTION => "EntityAction",
        ASSET_DISCOVERY => "AssetDiscovery",
        ASSET_DELETED => "AssetDeleted",
        REGISTER_COMPONENT_TYPE => "RegisterComponentType",
        SET_ENTITY_PARENT => "SetEntityParent",
        _ => "Unknown",
    }
}
