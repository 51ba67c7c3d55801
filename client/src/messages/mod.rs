mod client_presence;
mod entity_action;
mod login;
mod login_reply;
mod message;
mod observer_position;
mod register_component_type;
mod rigid_body_update;
mod set_entity_parent;

pub use client_presence::{ClientJoinedMessage, ClientLeftMessage};
pub use entity_action::EntityActionMessage;
pub use login::{LoginMessage, LoginProperties};
pub use login_reply::LoginReplyMessage;
pub use message::{read_sized_block, write_sized_block, IncomingMessage, NetworkMessage, OutgoingMessage};
pub use observer_position::{angle_axis, ObserverPositionMessage};
pub use register_component_type::{AnnouncedAttribute, RegisterComponentTypeMessage};
pub use rigid_body_update::{
    PositionUpdate, RigidBodyUpdate, RigidBodyUpdateMessage, RotationUpdate, ScaleUpdate,
    VelocityUpdate,
};
pub use set_entity_parent::SetEntityParentMessage;
