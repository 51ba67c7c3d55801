mod handler;
mod rigid_body;
mod scene_messages;
mod sync_manager;
mod sync_state;
mod wire;

pub use handler::TundraMessageHandler;
pub use rigid_body::apply_rigid_body_update;
pub use sync_manager::SyncManager;
pub use sync_state::SyncState;
pub use wire::{read_component_full_update, wire_id, write_component_full_update};
