use std::mem;

use tundra_shared::{ProtocolVersion, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Transport given, login sent or waiting for the transport to open.
    Connecting,
    /// Login reply accepted.
    Connected,
}

/// Things the application may want to react to, collected while messages
/// are handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected {
        connection_id: u32,
        protocol_version: ProtocolVersion,
        reply_data: String,
    },
    LoginFailed {
        reply_data: String,
    },
    ClientJoined {
        connection_id: u32,
        username: Option<String>,
    },
    ClientLeft {
        connection_id: u32,
    },
    Disconnected,
}

/// State a message handler may read and change.
#[derive(Debug)]
pub struct ClientContext {
    pub scene: Scene,
    pub state: ConnectionState,
    pub connection_id: u32,
    pub protocol_version: ProtocolVersion,
    pub debug: bool,
    events: Vec<ClientEvent>,
}

impl ClientContext {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            state: ConnectionState::Disconnected,
            connection_id: 0,
            protocol_version: ProtocolVersion::Original,
            debug: false,
            events: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn push_event(&mut self, event: ClientEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        mem::take(&mut self.events)
    }

    /// Forgets the connection, the scene is left alone.
    pub fn reset_connection(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.connection_id = 0;
        self.protocol_version = ProtocolVersion::Original;
    }
}
