use std::{collections::BTreeSet, sync::Arc, time::Instant};

use serde::Serialize;

use tundra_shared::{
    placeable, ComponentRegistry, ComponentTypeId, Float3, ProtocolVersion, Quat, Scene,
    BUILTIN_COMPONENT_TYPES, PLACEABLE,
};

use crate::{
    client_config::ClientConfig,
    error::{NetworkError, TransportError},
    messages::LoginMessage,
    network::{ClientContext, ClientEvent, ConnectionState, MessageHandler, Network},
    sync::{SyncManager, TundraMessageHandler},
    transport::{Transport, TransportEvent},
};

/// A Tundra client: owns the scene, replicates it with the server over a
/// transport and keeps the server informed about the observer.
pub struct TundraClient {
    network: Network,
    context: ClientContext,
    sync: SyncManager,
    transport: Option<Box<dyn Transport>>,
    pending_login: Option<LoginMessage>,
    observer_entity_id: Option<u32>,
}

impl TundraClient {
    /// Create a new client with an empty scene of `registry`'s types
    pub fn new(config: ClientConfig, registry: Arc<ComponentRegistry>) -> Self {
        let mut scene = Scene::new(registry);
        scene.set_server_side_id_allocation(config.is_server_side_id_allocation);
        let sync = SyncManager::new(&mut scene);

        let mut context = ClientContext::new(scene);
        context.debug = config.network.debug;

        let mut network = Network::new(config.network);
        network.register_handler(Box::new(TundraMessageHandler::new()));

        Self {
            network,
            context,
            sync,
            transport: None,
            pending_login: None,
            observer_entity_id: None,
        }
    }

    // Accessors

    pub fn scene(&self) -> &Scene {
        &self.context.scene
    }

    /// Changes made here with a replicating scope are sent on the next
    /// `update`.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.context.scene
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Adds an application handler. The core handler was registered first
    /// and keeps the ids it takes.
    pub fn register_handler(&mut self, handler: Box<dyn MessageHandler>) {
        self.network.register_handler(handler);
    }

    pub fn state(&self) -> ConnectionState {
        self.context.state
    }

    pub fn is_connected(&self) -> bool {
        self.context.is_connected()
    }

    /// Id the server assigned at login, 0 before that.
    pub fn connection_id(&self) -> u32 {
        self.context.connection_id
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.context.protocol_version
    }

    /// Entity whose Placeable drives the observer heartbeat.
    pub fn set_observer_entity_id(&mut self, entity_id: Option<u32>) {
        self.observer_entity_id = entity_id;
        self.network.reset_observer();
    }

    pub fn observer_entity_id(&self) -> Option<u32> {
        self.observer_entity_id
    }

    /// Events collected since the last call.
    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        self.context.take_events()
    }

    /// Announces a custom component type to the server on the next update.
    pub fn replicate_component_type(&mut self, type_id: u32) {
        self.sync.replicate_component_type(type_id);
    }

    // Connection

    /// Starts a connection over `transport`. The login is sent as soon as the
    /// transport is open, which may already be the case.
    pub fn connect<P: Serialize>(&mut self, transport: Box<dyn Transport>, properties: &P) -> Result<(), NetworkError> {
        if self.transport.is_some() {
            self.disconnect();
        }
        let login = LoginMessage::from_properties(properties).map_err(|err| {
            let err = NetworkError::InvalidLoginProperties(err.to_string());
            log::error!("{}", err);
            err
        })?;

        log::info!("Connecting");
        self.context.state = ConnectionState::Connecting;
        self.pending_login = Some(login);
        let opened = transport.is_connected();
        self.transport = Some(transport);
        if opened {
            self.send_login()?;
        }
        Ok(())
    }

    fn send_login(&mut self) -> Result<(), NetworkError> {
        let (Some(transport), Some(login)) = (self.transport.as_mut(), self.pending_login.take()) else {
            return Ok(());
        };
        self.network.send_message(transport.as_mut(), &login)?;
        log::debug!("Sent login");
        Ok(())
    }

    /// Feeds what the transport reported into the client. Errors of single
    /// messages are returned but leave the client usable.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<(), NetworkError> {
        match event {
            TransportEvent::Opened => self.send_login(),
            TransportEvent::Data(buffer) => self.receive(&buffer),
            TransportEvent::Closed => {
                if self.transport.is_some() {
                    log::info!("Connection closed by the transport");
                    self.disconnect();
                }
                Ok(())
            }
        }
    }

    fn receive(&mut self, buffer: &[u8]) -> Result<(), NetworkError> {
        let before = self.context.state;
        let result = self.network.receive(buffer, &mut self.context);

        match (before, self.context.state) {
            (ConnectionState::Connecting, ConnectionState::Disconnected) => {
                self.close_transport();
            }
            (ConnectionState::Connecting, ConnectionState::Connected) => {
                self.queue_custom_component_types();
            }
            _ => {}
        }
        result.map(|_| ())
    }

    /// Types the server cannot know about: everything registered locally
    /// that is not a built in Tundra type.
    fn queue_custom_component_types(&mut self) {
        let custom: BTreeSet<u32> = self
            .context
            .scene
            .registry()
            .types()
            .map(|(type_id, _)| type_id)
            .filter(|type_id| !BUILTIN_COMPONENT_TYPES.iter().any(|(builtin, _)| builtin == type_id))
            .collect();
        for type_id in custom {
            self.sync.replicate_component_type(type_id);
        }
    }

    /// Closes the transport and forgets the connection. The scene is kept.
    pub fn disconnect(&mut self) {
        let was_connected = self.context.state != ConnectionState::Disconnected || self.transport.is_some();
        self.close_transport();
        self.pending_login = None;
        self.context.reset_connection();
        self.sync.reset();
        self.network.reset_observer();
        if was_connected {
            log::info!("Disconnected");
            self.context.push_event(ClientEvent::Disconnected);
        }
    }

    fn close_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    // Update

    /// Sends pending scene changes and the observer heartbeat. Call once per
    /// frame.
    pub fn update(&mut self, now: Instant) -> Result<(), NetworkError> {
        if !self.context.is_connected() {
            return Ok(());
        }
        let observer = self.observer_placement();
        let Some(transport) = self.transport.as_mut() else {
            return Err(TransportError::NotConnected.into());
        };

        // one failed message does not hold back the rest; the first error is reported
        let mut result = Ok(());
        for message in self.sync.send_changes(&self.context.scene, self.context.protocol_version) {
            if let Err(err) = self.network.send(transport.as_mut(), message) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        if let Some((position, orientation)) = observer {
            self.network.update_observer(transport.as_mut(), now, position, orientation)?;
        }
        result
    }

    fn observer_placement(&self) -> Option<(Float3, Quat)> {
        let entity = self.context.scene.entity_by_id(self.observer_entity_id?)?;
        let transform = entity
            .component_by_type_id(ComponentTypeId(PLACEABLE))?
            .value(placeable::TRANSFORM)?
            .as_transform()?;
        Some((transform.pos, transform.orientation()))
    }
}
