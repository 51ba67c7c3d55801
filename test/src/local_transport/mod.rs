/// In-memory transport for end to end tests.
/// Moves whole messages between a client and a fake server without I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tundra_client::{Transport, TransportError, TransportEvent};

type Queue = Arc<Mutex<VecDeque<Vec<u8>>>>;

/// Connected client and server ends sharing two message queues
pub struct LocalTransportPair {
    pub client: LocalTransport,
    pub server: ServerEnd,
}

impl LocalTransportPair {
    pub fn new() -> Self {
        let to_server: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let to_client: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let open = Arc::new(Mutex::new(true));

        Self {
            client: LocalTransport {
                outgoing: to_server.clone(),
                open: open.clone(),
            },
            server: ServerEnd {
                incoming: to_server,
                outgoing: to_client,
                open,
            },
        }
    }
}

impl Default for LocalTransportPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Client side, handed to `TundraClient::connect`
#[derive(Clone)]
pub struct LocalTransport {
    outgoing: Queue,
    open: Arc<Mutex<bool>>,
}

impl Transport for LocalTransport {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.outgoing.lock().unwrap().push_back(payload.to_vec());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        *self.open.lock().unwrap()
    }

    fn close(&mut self) {
        *self.open.lock().unwrap() = false;
    }
}

/// Server side of the pair
pub struct ServerEnd {
    incoming: Queue,
    outgoing: Queue,
    open: Arc<Mutex<bool>>,
}

impl ServerEnd {
    /// Next message the client sent
    pub fn receive(&self) -> Option<Vec<u8>> {
        self.incoming.lock().unwrap().pop_front()
    }

    /// Everything the client sent so far
    pub fn receive_all(&self) -> Vec<Vec<u8>> {
        self.incoming.lock().unwrap().drain(..).collect()
    }

    pub fn send(&self, payload: Vec<u8>) {
        self.outgoing.lock().unwrap().push_back(payload);
    }

    /// Queued server messages as the events the client would see
    pub fn client_events(&self) -> Vec<TransportEvent> {
        let mut events: Vec<TransportEvent> = self
            .outgoing
            .lock()
            .unwrap()
            .drain(..)
            .map(TransportEvent::Data)
            .collect();
        if !self.is_open() {
            events.push(TransportEvent::Closed);
        }
        events
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock().unwrap()
    }

    pub fn close(&self) {
        *self.open.lock().unwrap() = false;
    }
}
