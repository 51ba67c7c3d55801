use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the Network router
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Minimum time between two observer position updates. An update is
    /// only sent after this period if the observer actually moved.
    pub priority_update_period: Duration,
    /// Logs every dropped or malformed scene message instead of only the
    /// ones that point at a protocol mismatch.
    pub debug: bool,
    /// Largest message the router hands to the transport, in bytes.
    /// Larger messages are dropped with an error.
    pub max_message_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            priority_update_period: Duration::from_secs(1),
            debug: false,
            max_message_size: 64 * 1024,
        }
    }
}

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Used to configure the message router and the observer heartbeat
    pub network: NetworkConfig,
    /// Lets the client allocate replicated ids itself instead of unacked
    /// ones. Only useful when the client is the authority for its scene.
    pub is_server_side_id_allocation: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            is_server_side_id_allocation: false,
        }
    }
}
