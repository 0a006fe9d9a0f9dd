use std::net::SocketAddr;

pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Send `host_disconnected` / `client_disconnected` to the rest of the room
    /// when a peer's connection closes.
    pub notify_departures: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            notify_departures: true,
        }
    }
}
