pub use tether_core::model::{PeerId, PeerRole, RoomId};

pub mod model {
    pub use tether_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tether_server::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use tether_peer::*;
}
