mod room;
mod room_directory;
mod room_snapshot;

pub use room::*;
pub use room_directory::*;
pub use room_snapshot::*;
