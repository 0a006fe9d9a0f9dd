mod relay_router;

pub use relay_router::*;
