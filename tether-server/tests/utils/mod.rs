
pub use signal_helpers::*;
pub use test_client::*;
