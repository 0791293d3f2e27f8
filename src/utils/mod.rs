pub mod graceful_shutdown;
pub mod url;

pub use graceful_shutdown::shutdown_signal;
