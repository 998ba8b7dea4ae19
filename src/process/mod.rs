pub mod handle;
pub mod log_buffer;
pub mod output;

pub use handle::{GRACE_PERIOD, ProcessHandle};
pub use log_buffer::{LOG_LIMIT, LogBuffer};
