mod commands;
mod logging;
mod paths;

pub use commands::{HideWindow, captured_command};
pub use logging::{init_logging, set_logging_enabled};
pub use paths::{AppPaths, AppPathsError};
