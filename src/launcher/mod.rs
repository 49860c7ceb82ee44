//! Server command assembly
//!
//! Option table, argv construction, shell-quoted preview and the endpoint
//! summary shown after launch.

pub mod api_info;
pub mod args;
pub mod options;
pub mod preview;

pub use args::build_arguments;
pub use preview::{command_line, preview};
