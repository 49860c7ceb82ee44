//! System utilities
//!
//! Starting, tracking and stopping the llama-server process, plus the
//! native dialogs the window uses.

pub mod dialogs;
pub mod process;
pub mod terminal;
