//! Shared type definitions
//!
//! Data types passed between the header reader, the argument assembler,
//! storage and the UI.

pub mod config;
pub mod model;
