//! Llama Launcher Library
//!
//! Core library for the llama-server launcher desktop application: GGUF
//! header inspection, server command assembly, settings and process control.

pub mod app;
pub mod gguf;
pub mod launcher;
pub mod storage;
pub mod system;
pub mod types;
pub mod ui;
