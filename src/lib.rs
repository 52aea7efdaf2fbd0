//! Neurochat is a terminal-first chat client for a NeuroSwitch-style
//! AI-provider routing backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the transcript, the per-session selections
//!   (provider, mode, pending attachment), token-usage tracking, and the
//!   routing-status indicator.
//! - [`api`] defines the wire payloads for the backend's four endpoints and
//!   the HTTP client shim that talks to them.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
