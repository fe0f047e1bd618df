//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands and incoming links
//! - `callback_handler`: Handles format keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `gateway`: Outbound messaging operations behind a trait

pub mod callback_handler;
pub mod gateway;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use gateway::{ChatGateway, OutgoingFile, OutgoingFileKind};
pub use ui_builder::{create_format_keyboard, format_caption, format_metadata_summary};
