//! # TubeDrop Telegram Bots
//!
//! A Telegram bot that downloads YouTube videos or their audio track through
//! yt-dlp and relays the file back to the chat, plus a small slot-analysis bot
//! sharing the same localization and messaging plumbing.

pub mod acquisition;
pub mod bot;
pub mod config;
pub mod delivery;
pub mod dialogue;
pub mod estimator;
pub mod extractor;
pub mod link_classifier;
pub mod localization;
pub mod media_errors;
pub mod media_model;
pub mod prober;
pub mod slots;
pub mod telemetry;
