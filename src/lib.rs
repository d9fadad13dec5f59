//! Revolt Selfbot Library
//!
//! A personal automation bot for the Revolt chat platform.
//!
//! This crate provides the core functionality for:
//! - Loading `config.json` and the username rotation list
//! - Talking to Revolt over REST and the WebSocket gateway
//! - Handling commands written by the account itself
//! - Rotating the display name and refreshing a custom status on a timer

pub mod commands;
pub mod config;
pub mod revolt;
pub mod scheduler;

#[cfg(test)]
mod testing;
