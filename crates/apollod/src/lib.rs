//! Apollo daemon library - exposes modules for testing.

pub mod activity;
pub mod commands;
pub mod discord;
pub mod handlers;
pub mod platform;
pub mod prompt;
pub mod state;
