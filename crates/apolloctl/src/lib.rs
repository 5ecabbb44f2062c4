//! Apollo Control - admin CLI for the Apollo bot.

pub mod commands;
pub mod display;
