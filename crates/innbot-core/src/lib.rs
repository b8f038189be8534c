//! Core domain + application logic for the company registry bot.
//!
//! This crate is framework-agnostic. Telegram and the registry HTTP API live
//! behind ports (traits) implemented in adapter crates.

pub mod command;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod store;
pub mod update_loop;
pub mod utils;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
