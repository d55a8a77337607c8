//! Core domain + application logic for askbot.
//!
//! This crate is framework-agnostic. Telegram and the answer API live behind
//! ports (traits) implemented in adapter crates.

pub mod answer;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod registry;

pub use errors::{Error, Result};
