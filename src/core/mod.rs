//! Core modules for the karma bot.
//!
//! Command recognition, the interpreter, configuration, and the shared
//! persistence primitives live here.

pub mod broker;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod interpreter;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
pub mod transport;
