//! CLI command handlers

pub mod commands;

pub use commands::{communities, convert, generate, roster, variants, GenerateArgs};
