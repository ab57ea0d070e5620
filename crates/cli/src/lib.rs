//! Command-line front end for the rollcall attendance client.

pub mod commands;
pub mod render;
