//! Domain types shared by the rollcall crates.
//!
//! Everything here mirrors the JSON shapes of the remote attendance API
//! (camelCase on the wire) plus the client-side validation applied to
//! admin form input before it is sent.

pub mod attendance;
pub mod employee;
pub mod error;
pub mod pagination;
pub mod types;
