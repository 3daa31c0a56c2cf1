//! Type-safe argument structs for every external tool the provisioner runs.
//!
//! Each struct maps Rust fields to the exact flags and environment the tool
//! expects, through the `CommandArgs` trait.

pub mod packages;
pub mod runtime;
pub mod service;
pub mod user;
