//! Foundation types for the skins manager.
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//! the error enum, the runtime configuration, and helpers for the loosely
//! typed JSON documents that skins and settings are made of.

pub mod config;
pub mod error;
pub mod value;
