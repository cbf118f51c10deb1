//! Shared types for the kitpress converter
//!
//! Hosts the error taxonomy, the event bus used for batch progress
//! reporting, and configuration resolution shared by every frontend.

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
