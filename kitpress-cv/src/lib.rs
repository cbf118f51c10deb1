//! kitpress-cv library interface
//!
//! Batch-converts selected audio files to mono 48 kHz s16 WAV through an
//! ffmpeg-compatible engine, with interactive conflict resolution, safe
//! self-replacement, and a fixed-capacity kit export mode. Exposed as a
//! library so integration tests and alternative frontends can drive the
//! same pipeline.

pub mod backend;
pub mod conflict;
pub mod driver;
pub mod engine;
pub mod error;
pub mod kit;
pub mod naming;
pub mod session;
pub mod types;

pub use crate::driver::BatchDriver;
pub use crate::error::{ConvertError, ConvertResult};
pub use crate::session::Session;
