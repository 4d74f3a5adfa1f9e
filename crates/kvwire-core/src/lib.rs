//! kvwire Core — RESP wire protocol types and codec.
//!
//! This crate is the protocol layer of kvwire. It is IO-free and
//! runtime-free (dependency level 0): it knows how to build request
//! frames and decode reply frames, nothing else. Transports live in
//! `kvwire-client`.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`value`]: Reply value model and typed conversions
//! - [`command`]: Request builder and encoding
//! - [`codec`]: Incremental reply decoder

pub mod codec;
pub mod command;
pub mod error;
pub mod value;

// Re-export key types at crate root for convenience
pub use codec::decode;
pub use command::Command;
pub use error::{Error, Result};
pub use value::{FromValue, Value};
