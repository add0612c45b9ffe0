//! Object model for assembling event-processing configurations.
//!
//! Typed parameters and parameter sets describe components; modules are
//! combined into sequences, paths and end paths with `*` and `+`; a
//! [`process::Process`] holds everything and can be rendered in either
//! output grammar or handed to a [`sink::PlacementSink`].

pub mod component;
pub mod desc;
pub mod error;
pub mod names;
pub mod parse;
pub mod process;
pub mod render;
pub mod sequence;
pub mod sink;
pub mod types;

pub use error::{ConfigError, Result};
