//! Output grammars.
//!
//! Each type renders itself (`dump_config` / `dump_source`); this module
//! owns the shared options and the two whole-process renderers used by the
//! CLI.

pub mod options;

pub use options::PrintOptions;

use crate::error::Result;
use crate::process::Process;

/// Output grammar selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Legacy `TypeName { type name = value }` grammar.
    Config,
    /// Source re-emission grammar (`cms.EDProducer('T', a = ...)`).
    Source,
}

/// Render a whole process. Placeholders must already be resolved.
pub fn render_process(process: &Process, format: Format, options: &PrintOptions) -> Result<String> {
    match format {
        Format::Config => process.dump_config(options),
        Format::Source => process.dump_source(options),
    }
}
