//! Parameter value system: typed, validated values with a tracked flag.
//!
//! - `kind`: type names (`int32`, `vstring`, `VPSet`, ...)
//! - `raw` / `value`: untyped candidates and the predicates that type them
//! - `parameter`: a value plus trackedness, with all-or-nothing list edits
//! - `pset`: the ordered, name-unique container

pub mod input_tag;
pub mod kind;
pub mod parameter;
pub mod pset;
pub mod raw;
pub mod strings;
pub mod value;

pub use input_tag::InputTag;
pub use kind::{ParamType, ScalarKind};
pub use parameter::{Parameter, untracked};
pub use pset::ParameterSet;
pub use raw::Raw;
pub use value::{Scalar, Value, format_double};
