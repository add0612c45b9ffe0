//! Untyped candidate values.
//!
//! Every assignment to a parameter starts as a [`Raw`] and becomes a typed
//! [`Scalar`](crate::types::Scalar) only after passing the predicate of the
//! target type.

use crate::types::{InputTag, ParameterSet, strings};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Int(i128),
    Float(f64),
    Bool(bool),
    Text(String),
    Tag(InputTag),
    Set(ParameterSet),
    List(Vec<Raw>),
}

impl Raw {
    pub fn describe(&self) -> &'static str {
        match self {
            Raw::Int(_) => "integer",
            Raw::Float(_) => "float",
            Raw::Bool(_) => "bool",
            Raw::Text(_) => "text",
            Raw::Tag(_) => "InputTag",
            Raw::Set(_) => "PSet",
            Raw::List(_) => "list",
        }
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Int(v) => write!(f, "{v}"),
            Raw::Float(v) => write!(f, "{v:?}"),
            Raw::Bool(true) => f.write_str("True"),
            Raw::Bool(false) => f.write_str("False"),
            Raw::Text(v) => f.write_str(&strings::quote(v)),
            Raw::Tag(tag) => write!(f, "InputTag({tag})"),
            Raw::Set(set) => write!(f, "PSet({} parameters)", set.len()),
            Raw::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! raw_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Raw {
            fn from(v: $t) -> Self {
                Raw::Int(i128::from(v))
            }
        })*
    };
}

raw_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<f64> for Raw {
    fn from(v: f64) -> Self {
        Raw::Float(v)
    }
}

impl From<bool> for Raw {
    fn from(v: bool) -> Self {
        Raw::Bool(v)
    }
}

impl From<&str> for Raw {
    fn from(v: &str) -> Self {
        Raw::Text(v.to_string())
    }
}

impl From<String> for Raw {
    fn from(v: String) -> Self {
        Raw::Text(v)
    }
}

impl From<InputTag> for Raw {
    fn from(v: InputTag) -> Self {
        Raw::Tag(v)
    }
}

impl From<ParameterSet> for Raw {
    fn from(v: ParameterSet) -> Self {
        Raw::Set(v)
    }
}

impl<T: Into<Raw>> From<Vec<T>> for Raw {
    fn from(v: Vec<T>) -> Self {
        Raw::List(v.into_iter().map(Into::into).collect())
    }
}
