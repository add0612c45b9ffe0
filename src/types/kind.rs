//! Parameter type names.

use std::fmt;

/// Element type of a parameter. Lists are homogeneous over one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    Bool,
    String,
    InputTag,
    PSet,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 9] = [
        ScalarKind::Int32,
        ScalarKind::UInt32,
        ScalarKind::Int64,
        ScalarKind::UInt64,
        ScalarKind::Double,
        ScalarKind::Bool,
        ScalarKind::String,
        ScalarKind::InputTag,
        ScalarKind::PSet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Int32 => "int32",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Double => "double",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::InputTag => "InputTag",
            ScalarKind::PSet => "PSet",
        }
    }

    pub fn list_name(self) -> &'static str {
        match self {
            ScalarKind::Int32 => "vint32",
            ScalarKind::UInt32 => "vuint32",
            ScalarKind::Int64 => "vint64",
            ScalarKind::UInt64 => "vuint64",
            ScalarKind::Double => "vdouble",
            ScalarKind::Bool => "vbool",
            ScalarKind::String => "vstring",
            ScalarKind::InputTag => "VInputTag",
            ScalarKind::PSet => "VPSet",
        }
    }
}

/// Full parameter type: an element kind, optionally as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    pub kind: ScalarKind,
    pub list: bool,
}

impl ParamType {
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self { kind, list: false }
    }

    pub const fn list(kind: ScalarKind) -> Self {
        Self { kind, list: true }
    }

    pub fn name(self) -> &'static str {
        if self.list {
            self.kind.list_name()
        } else {
            self.kind.name()
        }
    }

    /// Inverse of [`ParamType::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        ScalarKind::ALL.iter().find_map(|&kind| {
            if kind.name() == name {
                Some(Self::scalar(kind))
            } else if kind.list_name() == name {
                Some(Self::list(kind))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ScalarKind::ALL {
            for ty in [ParamType::scalar(kind), ParamType::list(kind)] {
                assert_eq!(ParamType::from_name(ty.name()), Some(ty));
            }
        }
        assert_eq!(ParamType::from_name("vfloat"), None);
    }
}
