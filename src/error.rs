//! Error taxonomy for configuration assembly.
//!
//! Every variant is fatal to the call that produced it: assembly is
//! deterministic and is re-run from scratch after a fix.

use std::collections::BTreeSet;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A raw value failed the predicate of the parameter type.
    #[error("{value} is not a valid {type_name}")]
    Validation { type_name: String, value: String },

    /// A value of the wrong category was supplied.
    #[error("{context}: expected {expected}, got {found}")]
    Type {
        context: String,
        expected: String,
        found: String,
    },

    #[error(
        "{type_name} takes exactly one input value. But the following ones are given:\n{}\
         Maybe you forgot to combine them via '*' or '+'.",
        format_args_list(.arguments)
    )]
    ArgumentCount {
        type_name: String,
        arguments: Vec<String>,
    },

    #[error(
        "the module {label} has two dependencies\n{}\n{}\n\
         Please modify sequences to rectify this inconsistency",
        format_set(.present),
        format_set(.known)
    )]
    DependencyConflict {
        label: String,
        present: BTreeSet<String>,
        known: BTreeSet<String>,
    },

    /// `known` is the resolution table's keys, when a table was consulted.
    #[error("The SequencePlaceholder {name} cannot be resolved{}", format_known(.known))]
    UnresolvedPlaceholder {
        name: String,
        known: Option<Vec<String>>,
    },

    #[error("no clone of {0} found; clone the component before the sequences that use it")]
    MissingCloneSource(String),

    #[error("the {operator} operator cannot accept a sequence, got {operand}")]
    OperatorMisuse { operator: String, operand: String },

    #[error("no parameter named {0}")]
    UnknownParameter(String),

    #[error("{0:?} is not a valid name")]
    InvalidName(String),

    #[error("the label {0} is already used in this process")]
    DuplicateLabel(String),

    #[error("{0} has no label; place it in a process first")]
    Unlabeled(String),

    #[error("sequence {0} refers to itself")]
    RecursiveSequence(String),

    #[error("{path} uses module {module}, which is not placed in this process")]
    UnplacedModule { path: String, module: String },

    #[error("parse error at offset {pos}: {message}")]
    Parse { pos: usize, message: String },
}

impl ConfigError {
    pub fn validation(type_name: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self::Validation {
            type_name: type_name.into(),
            value: value.to_string(),
        }
    }

    pub fn wrong_type(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Type {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn parse(pos: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            pos,
            message: message.into(),
        }
    }
}

fn format_args_list(arguments: &[String]) -> String {
    arguments
        .iter()
        .enumerate()
        .map(|(i, a)| format!("    {}) {}\n", i + 1, a))
        .collect()
}

fn format_known(known: &Option<Vec<String>>) -> String {
    match known {
        Some(keys) => format!(". Known keys are: {keys:?}"),
        None => String::new(),
    }
}

fn format_set(set: &BTreeSet<String>) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("{{{}}}", items.join(", "))
}
