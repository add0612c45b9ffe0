//! Typed values and the per-type validity predicates.

use crate::error::{ConfigError, Result};
use crate::render::PrintOptions;
use crate::types::{InputTag, ParamType, ParameterSet, Raw, ScalarKind, strings};

/// One validated element.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Bool(bool),
    String(String),
    InputTag(InputTag),
    PSet(ParameterSet),
}

/// The value held by a parameter: a scalar or a homogeneous list.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List { kind: ScalarKind, items: Vec<Scalar> },
}

impl ScalarKind {
    /// Apply this kind's predicate; the raw value is consumed either way.
    pub fn validate(self, raw: Raw) -> Result<Scalar> {
        let name = self.name();
        match (self, raw) {
            (ScalarKind::Int32, Raw::Int(v)) => i32::try_from(v)
                .map(Scalar::Int32)
                .map_err(|_| ConfigError::validation(name, v)),
            (ScalarKind::UInt32, Raw::Int(v)) => u32::try_from(v)
                .map(Scalar::UInt32)
                .map_err(|_| ConfigError::validation(name, v)),
            (ScalarKind::Int64, Raw::Int(v)) => i64::try_from(v)
                .map(Scalar::Int64)
                .map_err(|_| ConfigError::validation(name, v)),
            (ScalarKind::UInt64, Raw::Int(v)) => u64::try_from(v)
                .map(Scalar::UInt64)
                .map_err(|_| ConfigError::validation(name, v)),
            (ScalarKind::Double, Raw::Int(v)) => Ok(Scalar::Double(v as f64)),
            (ScalarKind::Double, Raw::Float(v)) => Ok(Scalar::Double(v)),
            (ScalarKind::Bool, Raw::Bool(v)) => Ok(Scalar::Bool(v)),
            (ScalarKind::String, Raw::Text(v)) => Ok(Scalar::String(v)),
            (ScalarKind::InputTag, Raw::Tag(v)) => Ok(Scalar::InputTag(v)),
            (ScalarKind::InputTag, Raw::Text(v)) => InputTag::parse(&v).map(Scalar::InputTag),
            (ScalarKind::PSet, Raw::Set(v)) => Ok(Scalar::PSet(v)),
            (_, raw) => Err(ConfigError::validation(name, raw)),
        }
    }

    /// Validate every candidate before returning any of them.
    pub fn validate_all(self, list_name: &str, raws: Vec<Raw>) -> Result<Vec<Scalar>> {
        raws.into_iter()
            .map(|raw| {
                let shown = raw.to_string();
                self.validate(raw)
                    .map_err(|_| ConfigError::validation(list_name, shown))
            })
            .collect()
    }
}

impl ParamType {
    pub fn validate(self, raw: Raw) -> Result<Value> {
        if !self.list {
            return self.kind.validate(raw).map(Value::Scalar);
        }
        match raw {
            Raw::List(items) => Ok(Value::List {
                kind: self.kind,
                items: self.kind.validate_all(self.name(), items)?,
            }),
            other => Err(ConfigError::validation(self.name(), other)),
        }
    }
}

impl ScalarKind {
    /// Convert one item of legacy config text. Integers accept a `0x` hex
    /// prefix; bools accept `true/t/on/yes/1` and `false/f/off/no/0` in any
    /// case. The result goes through the same range checks as [`Self::validate`].
    pub fn scalar_from_str(self, text: &str) -> Result<Scalar> {
        let text = text.trim();
        let bad = || ConfigError::validation(self.name(), strings::quote(text));
        let raw = match self {
            ScalarKind::Int32 | ScalarKind::UInt32 | ScalarKind::Int64 | ScalarKind::UInt64 => {
                let parsed = match text.strip_prefix("0x") {
                    Some(hex) => i128::from_str_radix(hex, 16),
                    None => text.parse::<i128>(),
                };
                Raw::Int(parsed.map_err(|_| bad())?)
            }
            ScalarKind::Double => Raw::Float(text.parse::<f64>().map_err(|_| bad())?),
            ScalarKind::Bool => Raw::Bool(bool_word(text).ok_or_else(bad)?),
            ScalarKind::String | ScalarKind::InputTag => Raw::Text(text.to_string()),
            ScalarKind::PSet => return Err(bad()),
        };
        self.validate(raw)
    }
}

fn bool_word(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "on" | "yes" | "1" => Some(true),
        "false" | "f" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl ParamType {
    /// Build a value from separate text items; a scalar type takes exactly one.
    pub fn value_from_strs<'a>(self, items: impl IntoIterator<Item = &'a str>) -> Result<Value> {
        let items: Vec<&str> = items.into_iter().collect();
        if !self.list {
            return match items.as_slice() {
                [only] => self.kind.scalar_from_str(only).map(Value::Scalar),
                _ => Err(ConfigError::validation(self.name(), items.join(","))),
            };
        }
        let converted = items
            .iter()
            .map(|item| {
                self.kind
                    .scalar_from_str(item)
                    .map_err(|_| ConfigError::validation(self.name(), strings::quote(item)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List {
            kind: self.kind,
            items: converted,
        })
    }

    /// Build a value from one piece of legacy text. List types split it on
    /// commas and skip empty items, so `"1, 0x10,"` is a two-item `vint32`.
    pub fn value_from_str(self, text: &str) -> Result<Value> {
        if self.list {
            self.value_from_strs(text.split(',').map(str::trim).filter(|s| !s.is_empty()))
        } else {
            self.value_from_strs([text])
        }
    }
}

/// Doubles always read back as doubles: `1.0`, `0.5`, `1e-7`.
pub fn format_double(v: f64) -> String {
    format!("{v:?}")
}

fn format_bool(v: bool) -> &'static str {
    if v { "True" } else { "False" }
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::UInt32(_) => ScalarKind::UInt32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::UInt64(_) => ScalarKind::UInt64,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::String(_) => ScalarKind::String,
            Scalar::InputTag(_) => ScalarKind::InputTag,
            Scalar::PSet(_) => ScalarKind::PSet,
        }
    }

    pub fn config_value(&self, options: &PrintOptions) -> String {
        match self {
            Scalar::Int32(v) => v.to_string(),
            Scalar::UInt32(v) => v.to_string(),
            Scalar::Int64(v) => v.to_string(),
            Scalar::UInt64(v) => v.to_string(),
            Scalar::Double(v) => format_double(*v),
            Scalar::Bool(v) => format_bool(*v).to_string(),
            Scalar::String(v) => strings::quote(v),
            Scalar::InputTag(v) => v.config_value(),
            Scalar::PSet(v) => v.config_value(options),
        }
    }

    /// Element form inside a source-grammar constructor call.
    ///
    /// InputTags inside lists use the quoted `label:instance` text form;
    /// the scalar `InputTag` parameter uses its own constructor instead.
    pub fn source_value(&self, options: &PrintOptions) -> String {
        match self {
            Scalar::InputTag(v) => strings::quote(&v.config_value()),
            Scalar::PSet(v) => v.dump_source(options, "PSet"),
            other => other.config_value(options),
        }
    }
}

impl Value {
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Scalar(s) => ParamType::scalar(s.kind()),
            Value::List { kind, .. } => ParamType::list(*kind),
        }
    }

    pub fn config_value(&self, options: &PrintOptions) -> String {
        match self {
            Value::Scalar(s) => s.config_value(options),
            Value::List { items, .. } if items.is_empty() => "{ }".to_string(),
            Value::List {
                kind: ScalarKind::PSet,
                items,
            } => {
                let nested = options.nested();
                let blocks: Vec<String> = items
                    .iter()
                    .map(|item| format!("{}{}", nested.indentation(), item.config_value(&nested)))
                    .collect();
                format!("{{\n{}\n{}}}", blocks.join(",\n"), options.indentation())
            }
            Value::List { items, .. } => {
                let rendered: Vec<String> =
                    items.iter().map(|item| item.config_value(options)).collect();
                format!("{{ {} }}", rendered.join(", "))
            }
        }
    }

    /// Constructor arguments in the source grammar, without the class name.
    pub fn source_args(&self, options: &PrintOptions) -> String {
        match self {
            Value::Scalar(Scalar::InputTag(tag)) => tag.source_args(),
            Value::Scalar(Scalar::PSet(set)) => set.source_args(options),
            Value::Scalar(s) => s.source_value(options),
            Value::List { items, .. } if items.is_empty() => String::new(),
            Value::List {
                kind: ScalarKind::PSet,
                items,
            } => {
                let nested = options.nested();
                let blocks: Vec<String> = items
                    .iter()
                    .map(|item| format!("{}{}", nested.indentation(), item.source_value(&nested)))
                    .collect();
                format!("\n{}\n{}", blocks.join(",\n"), options.indentation())
            }
            Value::List { items, .. } => items
                .iter()
                .map(|item| item.source_value(options))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
