//! Ordered, name-unique parameter container.

use crate::error::{ConfigError, Result};
use crate::names::check_identifier;
use crate::render::PrintOptions;
use crate::sink::PlacementSink;
use crate::types::{Parameter, Raw};
use indexmap::IndexMap;

/// Parameters in insertion order.
///
/// Two mutation paths exist: [`ParameterSet::set_parameter`] adds or replaces
/// a whole slot (including its trackedness), while
/// [`ParameterSet::set_parameter_value`] coerces a raw value into the
/// parameter already held under that name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: IndexMap<String, Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<N: Into<String>>(
        pairs: impl IntoIterator<Item = (N, Parameter)>,
    ) -> Result<Self> {
        let mut set = Self::new();
        for (name, param) in pairs {
            set.set_parameter(name, param)?;
        }
        Ok(set)
    }

    /// Start from copies of the contents of existing blocks, in order.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a ParameterSet>) -> Self {
        let mut set = Self::new();
        for block in blocks {
            set.merge(block);
        }
        set
    }

    /// Copy every parameter of `other` into this set, replacing same-named slots.
    pub fn merge(&mut self, other: &ParameterSet) {
        for (name, param) in &other.params {
            self.params.insert(name.clone(), param.clone());
        }
    }

    pub fn with(mut self, name: impl Into<String>, param: Parameter) -> Result<Self> {
        self.set_parameter(name, param)?;
        Ok(self)
    }

    /// Add `name`, or replace its slot (value and trackedness).
    pub fn set_parameter(&mut self, name: impl Into<String>, param: Parameter) -> Result<()> {
        let name = name.into();
        check_identifier(&name)?;
        self.params.insert(name, param);
        Ok(())
    }

    /// Coerce `raw` into the existing parameter; trackedness is preserved.
    pub fn set_parameter_value(&mut self, name: &str, raw: impl Into<Raw>) -> Result<()> {
        self.params
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?
            .set_value(raw)
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.params.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    /// Independent deep copy of the contents.
    pub fn parameters(&self) -> ParameterSet {
        self.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// One `type name = value` line per parameter at the nested indentation.
    pub fn config_lines(&self, options: &PrintOptions) -> String {
        let nested = options.nested();
        self.params
            .iter()
            .map(|(name, param)| {
                format!(
                    "{}{} {} = {}\n",
                    nested.indentation(),
                    param.config_type_name(),
                    name,
                    param.config_value(&nested)
                )
            })
            .collect()
    }

    /// Legacy grammar block: `{` lines `}`.
    pub fn config_value(&self, options: &PrintOptions) -> String {
        if self.is_empty() {
            return "{ }".to_string();
        }
        format!("{{ \n{}{}}}", self.config_lines(options), options.indentation())
    }

    /// Named constructor arguments, one per line.
    pub fn source_args(&self, options: &PrintOptions) -> String {
        if self.is_empty() {
            return String::new();
        }
        let nested = options.nested();
        let args: Vec<String> = self
            .params
            .iter()
            .map(|(name, param)| {
                format!("{}{} = {}", nested.indentation(), name, param.dump_source(&nested))
            })
            .collect();
        format!("\n{}\n{}", args.join(",\n"), options.indentation())
    }

    /// `cms.PSet(...)` with this set's contents as keyword arguments.
    pub fn dump_source(&self, options: &PrintOptions, class: &str) -> String {
        format!("{}({})", options.class_name(class), self.source_args(options))
    }

    /// Let each parameter insert itself under its name, in insertion order.
    pub fn insert_contents_into<S: PlacementSink + ?Sized>(
        &self,
        sink: &mut S,
        target: &mut S::Handle,
    ) {
        for (name, param) in &self.params {
            param.insert_into(sink, target, name);
        }
    }
}
