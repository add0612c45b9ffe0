use crate::error::{ConfigError, Result};
use crate::render::PrintOptions;
use crate::types::strings;
use std::fmt;

/// Reference to a data product: `label[:instance[:process]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InputTag {
    pub module_label: String,
    pub product_instance: String,
    pub process_name: String,
}

impl InputTag {
    pub fn new(module_label: impl Into<String>) -> Self {
        Self {
            module_label: module_label.into(),
            ..Self::default()
        }
    }

    pub fn with_instance(module_label: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            module_label: module_label.into(),
            product_instance: instance.into(),
            process_name: String::new(),
        }
    }

    pub fn full(
        module_label: impl Into<String>,
        instance: impl Into<String>,
        process: impl Into<String>,
    ) -> Self {
        Self {
            module_label: module_label.into(),
            product_instance: instance.into(),
            process_name: process.into(),
        }
    }

    /// Parse the colon-separated text form; at most three parts.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(':').collect();
        match parts.as_slice() {
            [label] => Ok(Self::new(*label)),
            [label, instance] => Ok(Self::with_instance(*label, *instance)),
            [label, instance, process] => Ok(Self::full(*label, *instance, *process)),
            _ => Err(ConfigError::validation("InputTag", strings::quote(text))),
        }
    }

    fn parts(&self) -> Vec<&str> {
        let mut parts = vec![
            self.module_label.as_str(),
            self.product_instance.as_str(),
            self.process_name.as_str(),
        ];
        while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        parts
    }

    /// Legacy grammar: `a`, `a:b`, `a::c`.
    pub fn config_value(&self) -> String {
        self.parts().join(":")
    }

    /// Constructor arguments in the source grammar: `'a', 'b'`.
    pub fn source_args(&self) -> String {
        self.parts()
            .into_iter()
            .map(strings::quote)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn dump_source(&self, options: &PrintOptions) -> String {
        format!("{}({})", options.class_name("InputTag"), self.source_args())
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_parts_default_to_empty() {
        let tag = InputTag::parse("tracks").unwrap();
        assert_eq!(tag, InputTag::full("tracks", "", ""));
        let tag = InputTag::parse("tracks::HLT").unwrap();
        assert_eq!(tag.process_name, "HLT");
        assert_eq!(tag.product_instance, "");
    }

    #[test]
    fn four_parts_are_rejected() {
        assert!(matches!(
            InputTag::parse("a:b:c:d"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn renders_minimal_forms() {
        assert_eq!(InputTag::new("a").config_value(), "a");
        assert_eq!(InputTag::with_instance("a", "b").config_value(), "a:b");
        assert_eq!(InputTag::full("a", "", "c").config_value(), "a::c");
        assert_eq!(
            InputTag::full("a", "", "c").dump_source(&PrintOptions::default()),
            "cms.InputTag('a', '', 'c')"
        );
    }
}
