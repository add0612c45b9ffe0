//! Indentation and naming knobs shared by both output grammars.

/// Options threaded through every `dump_*` call.
///
/// Rendering never mutates options; nested blocks call [`PrintOptions::nested`]
/// to get a copy indented one step deeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    indent: usize,
    pub delta_indent: usize,
    /// Class namespace in the source grammar, e.g. `cms` in `cms.int32(1)`.
    pub namespace: Option<String>,
    /// Prefix for labels inside sequence expressions, e.g. `process.`.
    pub label_prefix: Option<String>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: 0,
            delta_indent: 4,
            namespace: Some("cms".to_string()),
            label_prefix: Some("process.".to_string()),
        }
    }
}

impl PrintOptions {
    /// No namespace and no label prefix: `Path(c*(a+b))`.
    pub fn bare() -> Self {
        Self {
            namespace: None,
            label_prefix: None,
            ..Self::default()
        }
    }

    pub fn with_indent_step(mut self, step: usize) -> Self {
        self.delta_indent = step;
        self
    }

    pub fn indentation(&self) -> String {
        " ".repeat(self.indent)
    }

    pub fn nested(&self) -> Self {
        Self {
            indent: self.indent + self.delta_indent,
            ..self.clone()
        }
    }

    /// `cms.Name` or just `Name`.
    pub fn class_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{name}"),
            None => name.to_string(),
        }
    }

    pub fn label(&self, label: &str) -> String {
        match &self.label_prefix {
            Some(prefix) => format!("{prefix}{label}"),
            None => label.to_string(),
        }
    }
}
