//! A sink that records every registration as serializable data.

use crate::render::PrintOptions;
use crate::sink::PlacementSink;
use crate::types::{Scalar, ScalarKind};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedContainer {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Scalar {
        tracked: bool,
        name: String,
        type_name: String,
        value: String,
    },
    List {
        tracked: bool,
        name: String,
        type_name: String,
        values: Vec<String>,
    },
    Container {
        tracked: bool,
        name: String,
        content: RecordedContainer,
    },
    ContainerList {
        tracked: bool,
        name: String,
        items: Vec<RecordedContainer>,
    },
    Labels {
        tracked: bool,
        name: String,
        labels: Vec<String>,
    },
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Scalar { name, .. }
            | Entry::List { name, .. }
            | Entry::Container { name, .. }
            | Entry::ContainerList { name, .. }
            | Entry::Labels { name, .. } => name,
        }
    }
}

impl RecordedContainer {
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Value text of a scalar entry.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Entry::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn labels(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            Entry::Labels { labels, .. } => Some(labels),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    /// `producer`, `filter`, `service`, ...
    pub role: String,
    pub name: String,
    pub content: RecordedContainer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingSink {
    pub registrations: Vec<Registration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_parameters: Option<RecordedContainer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration(&self, role: &str, name: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.role == role && r.name == name)
    }

    pub fn roles_in_order(&self) -> Vec<(&str, &str)> {
        self.registrations
            .iter()
            .map(|r| (r.role.as_str(), r.name.as_str()))
            .collect()
    }

    fn register(&mut self, role: &str, name: &str, content: RecordedContainer) {
        self.registrations.push(Registration {
            role: role.to_string(),
            name: name.to_string(),
            content,
        });
    }
}

fn scalar_text(value: &Scalar) -> String {
    value.config_value(&PrintOptions::default())
}

impl PlacementSink for RecordingSink {
    type Handle = RecordedContainer;

    fn new_container(&mut self) -> RecordedContainer {
        RecordedContainer::default()
    }

    fn add_scalar(&mut self, target: &mut RecordedContainer, tracked: bool, name: &str, value: &Scalar) {
        target.entries.push(Entry::Scalar {
            tracked,
            name: name.to_string(),
            type_name: value.kind().name().to_string(),
            value: scalar_text(value),
        });
    }

    fn add_list(
        &mut self,
        target: &mut RecordedContainer,
        tracked: bool,
        name: &str,
        kind: ScalarKind,
        values: &[Scalar],
    ) {
        target.entries.push(Entry::List {
            tracked,
            name: name.to_string(),
            type_name: kind.list_name().to_string(),
            values: values.iter().map(scalar_text).collect(),
        });
    }

    fn add_container(
        &mut self,
        target: &mut RecordedContainer,
        tracked: bool,
        name: &str,
        child: RecordedContainer,
    ) {
        target.entries.push(Entry::Container {
            tracked,
            name: name.to_string(),
            content: child,
        });
    }

    fn add_container_list(
        &mut self,
        target: &mut RecordedContainer,
        tracked: bool,
        name: &str,
        children: Vec<RecordedContainer>,
    ) {
        target.entries.push(Entry::ContainerList {
            tracked,
            name: name.to_string(),
            items: children,
        });
    }

    fn add_ordered_labels(
        &mut self,
        target: &mut RecordedContainer,
        tracked: bool,
        name: &str,
        labels: Vec<String>,
    ) {
        target.entries.push(Entry::Labels {
            tracked,
            name: name.to_string(),
            labels,
        });
    }

    fn add_producer(&mut self, name: &str, handle: RecordedContainer) {
        self.register("producer", name, handle);
    }

    fn add_filter(&mut self, name: &str, handle: RecordedContainer) {
        self.register("filter", name, handle);
    }

    fn add_analyzer(&mut self, name: &str, handle: RecordedContainer) {
        self.register("analyzer", name, handle);
    }

    fn add_output_module(&mut self, name: &str, handle: RecordedContainer) {
        self.register("output_module", name, handle);
    }

    fn add_service(&mut self, name: &str, handle: RecordedContainer) {
        self.register("service", name, handle);
    }

    fn add_source(&mut self, name: &str, handle: RecordedContainer) {
        self.register("source", name, handle);
    }

    fn add_looper(&mut self, name: &str, handle: RecordedContainer) {
        self.register("looper", name, handle);
    }

    fn add_es_source(&mut self, name: &str, handle: RecordedContainer) {
        self.register("es_source", name, handle);
    }

    fn add_es_producer(&mut self, name: &str, handle: RecordedContainer) {
        self.register("es_producer", name, handle);
    }

    fn add_es_prefer(&mut self, name: &str, handle: RecordedContainer) {
        self.register("es_prefer", name, handle);
    }

    fn add_pset(&mut self, name: &str, handle: RecordedContainer) {
        self.register("pset", name, handle);
    }

    fn add_process_parameters(&mut self, process_name: &str, handle: RecordedContainer) {
        self.process_name = Some(process_name.to_string());
        self.process_parameters = Some(handle);
    }

    fn set_schedule_order(&mut self, path_names: Vec<String>) {
        self.schedule = Some(path_names);
    }
}
