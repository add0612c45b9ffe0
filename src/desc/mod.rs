//! Process description: JSON input for the command line tool.
//!
//! Components, parameter sets and sequence expressions are written in the
//! source grammar and read back through [`crate::parse`]. We keep two
//! representations:
//! - ProcessDesc: raw JSON input (serde-friendly)
//! - Process: validated, placed and resolved

use crate::parse::{parse_component, parse_parameter_set, parse_sequence};
use crate::process::Process;
use crate::sequence::{ModuleSequence, Role, Schedule, SeqNode};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessDesc {
    /// Process name, e.g. `RECO`.
    pub process: String,
    /// Components in placement order.
    #[serde(default)]
    pub components: Vec<ComponentDesc>,
    #[serde(default)]
    pub psets: Vec<PSetDesc>,
    /// Sequences may refer to sequences declared after them.
    #[serde(default)]
    pub sequences: Vec<SequenceDesc>,
    #[serde(default)]
    pub paths: Vec<SequenceDesc>,
    #[serde(default)]
    pub end_paths: Vec<SequenceDesc>,
    /// Path and end path labels. Absent means no schedule.
    #[serde(default)]
    pub schedule: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDesc {
    /// Ignored for sources, loopers and services.
    #[serde(default)]
    pub label: String,
    /// `cms.EDProducer('Type', a = cms.int32(1))`
    pub component: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PSetDesc {
    pub label: String,
    /// `cms.PSet(a = cms.int32(1))`
    pub pset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceDesc {
    pub label: String,
    /// `process.a*(process.b+~process.c)`
    pub expr: String,
}

impl ProcessDesc {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("failed to parse process description JSON")
    }

    /// Validate a ProcessDesc and build a Process:
    /// - every component, pset and expression parses
    /// - labels are unique
    /// - placeholders resolve and every used module is placed
    /// - schedule entries name paths or end paths
    pub fn validate_and_build(&self) -> anyhow::Result<Process> {
        let mut process = Process::new(&self.process)?;

        // 1) Components.
        for c in &self.components {
            let component = parse_component(&c.component)
                .with_context(|| format!("bad component {}", display_label(&c.label)))?;
            process
                .add_component(&c.label, component)
                .with_context(|| format!("cannot place component {}", display_label(&c.label)))?;
        }

        // 2) Parameter sets.
        for p in &self.psets {
            let pset = parse_parameter_set(&p.pset)
                .with_context(|| format!("bad parameter set {}", p.label))?;
            process
                .add_pset(&p.label, pset)
                .with_context(|| format!("cannot place parameter set {}", p.label))?;
        }

        // 3) Sequences, then paths and end paths.
        let groups = [
            (Role::Sequence, &self.sequences),
            (Role::Path, &self.paths),
            (Role::EndPath, &self.end_paths),
        ];
        for (role, descs) in groups {
            for d in descs {
                let seq = build_sequence(&process, role, d)?;
                let placed = match role {
                    Role::Sequence => process.add_sequence(&d.label, &seq),
                    Role::Path => process.add_path(&d.label, &seq),
                    Role::EndPath => process.add_end_path(&d.label, &seq),
                };
                placed.with_context(|| {
                    format!("cannot place {} {}", role.class_name(), d.label)
                })?;
            }
        }

        // 4) Late references.
        process.resolve().context("failed to resolve sequence placeholders")?;
        process.check_placement()?;

        // 5) Schedule.
        if let Some(labels) = &self.schedule {
            let mut seen = BTreeSet::new();
            let mut schedule = Schedule::new();
            for label in labels {
                if !seen.insert(label.as_str()) {
                    bail!("schedule lists {} twice", label);
                }
                let Some(path) = process.path(label).or_else(|| process.end_path(label)) else {
                    bail!("schedule references unknown path: {}", label);
                };
                schedule.push(path.clone())?;
            }
            process.set_schedule(schedule);
        }

        debug!(
            process = %self.process,
            components = self.components.len(),
            paths = self.paths.len() + self.end_paths.len(),
            "built process from description"
        );
        Ok(process)
    }
}

fn display_label(label: &str) -> &str {
    if label.is_empty() { "(unlabeled)" } else { label }
}

fn build_sequence(
    process: &Process,
    role: Role,
    desc: &SequenceDesc,
) -> anyhow::Result<ModuleSequence> {
    let lookup = |label: &str| {
        process
            .module(label)
            .map(SeqNode::from)
            .or_else(|| process.sequence(label).map(SeqNode::from))
    };
    let node = parse_sequence(&desc.expr, &lookup)
        .with_context(|| format!("bad expression for {} {}", role.class_name(), desc.label))?;
    Ok(ModuleSequence::new(role, node)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PrintOptions;
    use crate::sink::RecordingSink;
    use pretty_assertions::assert_eq;

    const DESC: &str = r#"{
        "process": "TEST",
        "components": [
            {"component": "cms.Source('EmptySource')"},
            {"label": "a", "component": "cms.EDProducer('A', n = cms.int32(1))"},
            {"label": "b", "component": "cms.EDFilter('B')"},
            {"label": "out", "component": "cms.OutputModule('Out')"}
        ],
        "psets": [{"label": "options", "pset": "cms.PSet(wantSummary = cms.untracked.bool(True))"}],
        "sequences": [{"label": "s", "expr": "process.a*later"}, {"label": "later", "expr": "b"}],
        "paths": [{"label": "p", "expr": "process.s+~process.b"}],
        "end_paths": [{"label": "e", "expr": "process.out"}],
        "schedule": ["p", "e"]
    }"#;

    #[test]
    fn builds_and_resolves_forward_references() {
        let process = ProcessDesc::from_json(DESC).unwrap().validate_and_build().unwrap();
        let opts = PrintOptions::bare();
        assert_eq!(
            process.path("p").unwrap().dump_source(&opts).unwrap(),
            "Path(s+~b)"
        );
        assert_eq!(
            process.sequence("s").unwrap().dump_source(&opts).unwrap(),
            "Sequence(a*later)"
        );
        assert_eq!(
            process.path("p").unwrap().names_list().unwrap(),
            vec!["a", "b", "!b"]
        );
        assert_eq!(process.schedule().unwrap().path_names().unwrap(), vec!["p", "e"]);

        let mut sink = RecordingSink::new();
        process.insert_into(&mut sink).unwrap();
        assert_eq!(sink.schedule, Some(vec!["p".to_string(), "e".to_string()]));
    }

    #[test]
    fn rejects_unknown_schedule_entries() {
        let mut desc = ProcessDesc::from_json(DESC).unwrap();
        desc.schedule = Some(vec!["p".into(), "missing".into()]);
        let err = desc.validate_and_build().unwrap_err();
        assert_eq!(err.to_string(), "schedule references unknown path: missing");
    }

    #[test]
    fn unresolved_placeholders_fail() {
        let mut desc = ProcessDesc::from_json(DESC).unwrap();
        desc.paths[0].expr = "process.s+nowhere".into();
        let err = desc.validate_and_build().unwrap_err();
        assert_eq!(err.to_string(), "failed to resolve sequence placeholders");
        assert!(format!("{err:#}").contains("nowhere"));
    }

    #[test]
    fn duplicate_labels_name_the_component() {
        let mut desc = ProcessDesc::from_json(DESC).unwrap();
        desc.components[2].label = "a".into();
        let err = desc.validate_and_build().unwrap_err();
        assert_eq!(err.to_string(), "cannot place component a");
    }

    #[test]
    fn bad_component_text_is_reported() {
        let mut desc = ProcessDesc::from_json(DESC).unwrap();
        desc.components[1].component = "cms.EDProducer('A', n = cms.uint32(-1))".into();
        let err = desc.validate_and_build().unwrap_err();
        assert_eq!(err.to_string(), "bad component a");
    }
}
