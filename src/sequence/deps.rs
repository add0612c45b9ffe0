//! Dependency inference over sequence expressions.
//!
//! `*` threads one "present" set through left then right. `+` evaluates
//! both branches from the same baseline and unions the results on return,
//! so neither branch depends on the other.

use crate::error::{ConfigError, Result};
use crate::sequence::{ModuleSequence, SeqNode};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Label to the labels that must run before it.
pub type DependencyTable = BTreeMap<String, BTreeSet<String>>;

/// One inference pass. `known` is shared across the pass and must start
/// empty; a label reached twice with two different sets is a conflict.
pub fn find_dependencies(
    node: &SeqNode,
    known: &mut DependencyTable,
    present: &mut BTreeSet<String>,
) -> Result<()> {
    match node {
        SeqNode::Atomic(m) | SeqNode::Negate(m) | SeqNode::Ignore(m) => {
            let label = m.require_label()?;
            match known.get(&label) {
                Some(previous) if *previous != *present => {
                    return Err(ConfigError::DependencyConflict {
                        label,
                        present: present.clone(),
                        known: previous.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    known.insert(label.clone(), present.clone());
                }
            }
            present.insert(label);
        }
        SeqNode::AlsoRun(left, right) => {
            find_dependencies(left, known, present)?;
            find_dependencies(right, known, present)?;
        }
        SeqNode::AndThen(left, right) => {
            let mut from_left = present.clone();
            let mut from_right = present.clone();
            find_dependencies(left, known, &mut from_left)?;
            find_dependencies(right, known, &mut from_right)?;
            present.extend(from_left);
            present.extend(from_right);
        }
        SeqNode::Sequence(seq) => find_dependencies(&seq.root(), known, present)?,
        SeqNode::Placeholder(name) => {
            return Err(ConfigError::UnresolvedPlaceholder {
                name: name.clone(),
                known: None,
            });
        }
    }
    Ok(())
}

impl ModuleSequence {
    /// Run one pass with fresh tables.
    pub fn module_dependencies(&self) -> Result<DependencyTable> {
        let mut known = DependencyTable::new();
        find_dependencies(&self.root(), &mut known, &mut BTreeSet::new())?;
        debug!(sequence = %self.describe(), modules = known.len(), "inferred dependencies");
        Ok(known)
    }
}
