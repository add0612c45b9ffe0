//! Identity-preserving deep copies of sequence expressions.

use crate::error::{ConfigError, Result};
use crate::sequence::{Module, ModuleSequence, NodeId, SeqNode};
use std::collections::HashMap;
use tracing::debug;

/// Original identity to clone, for one cloning pass.
///
/// Modules must be entered before the expressions that use them. A fresh
/// table is required per pass.
#[derive(Debug, Default)]
pub struct CloneTable {
    modules: HashMap<NodeId, Module>,
    sequences: HashMap<NodeId, ModuleSequence>,
}

impl CloneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `original` (keeping its label) and record the copy. A module
    /// already in the table yields the recorded clone.
    pub fn clone_module(&mut self, original: &Module) -> Result<Module> {
        if let Some(existing) = self.modules.get(&original.id()) {
            return Ok(existing.clone());
        }
        let copy = original.copy();
        if let Some(label) = original.label() {
            copy.set_label(&label)?;
        }
        self.modules.insert(original.id(), copy.clone());
        Ok(copy)
    }

    /// Record an externally made clone.
    pub fn register_module(&mut self, original: &Module, clone: Module) {
        self.modules.insert(original.id(), clone);
    }

    pub fn module(&self, original: &Module) -> Option<&Module> {
        self.modules.get(&original.id())
    }

    pub fn sequence(&self, original: &ModuleSequence) -> Option<&ModuleSequence> {
        self.sequences.get(&original.id())
    }

    fn mapped_module(&self, original: &Module) -> Result<Module> {
        self.module(original)
            .cloned()
            .ok_or_else(|| ConfigError::MissingCloneSource(original.display_name()))
    }
}

/// Clone an expression. Leaves map through the table; subsequences are
/// cloned once per pass and shared by every reference.
pub fn clone_with_table(node: &SeqNode, table: &mut CloneTable) -> Result<SeqNode> {
    Ok(match node {
        SeqNode::Atomic(m) => SeqNode::Atomic(table.mapped_module(m)?),
        SeqNode::Negate(m) => SeqNode::Negate(table.mapped_module(m)?),
        SeqNode::Ignore(m) => SeqNode::Ignore(table.mapped_module(m)?),
        SeqNode::AlsoRun(l, r) => SeqNode::AlsoRun(
            Box::new(clone_with_table(l, table)?),
            Box::new(clone_with_table(r, table)?),
        ),
        SeqNode::AndThen(l, r) => SeqNode::AndThen(
            Box::new(clone_with_table(l, table)?),
            Box::new(clone_with_table(r, table)?),
        ),
        SeqNode::Placeholder(name) => SeqNode::Placeholder(name.clone()),
        SeqNode::Sequence(seq) => SeqNode::Sequence(seq.clone_with_table(table)?),
    })
}

impl ModuleSequence {
    /// The clone is registered before its content is cloned, so a sequence
    /// reached again during the same pass resolves to the same clone.
    pub fn clone_with_table(&self, table: &mut CloneTable) -> Result<ModuleSequence> {
        if let Some(existing) = table.sequences.get(&self.id()) {
            return Ok(existing.clone());
        }
        let clone = ModuleSequence::from_root(self.role(), SeqNode::Placeholder(String::new()));
        if let Some(label) = self.label() {
            clone.set_label(&label)?;
        }
        table.sequences.insert(self.id(), clone.clone());
        let root = clone_with_table(&self.root(), table)?;
        clone.replace_root(root);
        debug!(original = ?self.id(), clone = ?clone.id(), "cloned sequence");
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, TypedComponent};
    use crate::render::PrintOptions;
    use crate::types::Parameter;
    use pretty_assertions::assert_eq;

    fn module(label: &str) -> Module {
        Module::labeled(label, TypedComponent::new(ComponentKind::EDProducer, "Dummy")).unwrap()
    }

    #[test]
    fn leaves_need_a_cloned_module() {
        let (a, b) = (module("a"), module("b"));
        let path = ModuleSequence::path(&a * &b).unwrap();
        let mut table = CloneTable::new();
        table.clone_module(&a).unwrap();
        let err = path.clone_with_table(&mut table).unwrap_err();
        assert_eq!(err, ConfigError::MissingCloneSource("b".into()));
    }

    #[test]
    fn shared_sequence_is_cloned_once() {
        let (a, c) = (module("a"), module("c"));
        let s = ModuleSequence::sequence(&a).unwrap();
        s.set_label("s").unwrap();
        let path = ModuleSequence::path(&s * &c + &s).unwrap();

        let mut table = CloneTable::new();
        table.clone_module(&a).unwrap();
        table.clone_module(&c).unwrap();
        let cloned = path.clone_with_table(&mut table).unwrap();

        let root = cloned.root();
        let SeqNode::AndThen(left, right) = &*root else {
            panic!("expected AndThen");
        };
        let SeqNode::AlsoRun(first, _) = &**left else {
            panic!("expected AlsoRun");
        };
        let (SeqNode::Sequence(x), SeqNode::Sequence(y)) = (&**first, &**right) else {
            panic!("expected sequence references");
        };
        assert!(x.ptr_eq(y));
        assert!(!x.ptr_eq(&s));
        assert!(table.sequence(&s).unwrap().ptr_eq(x));
    }

    #[test]
    fn clone_is_disjoint_from_original() {
        let (a, b) = (module("a"), module("b"));
        let s = ModuleSequence::sequence(&a).unwrap();
        let path = ModuleSequence::path(&s * &b).unwrap();

        let mut table = CloneTable::new();
        let a2 = table.clone_module(&a).unwrap();
        table.clone_module(&b).unwrap();
        let cloned = path.clone_with_table(&mut table).unwrap();

        a2.component_mut()
            .set_parameter("x", Parameter::int32(1))
            .unwrap();
        table.sequence(&s).unwrap().extend_and_then(&b).unwrap();

        assert!(a.component().get("x").is_none());
        assert_eq!(path.names_list().unwrap(), vec!["a", "b"]);
        assert_eq!(cloned.names_list().unwrap(), vec!["a", "b", "b"]);
        assert_eq!(
            cloned.dump_source(&PrintOptions::bare()).unwrap(),
            "Path((a+b)*b)"
        );
    }

    #[test]
    fn module_clone_is_reused() {
        let a = module("a");
        let mut table = CloneTable::new();
        let first = table.clone_module(&a).unwrap();
        let second = table.clone_module(&a).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.label().as_deref(), Some("a"));
    }
}
