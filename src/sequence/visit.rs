//! Read-only pre-order traversal.

use crate::sequence::{Module, ModuleSequence, SeqNode};

/// `enter` is called before a node's children, `leave` after them.
pub trait Visitor {
    fn enter(&mut self, node: &SeqNode);
    fn leave(&mut self, _node: &SeqNode) {}
}

/// Modifiers expose their module as an `Atomic` child; a subsequence
/// reference is entered, then its content.
pub fn visit_node<V: Visitor + ?Sized>(node: &SeqNode, visitor: &mut V) {
    visitor.enter(node);
    match node {
        SeqNode::AlsoRun(l, r) | SeqNode::AndThen(l, r) => {
            visit_node(l, visitor);
            visit_node(r, visitor);
        }
        SeqNode::Negate(m) | SeqNode::Ignore(m) => visit_node(&SeqNode::Atomic(m.clone()), visitor),
        SeqNode::Sequence(seq) => visit_node(&seq.root(), visitor),
        SeqNode::Atomic(_) | SeqNode::Placeholder(_) => {}
    }
    visitor.leave(node);
}

impl ModuleSequence {
    pub fn visit<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visit_node(&self.root(), visitor);
    }

    /// Every distinct module reachable from this root, in first-seen order.
    pub fn modules(&self) -> Vec<Module> {
        let mut collector = ModuleCollector::default();
        self.visit(&mut collector);
        collector.modules
    }
}

/// Collects distinct modules in first-seen order.
#[derive(Debug, Default)]
pub struct ModuleCollector {
    pub modules: Vec<Module>,
}

impl Visitor for ModuleCollector {
    fn enter(&mut self, node: &SeqNode) {
        let SeqNode::Atomic(m) = node else {
            return;
        };
        if !self.modules.iter().any(|seen| seen.ptr_eq(m)) {
            self.modules.push(m.clone());
        }
    }
}
