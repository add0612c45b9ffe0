//! Expression tree nodes and the operators that build them.

use crate::component::{Capability, TypedComponent};
use crate::error::{ConfigError, Result};
use crate::names::check_identifier;
use crate::sequence::ModuleSequence;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::{Add, Mul, Not};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Surrogate identity issued once per node at creation.
///
/// Clone tables key on this instead of on addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct ModuleInner {
    id: NodeId,
    label: RefCell<Option<String>>,
    component: RefCell<TypedComponent>,
}

/// Shared handle to a sequenceable component instance.
///
/// `Clone` shares the instance; [`Module::copy`] makes a new one.
#[derive(Clone)]
pub struct Module(Rc<ModuleInner>);

impl Module {
    pub fn new(component: TypedComponent) -> Result<Self> {
        if !component.kind().has(Capability::Sequenceable) {
            return Err(ConfigError::wrong_type(
                "sequence leaf",
                "EDProducer, EDFilter, EDAnalyzer or OutputModule",
                component.describe(),
            ));
        }
        Ok(Self(Rc::new(ModuleInner {
            id: NodeId::next(),
            label: RefCell::new(None),
            component: RefCell::new(component),
        })))
    }

    pub fn labeled(label: &str, component: TypedComponent) -> Result<Self> {
        let module = Self::new(component)?;
        module.set_label(label)?;
        Ok(module)
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn label(&self) -> Option<String> {
        self.0.label.borrow().clone()
    }

    pub fn set_label(&self, label: &str) -> Result<()> {
        check_identifier(label)?;
        *self.0.label.borrow_mut() = Some(label.to_string());
        Ok(())
    }

    pub(crate) fn require_label(&self) -> Result<String> {
        self.label()
            .ok_or_else(|| ConfigError::Unlabeled(self.describe()))
    }

    pub fn component(&self) -> Ref<'_, TypedComponent> {
        self.0.component.borrow()
    }

    pub fn component_mut(&self) -> RefMut<'_, TypedComponent> {
        self.0.component.borrow_mut()
    }

    /// Identical parameters, fresh identity, no label.
    pub fn copy(&self) -> Self {
        Self(Rc::new(ModuleInner {
            id: NodeId::next(),
            label: RefCell::new(None),
            component: RefCell::new(self.component().copy()),
        }))
    }

    pub fn ptr_eq(&self, other: &Module) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn describe(&self) -> String {
        self.component().describe()
    }

    /// Label when placed, otherwise the component description.
    pub(crate) fn display_name(&self) -> String {
        self.label().unwrap_or_else(|| self.describe())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.0.id)
            .field("label", &self.0.label.borrow())
            .field("type", &self.component().type_name())
            .finish()
    }
}

/// Node of a sequence expression.
///
/// `Negate` and `Ignore` hold a module directly: they only apply to a single
/// atomic leaf.
#[derive(Debug, Clone)]
pub enum SeqNode {
    Atomic(Module),
    /// `*`: both run, declared order kept, right depends on left.
    AlsoRun(Box<SeqNode>, Box<SeqNode>),
    /// `+`: right follows left, without an ordering constraint between them.
    AndThen(Box<SeqNode>, Box<SeqNode>),
    Negate(Module),
    Ignore(Module),
    /// Named forward reference, replaced during resolution.
    Placeholder(String),
    /// Reference to a shared, reusable subsequence.
    Sequence(ModuleSequence),
}

impl SeqNode {
    pub fn placeholder(name: impl Into<String>) -> Self {
        SeqNode::Placeholder(name.into())
    }

    /// Invert the result of a single module.
    pub fn negate(operand: impl Into<SeqNode>) -> Result<Self> {
        match operand.into() {
            SeqNode::Atomic(m) => Ok(SeqNode::Negate(m)),
            other => Err(ConfigError::OperatorMisuse {
                operator: "~".to_string(),
                operand: other.describe(),
            }),
        }
    }

    /// Run a single module but discard its result.
    pub fn ignore(operand: impl Into<SeqNode>) -> Result<Self> {
        match operand.into() {
            SeqNode::Atomic(m) => Ok(SeqNode::Ignore(m)),
            other => Err(ConfigError::OperatorMisuse {
                operator: "ignore".to_string(),
                operand: other.describe(),
            }),
        }
    }

    /// Binding strength of binary operators; larger binds tighter.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            SeqNode::AlsoRun(..) => Some(2),
            SeqNode::AndThen(..) => Some(1),
            _ => None,
        }
    }

    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            SeqNode::AlsoRun(..) | SeqNode::AndThen(..) | SeqNode::Negate(_) | SeqNode::Ignore(_)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SeqNode::Atomic(_) => "Atomic",
            SeqNode::AlsoRun(..) => "AlsoRun",
            SeqNode::AndThen(..) => "AndThen",
            SeqNode::Negate(_) => "Negate",
            SeqNode::Ignore(_) => "Ignore",
            SeqNode::Placeholder(_) => "Placeholder",
            SeqNode::Sequence(_) => "Sequence",
        }
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            SeqNode::Atomic(m) => m.describe(),
            SeqNode::Placeholder(name) => format!("SequencePlaceholder({name})"),
            SeqNode::Sequence(seq) => seq.describe(),
            other => other.kind_name().to_string(),
        }
    }
}

pub fn ignore(operand: impl Into<SeqNode>) -> Result<SeqNode> {
    SeqNode::ignore(operand)
}

pub fn negate(operand: impl Into<SeqNode>) -> Result<SeqNode> {
    SeqNode::negate(operand)
}

impl From<Module> for SeqNode {
    fn from(m: Module) -> Self {
        SeqNode::Atomic(m)
    }
}

impl From<&Module> for SeqNode {
    fn from(m: &Module) -> Self {
        SeqNode::Atomic(m.clone())
    }
}

impl From<ModuleSequence> for SeqNode {
    fn from(seq: ModuleSequence) -> Self {
        SeqNode::Sequence(seq)
    }
}

impl From<&ModuleSequence> for SeqNode {
    fn from(seq: &ModuleSequence) -> Self {
        SeqNode::Sequence(seq.clone())
    }
}

macro_rules! sequence_operators {
    ($($t:ty),*) => {
        $(
            impl<R: Into<SeqNode>> Mul<R> for $t {
                type Output = SeqNode;
                fn mul(self, rhs: R) -> SeqNode {
                    SeqNode::AlsoRun(Box::new(self.into()), Box::new(rhs.into()))
                }
            }

            impl<R: Into<SeqNode>> Add<R> for $t {
                type Output = SeqNode;
                fn add(self, rhs: R) -> SeqNode {
                    SeqNode::AndThen(Box::new(self.into()), Box::new(rhs.into()))
                }
            }
        )*
    };
}

sequence_operators!(SeqNode, Module, &Module, ModuleSequence, &ModuleSequence);

impl Not for &Module {
    type Output = SeqNode;
    fn not(self) -> SeqNode {
        SeqNode::Negate(self.clone())
    }
}

impl Not for Module {
    type Output = SeqNode;
    fn not(self) -> SeqNode {
        SeqNode::Negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn module(label: &str) -> Module {
        Module::labeled(label, TypedComponent::new(ComponentKind::EDProducer, "Dummy")).unwrap()
    }

    #[test]
    fn ids_are_unique() {
        let a = module("a");
        let b = module("b");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_ne!(a.copy().id(), a.id());
    }

    #[test]
    fn copy_has_same_parameters_and_no_label() {
        let a = module("a");
        let copy = a.copy();
        assert_eq!(*copy.component(), *a.component());
        assert_eq!(copy.label(), None);
        assert!(!copy.ptr_eq(&a));
    }

    #[test]
    fn services_cannot_be_sequenced() {
        let err = Module::new(TypedComponent::new(ComponentKind::Service, "Tracer")).unwrap_err();
        assert!(matches!(err, ConfigError::Type { .. }));
    }

    #[test]
    fn operators_build_trees() {
        let (a, b, c) = (module("a"), module("b"), module("c"));
        let node = &c * (&a + &b);
        assert_eq!(node.kind_name(), "AlsoRun");
        assert_eq!(node.precedence(), Some(2));
        let SeqNode::AlsoRun(_, right) = node else {
            panic!("expected AlsoRun");
        };
        assert_eq!(right.kind_name(), "AndThen");
        assert_eq!((!&a).kind_name(), "Negate");
    }

    #[test]
    fn negate_and_ignore_reject_composites() {
        let (a, b) = (module("a"), module("b"));
        assert!(matches!(
            ignore(&a * &b),
            Err(ConfigError::OperatorMisuse { .. })
        ));
        assert!(matches!(
            negate(&a + &b),
            Err(ConfigError::OperatorMisuse { .. })
        ));
        let seq = ModuleSequence::sequence(&a).unwrap();
        assert!(matches!(
            negate(&seq),
            Err(ConfigError::OperatorMisuse { .. })
        ));
        assert_eq!(ignore(&a).unwrap().kind_name(), "Ignore");
    }
}
