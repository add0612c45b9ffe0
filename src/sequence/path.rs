//! Labeled sequence roots: paths, end paths and reusable sequences.

use crate::error::{ConfigError, Result};
use crate::names::check_identifier;
use crate::render::{Format, PrintOptions};
use crate::sequence::print::render;
use crate::sequence::{NodeId, SeqNode};
use crate::sink::PlacementSink;
use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Name to expression table used to resolve placeholders.
pub type NameTable = IndexMap<String, SeqNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Path,
    EndPath,
    /// Reusable subsequence; the only role allowed inside other expressions.
    Sequence,
}

impl Role {
    pub fn class_name(self) -> &'static str {
        match self {
            Role::Path => "Path",
            Role::EndPath => "EndPath",
            Role::Sequence => "Sequence",
        }
    }
}

struct SequenceInner {
    id: NodeId,
    role: Role,
    label: RefCell<Option<String>>,
    root: RefCell<SeqNode>,
}

/// Shared handle to a labeled expression root.
///
/// `Clone` shares; every holder sees in-place extensions and resolution.
#[derive(Clone)]
pub struct ModuleSequence(Rc<SequenceInner>);

impl ModuleSequence {
    pub fn new(role: Role, expr: impl Into<SeqNode>) -> Result<Self> {
        let root = expr.into();
        check_nestable(role, &root)?;
        Ok(Self::from_root(role, root))
    }

    pub(crate) fn from_root(role: Role, root: SeqNode) -> Self {
        Self(Rc::new(SequenceInner {
            id: NodeId::next(),
            role,
            label: RefCell::new(None),
            root: RefCell::new(root),
        }))
    }

    /// Build from constructor arguments; exactly one is accepted.
    pub fn from_args(role: Role, args: Vec<SeqNode>) -> Result<Self> {
        match <[SeqNode; 1]>::try_from(args) {
            Ok([root]) => Self::new(role, root),
            Err(args) => Err(ConfigError::ArgumentCount {
                type_name: role.class_name().to_string(),
                arguments: args.iter().map(SeqNode::describe).collect(),
            }),
        }
    }

    pub fn path(expr: impl Into<SeqNode>) -> Result<Self> {
        Self::new(Role::Path, expr)
    }

    pub fn end_path(expr: impl Into<SeqNode>) -> Result<Self> {
        Self::new(Role::EndPath, expr)
    }

    pub fn sequence(expr: impl Into<SeqNode>) -> Result<Self> {
        Self::new(Role::Sequence, expr)
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn label(&self) -> Option<String> {
        self.0.label.borrow().clone()
    }

    pub fn set_label(&self, label: &str) -> Result<()> {
        check_identifier(label)?;
        *self.0.label.borrow_mut() = Some(label.to_string());
        Ok(())
    }

    pub fn root(&self) -> Ref<'_, SeqNode> {
        self.0.root.borrow()
    }

    pub(crate) fn replace_root(&self, root: SeqNode) {
        *self.0.root.borrow_mut() = root;
    }

    pub fn ptr_eq(&self, other: &ModuleSequence) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// `Sequence(label)`, or `Sequence(...)` when unplaced.
    pub fn describe(&self) -> String {
        let label = self.label().unwrap_or_else(|| "...".to_string());
        format!("{}({label})", self.0.role.class_name())
    }

    /// New holder of the same expression: shares modules and subsequences.
    pub fn copy(&self) -> Self {
        Self::from_root(self.0.role, self.root().clone())
    }

    /// `self *= rhs`
    pub fn extend_also_run(&self, rhs: impl Into<SeqNode>) -> Result<()> {
        self.extend(rhs.into(), |l, r| SeqNode::AlsoRun(Box::new(l), Box::new(r)))
    }

    /// `self += rhs`
    pub fn extend_and_then(&self, rhs: impl Into<SeqNode>) -> Result<()> {
        self.extend(rhs.into(), |l, r| SeqNode::AndThen(Box::new(l), Box::new(r)))
    }

    fn extend(&self, rhs: SeqNode, combine: fn(SeqNode, SeqNode) -> SeqNode) -> Result<()> {
        check_nestable(self.0.role, &rhs)?;
        if refers_to(&rhs, self.0.id) {
            return Err(ConfigError::RecursiveSequence(self.describe()));
        }
        let mut root = self.0.root.borrow_mut();
        let left = std::mem::replace(&mut *root, SeqNode::Placeholder(String::new()));
        *root = combine(left, rhs);
        Ok(())
    }

    /// `cms.Path(c*(a+b))`
    pub fn dump_source(&self, options: &PrintOptions) -> Result<String> {
        Ok(format!(
            "{}({})",
            options.class_name(self.0.role.class_name()),
            render(&self.root(), options, Format::Source)?
        ))
    }

    /// `{c,(a&b)}`
    pub fn dump_config(&self, options: &PrintOptions) -> Result<String> {
        Ok(format!("{{{}}}", render(&self.root(), options, Format::Config)?))
    }

    /// Append the signed labels in declared order.
    pub fn fill_names_list(&self, out: &mut Vec<String>) -> Result<()> {
        fill_names(&self.root(), out)
    }

    pub fn names_list(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        self.fill_names_list(&mut out)?;
        Ok(out)
    }

    /// Replace every placeholder by its table entry. Resolving twice is a
    /// no-op. On error this sequence's expression is left as it was.
    pub fn resolve(&self, names: &NameTable) -> Result<()> {
        self.resolve_with_stack(names, &mut Vec::new())
    }

    fn resolve_with_stack(&self, names: &NameTable, stack: &mut Vec<String>) -> Result<()> {
        // Already borrowed means the walk came back to this sequence.
        let mut root = self
            .0
            .root
            .try_borrow_mut()
            .map_err(|_| ConfigError::RecursiveSequence(self.describe()))?;
        let mut resolved = root.clone();
        resolve_node(&mut resolved, names, stack)?;
        *root = resolved;
        Ok(())
    }

    /// Register as an ordered label list under `name`.
    pub fn insert_into<S: PlacementSink + ?Sized>(
        &self,
        sink: &mut S,
        target: &mut S::Handle,
        name: &str,
        names: &NameTable,
    ) -> Result<()> {
        self.resolve(names)?;
        let labels = self.names_list()?;
        debug!(%name, count = labels.len(), "inserting sequence");
        sink.add_ordered_labels(target, true, name, labels);
        Ok(())
    }
}

impl fmt::Debug for ModuleSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSequence")
            .field("id", &self.0.id)
            .field("role", &self.0.role)
            .field("label", &self.0.label.borrow())
            .finish_non_exhaustive()
    }
}

fn check_nestable(role: Role, node: &SeqNode) -> Result<()> {
    match node {
        SeqNode::Sequence(seq) if seq.role() != Role::Sequence => Err(ConfigError::wrong_type(
            role.class_name(),
            "modules, sequences or placeholders",
            seq.describe(),
        )),
        SeqNode::AlsoRun(l, r) | SeqNode::AndThen(l, r) => {
            check_nestable(role, l)?;
            check_nestable(role, r)
        }
        _ => Ok(()),
    }
}

fn refers_to(node: &SeqNode, id: NodeId) -> bool {
    match node {
        SeqNode::Sequence(seq) => seq.id() == id || refers_to(&seq.root(), id),
        SeqNode::AlsoRun(l, r) | SeqNode::AndThen(l, r) => refers_to(l, id) || refers_to(r, id),
        _ => false,
    }
}

fn fill_names(node: &SeqNode, out: &mut Vec<String>) -> Result<()> {
    match node {
        SeqNode::Atomic(m) => out.push(m.require_label()?),
        SeqNode::Negate(m) => out.push(format!("!{}", m.require_label()?)),
        SeqNode::Ignore(m) => out.push(format!("-{}", m.require_label()?)),
        SeqNode::AlsoRun(l, r) | SeqNode::AndThen(l, r) => {
            fill_names(l, out)?;
            fill_names(r, out)?;
        }
        SeqNode::Sequence(seq) => seq.fill_names_list(out)?,
        SeqNode::Placeholder(name) => {
            return Err(ConfigError::UnresolvedPlaceholder {
                name: name.clone(),
                known: None,
            });
        }
    }
    Ok(())
}

fn resolve_node(node: &mut SeqNode, names: &NameTable, stack: &mut Vec<String>) -> Result<()> {
    match node {
        SeqNode::Placeholder(name) => {
            let name = name.clone();
            if stack.contains(&name) {
                return Err(ConfigError::RecursiveSequence(name));
            }
            let mut target = names.get(&name).cloned().ok_or_else(|| {
                ConfigError::UnresolvedPlaceholder {
                    name: name.clone(),
                    known: Some(names.keys().cloned().collect()),
                }
            })?;
            stack.push(name.clone());
            resolve_node(&mut target, names, stack)?;
            stack.pop();
            debug!(placeholder = %name, into = target.kind_name(), "resolved placeholder");
            *node = target;
        }
        SeqNode::AlsoRun(l, r) | SeqNode::AndThen(l, r) => {
            resolve_node(l, names, stack)?;
            resolve_node(r, names, stack)?;
        }
        SeqNode::Sequence(seq) => seq.resolve_with_stack(names, stack)?,
        SeqNode::Atomic(_) | SeqNode::Negate(_) | SeqNode::Ignore(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, TypedComponent};
    use crate::sequence::{Module, ignore};
    use crate::sink::RecordingSink;
    use pretty_assertions::assert_eq;

    fn module(label: &str) -> Module {
        Module::labeled(label, TypedComponent::new(ComponentKind::EDProducer, "Dummy")).unwrap()
    }

    #[test]
    fn source_and_config_forms() {
        let (a, b, c) = (module("a"), module("b"), module("c"));
        let path = ModuleSequence::path(&c * (&a + &b)).unwrap();
        assert_eq!(path.dump_source(&PrintOptions::bare()).unwrap(), "Path(c*(a+b))");
        assert_eq!(
            path.dump_source(&PrintOptions::default()).unwrap(),
            "cms.Path(process.c*(process.a+process.b))"
        );
        assert_eq!(path.dump_config(&PrintOptions::default()).unwrap(), "{c,(a&b)}");
    }

    #[test]
    fn arity_is_checked() {
        let (a, b) = (module("a"), module("b"));
        let err = ModuleSequence::from_args(Role::Path, vec![(&a).into(), (&b).into()]).unwrap_err();
        let ConfigError::ArgumentCount { type_name, arguments } = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(type_name, "Path");
        assert_eq!(arguments.len(), 2);
        assert!(err.to_string().contains("Maybe you forgot to combine them via '*' or '+'."));

        let err = ModuleSequence::from_args(Role::Sequence, vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::ArgumentCount { .. }));
        assert!(ModuleSequence::from_args(Role::EndPath, vec![(&a).into()]).is_ok());
    }

    #[test]
    fn paths_cannot_be_nested() {
        let a = module("a");
        let path = ModuleSequence::path(&a).unwrap();
        let err = ModuleSequence::sequence(&path * &a).unwrap_err();
        assert!(matches!(err, ConfigError::Type { .. }));
    }

    #[test]
    fn flattening_marks_modifiers() {
        let (a, b) = (module("a"), module("b"));
        let ignored = ModuleSequence::path(&a + ignore(&b).unwrap()).unwrap();
        assert_eq!(ignored.names_list().unwrap(), vec!["a", "-b"]);
        let negated = ModuleSequence::path(&a + !&b).unwrap();
        assert_eq!(negated.names_list().unwrap(), vec!["a", "!b"]);
    }

    #[test]
    fn extending_in_place() {
        let (a, b, c) = (module("a"), module("b"), module("c"));
        let seq = ModuleSequence::sequence(&a).unwrap();
        let holder = ModuleSequence::path(&seq).unwrap();
        seq.extend_also_run(&b).unwrap();
        seq.extend_and_then(&c).unwrap();
        assert_eq!(holder.names_list().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(seq.dump_source(&PrintOptions::bare()).unwrap(), "Sequence(a*b+c)");
        assert!(matches!(
            seq.extend_and_then(&seq),
            Err(ConfigError::RecursiveSequence(_))
        ));
    }

    #[test]
    fn placeholders_resolve_once() {
        let (a, b) = (module("a"), module("b"));
        let path = ModuleSequence::path(&a * SeqNode::placeholder("X")).unwrap();
        assert!(matches!(
            path.names_list(),
            Err(ConfigError::UnresolvedPlaceholder { .. })
        ));

        let err = path.resolve(&NameTable::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedPlaceholder { .. }));

        let mut names = NameTable::new();
        names.insert("X".into(), SeqNode::from(&b));
        path.resolve(&names).unwrap();
        assert_eq!(path.names_list().unwrap(), vec!["a", "b"]);
        path.resolve(&NameTable::new()).unwrap();
    }

    #[test]
    fn failed_resolve_changes_nothing() {
        let (a, b) = (module("a"), module("b"));
        let path = ModuleSequence::path(SeqNode::AndThen(
            Box::new(SeqNode::placeholder("X")),
            Box::new(SeqNode::placeholder("Y")),
        ))
        .unwrap();
        let mut names = NameTable::new();
        names.insert("X".into(), SeqNode::from(&a));

        assert_eq!(
            path.resolve(&names),
            Err(ConfigError::UnresolvedPlaceholder {
                name: "Y".into(),
                known: Some(vec!["X".into()]),
            })
        );
        assert_eq!(
            path.names_list(),
            Err(ConfigError::UnresolvedPlaceholder {
                name: "X".into(),
                known: None,
            })
        );
        assert_eq!(
            path.dump_source(&PrintOptions::bare()).unwrap(),
            "Path(SequencePlaceholder('X')+SequencePlaceholder('Y'))"
        );

        names.insert("Y".into(), SeqNode::from(&b));
        path.resolve(&names).unwrap();
        assert_eq!(path.names_list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn self_reference_is_reported() {
        let a = module("a");
        let seq = ModuleSequence::sequence(&a + SeqNode::placeholder("s")).unwrap();
        let mut names = NameTable::new();
        names.insert("s".into(), SeqNode::from(&seq));
        assert!(matches!(
            seq.resolve(&names),
            Err(ConfigError::RecursiveSequence(_))
        ));

        let mut names = NameTable::new();
        names.insert("p".into(), SeqNode::placeholder("p"));
        let path = ModuleSequence::path(SeqNode::placeholder("p")).unwrap();
        assert_eq!(
            path.resolve(&names),
            Err(ConfigError::RecursiveSequence("p".into()))
        );
    }

    #[test]
    fn insert_registers_labels() {
        let (a, b) = (module("a"), module("b"));
        let path = ModuleSequence::path(&a * SeqNode::placeholder("X")).unwrap();
        let mut names = NameTable::new();
        names.insert("X".into(), SeqNode::from(&b));

        let mut sink = RecordingSink::new();
        let mut top = sink.new_container();
        path.insert_into(&mut sink, &mut top, "p", &names).unwrap();
        assert_eq!(top.labels("p"), Some(&["a".to_string(), "b".to_string()][..]));
    }
}
