//! Sequence expression algebra.
//!
//! Modules combine with `*` (also run, ordered, precedence 2) and `+`
//! (and then, unordered between branches, precedence 1); single modules can
//! be negated (`!module`, printed `~`) or ignored. Expressions become the
//! root of a labeled [`ModuleSequence`] in one of three roles.
//!
//! ```
//! use procfg::component::{ComponentKind, TypedComponent};
//! use procfg::render::PrintOptions;
//! use procfg::sequence::{Module, ModuleSequence};
//!
//! let module = |label| {
//!     Module::labeled(label, TypedComponent::new(ComponentKind::EDProducer, "Dummy")).unwrap()
//! };
//! let (a, b, c) = (module("a"), module("b"), module("c"));
//! let path = ModuleSequence::path(&c * (&a + &b)).unwrap();
//! assert_eq!(path.dump_source(&PrintOptions::bare()).unwrap(), "Path(c*(a+b))");
//! ```

pub mod clone;
pub mod deps;
pub mod node;
pub mod path;
pub mod print;
pub mod schedule;
pub mod visit;

pub use clone::{CloneTable, clone_with_table};
pub use deps::{DependencyTable, find_dependencies};
pub use node::{Module, NodeId, SeqNode, ignore, negate};
pub use path::{ModuleSequence, NameTable, Role};
pub use schedule::Schedule;
pub use visit::{ModuleCollector, Visitor, visit_node};
