//! Reader for the source grammar.
//!
//! Everything `dump_source` writes can be read back here: parameters,
//! parameter sets, typed components and sequence expressions.

pub mod build;
pub mod expr;
pub mod lexer;

pub use build::Lookup;
pub use expr::{Expr, ExprKind, parse_expr};

use crate::component::TypedComponent;
use crate::error::Result;
use crate::sequence::{ModuleSequence, SeqNode};
use crate::types::{Parameter, ParameterSet};

/// `cms.untracked.vint32(1, 2)`
pub fn parse_parameter(text: &str) -> Result<Parameter> {
    build::parameter(&parse_expr(text)?)
}

/// `cms.PSet(a = cms.int32(1))`
pub fn parse_parameter_set(text: &str) -> Result<ParameterSet> {
    build::parameter_set(&parse_expr(text)?)
}

/// `cms.EDProducer('Type', a = cms.int32(1))`
pub fn parse_component(text: &str) -> Result<TypedComponent> {
    build::component(&parse_expr(text)?)
}

/// A bare expression such as `process.a*(process.b+~process.c)`.
pub fn parse_sequence(text: &str, lookup: Lookup<'_>) -> Result<SeqNode> {
    build::sequence(&parse_expr(text)?, lookup)
}

/// `cms.Path(...)`, `cms.EndPath(...)` or `cms.Sequence(...)`.
pub fn parse_module_sequence(text: &str, lookup: Lookup<'_>) -> Result<ModuleSequence> {
    build::module_sequence(&parse_expr(text)?, lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::error::ConfigError;
    use crate::render::PrintOptions;
    use crate::sequence::Module;
    use crate::types::{InputTag, untracked};
    use pretty_assertions::assert_eq;

    fn rich_component() -> TypedComponent {
        let inner = ParameterSet::from_pairs([
            ("tag", Parameter::input_tag(InputTag::full("a", "", "HLT"))),
            (
                "tags",
                Parameter::vinput_tag([InputTag::new("x"), InputTag::with_instance("y", "z")]),
            ),
        ])
        .unwrap();
        TypedComponent::new(ComponentKind::EDProducer, "Rich")
            .with("i", Parameter::int32(-3))
            .unwrap()
            .with("u", untracked(Parameter::uint64(u64::MAX)))
            .unwrap()
            .with("d", Parameter::double(1e-7))
            .unwrap()
            .with("b", Parameter::bool(true))
            .unwrap()
            .with("s", Parameter::string("it's \"quoted\"\n"))
            .unwrap()
            .with("names", Parameter::vstring(["p", "q"]))
            .unwrap()
            .with("none", Parameter::vdouble([]))
            .unwrap()
            .with("nested", untracked(Parameter::pset(inner.clone())))
            .unwrap()
            .with("many", Parameter::vpset([inner, ParameterSet::new()]))
            .unwrap()
    }

    #[test]
    fn component_round_trip() {
        let original = rich_component();
        let text = original.dump_source(&PrintOptions::default());
        let reread = parse_component(&text).unwrap();
        assert_eq!(reread, original);
        assert_eq!(
            reread.dump_config(&PrintOptions::default()),
            original.dump_config(&PrintOptions::default())
        );

        let bare = original.dump_source(&PrintOptions::bare());
        assert_eq!(parse_component(&bare).unwrap(), original);
    }

    #[test]
    fn special_double_names_round_trip() {
        let original = TypedComponent::new(ComponentKind::EDAnalyzer, "Limits")
            .with("inf", Parameter::int32(1))
            .unwrap()
            .with("NaN", Parameter::double(f64::NEG_INFINITY))
            .unwrap()
            .with("bounds", Parameter::vdouble([f64::INFINITY, -1.5]))
            .unwrap();
        for options in [PrintOptions::default(), PrintOptions::bare()] {
            let text = original.dump_source(&options);
            assert_eq!(parse_component(&text).unwrap(), original, "{text}");
        }

        let nan = parse_parameter("cms.double(NaN)").unwrap();
        assert_eq!(nan.dump_source(&PrintOptions::bare()), "double(NaN)");
        assert!(matches!(
            parse_parameter("cms.double(-True)"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn special_double_names_as_labels() {
        let nan = Module::labeled("NaN", TypedComponent::new(ComponentKind::EDFilter, "F")).unwrap();
        let inf = Module::labeled("inf", TypedComponent::new(ComponentKind::EDFilter, "F")).unwrap();
        let lookup = |label: &str| match label {
            "NaN" => Some(SeqNode::from(&nan)),
            "inf" => Some(SeqNode::from(&inf)),
            _ => None,
        };
        let path = parse_module_sequence("cms.Path(process.NaN*process.inf)", &lookup).unwrap();
        assert_eq!(path.names_list().unwrap(), vec!["NaN", "inf"]);

        let text = path.dump_source(&PrintOptions::bare()).unwrap();
        assert_eq!(text, "Path(NaN*inf)");
        let reread = parse_module_sequence(&text, &lookup).unwrap();
        assert_eq!(reread.names_list().unwrap(), vec!["NaN", "inf"]);
    }

    #[test]
    fn untracked_forms() {
        let wrapped = parse_parameter("cms.untracked(cms.int32(5))").unwrap();
        let dotted = parse_parameter("cms.untracked.int32(5)").unwrap();
        assert_eq!(wrapped, dotted);
        assert!(!dotted.is_tracked());
    }

    #[test]
    fn values_are_validated() {
        assert!(matches!(
            parse_parameter("cms.uint32(-1)"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            parse_parameter("cms.vint32(1, 'two')"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            parse_parameter("cms.int128(1)"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            parse_parameter("cms.PSet(cms.int32(1))"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn sequences_use_lookup_then_placeholders() {
        let a = Module::labeled("a", TypedComponent::new(ComponentKind::EDFilter, "A")).unwrap();
        let lookup = |label: &str| (label == "a").then(|| SeqNode::from(&a));

        let node = parse_sequence("process.a*cms.ignore(process.a)+later", &lookup).unwrap();
        let path = ModuleSequence::path(node).unwrap();
        assert_eq!(
            path.dump_source(&PrintOptions::bare()).unwrap(),
            "Path(a*ignore(a)+SequencePlaceholder('later'))"
        );

        let err = parse_sequence("~(process.a+process.a)", &lookup).unwrap_err();
        assert!(matches!(err, ConfigError::OperatorMisuse { .. }));
    }

    #[test]
    fn module_sequences_check_arity() {
        let lookup = |_: &str| None;
        let err = parse_module_sequence("cms.Path(process.a, process.b)", &lookup).unwrap_err();
        let ConfigError::ArgumentCount { arguments, .. } = err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(
            arguments,
            vec!["SequencePlaceholder(a)", "SequencePlaceholder(b)"]
        );
        let seq = parse_module_sequence("cms.Sequence(x+y)", &lookup).unwrap();
        assert_eq!(
            seq.dump_source(&PrintOptions::bare()).unwrap(),
            "Sequence(SequencePlaceholder('x')+SequencePlaceholder('y'))"
        );
    }
}
