//! Turn parsed expressions into parameters, components and sequences.

use crate::component::{ComponentKind, TypedComponent};
use crate::error::{ConfigError, Result};
use crate::parse::expr::{Arg, Expr, ExprKind};
use crate::sequence::{ModuleSequence, Role, SeqNode};
use crate::types::{
    InputTag, ParamType, Parameter, ParameterSet, Raw, Scalar, ScalarKind, Value, untracked,
};

/// Label resolver for sequence expressions; `None` leaves a placeholder.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<SeqNode>;

/// Drop a leading `cms` namespace.
fn local_name(path: &[String]) -> &[String] {
    match path {
        [ns, rest @ ..] if ns == "cms" && !rest.is_empty() => rest,
        _ => path,
    }
}

fn error(expr: &Expr, message: impl Into<String>) -> ConfigError {
    ConfigError::parse(expr.pos, message)
}

fn call(expr: &Expr) -> Option<(&[String], &[Arg])> {
    match &expr.kind {
        ExprKind::Call { callee, args } => Some((local_name(callee), args)),
        _ => None,
    }
}

fn positional<'e>(expr: &Expr, args: &'e [Arg], what: &str) -> Result<Vec<&'e Expr>> {
    args.iter()
        .map(|arg| match &arg.name {
            None => Ok(&arg.value),
            Some(name) => Err(error(expr, format!("{what} takes no keyword argument {name}"))),
        })
        .collect()
}

fn single<'e>(expr: &Expr, args: &'e [Arg], what: &str) -> Result<&'e Expr> {
    match positional(expr, args, what)?.as_slice() {
        [only] => Ok(*only),
        other => Err(error(
            expr,
            format!("{what} takes one argument, {} given", other.len()),
        )),
    }
}

fn string<'e>(expr: &'e Expr, what: &str) -> Result<&'e str> {
    match &expr.kind {
        ExprKind::Str(s) => Ok(s),
        _ => Err(error(expr, format!("{what} must be a string, found {}", expr.describe()))),
    }
}

/// `cms.int32(1)`, `cms.untracked.vstring('a')`, `cms.untracked(cms.PSet())`
pub fn parameter(expr: &Expr) -> Result<Parameter> {
    let Some((name, args)) = call(expr) else {
        return Err(error(expr, format!("expected a parameter, found {}", expr.describe())));
    };
    match name {
        [wrapper] if wrapper == "untracked" => {
            Ok(untracked(parameter(single(expr, args, "untracked")?)?))
        }
        [wrapper, type_name] if wrapper == "untracked" => {
            Ok(untracked(typed(expr, type_name, args)?))
        }
        [type_name] => typed(expr, type_name, args),
        _ => Err(error(expr, format!("unknown parameter type {}", name.join(".")))),
    }
}

fn typed(expr: &Expr, type_name: &str, args: &[Arg]) -> Result<Parameter> {
    let ty = ParamType::from_name(type_name)
        .ok_or_else(|| error(expr, format!("unknown parameter type {type_name}")))?;
    match (ty.kind, ty.list) {
        (ScalarKind::PSet, false) => Ok(Parameter::pset(keyword_set(expr, args)?)),
        (ScalarKind::PSet, true) => {
            let sets = positional(expr, args, type_name)?
                .into_iter()
                .map(parameter_set)
                .collect::<Result<Vec<_>>>()?;
            Ok(Parameter::vpset(sets))
        }
        (ScalarKind::InputTag, false) => {
            let parts = positional(expr, args, type_name)?
                .into_iter()
                .map(|e| string(e, "InputTag part"))
                .collect::<Result<Vec<_>>>()?;
            match parts.as_slice() {
                [label] => Ok(Parameter::input_tag(InputTag::new(*label))),
                [label, instance] => Ok(Parameter::input_tag(InputTag::with_instance(
                    *label, *instance,
                ))),
                [label, instance, process] => Ok(Parameter::input_tag(InputTag::full(
                    *label, *instance, *process,
                ))),
                _ => Err(error(expr, "InputTag takes one to three parts")),
            }
        }
        (_, false) => Parameter::new(ty, literal(single(expr, args, type_name)?)?),
        (_, true) => {
            let items = positional(expr, args, type_name)?
                .into_iter()
                .map(literal)
                .collect::<Result<Vec<_>>>()?;
            Parameter::new(ty, Raw::List(items))
        }
    }
}

/// A bare value inside a constructor: number (`inf`, `NaN` and a leading
/// `-` included), string, bool, or a nested `InputTag` / `PSet` constructor.
fn literal(expr: &Expr) -> Result<Raw> {
    match &expr.kind {
        ExprKind::Int(v) => Ok(Raw::Int(*v)),
        ExprKind::Float(v) => Ok(Raw::Float(*v)),
        ExprKind::Str(s) => Ok(Raw::Text(s.clone())),
        ExprKind::Name(path) if path.len() == 1 && path[0] == "True" => Ok(Raw::Bool(true)),
        ExprKind::Name(path) if path.len() == 1 && path[0] == "False" => Ok(Raw::Bool(false)),
        ExprKind::Name(path) if path.len() == 1 && path[0] == "inf" => Ok(Raw::Float(f64::INFINITY)),
        ExprKind::Name(path) if path.len() == 1 && path[0] == "NaN" => Ok(Raw::Float(f64::NAN)),
        ExprKind::Neg(inner) => match literal(inner)? {
            Raw::Int(v) => Ok(Raw::Int(-v)),
            Raw::Float(v) => Ok(Raw::Float(-v)),
            _ => Err(error(expr, format!("cannot negate {}", inner.describe()))),
        },
        ExprKind::Call { .. } => match parameter(expr)?.value() {
            Value::Scalar(Scalar::InputTag(tag)) => Ok(Raw::Tag(tag.clone())),
            Value::Scalar(Scalar::PSet(set)) => Ok(Raw::Set(set.clone())),
            _ => Err(error(expr, "only InputTag and PSet constructors may appear as values")),
        },
        _ => Err(error(expr, format!("expected a value, found {}", expr.describe()))),
    }
}

fn keyword_set(expr: &Expr, args: &[Arg]) -> Result<ParameterSet> {
    let mut set = ParameterSet::new();
    for arg in args {
        let Some(name) = &arg.name else {
            return Err(error(&arg.value, "parameters must be passed as name = value"));
        };
        if set.contains(name) {
            return Err(error(expr, format!("parameter {name} given twice")));
        }
        set.set_parameter(name.clone(), parameter(&arg.value)?)?;
    }
    Ok(set)
}

/// `cms.PSet(a = ..., b = ...)`
pub fn parameter_set(expr: &Expr) -> Result<ParameterSet> {
    match call(expr) {
        Some(([name], args)) if name == "PSet" => keyword_set(expr, args),
        _ => Err(error(expr, format!("expected a PSet, found {}", expr.describe()))),
    }
}

/// `cms.EDProducer('TypeName', a = ..., ...)`
pub fn component(expr: &Expr) -> Result<TypedComponent> {
    let Some(([class], args)) = call(expr) else {
        return Err(error(expr, format!("expected a component, found {}", expr.describe())));
    };
    let kind = ComponentKind::from_class_name(class)
        .ok_or_else(|| error(expr, format!("unknown component class {class}")))?;
    let Some((first, rest)) = args.split_first() else {
        return Err(error(expr, format!("{class} needs a type name")));
    };
    if first.name.is_some() {
        return Err(error(&first.value, format!("{class} needs a type name first")));
    }
    let type_name = string(&first.value, "type name")?;
    Ok(TypedComponent::with_params(
        kind,
        type_name,
        keyword_set(expr, rest)?,
    ))
}

/// `process.a*(process.b+~process.c)`. Labels unknown to `lookup` become
/// placeholders.
pub fn sequence(expr: &Expr, lookup: Lookup<'_>) -> Result<SeqNode> {
    match &expr.kind {
        ExprKind::AlsoRun(l, r) => Ok(SeqNode::AlsoRun(
            Box::new(sequence(l, lookup)?),
            Box::new(sequence(r, lookup)?),
        )),
        ExprKind::AndThen(l, r) => Ok(SeqNode::AndThen(
            Box::new(sequence(l, lookup)?),
            Box::new(sequence(r, lookup)?),
        )),
        ExprKind::Not(inner) => SeqNode::negate(sequence(inner, lookup)?),
        ExprKind::Name(path) => {
            let label = match path.as_slice() {
                [label] => label,
                [process, label] if process == "process" => label,
                _ => {
                    let found = path.join(".");
                    return Err(error(expr, format!("expected a label, found {found}")));
                }
            };
            Ok(lookup(label.as_str()).unwrap_or_else(|| SeqNode::placeholder(label.as_str())))
        }
        ExprKind::Call { .. } => match call(expr) {
            Some(([name], args)) if name == "ignore" => {
                SeqNode::ignore(sequence(single(expr, args, "ignore")?, lookup)?)
            }
            Some(([name], args)) if name == "SequencePlaceholder" => Ok(SeqNode::placeholder(
                string(single(expr, args, "SequencePlaceholder")?, "placeholder name")?,
            )),
            Some(([name], _)) if name == "Sequence" => {
                Ok(SeqNode::Sequence(module_sequence(expr, lookup)?))
            }
            _ => Err(error(expr, format!("unexpected {} in a sequence", expr.describe()))),
        },
        _ => Err(error(expr, format!("unexpected {} in a sequence", expr.describe()))),
    }
}

/// `cms.Path(...)`, `cms.EndPath(...)` or `cms.Sequence(...)`.
pub fn module_sequence(expr: &Expr, lookup: Lookup<'_>) -> Result<ModuleSequence> {
    let (role, args) = match call(expr) {
        Some(([name], args)) if name == "Path" => (Role::Path, args),
        Some(([name], args)) if name == "EndPath" => (Role::EndPath, args),
        Some(([name], args)) if name == "Sequence" => (Role::Sequence, args),
        _ => {
            return Err(error(
                expr,
                format!("expected a Path, EndPath or Sequence, found {}", expr.describe()),
            ));
        }
    };
    let nodes = positional(expr, args, role.class_name())?
        .into_iter()
        .map(|e| sequence(e, lookup))
        .collect::<Result<Vec<_>>>()?;
    ModuleSequence::from_args(role, nodes)
}
