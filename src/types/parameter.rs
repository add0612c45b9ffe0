//! A typed value plus its tracked/untracked flag.

use crate::error::{ConfigError, Result};
use crate::render::PrintOptions;
use crate::sink::PlacementSink;
use crate::types::{InputTag, ParamType, ParameterSet, Raw, Scalar, ScalarKind, Value};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    value: Value,
    tracked: bool,
}

/// Mark a parameter untracked; the value and type are untouched.
pub fn untracked(mut param: Parameter) -> Parameter {
    param.tracked = false;
    param
}

impl Parameter {
    /// Build a tracked parameter of type `ty`, or fail without side effects.
    pub fn new(ty: ParamType, raw: impl Into<Raw>) -> Result<Self> {
        Ok(Self::from_value(ty.validate(raw.into())?))
    }

    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            tracked: true,
        }
    }

    fn scalar(s: Scalar) -> Self {
        Self::from_value(Value::Scalar(s))
    }

    fn list(kind: ScalarKind, items: Vec<Scalar>) -> Self {
        Self::from_value(Value::List { kind, items })
    }

    pub fn int32(v: i32) -> Self {
        Self::scalar(Scalar::Int32(v))
    }

    pub fn uint32(v: u32) -> Self {
        Self::scalar(Scalar::UInt32(v))
    }

    pub fn int64(v: i64) -> Self {
        Self::scalar(Scalar::Int64(v))
    }

    pub fn uint64(v: u64) -> Self {
        Self::scalar(Scalar::UInt64(v))
    }

    pub fn double(v: f64) -> Self {
        Self::scalar(Scalar::Double(v))
    }

    pub fn bool(v: bool) -> Self {
        Self::scalar(Scalar::Bool(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::scalar(Scalar::String(v.into()))
    }

    pub fn input_tag(v: InputTag) -> Self {
        Self::scalar(Scalar::InputTag(v))
    }

    pub fn pset(v: ParameterSet) -> Self {
        Self::scalar(Scalar::PSet(v))
    }

    pub fn vint32(v: impl IntoIterator<Item = i32>) -> Self {
        Self::list(ScalarKind::Int32, v.into_iter().map(Scalar::Int32).collect())
    }

    pub fn vuint32(v: impl IntoIterator<Item = u32>) -> Self {
        Self::list(ScalarKind::UInt32, v.into_iter().map(Scalar::UInt32).collect())
    }

    pub fn vint64(v: impl IntoIterator<Item = i64>) -> Self {
        Self::list(ScalarKind::Int64, v.into_iter().map(Scalar::Int64).collect())
    }

    pub fn vuint64(v: impl IntoIterator<Item = u64>) -> Self {
        Self::list(ScalarKind::UInt64, v.into_iter().map(Scalar::UInt64).collect())
    }

    pub fn vdouble(v: impl IntoIterator<Item = f64>) -> Self {
        Self::list(ScalarKind::Double, v.into_iter().map(Scalar::Double).collect())
    }

    pub fn vbool(v: impl IntoIterator<Item = bool>) -> Self {
        Self::list(ScalarKind::Bool, v.into_iter().map(Scalar::Bool).collect())
    }

    pub fn vstring<S: Into<String>>(v: impl IntoIterator<Item = S>) -> Self {
        Self::list(
            ScalarKind::String,
            v.into_iter().map(|s| Scalar::String(s.into())).collect(),
        )
    }

    pub fn vinput_tag(v: impl IntoIterator<Item = InputTag>) -> Self {
        Self::list(ScalarKind::InputTag, v.into_iter().map(Scalar::InputTag).collect())
    }

    pub fn vpset(v: impl IntoIterator<Item = ParameterSet>) -> Self {
        Self::list(ScalarKind::PSet, v.into_iter().map(Scalar::PSet).collect())
    }

    pub fn param_type(&self) -> ParamType {
        self.value.param_type()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    pub fn set_tracked(&mut self, tracked: bool) {
        self.tracked = tracked;
    }

    /// Re-validate against the held type; commit only on success.
    pub fn set_value(&mut self, raw: impl Into<Raw>) -> Result<()> {
        self.value = self.param_type().validate(raw.into())?;
        Ok(())
    }

    pub fn as_pset(&self) -> Option<&ParameterSet> {
        match &self.value {
            Value::Scalar(Scalar::PSet(set)) => Some(set),
            _ => None,
        }
    }

    pub fn as_pset_mut(&mut self) -> Option<&mut ParameterSet> {
        match &mut self.value {
            Value::Scalar(Scalar::PSet(set)) => Some(set),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Scalar]> {
        match &self.value {
            Value::List { items, .. } => Some(items),
            Value::Scalar(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items().map_or(1, <[Scalar]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_some_and(<[Scalar]>::is_empty)
    }

    fn list_parts(&mut self, operation: &str) -> Result<(ScalarKind, &'static str, &mut Vec<Scalar>)> {
        let ty = self.param_type();
        match &mut self.value {
            Value::List { kind, items } => Ok((*kind, ty.name(), items)),
            Value::Scalar(_) => Err(ConfigError::wrong_type(operation, "a list parameter", ty.name())),
        }
    }

    pub fn push(&mut self, raw: impl Into<Raw>) -> Result<()> {
        let (kind, name, items) = self.list_parts("push")?;
        let item = kind.validate_all(name, vec![raw.into()])?;
        items.extend(item);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, raw: impl Into<Raw>) -> Result<()> {
        let (kind, name, items) = self.list_parts("insert")?;
        if index > items.len() {
            return Err(ConfigError::validation(name, format!("index {index}")));
        }
        let item = kind.validate_all(name, vec![raw.into()])?;
        items.splice(index..index, item);
        Ok(())
    }

    /// Append every candidate, or none of them.
    pub fn extend<R: Into<Raw>>(&mut self, raws: impl IntoIterator<Item = R>) -> Result<()> {
        let (kind, name, items) = self.list_parts("extend")?;
        let validated = kind.validate_all(name, raws.into_iter().map(Into::into).collect())?;
        items.extend(validated);
        Ok(())
    }

    pub fn set_item(&mut self, index: usize, raw: impl Into<Raw>) -> Result<()> {
        let (kind, name, items) = self.list_parts("set_item")?;
        if index >= items.len() {
            return Err(ConfigError::validation(name, format!("index {index}")));
        }
        let mut item = kind.validate_all(name, vec![raw.into()])?;
        if let Some(v) = item.pop() {
            items[index] = v;
        }
        Ok(())
    }

    /// Replace `range` with the candidates (slice assignment), all-or-nothing.
    pub fn splice<R: Into<Raw>>(
        &mut self,
        range: Range<usize>,
        raws: impl IntoIterator<Item = R>,
    ) -> Result<()> {
        let (kind, name, items) = self.list_parts("splice")?;
        if range.start > range.end || range.end > items.len() {
            return Err(ConfigError::validation(
                name,
                format!("range {}..{}", range.start, range.end),
            ));
        }
        let validated = kind.validate_all(name, raws.into_iter().map(Into::into).collect())?;
        items.splice(range, validated);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Scalar> {
        let (_, name, items) = self.list_parts("remove")?;
        if index >= items.len() {
            return Err(ConfigError::validation(name, format!("index {index}")));
        }
        Ok(items.remove(index))
    }

    /// `int32` or `untracked int32`.
    pub fn config_type_name(&self) -> String {
        let name = self.param_type().name();
        if self.tracked {
            name.to_string()
        } else {
            format!("untracked {name}")
        }
    }

    pub fn config_value(&self, options: &PrintOptions) -> String {
        self.value.config_value(options)
    }

    /// `cms.int32` or `cms.untracked.int32`.
    pub fn source_type_name(&self, options: &PrintOptions) -> String {
        let name = self.param_type().name();
        if self.tracked {
            options.class_name(name)
        } else {
            options.class_name(&format!("untracked.{name}"))
        }
    }

    pub fn dump_source(&self, options: &PrintOptions) -> String {
        format!(
            "{}({})",
            self.source_type_name(options),
            self.value.source_args(options)
        )
    }

    /// Register this parameter under `name` in `target`.
    pub fn insert_into<S: PlacementSink + ?Sized>(
        &self,
        sink: &mut S,
        target: &mut S::Handle,
        name: &str,
    ) {
        match &self.value {
            Value::Scalar(Scalar::PSet(set)) => {
                let mut child = sink.new_container();
                set.insert_contents_into(sink, &mut child);
                sink.add_container(target, self.tracked, name, child);
            }
            Value::Scalar(s) => sink.add_scalar(target, self.tracked, name, s),
            Value::List {
                kind: ScalarKind::PSet,
                items,
            } => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    if let Scalar::PSet(set) = item {
                        let mut child = sink.new_container();
                        set.insert_contents_into(sink, &mut child);
                        children.push(child);
                    }
                }
                sink.add_container_list(target, self.tracked, name, children);
            }
            Value::List {
                kind: ScalarKind::String,
                items,
            } => {
                let labels = items
                    .iter()
                    .filter_map(|item| match item {
                        Scalar::String(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect();
                sink.add_ordered_labels(target, self.tracked, name, labels);
            }
            Value::List { kind, items } => sink.add_list(target, self.tracked, name, *kind, items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction_validates() {
        assert_eq!(
            Parameter::new(ParamType::scalar(ScalarKind::Int32), 1).unwrap(),
            Parameter::int32(1)
        );
        assert!(Parameter::new(ParamType::scalar(ScalarKind::Int32), "i").is_err());
        assert!(Parameter::new(ParamType::scalar(ScalarKind::UInt32), -1).is_err());
    }

    #[test]
    fn failed_set_value_leaves_state() {
        let mut p = untracked(Parameter::uint32(7));
        assert!(p.set_value(-3).is_err());
        assert_eq!(p, untracked(Parameter::uint32(7)));
        p.set_value(9u32).unwrap();
        assert_eq!(p.value(), &Value::Scalar(Scalar::UInt32(9)));
        assert!(!p.is_tracked());
    }

    #[test]
    fn list_operations_follow_slice_semantics() {
        let mut v = Parameter::vint32([]);
        assert_eq!(v.len(), 0);
        v.push(1).unwrap();
        v.push(2).unwrap();
        v.insert(1, 3).unwrap();
        v.set_item(1, 4).unwrap();
        v.splice(1..1, [5]).unwrap();
        assert_eq!(v, Parameter::vint32([1, 5, 4, 2]));
        assert!(v.push("blah").is_err());
    }

    #[test]
    fn list_mutations_are_all_or_nothing() {
        let mut v = Parameter::vuint32([1, 2]);
        let before = v.clone();
        assert!(v.extend(vec![Raw::from(3), Raw::from(-1)]).is_err());
        assert!(v.splice(0..2, vec![Raw::from(5), Raw::from("x")]).is_err());
        assert!(v.insert(5, 1).is_err());
        assert!(v.set_item(0, -4).is_err());
        assert_eq!(v, before);
    }

    #[test]
    fn list_operations_need_a_list() {
        let mut p = Parameter::int32(1);
        assert!(matches!(p.push(2), Err(ConfigError::Type { .. })));
    }

    #[test]
    fn set_value_replaces_whole_list() {
        let mut v = Parameter::vstring(["a"]);
        v.set_value(vec!["b", "c"]).unwrap();
        assert_eq!(v, Parameter::vstring(["b", "c"]));
        assert!(v.set_value(vec![Raw::from("d"), Raw::from(1)]).is_err());
        assert_eq!(v, Parameter::vstring(["b", "c"]));
    }

    #[test]
    fn type_names_reflect_trackedness() {
        let opts = PrintOptions::default();
        let p = untracked(Parameter::vint32([1, 5, 3]));
        assert_eq!(p.config_type_name(), "untracked vint32");
        assert_eq!(p.dump_source(&opts), "cms.untracked.vint32(1, 5, 3)");
        assert_eq!(Parameter::int32(1).config_type_name(), "int32");
    }

    #[test]
    fn scalar_source_forms() {
        let opts = PrintOptions::default();
        assert_eq!(Parameter::double(2.0).dump_source(&opts), "cms.double(2.0)");
        assert_eq!(Parameter::bool(true).dump_source(&opts), "cms.bool(True)");
        assert_eq!(Parameter::string("it's").dump_source(&opts), "cms.string(\"it's\")");
        assert_eq!(
            Parameter::input_tag(InputTag::with_instance("a", "b")).dump_source(&opts),
            "cms.InputTag('a', 'b')"
        );
        assert_eq!(
            Parameter::vinput_tag([InputTag::new("a"), InputTag::with_instance("b", "c")])
                .dump_source(&opts),
            "cms.VInputTag('a', 'b:c')"
        );
    }
}
