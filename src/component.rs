//! Typed components: a parameter set plus an immutable type name.

use crate::error::Result;
use crate::render::PrintOptions;
use crate::sink::PlacementSink;
use crate::types::{Parameter, ParameterSet, Raw, Scalar, strings};
use tracing::debug;

/// What a component kind may do; declared per kind rather than inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Takes a process-unique label.
    Labelable,
    /// May be placed without a label.
    Unlabelable,
    Configurable,
    /// May appear in sequences and paths.
    Sequenceable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    EDProducer,
    EDFilter,
    EDAnalyzer,
    OutputModule,
    Source,
    Looper,
    Service,
    ESSource,
    ESProducer,
    ESPrefer,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::EDProducer,
        ComponentKind::EDFilter,
        ComponentKind::EDAnalyzer,
        ComponentKind::OutputModule,
        ComponentKind::Source,
        ComponentKind::Looper,
        ComponentKind::Service,
        ComponentKind::ESSource,
        ComponentKind::ESProducer,
        ComponentKind::ESPrefer,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            ComponentKind::EDProducer => "EDProducer",
            ComponentKind::EDFilter => "EDFilter",
            ComponentKind::EDAnalyzer => "EDAnalyzer",
            ComponentKind::OutputModule => "OutputModule",
            ComponentKind::Source => "Source",
            ComponentKind::Looper => "Looper",
            ComponentKind::Service => "Service",
            ComponentKind::ESSource => "ESSource",
            ComponentKind::ESProducer => "ESProducer",
            ComponentKind::ESPrefer => "ESPrefer",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class_name() == name)
    }

    pub fn capabilities(self) -> &'static [Capability] {
        use Capability::*;
        match self {
            ComponentKind::EDProducer
            | ComponentKind::EDFilter
            | ComponentKind::EDAnalyzer
            | ComponentKind::OutputModule => &[Configurable, Labelable, Sequenceable],
            ComponentKind::Source | ComponentKind::Looper => &[Configurable],
            ComponentKind::Service => &[Configurable, Unlabelable],
            ComponentKind::ESSource | ComponentKind::ESProducer | ComponentKind::ESPrefer => {
                &[Configurable, Unlabelable, Labelable]
            }
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedComponent {
    kind: ComponentKind,
    type_name: String,
    params: ParameterSet,
}

impl TypedComponent {
    pub fn new(kind: ComponentKind, type_name: impl Into<String>) -> Self {
        Self::with_params(kind, type_name, ParameterSet::new())
    }

    pub fn with_params(
        kind: ComponentKind,
        type_name: impl Into<String>,
        params: ParameterSet,
    ) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            params,
        }
    }

    pub fn with(mut self, name: impl Into<String>, param: Parameter) -> Result<Self> {
        self.params.set_parameter(name, param)?;
        Ok(self)
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    /// Deep copy of the parameters.
    pub fn parameters(&self) -> ParameterSet {
        self.params.parameters()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, param: Parameter) -> Result<()> {
        self.params.set_parameter(name, param)
    }

    pub fn set_parameter_value(&mut self, name: &str, raw: impl Into<Raw>) -> Result<()> {
        self.params.set_parameter_value(name, raw)
    }

    /// Same type and parameters, independent of `self`.
    pub fn copy(&self) -> Self {
        Self::with_params(self.kind, self.type_name.clone(), self.parameters())
    }

    /// Short description for error messages: `EDProducer('Foo', ...)`.
    pub fn describe(&self) -> String {
        format!("{}({}, ...)", self.kind.class_name(), strings::quote(&self.type_name))
    }

    /// ```text
    /// TypeName {
    ///     int32 a = 1
    /// }
    /// ```
    pub fn dump_config(&self, options: &PrintOptions) -> String {
        format!(
            "{} {{ \n{}{}}}\n",
            self.type_name,
            self.params.config_lines(options),
            options.indentation()
        )
    }

    /// `cms.EDProducer('TypeName', a = cms.int32(1))`, one argument per line.
    pub fn dump_source(&self, options: &PrintOptions) -> String {
        let args = self.params.source_args(options);
        let sep = if args.is_empty() { "" } else { "," };
        format!(
            "{}({}{}{})",
            options.class_name(self.kind.class_name()),
            strings::quote(&self.type_name),
            sep,
            args
        )
    }

    /// Value of `@module_label` for an instance placed as `label`.
    pub fn module_label(&self, label: &str) -> String {
        match self.kind {
            ComponentKind::Source => "@main_input".to_string(),
            ComponentKind::Looper => "@main_looper".to_string(),
            ComponentKind::ESSource | ComponentKind::ESProducer if label == self.type_name => {
                String::new()
            }
            _ => label.to_string(),
        }
    }

    /// Name the host files this instance under.
    pub fn name_in_process_desc(&self, label: &str) -> String {
        match self.kind {
            ComponentKind::Source | ComponentKind::Looper => self.module_label(label),
            ComponentKind::ESSource | ComponentKind::ESProducer => {
                format!("{}@{}", self.type_name, self.module_label(label))
            }
            ComponentKind::ESPrefer => format!("esprefer_{}@{}", self.type_name, label),
            ComponentKind::Service => self.type_name.clone(),
            _ => label.to_string(),
        }
    }

    /// Emit label, type name, then the parameters, and register the result.
    pub fn insert_into<S: PlacementSink + ?Sized>(&self, sink: &mut S, label: &str) {
        let mut handle = sink.new_container();
        let type_name = Scalar::String(self.type_name.clone());
        if self.kind == ComponentKind::Service {
            sink.add_scalar(&mut handle, true, "@service_type", &type_name);
        } else {
            let module_label = Scalar::String(self.module_label(label));
            sink.add_scalar(&mut handle, true, "@module_label", &module_label);
            sink.add_scalar(&mut handle, true, "@module_type", &type_name);
        }
        self.params.insert_contents_into(sink, &mut handle);

        let name = self.name_in_process_desc(label);
        debug!(kind = self.kind.class_name(), %name, "registering component");
        match self.kind {
            ComponentKind::EDProducer => sink.add_producer(&name, handle),
            ComponentKind::EDFilter => sink.add_filter(&name, handle),
            ComponentKind::EDAnalyzer => sink.add_analyzer(&name, handle),
            ComponentKind::OutputModule => sink.add_output_module(&name, handle),
            ComponentKind::Source => sink.add_source(&name, handle),
            ComponentKind::Looper => sink.add_looper(&name, handle),
            ComponentKind::Service => sink.add_service(&name, handle),
            ComponentKind::ESSource => sink.add_es_source(&name, handle),
            ComponentKind::ESProducer => sink.add_es_producer(&name, handle),
            ComponentKind::ESPrefer => sink.add_es_prefer(&name, handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::types::{InputTag, untracked};
    use pretty_assertions::assert_eq;

    fn analyzer() -> TypedComponent {
        TypedComponent::new(ComponentKind::EDAnalyzer, "Parameterized")
            .with("foo", untracked(Parameter::int32(1)))
            .unwrap()
            .with("bar", untracked(Parameter::string("it")))
            .unwrap()
    }

    #[test]
    fn copy_is_independent() {
        let original = analyzer();
        let mut copy = original.copy();
        assert_eq!(copy, original);
        copy.set_parameter_value("foo", 2).unwrap();
        assert_eq!(original.get("foo"), Some(&untracked(Parameter::int32(1))));
    }

    #[test]
    fn config_dump() {
        let c = analyzer()
            .with("src", Parameter::input_tag(InputTag::with_instance("a", "b")))
            .unwrap();
        assert_eq!(
            c.dump_config(&PrintOptions::default()),
            "Parameterized { \n    untracked int32 foo = 1\n    untracked string bar = 'it'\n    \
             InputTag src = a:b\n}\n"
        );
        let empty = TypedComponent::new(ComponentKind::Service, "Empty");
        assert_eq!(empty.dump_config(&PrintOptions::default()), "Empty { \n}\n");
    }

    #[test]
    fn source_dump() {
        assert_eq!(
            analyzer().dump_source(&PrintOptions::default()),
            "cms.EDAnalyzer('Parameterized',\n    foo = cms.untracked.int32(1),\n    \
             bar = cms.untracked.string('it')\n)"
        );
        let empty = TypedComponent::new(ComponentKind::EDAnalyzer, "Empty");
        assert_eq!(empty.dump_source(&PrintOptions::bare()), "EDAnalyzer('Empty')");
    }

    #[test]
    fn capabilities_per_kind() {
        assert!(ComponentKind::EDFilter.has(Capability::Sequenceable));
        assert!(!ComponentKind::Service.has(Capability::Sequenceable));
        assert!(ComponentKind::Service.has(Capability::Unlabelable));
        assert!(ComponentKind::ESSource.has(Capability::Labelable));
        assert!(!ComponentKind::Source.has(Capability::Labelable));
    }

    #[test]
    fn host_names_per_kind() {
        let es = TypedComponent::new(ComponentKind::ESSource, "EmptyESSource");
        assert_eq!(es.name_in_process_desc("EmptyESSource"), "EmptyESSource@");
        assert_eq!(es.name_in_process_desc("magfield"), "EmptyESSource@magfield");
        let prefer = TypedComponent::new(ComponentKind::ESPrefer, "Geom");
        assert_eq!(prefer.name_in_process_desc("x"), "esprefer_Geom@x");
        let source = TypedComponent::new(ComponentKind::Source, "PoolSource");
        assert_eq!(source.name_in_process_desc("anything"), "@main_input");
    }

    #[test]
    fn insert_emits_label_type_then_parameters() {
        let mut sink = RecordingSink::new();
        analyzer().insert_into(&mut sink, "ana");
        let reg = sink.registration("analyzer", "ana").unwrap();
        assert_eq!(reg.content.names(), vec!["@module_label", "@module_type", "foo", "bar"]);
        assert_eq!(reg.content.scalar("@module_type"), Some("'Parameterized'"));

        let mut sink = RecordingSink::new();
        TypedComponent::new(ComponentKind::Service, "Tracer").insert_into(&mut sink, "");
        let reg = sink.registration("service", "Tracer").unwrap();
        assert_eq!(reg.content.names(), vec!["@service_type"]);
    }
}
