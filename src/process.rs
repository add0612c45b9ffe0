//! A whole process description: every placed component, sequence and path
//! under one name.

use crate::component::{ComponentKind, TypedComponent};
use crate::error::{ConfigError, Result};
use crate::names::check_identifier;
use crate::render::PrintOptions;
use crate::sequence::{
    CloneTable, DependencyTable, Module, ModuleSequence, NameTable, Role, Schedule, SeqNode,
};
use crate::sink::PlacementSink;
use crate::types::ParameterSet;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Process {
    name: String,
    source: Option<TypedComponent>,
    looper: Option<TypedComponent>,
    modules: IndexMap<String, Module>,
    /// Keyed by type name; a service has no label.
    services: IndexMap<String, TypedComponent>,
    es_sources: IndexMap<String, TypedComponent>,
    es_producers: IndexMap<String, TypedComponent>,
    es_prefers: IndexMap<String, TypedComponent>,
    psets: IndexMap<String, ParameterSet>,
    sequences: IndexMap<String, ModuleSequence>,
    paths: IndexMap<String, ModuleSequence>,
    end_paths: IndexMap<String, ModuleSequence>,
    schedule: Option<Schedule>,
}

fn expect_kind(component: &TypedComponent, allowed: &[ComponentKind], what: &str) -> Result<()> {
    if allowed.contains(&component.kind()) {
        Ok(())
    } else {
        Err(ConfigError::wrong_type(what, allowed_names(allowed), component.describe()))
    }
}

fn allowed_names(allowed: &[ComponentKind]) -> String {
    allowed
        .iter()
        .map(|k| k.class_name())
        .collect::<Vec<_>>()
        .join(" or ")
}

const MODULE_KINDS: [ComponentKind; 4] = [
    ComponentKind::EDProducer,
    ComponentKind::EDFilter,
    ComponentKind::EDAnalyzer,
    ComponentKind::OutputModule,
];

impl Process {
    pub fn new(name: &str) -> Result<Self> {
        check_identifier(name)?;
        Ok(Self {
            name: name.to_string(),
            source: None,
            looper: None,
            modules: IndexMap::new(),
            services: IndexMap::new(),
            es_sources: IndexMap::new(),
            es_producers: IndexMap::new(),
            es_prefers: IndexMap::new(),
            psets: IndexMap::new(),
            sequences: IndexMap::new(),
            paths: IndexMap::new(),
            end_paths: IndexMap::new(),
            schedule: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn has_label(&self, label: &str) -> bool {
        self.modules.contains_key(label)
            || self.es_sources.contains_key(label)
            || self.es_producers.contains_key(label)
            || self.es_prefers.contains_key(label)
            || self.psets.contains_key(label)
            || self.sequences.contains_key(label)
            || self.paths.contains_key(label)
            || self.end_paths.contains_key(label)
    }

    fn claim_label(&self, label: &str) -> Result<()> {
        check_identifier(label)?;
        if self.has_label(label) {
            return Err(ConfigError::DuplicateLabel(label.to_string()));
        }
        Ok(())
    }

    /// Place any component, dispatching on its kind. Sources, loopers and
    /// services ignore `label`.
    pub fn add_component(&mut self, label: &str, component: TypedComponent) -> Result<()> {
        match component.kind() {
            ComponentKind::EDProducer
            | ComponentKind::EDFilter
            | ComponentKind::EDAnalyzer
            | ComponentKind::OutputModule => self.add_module(label, component).map(|_| ()),
            ComponentKind::Source => self.set_source(component),
            ComponentKind::Looper => self.set_looper(component),
            ComponentKind::Service => self.add_service(component),
            ComponentKind::ESSource => self.add_es_source(label, component),
            ComponentKind::ESProducer => self.add_es_producer(label, component),
            ComponentKind::ESPrefer => self.add_es_prefer(label, component),
        }
    }

    /// Place a producer, filter, analyzer or output module and return the
    /// handle sequences are built from.
    pub fn add_module(&mut self, label: &str, component: TypedComponent) -> Result<Module> {
        expect_kind(&component, &MODULE_KINDS, "module")?;
        self.claim_label(label)?;
        let module = Module::labeled(label, component)?;
        self.modules.insert(label.to_string(), module.clone());
        Ok(module)
    }

    /// Place an already built module under its own label.
    pub fn place_module(&mut self, module: &Module) -> Result<()> {
        let label = module.require_label()?;
        self.claim_label(&label)?;
        self.modules.insert(label, module.clone());
        Ok(())
    }

    pub fn set_source(&mut self, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::Source], "source")?;
        if self.source.is_some() {
            warn!(process = %self.name, "replacing the input source");
        }
        self.source = Some(component);
        Ok(())
    }

    pub fn set_looper(&mut self, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::Looper], "looper")?;
        if self.looper.is_some() {
            warn!(process = %self.name, "replacing the looper");
        }
        self.looper = Some(component);
        Ok(())
    }

    pub fn add_service(&mut self, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::Service], "service")?;
        let key = component.type_name().to_string();
        if self.services.insert(key.clone(), component).is_some() {
            warn!(service = %key, "replacing an existing service");
        }
        Ok(())
    }

    pub fn add_es_source(&mut self, label: &str, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::ESSource], "ES source")?;
        self.claim_label(label)?;
        self.es_sources.insert(label.to_string(), component);
        Ok(())
    }

    pub fn add_es_producer(&mut self, label: &str, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::ESProducer], "ES producer")?;
        self.claim_label(label)?;
        self.es_producers.insert(label.to_string(), component);
        Ok(())
    }

    pub fn add_es_prefer(&mut self, label: &str, component: TypedComponent) -> Result<()> {
        expect_kind(&component, &[ComponentKind::ESPrefer], "ES prefer")?;
        self.claim_label(label)?;
        self.es_prefers.insert(label.to_string(), component);
        Ok(())
    }

    pub fn add_pset(&mut self, label: &str, pset: ParameterSet) -> Result<()> {
        self.claim_label(label)?;
        self.psets.insert(label.to_string(), pset);
        Ok(())
    }

    fn place_sequence(&mut self, label: &str, seq: &ModuleSequence, role: Role) -> Result<()> {
        if seq.role() != role {
            return Err(ConfigError::wrong_type(
                label,
                role.class_name(),
                seq.role().class_name(),
            ));
        }
        self.claim_label(label)?;
        seq.set_label(label)?;
        let table = match role {
            Role::Sequence => &mut self.sequences,
            Role::Path => &mut self.paths,
            Role::EndPath => &mut self.end_paths,
        };
        table.insert(label.to_string(), seq.clone());
        Ok(())
    }

    pub fn add_sequence(&mut self, label: &str, seq: &ModuleSequence) -> Result<()> {
        self.place_sequence(label, seq, Role::Sequence)
    }

    pub fn add_path(&mut self, label: &str, path: &ModuleSequence) -> Result<()> {
        self.place_sequence(label, path, Role::Path)
    }

    pub fn add_end_path(&mut self, label: &str, path: &ModuleSequence) -> Result<()> {
        self.place_sequence(label, path, Role::EndPath)
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = Some(schedule);
    }

    pub fn source(&self) -> Option<&TypedComponent> {
        self.source.as_ref()
    }

    pub fn looper(&self) -> Option<&TypedComponent> {
        self.looper.as_ref()
    }

    pub fn module(&self, label: &str) -> Option<&Module> {
        self.modules.get(label)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &Module)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn service(&self, type_name: &str) -> Option<&TypedComponent> {
        self.services.get(type_name)
    }

    pub fn pset(&self, label: &str) -> Option<&ParameterSet> {
        self.psets.get(label)
    }

    pub fn sequence(&self, label: &str) -> Option<&ModuleSequence> {
        self.sequences.get(label)
    }

    pub fn path(&self, label: &str) -> Option<&ModuleSequence> {
        self.paths.get(label)
    }

    pub fn end_path(&self, label: &str) -> Option<&ModuleSequence> {
        self.end_paths.get(label)
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// Path, end path or sequence under `label`.
    pub fn any_sequence(&self, label: &str) -> Option<&ModuleSequence> {
        self.sequences
            .get(label)
            .or_else(|| self.paths.get(label))
            .or_else(|| self.end_paths.get(label))
    }

    fn all_sequences(&self) -> impl Iterator<Item = &ModuleSequence> {
        self.sequences
            .values()
            .chain(self.paths.values())
            .chain(self.end_paths.values())
    }

    /// What placeholders may refer to: modules and named sequences.
    pub fn name_table(&self) -> NameTable {
        let mut names = NameTable::new();
        for (label, module) in &self.modules {
            names.insert(label.clone(), SeqNode::Atomic(module.clone()));
        }
        for (label, seq) in &self.sequences {
            names.insert(label.clone(), SeqNode::Sequence(seq.clone()));
        }
        names
    }

    /// Resolve every placeholder in every sequence and path.
    pub fn resolve(&self) -> Result<()> {
        let names = self.name_table();
        for seq in self.all_sequences() {
            seq.resolve(&names)?;
        }
        debug!(process = %self.name, sequences = names.len(), "resolved placeholders");
        Ok(())
    }

    /// Every module used by a sequence or path must be the one placed under
    /// its label.
    pub fn check_placement(&self) -> Result<()> {
        for seq in self.all_sequences() {
            for module in seq.modules() {
                let label = module.require_label()?;
                match self.modules.get(&label) {
                    Some(placed) if placed.ptr_eq(&module) => {}
                    _ => {
                        return Err(ConfigError::UnplacedModule {
                            path: seq.describe(),
                            module: label,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// One dependency pass per path and end path, each with a fresh table.
    pub fn validate_dependencies(&self) -> Result<BTreeMap<String, DependencyTable>> {
        self.resolve()?;
        let mut all = BTreeMap::new();
        for (label, path) in self.paths.iter().chain(&self.end_paths) {
            all.insert(label.clone(), path.module_dependencies()?);
        }
        Ok(all)
    }

    /// Independent copy: modules are copied once, then every sequence and
    /// path is cloned through one shared table so sharing is kept.
    pub fn deep_clone(&self) -> Result<Process> {
        let mut table = CloneTable::new();
        let mut copy = Process::new(&self.name)?;
        copy.source = self.source.as_ref().map(TypedComponent::copy);
        copy.looper = self.looper.as_ref().map(TypedComponent::copy);
        for (label, module) in &self.modules {
            copy.modules.insert(label.clone(), table.clone_module(module)?);
        }
        copy.services = copy_all(&self.services);
        copy.es_sources = copy_all(&self.es_sources);
        copy.es_producers = copy_all(&self.es_producers);
        copy.es_prefers = copy_all(&self.es_prefers);
        copy.psets = self.psets.clone();
        copy.sequences = clone_all(&self.sequences, &mut table)?;
        copy.paths = clone_all(&self.paths, &mut table)?;
        copy.end_paths = clone_all(&self.end_paths, &mut table)?;
        if let Some(schedule) = &self.schedule {
            let paths = schedule
                .paths()
                .iter()
                .map(|p| p.clone_with_table(&mut table))
                .collect::<Result<Vec<_>>>()?;
            copy.schedule = Some(Schedule::from_paths(paths)?);
        }
        debug!(process = %self.name, modules = copy.modules.len(), "cloned process");
        Ok(copy)
    }

    /// Legacy grammar:
    ///
    /// ```text
    /// process NAME = {
    ///     module a = Producer {
    ///     }
    ///     path p = {a}
    /// }
    /// ```
    pub fn dump_config(&self, options: &PrintOptions) -> Result<String> {
        let inner = options.nested();
        let pad = inner.indentation();
        let mut out = format!("{}process {} = {{\n", options.indentation(), self.name);

        if let Some(source) = &self.source {
            out += &format!("{pad}source = {}", source.dump_config(&inner));
        }
        if let Some(looper) = &self.looper {
            out += &format!("{pad}looper = {}", looper.dump_config(&inner));
        }
        for (label, module) in &self.modules {
            out += &format!("{pad}module {label} = {}", module.component().dump_config(&inner));
        }
        for (keyword, table) in [
            ("es_source", &self.es_sources),
            ("es_module", &self.es_producers),
            ("es_prefer", &self.es_prefers),
        ] {
            for (label, component) in table {
                let body = component.dump_config(&inner);
                if label == component.type_name() {
                    out += &format!("{pad}{keyword} = {body}");
                } else {
                    out += &format!("{pad}{keyword} {label} = {body}");
                }
            }
        }
        for service in self.services.values() {
            out += &format!("{pad}service = {}", service.dump_config(&inner));
        }
        for (label, pset) in &self.psets {
            out += &format!("{pad}PSet {label} = {}\n", pset.config_value(&inner));
        }
        for (keyword, table) in [
            ("sequence", &self.sequences),
            ("path", &self.paths),
            ("endpath", &self.end_paths),
        ] {
            for (label, seq) in table {
                out += &format!("{pad}{keyword} {label} = {}\n", seq.dump_config(&inner)?);
            }
        }
        if let Some(schedule) = &self.schedule {
            out += &format!("{pad}schedule = {{{}}}\n", schedule.path_names()?.join(","));
        }
        out += &format!("{}}}\n", options.indentation());
        Ok(out)
    }

    /// Source grammar: one `process.label = ...` assignment per object.
    pub fn dump_source(&self, options: &PrintOptions) -> Result<String> {
        let mut out = format!(
            "process = {}({})\n\n",
            options.class_name("Process"),
            crate::types::strings::quote(&self.name)
        );
        let assign = |label: &str, value: String| format!("{} = {}\n", options.label(label), value);

        if let Some(source) = &self.source {
            out += &assign("source", source.dump_source(options));
        }
        if let Some(looper) = &self.looper {
            out += &assign("looper", looper.dump_source(options));
        }
        for (label, module) in &self.modules {
            out += &assign(label, module.component().dump_source(options));
        }
        for table in [&self.es_sources, &self.es_producers, &self.es_prefers] {
            for (label, component) in table {
                out += &assign(label, component.dump_source(options));
            }
        }
        for (type_name, service) in &self.services {
            out += &assign(type_name, service.dump_source(options));
        }
        for (label, pset) in &self.psets {
            out += &assign(label, pset.dump_source(options, "PSet"));
        }
        for seq in self.all_sequences() {
            let label = seq.label().unwrap_or_default();
            out += &assign(&label, seq.dump_source(options)?);
        }
        if let Some(schedule) = &self.schedule {
            out += &assign("schedule", schedule.dump_source(options)?);
        }
        Ok(out)
    }

    /// Register everything with `sink`: components first, then the
    /// flattened paths as process parameters, then the schedule.
    pub fn insert_into<S: PlacementSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        self.resolve()?;
        self.check_placement()?;
        let names = self.name_table();

        if let Some(source) = &self.source {
            source.insert_into(sink, "");
        }
        if let Some(looper) = &self.looper {
            looper.insert_into(sink, "");
        }
        for (label, module) in &self.modules {
            module.component().insert_into(sink, label);
        }
        for table in [&self.es_sources, &self.es_producers, &self.es_prefers] {
            for (label, component) in table {
                component.insert_into(sink, label);
            }
        }
        for service in self.services.values() {
            service.insert_into(sink, "");
        }
        for (label, pset) in &self.psets {
            let mut handle = sink.new_container();
            pset.insert_contents_into(sink, &mut handle);
            sink.add_pset(label, handle);
        }

        let mut params = sink.new_container();
        for (label, path) in self.paths.iter().chain(&self.end_paths) {
            path.insert_into(sink, &mut params, label, &names)?;
        }
        let path_labels = self.paths.keys().cloned().collect();
        let end_path_labels = self.end_paths.keys().cloned().collect();
        sink.add_ordered_labels(&mut params, true, "@paths", path_labels);
        sink.add_ordered_labels(&mut params, true, "@end_paths", end_path_labels);
        sink.add_process_parameters(&self.name, params);

        if let Some(schedule) = &self.schedule {
            if schedule.is_empty() {
                warn!(process = %self.name, "schedule is empty; no path will run");
            }
            sink.set_schedule_order(schedule.path_names()?);
        }
        debug!(process = %self.name, "inserted process into sink");
        Ok(())
    }
}

fn copy_all(table: &IndexMap<String, TypedComponent>) -> IndexMap<String, TypedComponent> {
    table
        .iter()
        .map(|(label, c)| (label.clone(), c.copy()))
        .collect()
}

fn clone_all(
    table: &IndexMap<String, ModuleSequence>,
    clones: &mut CloneTable,
) -> Result<IndexMap<String, ModuleSequence>> {
    table
        .iter()
        .map(|(label, seq)| Ok((label.clone(), seq.clone_with_table(clones)?)))
        .collect()
}
