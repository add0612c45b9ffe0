//! Placement sink: the external collector that fully assembled components
//! and paths are registered into.
//!
//! The crate only calls this interface; the execution host implements it.
//! [`RecordingSink`] is an in-crate implementation that records every call.

pub mod record;

pub use record::{Entry, RecordedContainer, Registration, RecordingSink};

use crate::types::{Scalar, ScalarKind};

pub trait PlacementSink {
    /// Opaque container handle (a nested parameter set on the host side).
    type Handle;

    fn new_container(&mut self) -> Self::Handle;

    /// Never called with a `Scalar::PSet`; nested sets go through
    /// [`PlacementSink::add_container`].
    fn add_scalar(&mut self, target: &mut Self::Handle, tracked: bool, name: &str, value: &Scalar);

    fn add_list(
        &mut self,
        target: &mut Self::Handle,
        tracked: bool,
        name: &str,
        kind: ScalarKind,
        values: &[Scalar],
    );

    fn add_container(
        &mut self,
        target: &mut Self::Handle,
        tracked: bool,
        name: &str,
        child: Self::Handle,
    );

    fn add_container_list(
        &mut self,
        target: &mut Self::Handle,
        tracked: bool,
        name: &str,
        children: Vec<Self::Handle>,
    );

    /// String lists and flattened paths.
    fn add_ordered_labels(
        &mut self,
        target: &mut Self::Handle,
        tracked: bool,
        name: &str,
        labels: Vec<String>,
    );

    fn add_producer(&mut self, name: &str, handle: Self::Handle);
    fn add_filter(&mut self, name: &str, handle: Self::Handle);
    fn add_analyzer(&mut self, name: &str, handle: Self::Handle);
    fn add_output_module(&mut self, name: &str, handle: Self::Handle);
    fn add_service(&mut self, name: &str, handle: Self::Handle);
    fn add_source(&mut self, name: &str, handle: Self::Handle);
    fn add_looper(&mut self, name: &str, handle: Self::Handle);
    fn add_es_source(&mut self, name: &str, handle: Self::Handle);
    fn add_es_producer(&mut self, name: &str, handle: Self::Handle);
    fn add_es_prefer(&mut self, name: &str, handle: Self::Handle);
    fn add_pset(&mut self, name: &str, handle: Self::Handle);

    /// Process-level parameters: path lists and bookkeeping entries.
    fn add_process_parameters(&mut self, process_name: &str, handle: Self::Handle);

    fn set_schedule_order(&mut self, path_names: Vec<String>);
}
