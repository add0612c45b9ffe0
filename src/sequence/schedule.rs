//! Explicit path execution order.

use crate::error::{ConfigError, Result};
use crate::render::PrintOptions;
use crate::sequence::{ModuleSequence, Role};
use std::ops::Range;

/// Ordered list of paths and end paths. Every edit is all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    paths: Vec<ModuleSequence>,
}

fn check_item(item: &ModuleSequence) -> Result<()> {
    match item.role() {
        Role::Path | Role::EndPath => Ok(()),
        Role::Sequence => Err(ConfigError::wrong_type(
            "Schedule",
            "Path or EndPath",
            item.describe(),
        )),
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths(paths: impl IntoIterator<Item = ModuleSequence>) -> Result<Self> {
        let mut schedule = Self::new();
        schedule.extend(paths)?;
        Ok(schedule)
    }

    pub fn push(&mut self, item: ModuleSequence) -> Result<()> {
        check_item(&item)?;
        self.paths.push(item);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, item: ModuleSequence) -> Result<()> {
        check_item(&item)?;
        if index > self.paths.len() {
            return Err(ConfigError::validation("schedule index", index));
        }
        self.paths.insert(index, item);
        Ok(())
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ModuleSequence>) -> Result<()> {
        let items: Vec<_> = items.into_iter().collect();
        items.iter().try_for_each(check_item)?;
        self.paths.extend(items);
        Ok(())
    }

    /// Replace `range` with `items`.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        items: impl IntoIterator<Item = ModuleSequence>,
    ) -> Result<()> {
        let items: Vec<_> = items.into_iter().collect();
        items.iter().try_for_each(check_item)?;
        if range.start > range.end || range.end > self.paths.len() {
            return Err(ConfigError::validation(
                "schedule range",
                format!("{range:?}"),
            ));
        }
        self.paths.splice(range, items);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<ModuleSequence> {
        (index < self.paths.len()).then(|| self.paths.remove(index))
    }

    /// Shallow: the copy shares the path objects.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn paths(&self) -> &[ModuleSequence] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Labels handed to the sink's schedule order.
    pub fn path_names(&self) -> Result<Vec<String>> {
        self.paths
            .iter()
            .map(|p| p.label().ok_or_else(|| ConfigError::Unlabeled(p.describe())))
            .collect()
    }

    /// `cms.Schedule(process.p1, process.e)`
    pub fn dump_source(&self, options: &PrintOptions) -> Result<String> {
        let names = self
            .path_names()?
            .iter()
            .map(|n| options.label(n))
            .collect::<Vec<_>>();
        Ok(format!("{}({})", options.class_name("Schedule"), names.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, TypedComponent};
    use crate::sequence::Module;
    use pretty_assertions::assert_eq;

    fn labeled(seq: ModuleSequence, label: &str) -> ModuleSequence {
        seq.set_label(label).unwrap();
        seq
    }

    fn fixtures() -> (ModuleSequence, ModuleSequence, ModuleSequence) {
        let a = Module::labeled("a", TypedComponent::new(ComponentKind::EDProducer, "A")).unwrap();
        (
            labeled(ModuleSequence::path(&a).unwrap(), "p"),
            labeled(ModuleSequence::end_path(&a).unwrap(), "e"),
            labeled(ModuleSequence::sequence(&a).unwrap(), "s"),
        )
    }

    #[test]
    fn only_paths_are_accepted() {
        let (p, e, s) = fixtures();
        let mut schedule = Schedule::from_paths([p.clone()]).unwrap();
        assert!(matches!(schedule.push(s.clone()), Err(ConfigError::Type { .. })));
        assert!(matches!(schedule.insert(0, s.clone()), Err(ConfigError::Type { .. })));
        schedule.insert(0, e.clone()).unwrap();
        assert_eq!(schedule.path_names().unwrap(), vec!["e", "p"]);
    }

    #[test]
    fn bulk_edits_are_all_or_nothing() {
        let (p, e, s) = fixtures();
        let mut schedule = Schedule::from_paths([p.clone()]).unwrap();
        assert!(schedule.extend([e.clone(), s.clone()]).is_err());
        assert_eq!(schedule.len(), 1);
        assert!(schedule.splice(0..1, [s.clone()]).is_err());
        assert!(schedule.splice(0..3, [e.clone()]).is_err());
        assert_eq!(schedule.path_names().unwrap(), vec!["p"]);
        schedule.splice(0..1, [e.clone(), p.clone()]).unwrap();
        assert_eq!(schedule.path_names().unwrap(), vec!["e", "p"]);
    }

    #[test]
    fn copy_is_shallow() {
        let (p, e, _) = fixtures();
        let schedule = Schedule::from_paths([p, e]).unwrap();
        let copy = schedule.copy();
        assert!(copy.paths()[0].ptr_eq(&schedule.paths()[0]));
        assert_eq!(
            copy.dump_source(&PrintOptions::default()).unwrap(),
            "cms.Schedule(process.p, process.e)"
        );
    }
}
