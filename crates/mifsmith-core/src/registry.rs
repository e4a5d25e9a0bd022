//! Session-scoped catalog of every declared entity.
//!
//! Specify-block names share one namespace across all kinds, so an atlas and
//! a scalar field can never have the same name. Destination labels and atlas
//! sub-regions live in their own namespaces. Declaration order is preserved
//! so "first declared" defaults and error listings are deterministic.

use std::collections::HashSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::error::Fault;
use crate::geometry::Extent;

/// Whether an evolver advances time or minimizes energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvolverMode {
    Time,
    Minimizing,
}

impl fmt::Display for EvolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvolverMode::Time => "time",
            EvolverMode::Minimizing => "minimizing",
        })
    }
}

/// Kind partition of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Atlas,
    Mesh,
    ScalarField,
    VectorField,
    Script,
    Evolver,
    Driver,
    Energy,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Atlas => "atlas",
            EntityKind::Mesh => "mesh",
            EntityKind::ScalarField => "scalar field",
            EntityKind::VectorField => "vector field",
            EntityKind::Script => "script",
            EntityKind::Evolver => "evolver",
            EntityKind::Driver => "driver",
            EntityKind::Energy => "energy term",
        })
    }
}

/// Kind-specific payload stored for a declared name.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A region with the sub-regions it exposes.
    Atlas {
        extent: Extent,
        regions: IndexSet<String>,
    },
    Mesh {
        atlas: String,
    },
    ScalarField,
    VectorField,
    Script {
        args: Vec<String>,
    },
    Evolver {
        mode: EvolverMode,
    },
    Driver,
    Energy,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Atlas { .. } => EntityKind::Atlas,
            Entity::Mesh { .. } => EntityKind::Mesh,
            Entity::ScalarField => EntityKind::ScalarField,
            Entity::VectorField => EntityKind::VectorField,
            Entity::Script { .. } => EntityKind::Script,
            Entity::Evolver { .. } => EntityKind::Evolver,
            Entity::Driver => EntityKind::Driver,
            Entity::Energy => EntityKind::Energy,
        }
    }
}

/// One declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub class: &'static str,
    pub entity: Entity,
}

/// Everything a session has declared so far.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
    used: HashSet<String>,
    destinations: IndexSet<String>,
    stage_counts: Vec<u64>,
    referenced_files: IndexSet<String>,
    scheduled: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    pub fn is_reserved(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Fails if `name` is already taken by any Specify block.
    pub fn reserve(&self, name: &str) -> Result<(), Fault> {
        if self.is_reserved(name) {
            return Err(Fault::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Reserves `name` and records its payload.
    pub fn register(&mut self, name: &str, class: &'static str, entity: Entity) -> Result<(), Fault> {
        self.reserve(name)?;
        self.entries.insert(name.to_string(), Entry { class, entity });
        Ok(())
    }

    /// First free name among `label`, `label_2`, `label_3`, ...
    pub fn auto_name(&self, label: &str) -> String {
        if !self.is_reserved(label) {
            return label.to_string();
        }
        (2..)
            .map(|n| format!("{label}_{n}"))
            .find(|candidate| !self.is_reserved(candidate))
            .unwrap_or_else(|| label.to_string())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Names of one kind, in declaration order.
    pub fn names(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.entity.kind() == kind)
            .map(|(name, _)| name.as_str())
    }

    /// Finds `name` among entities of `kind` without marking it used.
    pub fn lookup(&self, parameter: &str, kind: EntityKind, name: &str) -> Result<&Entity, Fault> {
        match self.entries.get(name) {
            Some(entry) if entry.entity.kind() == kind => Ok(&entry.entity),
            _ => Err(Fault::UndefinedReference {
                parameter: parameter.to_string(),
                value: name.to_string(),
                expected_kind: kind.to_string(),
                valid: self.names(kind).map(str::to_string).collect(),
            }),
        }
    }

    /// Like [`Registry::lookup`], and marks the name used on success.
    pub fn resolve(&mut self, parameter: &str, kind: EntityKind, name: &str) -> Result<&Entity, Fault> {
        self.lookup(parameter, kind, name)?;
        self.mark_used(name);
        self.lookup(parameter, kind, name)
    }

    /// First declared entity of `kind`.
    pub fn first(&self, kind: EntityKind) -> Option<&str> {
        self.names(kind).next()
    }

    /// Declared evolvers with their modes, in declaration order.
    pub fn evolvers(&self) -> impl Iterator<Item = (&str, EvolverMode)> {
        self.entries.iter().filter_map(|(name, entry)| match entry.entity {
            Entity::Evolver { mode } => Some((name.as_str(), mode)),
            _ => None,
        })
    }

    /// First declared evolver of `mode`.
    pub fn first_evolver(&self, mode: EvolverMode) -> Option<&str> {
        self.evolvers().find(|(_, m)| *m == mode).map(|(name, _)| name)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.names(kind).count()
    }

    // -----------------------------------------------------------------------
    // Usage
    // -----------------------------------------------------------------------

    pub fn mark_used(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Declared names of `kind` that nothing has referenced.
    pub fn unused(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.names(kind).filter(|name| !self.used.contains(*name))
    }

    // -----------------------------------------------------------------------
    // Output, stages and files
    // -----------------------------------------------------------------------

    pub fn has_destination(&self, label: &str) -> bool {
        self.destinations.contains(label)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.destinations.iter().map(String::as_str)
    }

    /// Adds a destination label. Labels do not collide with block names.
    pub fn add_destination(&mut self, label: &str) -> Result<(), Fault> {
        if !self.destinations.insert(label.to_string()) {
            return Err(Fault::DuplicateName {
                name: label.to_string(),
            });
        }
        Ok(())
    }

    pub fn mark_scheduled(&mut self) {
        self.scheduled = true;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn record_stage_count(&mut self, stages: u64) {
        self.stage_counts.push(stages);
    }

    /// Largest stage count any block asked for.
    pub fn max_stage_count(&self) -> Option<u64> {
        self.stage_counts.iter().copied().max()
    }

    pub fn reference_file(&mut self, path: &str) {
        self.referenced_files.insert(path.to_string());
    }

    pub fn referenced_files(&self) -> impl Iterator<Item = &str> {
        self.referenced_files.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas() -> Entity {
        Entity::Atlas {
            extent: Extent::new((0.0, 1.0), (0.0, 1.0), (0.0, 1.0)),
            regions: IndexSet::new(),
        }
    }

    fn setup_registry() -> Registry {
        let mut r = Registry::new();
        r.register("Brick", "Oxs_BoxAtlas", atlas()).unwrap();
        r.register("Ms", "Oxs_UniformScalarField", Entity::ScalarField).unwrap();
        r.register(
            "RK",
            "Oxs_RungeKuttaEvolve",
            Entity::Evolver {
                mode: EvolverMode::Time,
            },
        )
        .unwrap();
        r.register(
            "CG",
            "Oxs_CGEvolve",
            Entity::Evolver {
                mode: EvolverMode::Minimizing,
            },
        )
        .unwrap();
        r
    }

    #[test]
    fn register_and_lookup() {
        let r = setup_registry();
        assert!(r.is_reserved("Brick"));
        assert!(matches!(
            r.lookup("atlas", EntityKind::Atlas, "Brick"),
            Ok(Entity::Atlas { .. })
        ));
        assert_eq!(r.get("Ms").unwrap().class, "Oxs_UniformScalarField");
    }

    #[test]
    fn duplicate_name_across_kinds_fails() {
        let mut r = setup_registry();
        let result = r.register("Brick", "Oxs_UniformScalarField", Entity::ScalarField);
        assert_eq!(
            result,
            Err(Fault::DuplicateName {
                name: "Brick".to_string()
            })
        );
        assert_eq!(r.count(EntityKind::ScalarField), 1);
    }

    #[test]
    fn separate_registries_never_conflict() {
        let mut a = Registry::new();
        let mut b = Registry::new();
        assert!(a.register("Brick", "Oxs_BoxAtlas", atlas()).is_ok());
        assert!(b.register("Brick", "Oxs_BoxAtlas", atlas()).is_ok());
    }

    #[test]
    fn wrong_kind_is_undefined_reference() {
        let r = setup_registry();
        match r.lookup("Ms", EntityKind::ScalarField, "Brick") {
            Err(Fault::UndefinedReference {
                parameter,
                value,
                expected_kind,
                valid,
            }) => {
                assert_eq!(parameter, "Ms");
                assert_eq!(value, "Brick");
                assert_eq!(expected_kind, "scalar field");
                assert_eq!(valid, vec!["Ms".to_string()]);
            }
            other => panic!("expected UndefinedReference, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_marks_used_and_lookup_does_not() {
        let mut r = setup_registry();
        r.lookup("atlas", EntityKind::Atlas, "Brick").unwrap();
        assert!(!r.is_used("Brick"));
        r.resolve("atlas", EntityKind::Atlas, "Brick").unwrap();
        assert!(r.is_used("Brick"));
        assert!(r.resolve("atlas", EntityKind::Atlas, "Nope").is_err());
        assert!(!r.is_used("Nope"));
    }

    #[test]
    fn mark_used_is_idempotent() {
        let mut r = setup_registry();
        r.mark_used("Ms");
        r.mark_used("Ms");
        assert!(r.is_used("Ms"));
        assert_eq!(r.unused(EntityKind::ScalarField).count(), 0);
    }

    #[test]
    fn auto_name_appends_suffix() {
        let mut r = Registry::new();
        assert_eq!(r.auto_name("BoxAtlas"), "BoxAtlas");
        r.register("BoxAtlas", "Oxs_BoxAtlas", atlas()).unwrap();
        assert_eq!(r.auto_name("BoxAtlas"), "BoxAtlas_2");
        r.register("BoxAtlas_2", "Oxs_BoxAtlas", atlas()).unwrap();
        assert_eq!(r.auto_name("BoxAtlas"), "BoxAtlas_3");
    }

    #[test]
    fn first_evolver_respects_mode_and_order() {
        let r = setup_registry();
        assert_eq!(r.first_evolver(EvolverMode::Time), Some("RK"));
        assert_eq!(r.first_evolver(EvolverMode::Minimizing), Some("CG"));
        assert_eq!(r.first(EntityKind::Evolver), Some("RK"));
        assert_eq!(r.first(EntityKind::Mesh), None);
    }

    #[test]
    fn unused_lists_unreferenced_names() {
        let mut r = setup_registry();
        r.mark_used("RK");
        let unused: Vec<_> = r.unused(EntityKind::Evolver).collect();
        assert_eq!(unused, vec!["CG"]);
    }

    #[test]
    fn destinations_have_their_own_namespace() {
        let mut r = setup_registry();
        assert!(r.add_destination("Brick").is_ok());
        assert!(r.has_destination("Brick"));
        assert!(matches!(
            r.add_destination("Brick"),
            Err(Fault::DuplicateName { .. })
        ));
    }

    #[test]
    fn stage_counts_report_maximum() {
        let mut r = Registry::new();
        assert_eq!(r.max_stage_count(), None);
        r.record_stage_count(3);
        r.record_stage_count(11);
        r.record_stage_count(5);
        assert_eq!(r.max_stage_count(), Some(11));
    }

    #[test]
    fn scheduling_and_files_are_tracked() {
        let mut r = Registry::new();
        assert!(!r.is_scheduled());
        r.mark_scheduled();
        assert!(r.is_scheduled());
        r.reference_file("a.ovf");
        r.reference_file("a.ovf");
        assert_eq!(r.referenced_files().collect::<Vec<_>>(), vec!["a.ovf"]);
    }
}
