//! In-progress construction of one block.
//!
//! A [`Draft`] only reads the registry. Everything a block wants to change
//! (its own registration, names it used, stage counts, files, destinations)
//! is queued as an effect and applied by the session once the block has
//! validated completely, so a rejected block leaves no trace behind.

use indexmap::IndexSet;

use crate::error::Fault;
use crate::finalize::Warning;
use crate::geometry::Extent;
use crate::registry::{Entity, EntityKind, EvolverMode, Registry};

const INDENT: &str = "    ";

/// A registry change deferred until the block commits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    Use(String),
    Register(Entity),
    Destination(String),
    Schedule,
    StageCount(u64),
    File(String),
}

pub struct Draft<'r> {
    registry: &'r Registry,
    class: &'static str,
    name: String,
    basename: &'r str,
    lines: Vec<String>,
    effects: Vec<Effect>,
    warnings: Vec<Warning>,
}

/// What a validated draft hands back to the session.
pub(crate) struct Committed {
    pub lines: Vec<String>,
    pub effects: Vec<Effect>,
    pub warnings: Vec<Warning>,
}

impl<'r> Draft<'r> {
    pub(crate) fn new(registry: &'r Registry, class: &'static str, name: String, basename: &'r str) -> Self {
        Self {
            registry,
            class,
            name,
            basename,
            lines: Vec::new(),
            effects: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Name of the block under construction; empty for directives.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output basename of the session.
    pub fn basename(&self) -> &'r str {
        self.basename
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// Appends a body line one level deep.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.indented(1, text);
    }

    /// Appends a line `depth` levels deep.
    pub fn indented(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", INDENT.repeat(depth), text.as_ref()));
    }

    /// Appends a line with no indentation.
    pub fn raw(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    /// Looks `name` up among entities of `kind` and queues it as used.
    pub fn reference(&mut self, parameter: &str, kind: EntityKind, name: &str) -> Result<&'r Entity, Fault> {
        let registry = self.registry;
        let entity = registry.lookup(parameter, kind, name)?;
        self.effects.push(Effect::Use(name.to_string()));
        Ok(entity)
    }

    /// Resolves an atlas, returning its extent and exposed regions.
    pub fn atlas(&mut self, parameter: &str, name: &str) -> Result<(Extent, &'r IndexSet<String>), Fault> {
        match self.reference(parameter, EntityKind::Atlas, name)? {
            Entity::Atlas { extent, regions } => Ok((*extent, regions)),
            _ => Err(Fault::validation(parameter, format!("'{name}' is not an atlas"))),
        }
    }

    /// Checks that `region` is exposed by the atlas `atlas`.
    pub fn region(&mut self, parameter: &str, atlas: &str, region: &str) -> Result<(), Fault> {
        let (_, regions) = self.atlas("atlas", atlas)?;
        if regions.contains(region) {
            return Ok(());
        }
        Err(Fault::UndefinedReference {
            parameter: parameter.to_string(),
            value: region.to_string(),
            expected_kind: format!("region of atlas {atlas}"),
            valid: regions.iter().cloned().collect(),
        })
    }

    pub fn scalar_field(&mut self, parameter: &str, name: &str) -> Result<(), Fault> {
        self.reference(parameter, EntityKind::ScalarField, name).map(|_| ())
    }

    pub fn vector_field(&mut self, parameter: &str, name: &str) -> Result<(), Fault> {
        self.reference(parameter, EntityKind::VectorField, name).map(|_| ())
    }

    pub fn mesh(&mut self, parameter: &str, name: &str) -> Result<(), Fault> {
        self.reference(parameter, EntityKind::Mesh, name).map(|_| ())
    }

    /// Resolves a script, returning its formal arguments.
    pub fn script(&mut self, parameter: &str, name: &str) -> Result<&'r [String], Fault> {
        match self.reference(parameter, EntityKind::Script, name)? {
            Entity::Script { args } => Ok(args),
            _ => Ok(&[]),
        }
    }

    /// Resolves an evolver, returning its mode.
    pub fn evolver(&mut self, parameter: &str, name: &str) -> Result<EvolverMode, Fault> {
        match self.reference(parameter, EntityKind::Evolver, name)? {
            Entity::Evolver { mode } => Ok(*mode),
            _ => Err(Fault::validation(parameter, format!("'{name}' is not an evolver"))),
        }
    }

    /// Checks that an output destination has been declared.
    pub fn destination(&mut self, parameter: &str, label: &str) -> Result<(), Fault> {
        if self.registry.has_destination(label) {
            return Ok(());
        }
        Err(Fault::UndefinedReference {
            parameter: parameter.to_string(),
            value: label.to_string(),
            expected_kind: "destination".to_string(),
            valid: self.registry.destinations().map(str::to_string).collect(),
        })
    }

    // -----------------------------------------------------------------------
    // Deferred effects
    // -----------------------------------------------------------------------

    /// Registers the block under its own name on commit.
    pub fn register(&mut self, entity: Entity) {
        self.effects.push(Effect::Register(entity));
    }

    /// Declares a new destination label on commit.
    pub fn add_destination(&mut self, label: &str) -> Result<(), Fault> {
        if self.registry.has_destination(label) {
            return Err(Fault::DuplicateName {
                name: label.to_string(),
            });
        }
        self.effects.push(Effect::Destination(label.to_string()));
        Ok(())
    }

    pub fn schedule(&mut self) {
        self.effects.push(Effect::Schedule);
    }

    pub fn stage_count(&mut self, stages: u64) {
        self.effects.push(Effect::StageCount(stages));
    }

    /// Records a file the simulator will need at run time.
    pub fn reference_file(&mut self, path: &str) {
        self.effects.push(Effect::File(path.to_string()));
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub(crate) fn into_committed(self) -> Committed {
        Committed {
            lines: self.lines,
            effects: self.effects,
            warnings: self.warnings,
        }
    }
}

impl Registry {
    /// Applies the queued effects of a validated block named `name`.
    ///
    /// The block must have been drafted against this registry as it is now:
    /// a name or destination label taken in between is a logic error and
    /// trips a debug assertion.
    pub(crate) fn apply(&mut self, name: &str, class: &'static str, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Use(used) => self.mark_used(&used),
                Effect::Register(entity) => {
                    let registered = self.register(name, class, entity);
                    debug_assert!(registered.is_ok(), "{name} already registered: {registered:?}");
                }
                Effect::Destination(label) => {
                    let added = self.add_destination(&label);
                    debug_assert!(added.is_ok(), "destination {label} already declared: {added:?}");
                }
                Effect::Schedule => self.mark_scheduled(),
                Effect::StageCount(stages) => self.record_stage_count(stages),
                Effect::File(path) => self.reference_file(&path),
            }
        }
    }
}
