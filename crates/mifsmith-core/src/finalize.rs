//! Advisory checks run when a session closes cleanly.

use std::fmt;
use std::path::Path;

use crate::registry::{EntityKind, Registry};

/// A non-fatal condition worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// No entity of a mandatory top-level kind (evolver or driver) exists.
    NoneDeclared { kind: EntityKind },
    /// A declared name was never referenced.
    Unused { kind: EntityKind, name: String },
    /// A referenced file does not exist yet.
    MissingFile { path: String },
    /// No destination or no schedule entry was declared.
    NoOutput,
    /// A mesh was declared while others already existed.
    MultipleMeshes { name: String, existing: Vec<String> },
    /// An evolver was declared while others already existed.
    MultipleEvolvers { name: String, existing: Vec<String> },
    /// A driver has no stopping criterion at all.
    NoStoppingCriteria { driver: String },
    /// A script argument never appears in the script body.
    UnreferencedScriptArg { script: String, arg: String },
    /// A driver asked for more stages than any other block requires.
    StageCountExceeds { requested: u64, required: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoneDeclared { kind } => write!(f, "no {kind} defined"),
            Warning::Unused { kind, name } => {
                write!(f, "{kind} '{name}' declared, but never used")
            }
            Warning::MissingFile { path } => write!(
                f,
                "uses file {path} which could not be located; be sure to move it into position"
            ),
            Warning::NoOutput => f.write_str("simulation has not configured any output"),
            Warning::MultipleMeshes { name, existing } => write!(
                f,
                "defining mesh {name}, but have defined other meshes: [{}]",
                existing.join(", ")
            ),
            Warning::MultipleEvolvers { name, existing } => write!(
                f,
                "defining evolver {name}, but have defined other evolvers: [{}]",
                existing.join(", ")
            ),
            Warning::NoStoppingCriteria { driver } => write!(
                f,
                "driver {driver} specifies no stopping criteria; this is not technically an error"
            ),
            Warning::UnreferencedScriptArg { script, arg } => write!(
                f,
                "{arg} taken as argument of script {script} but never referenced"
            ),
            Warning::StageCountExceeds {
                requested,
                required,
            } => write!(
                f,
                "gave stage count {requested}, but the declared blocks require at most {required}"
            ),
        }
    }
}

/// Kinds whose declarations are expected to be referenced by something.
const TRACKED_KINDS: [EntityKind; 4] = [
    EntityKind::Atlas,
    EntityKind::VectorField,
    EntityKind::ScalarField,
    EntityKind::Evolver,
];

/// Inspects the final registry. Relative file references are resolved
/// against `base_dir`, the directory holding the output file.
pub fn finalize(registry: &Registry, base_dir: &Path) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for kind in [EntityKind::Evolver, EntityKind::Driver] {
        if registry.first(kind).is_none() {
            warnings.push(Warning::NoneDeclared { kind });
        }
    }

    for kind in TRACKED_KINDS {
        warnings.extend(registry.unused(kind).map(|name| Warning::Unused {
            kind,
            name: name.to_string(),
        }));
    }

    for file in registry.referenced_files() {
        let path = Path::new(file);
        let located = if path.is_absolute() {
            path.is_file()
        } else {
            base_dir.join(path).is_file()
        };
        if !located {
            warnings.push(Warning::MissingFile {
                path: file.to_string(),
            });
        }
    }

    if registry.destinations().next().is_none() || !registry.is_scheduled() {
        warnings.push(Warning::NoOutput);
    }

    warnings
}
