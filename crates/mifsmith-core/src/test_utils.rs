//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so downstream
//! crates can reach them through the `test-utils` feature.

use std::fs;
use std::path::{Path, PathBuf};

use crate::blocks::Specify;
use crate::blocks::atlas::BoxAtlas;
use crate::blocks::evolver::{EulerEvolve, RungeKuttaEvolve};
use crate::blocks::scalar_field::UniformScalarField;
use crate::blocks::vector_field::UniformVectorField;
use crate::draft::Draft;
use crate::error::Fault;
use crate::finalize::Warning;
use crate::registry::Registry;

// ===========================================================================
// Filesystem
// ===========================================================================

/// Creates a fresh directory under the system temp dir, unique per test
/// and process.
pub fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mifsmith_test_{suffix}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

// ===========================================================================
// Block constructors
// ===========================================================================

/// A 100 nm x 100 nm x 12 nm box.
pub fn brick() -> BoxAtlas {
    BoxAtlas {
        xrange: Some((0.0, 100e-9)),
        yrange: Some((0.0, 100e-9)),
        zrange: Some((0.0, 12e-9)),
    }
}

pub fn uniform_ms(value: f64) -> UniformScalarField {
    UniformScalarField { value: Some(value) }
}

pub fn uniform_m0(vector: (f64, f64, f64)) -> UniformVectorField {
    UniformVectorField {
        vector: Some(vector),
        norm: None,
    }
}

/// A Runge-Kutta evolver with the usual damping of 0.5.
pub fn rk_evolver() -> RungeKuttaEvolve {
    RungeKuttaEvolve {
        base: EulerEvolve {
            alpha: Some(0.5),
            ..EulerEvolve::default()
        },
        ..RungeKuttaEvolve::default()
    }
}

// ===========================================================================
// Registry-level drafting
// ===========================================================================

/// Output of a block drafted and committed straight against a registry.
#[derive(Debug)]
pub struct Drafted {
    pub lines: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Drafts `spec` as `name` and applies its effects on success, without a
/// session or output file.
pub fn commit(registry: &mut Registry, name: &str, spec: &dyn Specify) -> Result<Drafted, Fault> {
    if spec.layout().named {
        registry.reserve(name)?;
    }
    let committed = {
        let mut draft = Draft::new(registry, spec.class(), name.to_string(), "test");
        spec.draft(&mut draft)?;
        draft.into_committed()
    };
    registry.apply(name, spec.class(), committed.effects);
    Ok(Drafted {
        lines: committed.lines,
        warnings: committed.warnings,
    })
}

/// A registry holding `Brick`, `Ms` and `m0`.
pub fn setup_registry() -> Registry {
    let mut r = Registry::new();
    commit(&mut r, "Brick", &brick()).unwrap();
    commit(&mut r, "Ms", &uniform_ms(8e5)).unwrap();
    commit(&mut r, "m0", &uniform_m0((1.0, 0.0, 0.0))).unwrap();
    r
}
