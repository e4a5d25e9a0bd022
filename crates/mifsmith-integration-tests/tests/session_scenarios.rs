//! Integration test: whole sessions, from open to close.
//!
//! Builds the standard brick simulation block by block and checks the clean
//! close, the rollback on a bad cell size, and the fallback failures of a
//! driver declared too early.

use std::fs;
use std::path::Path;

use mifsmith_core::blocks::driver::{DriverSettings, TimeDriver};
use mifsmith_core::blocks::energy::{Demag, ExchangePtwise, UZeeman, UniformExchange};
use mifsmith_core::blocks::mesh::RectangularMesh;
use mifsmith_core::blocks::output::{Destination, DestinationType, Schedule};
use mifsmith_core::blocks::vector_field::RandomVectorField;
use mifsmith_core::blocks::Criterion;
use mifsmith_core::registry::EntityKind;
use mifsmith_core::session::Closed;
use mifsmith_core::test_utils::{brick, cleanup, make_test_dir, rk_evolver, uniform_ms};
use mifsmith_core::{Fault, MifError, Session, SessionConfig, Warning, write_simulation};

// ===========================================================================
// Helpers
// ===========================================================================

fn mesh(x: f64) -> RectangularMesh {
    RectangularMesh {
        cellsize: Some((x, 4e-9, 4e-9)),
        atlas: Some("Brick".into()),
    }
}

fn random_m0() -> RandomVectorField {
    RandomVectorField {
        min_norm: Some(1.0),
        max_norm: Some(1.0),
        cache_grid: None,
    }
}

fn driver() -> TimeDriver {
    TimeDriver {
        settings: DriverSettings {
            ms: Some("Ms".into()),
            m0: Some("m0".into()),
            ..DriverSettings::default()
        },
        stopping_dm_dt: Some(Criterion::Single(0.01)),
        ..TimeDriver::default()
    }
}

fn table() -> Destination {
    Destination {
        label: Some("table".into()),
        kind: Some(DestinationType::MmDataTable),
        new: false,
    }
}

fn every_stage() -> Schedule {
    Schedule {
        output: Some("DataTable".into()),
        label: Some("table".into()),
        stage: Some(1),
        step: None,
    }
}

/// Declares the standard brick simulation with the given x cell size.
fn build(session: &mut Session, cell_x: f64) -> Result<(), MifError> {
    session.declare_named("Brick", &brick())?;
    session.declare(&mesh(cell_x))?;
    session.declare_named("Ms", &uniform_ms(8e5))?;
    session.declare_named("m0", &random_m0())?;
    session.declare(&UniformExchange {
        a: Some(1.3e-11),
        lex: None,
    })?;
    session.declare(&Demag {})?;
    session.declare(&rk_evolver())?;
    session.declare(&driver())?;
    session.declare(&table())?;
    session.declare(&every_stage())?;
    Ok(())
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn clean_run_closes_ok_without_output_warning() {
    let dir = make_test_dir("it_clean");
    let target = dir.join("sims/brick.mif");

    let mut session = Session::open(SessionConfig::new(&target)).unwrap();
    build(&mut session, 4e-9).unwrap();
    let report = match session.close() {
        Closed::Completed(report) => report,
        other => panic!("expected Completed, got: {other:?}"),
    };
    assert!(!report.warnings.contains(&Warning::NoOutput));
    assert!(!report.warnings.iter().any(|w| matches!(w, Warning::NoneDeclared { .. })));

    let text = fs::read_to_string(&target).unwrap();
    assert!(text.starts_with("# MIF 2.1\n# Generated by mifsmith at "));
    assert!(text.contains(
        "Specify Oxs_BoxAtlas:Brick {\n    xrange {  0.00e+00  1.00e-07 }\n    yrange {  0.00e+00  1.00e-07 }\n    zrange {  0.00e+00  1.20e-08 }\n}\n\n\n"
    ));
    assert!(text.contains("Specify Oxs_RectangularMesh:RectangularMesh {\n    cellsize { 4e-09 4e-09 4e-09 }\n    atlas Brick\n}"));
    assert!(text.contains("Specify Oxs_TimeDriver:TimeDriver {\n    evolver RungeKuttaEvolve\n    mesh RectangularMesh\n    Ms Ms\n    m0 m0\n    basename brick\n"));
    assert!(text.ends_with("\n\n\nDestination table mmDataTable\nSchedule DataTable table Stage 1\n"));
    cleanup(&dir);
}

#[test]
fn indivisible_cellsize_rolls_back() {
    let dir = make_test_dir("it_indivisible");
    let target = dir.join("brick.mif");

    let mut session = Session::open(SessionConfig::new(&target)).unwrap();
    let err = build(&mut session, 3e-9).unwrap_err();
    match &err {
        MifError::Block { class, fault, .. } => {
            assert_eq!(*class, "Oxs_RectangularMesh");
            assert!(matches!(fault, Fault::Validation { .. }));
            assert_eq!(fault.parameter(), "xstep");
        }
        other => panic!("expected a block error, got: {other:?}"),
    }
    assert!(!target.exists());

    // Later declarations are silent no-ops on the failed session.
    assert_eq!(session.declare(&Demag {}).unwrap(), None);
    assert!(!target.exists());
    assert!(matches!(session.close(), Closed::Failed { .. }));
    cleanup(&dir);
}

#[test]
fn driver_before_evolver_or_mesh() {
    let dir = make_test_dir("it_early_driver");

    let target = dir.join("no_evolver.mif");
    let err = write_simulation(SessionConfig::new(&target), |s| {
        s.declare_named("Brick", &brick())?;
        s.declare(&mesh(4e-9))?;
        s.declare_named("Ms", &uniform_ms(8e5))?;
        s.declare_named("m0", &random_m0())?;
        s.declare(&driver())?;
        Ok(())
    })
    .unwrap_err();
    assert_eq!(
        err.fault(),
        Some(&Fault::configuration("evolver", "no evolvers declared"))
    );
    assert!(!target.exists());

    let target = dir.join("no_mesh.mif");
    let err = write_simulation(SessionConfig::new(&target), |s| {
        s.declare_named("Ms", &uniform_ms(8e5))?;
        s.declare_named("m0", &random_m0())?;
        s.declare(&rk_evolver())?;
        s.declare(&driver())?;
        Ok(())
    })
    .unwrap_err();
    assert_eq!(
        err.fault(),
        Some(&Fault::configuration("mesh", "no meshes declared"))
    );
    assert!(!target.exists());
    cleanup(&dir);
}

#[test]
fn wrong_kind_reference_is_undefined() {
    let dir = make_test_dir("it_wrong_kind");
    let target = dir.join("wrong.mif");
    let err = write_simulation(SessionConfig::new(&target), |s| {
        s.declare_named("Brick", &brick())?;
        s.declare(&ExchangePtwise {
            a: Some("Brick".into()),
        })?;
        Ok(())
    })
    .unwrap_err();
    match err.fault() {
        Some(Fault::UndefinedReference { value, valid, .. }) => {
            assert_eq!(value, "Brick");
            assert!(valid.is_empty());
        }
        other => panic!("expected UndefinedReference, got: {other:?}"),
    }
    assert!(!target.exists());
    cleanup(&dir);
}

#[test]
fn names_are_scoped_to_their_session() {
    let dir = make_test_dir("it_scoped_names");
    let mut first = Session::open(SessionConfig::new(dir.join("a.mif"))).unwrap();
    let mut second = Session::open(SessionConfig::new(dir.join("b.mif"))).unwrap();
    first.declare_named("Brick", &brick()).unwrap();
    second.declare_named("Brick", &brick()).unwrap();

    let err = first.declare_named("Brick", &brick()).unwrap_err();
    assert!(matches!(err.fault(), Some(Fault::DuplicateName { .. })));
    assert!(!dir.join("a.mif").exists());
    assert!(dir.join("b.mif").exists());
    assert!(matches!(second.close(), Closed::Completed(_)));
    cleanup(&dir);
}

#[test]
fn finalizer_reports_unused_and_missing_files() {
    let dir = make_test_dir("it_finalize");
    let target = dir.join("sparse.mif");
    let report = write_simulation(SessionConfig::new(&target), |s| {
        s.declare_named("Brick", &brick())?;
        s.declare_named("Spare", &brick())?;
        s.declare(&mesh(4e-9))?;
        s.declare_named(
            "loaded",
            &mifsmith_core::blocks::vector_field::FileVectorField {
                file: Some("missing.omf".into()),
                atlas: Some("Brick".into()),
                ..Default::default()
            },
        )?;
        Ok(())
    })
    .unwrap();

    let w = &report.warnings;
    assert!(w.contains(&Warning::Unused {
        kind: EntityKind::Atlas,
        name: "Spare".into()
    }));
    assert!(w.contains(&Warning::MissingFile {
        path: "missing.omf".into()
    }));
    assert!(w.contains(&Warning::NoneDeclared {
        kind: EntityKind::Evolver
    }));
    assert!(w.contains(&Warning::NoOutput));
    assert!(Path::new(&target).is_file());
    cleanup(&dir);
}

#[test]
fn stage_count_check_against_field_sweeps() {
    let dir = make_test_dir("it_stage_count");
    let sweep = UZeeman {
        h_range: vec![(0.0, 0.0, 0.0, 1e5, 0.0, 0.0, 10), (1e5, 0.0, 0.0, 0.0, 0.0, 0.0, 10)],
        multiplier: None,
    };
    let checked = |stage_count| TimeDriver {
        settings: DriverSettings {
            stage_count: Some(stage_count),
            stage_count_check: true,
            ..driver().settings
        },
        ..driver()
    };

    let run = |name: &str, stage_count: u64| {
        write_simulation(SessionConfig::new(dir.join(name)), |s| {
            s.declare_named("Brick", &brick())?;
            s.declare(&mesh(4e-9))?;
            s.declare_named("Ms", &uniform_ms(8e5))?;
            s.declare_named("m0", &random_m0())?;
            s.declare(&sweep)?;
            s.declare(&rk_evolver())?;
            s.declare(&checked(stage_count))?;
            Ok(())
        })
    };

    let err = run("short.mif", 5).unwrap_err();
    assert_eq!(err.fault().map(Fault::parameter), Some("stage_count"));

    let report = run("long.mif", 40).unwrap();
    assert!(report.warnings.contains(&Warning::StageCountExceeds {
        requested: 40,
        required: 20
    }));
    cleanup(&dir);
}
