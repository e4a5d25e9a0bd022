//! Rectangular discretization of an atlas.

use serde::Deserialize;

use super::{Specify, require};
use crate::draft::Draft;
use crate::error::Fault;
use crate::finalize::Warning;
use crate::format::{format_number, triple};
use crate::geometry::{Axis, evenly_divides};
use crate::registry::{Entity, EntityKind};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RectangularMesh {
    /// Cell edge lengths along x, y and z.
    pub cellsize: Option<(f64, f64, f64)>,
    pub atlas: Option<String>,
}

impl Specify for RectangularMesh {
    fn class(&self) -> &'static str {
        "Oxs_RectangularMesh"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let cellsize = *require("cellsize", &self.cellsize)?;
        let atlas = require("atlas", &self.atlas)?;
        let (extent, _) = d.atlas("atlas", atlas)?;

        let steps = [cellsize.0, cellsize.1, cellsize.2];
        for (axis, step) in Axis::ALL.into_iter().zip(steps) {
            let parameter = format!("{axis}step");
            if step <= 0.0 {
                return Err(Fault::validation(
                    &parameter,
                    format!("{} is not a positive cell size", format_number(step)),
                ));
            }
            let span = extent.span(axis);
            if !evenly_divides(span, step) {
                return Err(Fault::validation(
                    &parameter,
                    format!(
                        "{} does not evenly divide atlas {axis} size {}",
                        format_number(step),
                        format_number(span)
                    ),
                ));
            }
        }

        let existing: Vec<String> = d
            .registry()
            .names(EntityKind::Mesh)
            .map(str::to_string)
            .collect();
        if !existing.is_empty() {
            d.warn(Warning::MultipleMeshes {
                name: d.name().to_string(),
                existing,
            });
        }

        d.line(format!("cellsize {}", triple(cellsize)));
        d.line(format!("atlas {atlas}"));
        d.register(Entity::Mesh {
            atlas: atlas.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::test_utils::{commit, setup_registry};

    fn mesh(step: f64) -> RectangularMesh {
        RectangularMesh {
            cellsize: Some((step, step, step)),
            atlas: Some("Brick".into()),
        }
    }

    #[test]
    fn divisible_cellsize_is_written() {
        let mut r = setup_registry();
        let out = commit(&mut r, "mesh", &mesh(4e-9)).unwrap();
        assert_eq!(out.lines, ["    cellsize { 4e-09 4e-09 4e-09 }", "    atlas Brick"]);
        assert!(out.warnings.is_empty());
        assert!(r.is_used("Brick"));
        assert_eq!(r.first(EntityKind::Mesh), Some("mesh"));
    }

    #[test]
    fn indivisible_cellsize_names_the_axis() {
        let mut r = setup_registry();
        match commit(&mut r, "mesh", &mesh(3e-9)) {
            Err(Fault::Validation { parameter, reason }) => {
                assert_eq!(parameter, "xstep");
                assert!(reason.contains("does not evenly divide atlas x size"), "got: {reason}");
            }
            other => panic!("expected Validation, got: {other:?}"),
        }
        assert!(!r.is_reserved("mesh"));
        assert!(!r.is_used("Brick"));
    }

    #[test]
    fn z_axis_is_checked_separately() {
        let mut r = setup_registry();
        let m = RectangularMesh {
            cellsize: Some((5e-9, 5e-9, 5e-9)),
            atlas: Some("Brick".into()),
        };
        let fault = commit(&mut r, "mesh", &m).unwrap_err();
        assert_eq!(fault.parameter(), "zstep");
    }

    #[test]
    fn non_positive_cellsize_is_rejected() {
        let mut r = setup_registry();
        let fault = commit(&mut r, "mesh", &mesh(0.0)).unwrap_err();
        assert!(matches!(fault, Fault::Validation { .. }));
        assert_eq!(fault.parameter(), "xstep");
    }

    #[test]
    fn unknown_atlas_is_undefined_reference() {
        let mut r = Registry::new();
        let fault = commit(&mut r, "mesh", &mesh(4e-9)).unwrap_err();
        assert!(matches!(fault, Fault::UndefinedReference { .. }));
        assert_eq!(commit(&mut r, "m", &RectangularMesh::default()).unwrap_err(), Fault::missing("cellsize"));
    }

    #[test]
    fn second_mesh_warns() {
        let mut r = setup_registry();
        commit(&mut r, "coarse", &mesh(4e-9)).unwrap();
        let out = commit(&mut r, "fine", &mesh(2e-9)).unwrap();
        assert_eq!(
            out.warnings,
            vec![Warning::MultipleMeshes {
                name: "fine".into(),
                existing: vec!["coarse".into()]
            }]
        );
    }
}
