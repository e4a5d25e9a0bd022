//! Energy terms. They reserve a name but nothing ever refers to them.

use serde::Deserialize;

use super::{Keyword, ScalarParam, Specify, StageArg, VectorParam, require, require_list, stage_args};
use crate::draft::Draft;
use crate::error::Fault;
use crate::format::{column_width, format_number, scientific, significant_digits};
use crate::registry::Entity;

/// One applied-field sweep: start `(x, y, z)`, end `(X, Y, Z)` and the
/// number of steps between them.
pub type FieldSweep = (f64, f64, f64, f64, f64, f64, u64);

/// A pair of regions with the exchange coefficient between them.
pub type RegionCoupling = (String, String, f64);

fn multiplier_line(d: &mut Draft<'_>, multiplier: Option<f64>) {
    d.line(format!("multiplier {}", format_number(multiplier.unwrap_or(1.0))));
}

fn stage_count_line(d: &mut Draft<'_>, stage_count: Option<u64>) {
    if let Some(n) = stage_count {
        d.line(format!("stage_count {n}"));
        if n > 0 {
            d.stage_count(n);
        }
    }
}

/// Exactly one of two mutually exclusive options, with the name of the one
/// that was given.
fn one_of<'a, T: ?Sized>(
    a: (&'static str, Option<&'a T>),
    b: (&'static str, Option<&'a T>),
) -> Result<(&'static str, &'a T), Fault> {
    match (a.1, b.1) {
        (Some(_), Some(_)) => Err(Fault::validation(
            &format!("{}, {}", a.0, b.0),
            format!("specify only one of {} and {}", a.0, b.0),
        )),
        (None, None) => Err(Fault::missing(&format!("{} or {}", a.0, b.0))),
        (Some(v), None) => Ok((a.0, v)),
        (None, Some(v)) => Ok((b.0, v)),
    }
}

// ---------------------------------------------------------------------------
// Anisotropy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UniaxialAnisotropy {
    #[serde(rename = "K1")]
    pub k1: Option<ScalarParam>,
    pub axis: Option<VectorParam>,
}

impl Specify for UniaxialAnisotropy {
    fn class(&self) -> &'static str {
        "Oxs_UniaxialAnisotropy"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let k1 = require("K1", &self.k1)?.render(d, "K1")?;
        let axis = require("axis", &self.axis)?.render(d, "axis")?;
        d.line(format!("K1 {k1}"));
        d.line(format!("axis {axis}"));
        d.register(Entity::Energy);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CubicAnisotropy {
    #[serde(rename = "K1")]
    pub k1: Option<ScalarParam>,
    pub axis1: Option<VectorParam>,
    pub axis2: Option<VectorParam>,
}

impl Specify for CubicAnisotropy {
    fn class(&self) -> &'static str {
        "Oxs_CubicAnisotropy"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let k1 = require("K1", &self.k1)?.render(d, "K1")?;
        let axis1 = require("axis1", &self.axis1)?.render(d, "axis1")?;
        let axis2 = require("axis2", &self.axis2)?.render(d, "axis2")?;
        d.line(format!("K1 {k1}"));
        d.line(format!("axis1 {axis1}"));
        d.line(format!("axis2 {axis2}"));
        d.register(Entity::Energy);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

/// Six-neighbour exchange with per-region-pair coefficients, given either as
/// exchange constants (`A`) or exchange lengths (`lex`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Exchange6Ngbr {
    pub atlas: Option<String>,
    #[serde(rename = "A")]
    pub a: Vec<RegionCoupling>,
    pub lex: Vec<RegionCoupling>,
    #[serde(rename = "default_A")]
    pub default_a: Option<f64>,
    pub default_lex: Option<f64>,
    /// Fallback for whichever of `default_A`/`default_lex` applies.
    pub default: Option<f64>,
}

impl Specify for Exchange6Ngbr {
    fn class(&self) -> &'static str {
        "Oxs_Exchange6Ngbr"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let atlas = require("atlas", &self.atlas)?;
        let (kind, table) = one_of(
            ("A", (!self.a.is_empty()).then_some(&self.a)),
            ("lex", (!self.lex.is_empty()).then_some(&self.lex)),
        )?;
        let specific = if kind == "A" { self.default_a } else { self.default_lex };
        let default = specific
            .or(self.default)
            .ok_or_else(|| Fault::missing(&format!("default_{kind}")))?;

        d.atlas("atlas", atlas)?;
        for (first, second, _) in table {
            d.region(kind, atlas, first)?;
            d.region(kind, atlas, second)?;
        }

        d.line(format!("default_{kind} {}", format_number(default)));
        d.line(format!("atlas {atlas}"));
        d.line(format!("{kind} {{"));
        let width = column_width(
            table
                .iter()
                .flat_map(|(first, second, _)| [first.as_str(), second.as_str()]),
        );
        for (first, second, value) in table {
            d.indented(
                2,
                format!("{first:<width$} {second:<width$} {}", format_number(*value)),
            );
        }
        d.line("}");
        d.register(Entity::Energy);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UniformExchange {
    #[serde(rename = "A")]
    pub a: Option<f64>,
    pub lex: Option<f64>,
}

impl Specify for UniformExchange {
    fn class(&self) -> &'static str {
        "Oxs_UniformExchange"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let (kind, value) = one_of(("A", self.a.as_ref()), ("lex", self.lex.as_ref()))?;
        d.line(format!("{kind} {}", format_number(*value)));
        d.register(Entity::Energy);
        Ok(())
    }
}

/// Exchange with a spatially varying constant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExchangePtwise {
    /// Name of a scalar field.
    #[serde(rename = "A")]
    pub a: Option<String>,
}

impl Specify for ExchangePtwise {
    fn class(&self) -> &'static str {
        "Oxs_ExchangePtwise"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let a = require("A", &self.a)?;
        d.scalar_field("A", a)?;
        d.line(format!("A {a}"));
        d.register(Entity::Energy);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RandomSiteExchange {
    pub linkprob: Option<f64>,
    #[serde(rename = "Amin")]
    pub a_min: Option<f64>,
    #[serde(rename = "Amax")]
    pub a_max: Option<f64>,
}

impl Specify for RandomSiteExchange {
    fn class(&self) -> &'static str {
        "Oxs_RandomSiteExchange"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let linkprob = *require("linkprob", &self.linkprob)?;
        if !(0.0..=1.0).contains(&linkprob) {
            return Err(Fault::validation(
                "linkprob",
                format!("{} is not between 0 and 1", format_number(linkprob)),
            ));
        }
        let a_min = *require("Amin", &self.a_min)?;
        let a_max = *require("Amax", &self.a_max)?;
        d.line(format!("linkprob {}", format_number(linkprob)));
        d.line(format!("Amin {}", format_number(a_min)));
        d.line(format!("Amax {}", format_number(a_max)));
        d.register(Entity::Energy);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Demagnetization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demag {}

impl Specify for Demag {
    fn class(&self) -> &'static str {
        "Oxs_Demag"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        d.register(Entity::Energy);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimpleDemag {}

impl Specify for SimpleDemag {
    fn class(&self) -> &'static str {
        "Oxs_SimpleDemag"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        d.register(Entity::Energy);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Applied fields
// ---------------------------------------------------------------------------

/// Uniform applied field stepped through a list of sweeps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UZeeman {
    #[serde(rename = "Hrange")]
    pub h_range: Vec<FieldSweep>,
    pub multiplier: Option<f64>,
}

impl Specify for UZeeman {
    fn class(&self) -> &'static str {
        "Oxs_UZeeman"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let sweeps = require_list("Hrange", &self.h_range)?;
        let values: Vec<f64> = sweeps
            .iter()
            .flat_map(|s| [s.0, s.1, s.2, s.3, s.4, s.5])
            .collect();
        let digits = significant_digits(&values);

        let stages = sweeps
            .iter()
            .try_fold(0u64, |total, s| total.checked_add(s.6))
            .ok_or_else(|| Fault::validation("Hrange", "total step count does not fit in 64 bits"))?;

        multiplier_line(d, self.multiplier);
        d.line("Hrange {");
        for s in sweeps {
            let ends: Vec<String> = [s.0, s.1, s.2, s.3, s.4, s.5]
                .into_iter()
                .map(|v| scientific(v, digits))
                .collect();
            d.indented(2, format!("{{ {} {} }}", ends.join(" "), s.6));
        }
        d.line("}");

        if stages > 0 {
            d.stage_count(stages);
        }
        d.register(Entity::Energy);
        Ok(())
    }
}

/// A constant applied field taken from a vector field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixedZeeman {
    pub field: Option<String>,
    pub multiplier: Option<f64>,
}

impl Specify for FixedZeeman {
    fn class(&self) -> &'static str {
        "Oxs_FixedZeeman"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        d.vector_field("field", field)?;
        d.line(format!("field {field}"));
        multiplier_line(d, self.multiplier);
        d.register(Entity::Energy);
        Ok(())
    }
}

/// Uniform applied field computed by a script of the stage and time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptUZeeman {
    pub script: Option<String>,
    pub script_args: Option<Vec<StageArg>>,
    pub multiplier: Option<f64>,
    pub stage_count: Option<u64>,
}

impl Specify for ScriptUZeeman {
    fn class(&self) -> &'static str {
        "Oxs_ScriptUZeeman"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let script = require("script", &self.script)?;
        d.script("script", script)?;
        stage_args(d, "script_args", &self.script_args)?;
        d.line(format!("script {script}"));
        multiplier_line(d, self.multiplier);
        stage_count_line(d, self.stage_count);
        d.register(Entity::Energy);
        Ok(())
    }
}

/// Shape of the matrix a transform script returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformType {
    Identity,
    Diagonal,
    Symmetric,
    General,
}

impl Keyword for TransformType {
    fn as_str(&self) -> &'static str {
        match self {
            TransformType::Identity => "identity",
            TransformType::Diagonal => "diagonal",
            TransformType::Symmetric => "symmetric",
            TransformType::General => "general",
        }
    }
}

/// A vector field transformed over time by a script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransformZeeman {
    pub field: Option<String>,
    pub script: Option<String>,
    pub script_args: Option<Vec<StageArg>>,
    #[serde(rename = "type")]
    pub kind: Option<TransformType>,
    pub multiplier: Option<f64>,
    pub stage_count: Option<u64>,
}

impl Specify for TransformZeeman {
    fn class(&self) -> &'static str {
        "Oxs_TransformZeeman"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let script = require("script", &self.script)?;
        let kind = require("type", &self.kind)?;
        d.vector_field("field", field)?;
        d.script("script", script)?;

        d.line(format!("field {field}"));
        d.line(format!("script {script}"));
        stage_args(d, "script_args", &self.script_args)?;
        d.line(format!("type {}", kind.as_str()));
        multiplier_line(d, self.multiplier);
        stage_count_line(d, self.stage_count);
        d.register(Entity::Energy);
        Ok(())
    }
}

/// Applied field replaced at each stage, from a script or a list of files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageZeeman {
    pub script: Option<String>,
    pub files: Vec<String>,
    pub multiplier: Option<f64>,
    pub stage_count: Option<u64>,
}

impl Specify for StageZeeman {
    fn class(&self) -> &'static str {
        "Oxs_StageZeeman"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        match (&self.script, self.files.is_empty()) {
            (Some(_), false) => {
                return Err(Fault::validation(
                    "script, files",
                    "specify only one of script and files",
                ));
            }
            (None, true) => return Err(Fault::missing("script or files")),
            (Some(script), true) => {
                d.script("script", script)?;
                d.line(format!("script {script}"));
            }
            (None, false) => {
                d.line("files {");
                for file in &self.files {
                    let file = file.replace('\\', "/");
                    d.indented(2, &file);
                    d.reference_file(&file);
                }
                d.line("}");
            }
        }
        stage_count_line(d, self.stage_count);
        multiplier_line(d, self.multiplier);
        d.register(Entity::Energy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::atlas::ScriptAtlas;
    use crate::blocks::script::Proc;
    use crate::registry::{EntityKind, Registry};
    use crate::test_utils::{commit, setup_registry};

    fn with_regions() -> Registry {
        let mut r = setup_registry();
        commit(
            &mut r,
            "layers",
            &Proc {
                args: vec!["x".into(), "y".into(), "z".into()],
                lines: vec!["if {$z < 0.5} { return 1 }".into(), "return 2".into()],
            },
        )
        .unwrap();
        commit(
            &mut r,
            "Stack",
            &ScriptAtlas {
                xrange: Some((0.0, 1e-7)),
                yrange: Some((0.0, 1e-7)),
                zrange: Some((0.0, 1e-8)),
                regions: vec!["bottom".into(), "top".into()],
                script: Some("layers".into()),
                script_args: None,
            },
        )
        .unwrap();
        r
    }

    fn ramp() -> Proc {
        Proc {
            args: vec!["stage".into(), "stage_time".into(), "total_time".into()],
            lines: vec![
                "set t [expr {$total_time + $stage + $stage_time}]".into(),
                "return [list $t 0 0 1 0 0 0 0 0]".into(),
            ],
        }
    }

    #[test]
    fn uniaxial_accepts_literals_and_fields() {
        let mut r = setup_registry();
        let anis = UniaxialAnisotropy {
            k1: Some(5.2e5.into()),
            axis: Some((0.0, 0.0, 1.0).into()),
        };
        let out = commit(&mut r, "anis", &anis).unwrap();
        assert_eq!(out.lines, ["    K1 520000.0", "    axis { 0.0 0.0 1.0 }"]);

        let anis = UniaxialAnisotropy {
            k1: Some("Ms".into()),
            axis: Some("m0".into()),
        };
        let out = commit(&mut r, "anis2", &anis).unwrap();
        assert_eq!(out.lines, ["    K1 Ms", "    axis m0"]);
        assert!(r.is_used("Ms") && r.is_used("m0"));
        assert_eq!(r.first(EntityKind::Energy), Some("anis"));
    }

    #[test]
    fn cubic_anisotropy_checks_both_axes() {
        let mut r = setup_registry();
        let anis = CubicAnisotropy {
            k1: Some((-1e4).into()),
            axis1: Some((1.0, 0.0, 0.0).into()),
            axis2: Some("nope".into()),
        };
        match commit(&mut r, "cubic", &anis) {
            Err(Fault::UndefinedReference { parameter, .. }) => assert_eq!(parameter, "axis2"),
            other => panic!("expected UndefinedReference, got: {other:?}"),
        }
        let anis = CubicAnisotropy {
            axis2: Some((0.0, 1.0, 0.0).into()),
            ..anis
        };
        let out = commit(&mut r, "cubic", &anis).unwrap();
        assert_eq!(out.lines[2], "    axis2 { 0.0 1.0 0.0 }");
    }

    #[test]
    fn exchange6ngbr_writes_aligned_table() {
        let mut r = with_regions();
        let ex = Exchange6Ngbr {
            atlas: Some("Stack".into()),
            a: vec![
                ("bottom".into(), "bottom".into(), 13e-12),
                ("top".into(), "bottom".into(), 1e-12),
            ],
            default: Some(0.0),
            ..Exchange6Ngbr::default()
        };
        let out = commit(&mut r, "ex", &ex).unwrap();
        assert_eq!(
            out.lines,
            [
                "    default_A 0.0",
                "    atlas Stack",
                "    A {",
                "        bottom bottom 1.3e-11",
                "        top    bottom 1e-12",
                "    }"
            ]
        );
        assert!(r.is_used("Stack"));
    }

    #[test]
    fn exchange6ngbr_rejects_foreign_regions() {
        let mut r = with_regions();
        let ex = Exchange6Ngbr {
            atlas: Some("Stack".into()),
            lex: vec![("bottom".into(), "middle".into(), 5e-9)],
            default_lex: Some(1e-9),
            ..Exchange6Ngbr::default()
        };
        match commit(&mut r, "ex", &ex) {
            Err(Fault::UndefinedReference { value, valid, .. }) => {
                assert_eq!(value, "middle");
                assert_eq!(valid, ["bottom", "top"]);
            }
            other => panic!("expected UndefinedReference, got: {other:?}"),
        }
    }

    #[test]
    fn exchange6ngbr_needs_exactly_one_table_and_a_default() {
        let mut r = with_regions();
        let row = || vec![("top".to_string(), "top".to_string(), 1e-11)];
        let both = Exchange6Ngbr {
            atlas: Some("Stack".into()),
            a: row(),
            lex: row(),
            default: Some(0.0),
            ..Exchange6Ngbr::default()
        };
        assert!(matches!(commit(&mut r, "ex", &both), Err(Fault::Validation { .. })));

        let neither = Exchange6Ngbr {
            atlas: Some("Stack".into()),
            default: Some(0.0),
            ..Exchange6Ngbr::default()
        };
        assert!(matches!(commit(&mut r, "ex", &neither), Err(Fault::Configuration { .. })));

        let no_default = Exchange6Ngbr {
            atlas: Some("Stack".into()),
            a: row(),
            ..Exchange6Ngbr::default()
        };
        assert_eq!(commit(&mut r, "ex", &no_default).unwrap_err(), Fault::missing("default_A"));
    }

    #[test]
    fn uniform_exchange_takes_a_or_lex() {
        let mut r = Registry::new();
        let out = commit(&mut r, "ex", &UniformExchange { a: Some(13e-12), lex: None }).unwrap();
        assert_eq!(out.lines, ["    A 1.3e-11"]);
        let out = commit(&mut r, "ex2", &UniformExchange { a: None, lex: Some(5e-9) }).unwrap();
        assert_eq!(out.lines, ["    lex 5e-09"]);
        assert!(commit(&mut r, "ex3", &UniformExchange::default()).is_err());
    }

    #[test]
    fn exchange_ptwise_needs_scalar_field() {
        let mut r = setup_registry();
        assert!(commit(&mut r, "ex", &ExchangePtwise { a: Some("m0".into()) }).is_err());
        let out = commit(&mut r, "ex", &ExchangePtwise { a: Some("Ms".into()) }).unwrap();
        assert_eq!(out.lines, ["    A Ms"]);
    }

    #[test]
    fn random_site_exchange_bounds_linkprob() {
        let mut r = Registry::new();
        let ex = RandomSiteExchange {
            linkprob: Some(1.5),
            a_min: Some(1e-11),
            a_max: Some(2e-11),
        };
        let fault = commit(&mut r, "rse", &ex).unwrap_err();
        assert_eq!(fault.parameter(), "linkprob");
        let ex = RandomSiteExchange {
            linkprob: Some(0.1),
            ..ex
        };
        let out = commit(&mut r, "rse", &ex).unwrap();
        assert_eq!(out.lines, ["    linkprob 0.1", "    Amin 1e-11", "    Amax 2e-11"]);
    }

    #[test]
    fn demag_has_empty_body() {
        let mut r = Registry::new();
        assert!(commit(&mut r, "Demag", &Demag {}).unwrap().lines.is_empty());
        assert!(commit(&mut r, "Simple", &SimpleDemag {}).unwrap().lines.is_empty());
        assert_eq!(r.count(EntityKind::Energy), 2);
    }

    #[test]
    fn uzeeman_writes_sweeps_and_records_stages() {
        let mut r = Registry::new();
        let z = UZeeman {
            h_range: vec![
                (0.0, 0.0, 0.0, 1e5, 0.0, 0.0, 4),
                (1e5, 0.0, 0.0, -1e5, 0.0, 0.0, 6),
            ],
            multiplier: None,
        };
        let out = commit(&mut r, "zeeman", &z).unwrap();
        assert_eq!(out.lines[0], "    multiplier 1.0");
        assert_eq!(
            out.lines[2],
            "        {  0.00e+00  0.00e+00  0.00e+00  1.00e+05  0.00e+00  0.00e+00 4 }"
        );
        assert_eq!(
            out.lines[3],
            "        {  1.00e+05  0.00e+00  0.00e+00 -1.00e+05  0.00e+00  0.00e+00 6 }"
        );
        assert_eq!(r.max_stage_count(), Some(10));
    }

    #[test]
    fn uzeeman_step_total_overflow_is_rejected() {
        let mut r = Registry::new();
        let z = UZeeman {
            h_range: vec![
                (0.0, 0.0, 0.0, 1e5, 0.0, 0.0, u64::MAX),
                (1e5, 0.0, 0.0, 0.0, 0.0, 0.0, 1),
            ],
            multiplier: None,
        };
        let fault = commit(&mut r, "zeeman", &z).unwrap_err();
        assert!(matches!(fault, Fault::Validation { .. }));
        assert_eq!(fault.parameter(), "Hrange");
        assert_eq!(r.max_stage_count(), None);
    }

    #[test]
    fn fixed_zeeman_resolves_field() {
        let mut r = setup_registry();
        let z = FixedZeeman {
            field: Some("m0".into()),
            multiplier: Some(795.77),
        };
        let out = commit(&mut r, "fz", &z).unwrap();
        assert_eq!(out.lines, ["    field m0", "    multiplier 795.77"]);
    }

    #[test]
    fn script_uzeeman_checks_script_and_arguments() {
        let mut r = Registry::new();
        let z = ScriptUZeeman {
            script: Some("ramp".into()),
            stage_count: Some(5),
            ..ScriptUZeeman::default()
        };
        assert!(matches!(
            commit(&mut r, "sz", &z),
            Err(Fault::UndefinedReference { .. })
        ));
        commit(&mut r, "ramp", &ramp()).unwrap();
        let out = commit(&mut r, "sz", &z).unwrap();
        assert_eq!(
            out.lines,
            [
                "    script_args { stage stage_time total_time }",
                "    script ramp",
                "    multiplier 1.0",
                "    stage_count 5"
            ]
        );
        assert_eq!(r.max_stage_count(), Some(5));

        let repeated = ScriptUZeeman {
            script_args: Some(vec![StageArg::Stage, StageArg::Stage]),
            ..z
        };
        assert!(matches!(
            commit(&mut r, "sz2", &repeated),
            Err(Fault::Validation { .. })
        ));
    }

    #[test]
    fn transform_zeeman_writes_type() {
        let mut r = setup_registry();
        commit(&mut r, "ramp", &ramp()).unwrap();
        let z = TransformZeeman {
            field: Some("m0".into()),
            script: Some("ramp".into()),
            script_args: Some(vec![StageArg::TotalTime]),
            kind: Some(TransformType::General),
            ..TransformZeeman::default()
        };
        let out = commit(&mut r, "tz", &z).unwrap();
        assert_eq!(
            out.lines,
            [
                "    field m0",
                "    script ramp",
                "    script_args { total_time }",
                "    type general",
                "    multiplier 1.0"
            ]
        );
        let untyped = TransformZeeman { kind: None, ..z };
        assert_eq!(commit(&mut r, "tz2", &untyped).unwrap_err(), Fault::missing("type"));
    }

    #[test]
    fn stage_zeeman_takes_script_or_files() {
        let mut r = Registry::new();
        let files = StageZeeman {
            files: vec!["fields\\h0.ovf".into(), "fields/h1.ovf".into()],
            stage_count: Some(2),
            ..StageZeeman::default()
        };
        let out = commit(&mut r, "stz", &files).unwrap();
        assert_eq!(
            out.lines,
            [
                "    files {",
                "        fields/h0.ovf",
                "        fields/h1.ovf",
                "    }",
                "    stage_count 2",
                "    multiplier 1.0"
            ]
        );
        assert_eq!(r.referenced_files().count(), 2);

        let both = StageZeeman {
            script: Some("ramp".into()),
            ..files
        };
        assert!(matches!(commit(&mut r, "stz2", &both), Err(Fault::Validation { .. })));
        assert!(matches!(
            commit(&mut r, "stz3", &StageZeeman::default()),
            Err(Fault::Configuration { .. })
        ));
    }
}
