//! Block kinds and the parameter types they share.
//!
//! Every kind is a plain configuration struct implementing [`Specify`]. All
//! options are optional at the type level so that a missing mandatory option
//! surfaces as a [`Fault::Configuration`] naming it, the same way a data file
//! with the option left out would.

pub mod atlas;
pub mod driver;
pub mod energy;
pub mod evolver;
pub mod mesh;
pub mod output;
pub mod scalar_field;
pub mod script;
pub mod vector_field;

use serde::Deserialize;

use crate::draft::Draft;
use crate::error::Fault;
use crate::format::{format_number, range, significant_digits, triple};
use crate::geometry::{Axis, Extent};
use crate::session::Layout;

/// A block kind that can be declared in a session.
pub trait Specify {
    /// Class written in the block header, e.g. `Oxs_BoxAtlas`.
    fn class(&self) -> &'static str;

    /// Base for auto-generated names: the class without its prefix.
    fn label(&self) -> &'static str {
        let class = self.class();
        class.split_once('_').map_or(class, |(_, label)| label)
    }

    fn layout(&self) -> Layout {
        Layout::BLOCK
    }

    /// Validates the configuration and writes the block body.
    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault>;
}

// ===========================================================================
// Extraction helpers
// ===========================================================================

/// The value of a mandatory option.
pub(crate) fn require<'a, T>(parameter: &str, value: &'a Option<T>) -> Result<&'a T, Fault> {
    value.as_ref().ok_or_else(|| Fault::missing(parameter))
}

/// A mandatory list that must not be empty.
pub(crate) fn require_list<'a, T>(parameter: &str, value: &'a [T]) -> Result<&'a [T], Fault> {
    if value.is_empty() {
        return Err(Fault::missing(parameter));
    }
    Ok(value)
}

/// Builds and checks an extent from three mandatory ranges.
pub(crate) fn extent_from(
    xrange: &Option<(f64, f64)>,
    yrange: &Option<(f64, f64)>,
    zrange: &Option<(f64, f64)>,
) -> Result<Extent, Fault> {
    let x = *require("xrange", xrange)?;
    let y = *require("yrange", yrange)?;
    let z = *require("zrange", zrange)?;
    Ok(Extent::checked(x, y, z)?)
}

/// Writes `xrange`/`yrange`/`zrange` lines sharing one precision.
pub(crate) fn extent_lines(d: &mut Draft<'_>, extent: &Extent) {
    let digits = significant_digits(&extent.bounds());
    for axis in Axis::ALL {
        let (min, max) = extent.range(axis);
        d.line(format!("{axis}range {}", range(min, max, digits)));
    }
}

/// Writes either an `atlas` line or three range lines.
pub(crate) fn placement(
    d: &mut Draft<'_>,
    atlas: &Option<String>,
    xrange: &Option<(f64, f64)>,
    yrange: &Option<(f64, f64)>,
    zrange: &Option<(f64, f64)>,
) -> Result<(), Fault> {
    if let Some(atlas) = atlas {
        d.atlas("atlas", atlas)?;
        d.line(format!("atlas {atlas}"));
        return Ok(());
    }
    if xrange.is_none() || yrange.is_none() || zrange.is_none() {
        return Err(Fault::configuration(
            "atlas or xrange/yrange/zrange",
            "specify an atlas or all of xrange, yrange, zrange",
        ));
    }
    let extent = extent_from(xrange, yrange, zrange)?;
    extent_lines(d, &extent);
    Ok(())
}

/// Rejects a list in which any entry appears twice.
pub(crate) fn check_unique<T: PartialEq + Keyword>(parameter: &str, values: &[T]) -> Result<(), Fault> {
    for (i, v) in values.iter().enumerate() {
        if values[..i].contains(v) {
            return Err(Fault::validation(
                parameter,
                format!("{} appears more than once", v.as_str()),
            ));
        }
    }
    Ok(())
}

/// Joins keywords as `{ a b c }`.
pub(crate) fn keyword_list<T: Keyword>(values: &[T]) -> String {
    let words: Vec<&str> = values.iter().map(Keyword::as_str).collect();
    format!("{{ {} }}", words.join(" "))
}

/// Writes a stage-style argument list after checking it for repeats.
pub(crate) fn stage_args(
    d: &mut Draft<'_>,
    parameter: &str,
    args: &Option<Vec<StageArg>>,
) -> Result<(), Fault> {
    let args = args.clone().unwrap_or_else(StageArg::all);
    check_unique(parameter, &args)?;
    d.line(format!("{parameter} {}", keyword_list(&args)));
    Ok(())
}

/// Writes a point-style `script_args` list. Field arguments are only
/// accepted when `fields` is given, and then expand into nested lists.
pub(crate) fn point_args(
    d: &mut Draft<'_>,
    args: &Option<Vec<PointArg>>,
    fields: Option<(&[String], &[String])>,
) -> Result<(), Fault> {
    let args = args.clone().unwrap_or_else(|| vec![PointArg::Relpt]);
    check_unique("script_args", &args)?;

    let wants_fields = args
        .iter()
        .any(|a| matches!(a, PointArg::ScalarFields | PointArg::VectorFields));
    let (scalar_fields, vector_fields) = match (wants_fields, fields) {
        (false, _) => {
            d.line(format!("script_args {}", keyword_list(&args)));
            return Ok(());
        }
        (true, None) => {
            return Err(Fault::validation(
                "script_args",
                "scalar_fields and vector_fields are not accepted here",
            ));
        }
        (true, Some(lists)) => lists,
    };

    d.line("script_args {");
    for arg in &args {
        match arg {
            PointArg::ScalarFields => {
                let names = require_list("scalar_fields", scalar_fields)?;
                d.indented(2, "scalar_fields {");
                for name in names {
                    d.scalar_field("scalar_fields", name)?;
                    d.indented(3, name);
                }
                d.indented(2, "}");
            }
            PointArg::VectorFields => {
                let names = require_list("vector_fields", vector_fields)?;
                d.indented(2, "vector_fields {");
                for name in names {
                    d.vector_field("vector_fields", name)?;
                    d.indented(3, name);
                }
                d.indented(2, "}");
            }
            other => d.indented(2, other.as_str()),
        }
    }
    d.line("}");
    Ok(())
}

/// Writes `parameter value` for an optional number.
pub(crate) fn optional_number(d: &mut Draft<'_>, parameter: &str, value: Option<f64>) {
    if let Some(v) = value {
        d.line(format!("{parameter} {}", format_number(v)));
    }
}

/// Checks a value lies strictly between 0 and 1.
pub(crate) fn open_unit(parameter: &str, value: Option<f64>) -> Result<(), Fault> {
    match value {
        Some(v) if !(v > 0.0 && v < 1.0) => Err(Fault::validation(
            parameter,
            format!("{} is not between 0 and 1 exclusive", format_number(v)),
        )),
        _ => Ok(()),
    }
}

// ===========================================================================
// Literal-or-reference parameters
// ===========================================================================

/// A number, or the name of a declared scalar field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarParam {
    Value(f64),
    Field(String),
}

impl ScalarParam {
    /// Resolves a field reference and renders the value.
    pub(crate) fn render(&self, d: &mut Draft<'_>, parameter: &str) -> Result<String, Fault> {
        match self {
            ScalarParam::Value(v) => Ok(format_number(*v)),
            ScalarParam::Field(name) => {
                d.scalar_field(parameter, name)?;
                Ok(name.clone())
            }
        }
    }
}

impl From<f64> for ScalarParam {
    fn from(v: f64) -> Self {
        ScalarParam::Value(v)
    }
}

impl From<&str> for ScalarParam {
    fn from(name: &str) -> Self {
        ScalarParam::Field(name.to_string())
    }
}

/// A literal triple, or the name of a declared vector field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VectorParam {
    Value((f64, f64, f64)),
    Field(String),
}

impl VectorParam {
    /// Resolves a field reference and renders the value.
    pub(crate) fn render(&self, d: &mut Draft<'_>, parameter: &str) -> Result<String, Fault> {
        match self {
            VectorParam::Value(v) => Ok(triple(*v)),
            VectorParam::Field(name) => {
                d.vector_field(parameter, name)?;
                Ok(name.clone())
            }
        }
    }
}

impl From<(f64, f64, f64)> for VectorParam {
    fn from(v: (f64, f64, f64)) -> Self {
        VectorParam::Value(v)
    }
}

impl From<&str> for VectorParam {
    fn from(name: &str) -> Self {
        VectorParam::Field(name.to_string())
    }
}

/// What a file- or image-backed field reports outside its data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Exterior {
    Value(f64),
    Mode(ExteriorMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExteriorMode {
    Boundary,
    Error,
}

impl Default for Exterior {
    fn default() -> Self {
        Exterior::Mode(ExteriorMode::Error)
    }
}

impl Exterior {
    pub(crate) fn render(&self) -> String {
        match self {
            Exterior::Value(v) => format_number(*v),
            Exterior::Mode(ExteriorMode::Boundary) => "boundary".to_string(),
            Exterior::Mode(ExteriorMode::Error) => "error".to_string(),
        }
    }
}

/// One value for every stage, or a value per stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Criterion<T> {
    Single(T),
    PerStage(Vec<T>),
}

impl<T> Criterion<T> {
    pub fn values(&self) -> &[T] {
        match self {
            Criterion::Single(v) => std::slice::from_ref(v),
            Criterion::PerStage(vs) => vs,
        }
    }

    /// `v` for a single value, `{ a b c }` for a per-stage list.
    pub(crate) fn render(&self, fmt: impl Fn(&T) -> String) -> String {
        match self {
            Criterion::Single(v) => fmt(v),
            Criterion::PerStage(vs) => {
                let items: Vec<String> = vs.iter().map(fmt).collect();
                format!("{{ {} }}", items.join(" "))
            }
        }
    }
}

/// Spins held fixed during evolution: an atlas and some of its regions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixedSpins {
    pub atlas: String,
    pub regions: Vec<String>,
}

// ===========================================================================
// Keyword options
// ===========================================================================

/// A closed set of keyword values written verbatim.
pub trait Keyword {
    fn as_str(&self) -> &'static str;
}

/// Plane an image is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewplane {
    Xy,
    Zx,
    Yz,
}

impl Keyword for Viewplane {
    fn as_str(&self) -> &'static str {
        match self {
            Viewplane::Xy => "xy",
            Viewplane::Zx => "zx",
            Viewplane::Yz => "yz",
        }
    }
}

/// Arguments handed to a spatial script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointArg {
    Relpt,
    Rawpt,
    Minpt,
    Maxpt,
    Span,
    ScalarFields,
    VectorFields,
}

impl Keyword for PointArg {
    fn as_str(&self) -> &'static str {
        match self {
            PointArg::Relpt => "relpt",
            PointArg::Rawpt => "rawpt",
            PointArg::Minpt => "minpt",
            PointArg::Maxpt => "maxpt",
            PointArg::Span => "span",
            PointArg::ScalarFields => "scalar_fields",
            PointArg::VectorFields => "vector_fields",
        }
    }
}

/// Arguments handed to a time-dependent script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageArg {
    Stage,
    StageTime,
    TotalTime,
}

impl StageArg {
    pub fn all() -> Vec<StageArg> {
        vec![StageArg::Stage, StageArg::StageTime, StageArg::TotalTime]
    }
}

impl Keyword for StageArg {
    fn as_str(&self) -> &'static str {
        match self {
            StageArg::Stage => "stage",
            StageArg::StageTime => "stage_time",
            StageArg::TotalTime => "total_time",
        }
    }
}
