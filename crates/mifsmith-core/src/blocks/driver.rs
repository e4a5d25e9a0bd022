//! Drivers: the top-level blocks that tie an evolver, a mesh and the
//! initial state together and decide when each stage ends.

use serde::Deserialize;

use super::{Criterion, Keyword, Specify, require};
use crate::draft::Draft;
use crate::error::Fault;
use crate::finalize::Warning;
use crate::format::{flag, format_number};
use crate::registry::{Entity, EntityKind, EvolverMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointCleanup {
    Normal,
    DoneOnly,
    Never,
}

impl Keyword for CheckpointCleanup {
    fn as_str(&self) -> &'static str {
        match self {
            CheckpointCleanup::Normal => "normal",
            CheckpointCleanup::DoneOnly => "done_only",
            CheckpointCleanup::Never => "never",
        }
    }
}

/// Options shared by every driver.
#[derive(Debug, Clone, Default)]
pub struct DriverSettings {
    /// Saturation magnetization: a scalar field name.
    pub ms: Option<String>,
    /// Initial magnetization: a vector field name.
    pub m0: Option<String>,
    /// Defaults to the first evolver of the driver's mode.
    pub evolver: Option<String>,
    /// Defaults to the first mesh.
    pub mesh: Option<String>,
    pub checkpoint_file: Option<String>,
    /// Minutes between checkpoints; -1 disables them.
    pub checkpoint_interval: Option<f64>,
    pub checkpoint_cleanup: Option<CheckpointCleanup>,
    pub normalize_ave_m_output: Option<bool>,
    pub scalar_output_format: Option<String>,
    pub vector_field_output_format: Option<String>,
    pub report_max_spin_angle: Option<bool>,
    pub total_iteration_limit: Option<u64>,
    pub stage_count: Option<u64>,
    /// Ask the simulator to check the stage count, and check it here
    /// against the other blocks first.
    pub stage_count_check: bool,
}

impl DriverSettings {
    fn fragment(&self, d: &mut Draft<'_>, mode: EvolverMode) -> Result<(), Fault> {
        let ms = require("Ms", &self.ms)?;
        let m0 = require("m0", &self.m0)?;
        let evolver = resolve_evolver(d, &self.evolver, mode)?;
        let mesh = resolve_mesh(d, &self.mesh)?;
        d.scalar_field("Ms", ms)?;
        d.vector_field("m0", m0)?;

        d.line(format!("evolver {evolver}"));
        d.line(format!("mesh {mesh}"));
        d.line(format!("Ms {ms}"));
        d.line(format!("m0 {m0}"));
        d.line(format!("basename {}", d.basename()));

        if let Some(file) = &self.checkpoint_file {
            d.line(format!("checkpoint_file {}", file.replace('\\', "/")));
        }
        if let Some(interval) = self.checkpoint_interval {
            if !(interval == -1.0 || interval >= 0.0) {
                return Err(Fault::validation(
                    "checkpoint_interval",
                    format!("{} is not -1 or >= 0", format_number(interval)),
                ));
            }
            d.line(format!("checkpoint_interval {}", format_number(interval)));
        }
        if let Some(cleanup) = self.checkpoint_cleanup {
            d.line(format!("checkpoint_cleanup {}", cleanup.as_str()));
        }
        if let Some(normalize) = self.normalize_ave_m_output {
            d.line(format!("normalize_aveM_output {}", flag(normalize)));
        }
        if let Some(format) = &self.scalar_output_format {
            d.line(format!("scalar_output_format {format}"));
        }
        if let Some(format) = &self.vector_field_output_format {
            d.line(format!("vector_field_output_format {{ {format} }}"));
        }
        if let Some(report) = self.report_max_spin_angle {
            d.line(format!("report_max_spin_angle {}", flag(report)));
        }
        if let Some(limit) = self.total_iteration_limit {
            d.line(format!("total_iteration_limit {limit}"));
        }

        self.stage_lines(d)
    }

    fn stage_lines(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        if self.stage_count == Some(0) {
            return Err(Fault::validation("stage_count", "0 is not a positive stage count"));
        }
        if !self.stage_count_check {
            if let Some(count) = self.stage_count {
                d.line(format!("stage_count {count}"));
            }
            return Ok(());
        }

        let requested = *require("stage_count", &self.stage_count)?;
        if let Some(required) = d.registry().max_stage_count() {
            if requested < required {
                return Err(Fault::validation(
                    "stage_count",
                    format!("gave stage count {requested}, but other blocks require at least {required}"),
                ));
            }
            if requested > required {
                d.warn(Warning::StageCountExceeds {
                    requested,
                    required,
                });
            }
        }
        d.line("stage_count_check 1");
        d.line(format!("stage_count {requested}"));
        Ok(())
    }
}

fn resolve_evolver(d: &mut Draft<'_>, requested: &Option<String>, mode: EvolverMode) -> Result<String, Fault> {
    if let Some(name) = requested {
        let found = d.evolver("evolver", name)?;
        if found != mode {
            return Err(Fault::validation(
                "evolver",
                format!("{name} is a {found} evolver, not a {mode} one"),
            ));
        }
        return Ok(name.clone());
    }

    let registry = d.registry();
    if registry.first(EntityKind::Evolver).is_none() {
        return Err(Fault::configuration("evolver", "no evolvers declared"));
    }
    let name = registry
        .first_evolver(mode)
        .ok_or_else(|| Fault::configuration("evolver", format!("no {mode} evolvers declared")))?;
    d.evolver("evolver", name)?;
    Ok(name.to_string())
}

fn resolve_mesh(d: &mut Draft<'_>, requested: &Option<String>) -> Result<String, Fault> {
    let name = match requested {
        Some(name) => name.as_str(),
        None => d
            .registry()
            .first(EntityKind::Mesh)
            .ok_or_else(|| Fault::configuration("mesh", "no meshes declared"))?,
    };
    d.mesh("mesh", name)?;
    Ok(name.to_string())
}

/// Writes `name value` or `name { a b c }` after checking every value.
fn criterion_line<T>(
    d: &mut Draft<'_>,
    name: &str,
    criterion: &Option<Criterion<T>>,
    negative: impl Fn(&T) -> bool,
    render: impl Fn(&T) -> String,
) -> Result<(), Fault> {
    let Some(criterion) = criterion else {
        return Ok(());
    };
    if criterion.values().is_empty() {
        return Err(Fault::validation(name, "per-stage list is empty"));
    }
    if let Some(bad) = criterion.values().iter().find(|v| negative(*v)) {
        return Err(Fault::validation(name, format!("{} is not >= 0", render(bad))));
    }
    d.line(format!("{name} {}", criterion.render(render)));
    Ok(())
}

fn negative_f64(v: &f64) -> bool {
    *v < 0.0
}

fn render_f64(v: &f64) -> String {
    format_number(*v)
}

fn render_u64(v: &u64) -> String {
    v.to_string()
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Drives a time evolver through stages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "DriverData")]
pub struct TimeDriver {
    pub settings: DriverSettings,
    pub stopping_dm_dt: Option<Criterion<f64>>,
    pub stopping_time: Option<Criterion<f64>>,
    pub stage_iteration_limit: Option<Criterion<u64>>,
}

impl Specify for TimeDriver {
    fn class(&self) -> &'static str {
        "Oxs_TimeDriver"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.settings.fragment(d, EvolverMode::Time)?;
        criterion_line(d, "stopping_dm_dt", &self.stopping_dm_dt, negative_f64, render_f64)?;
        criterion_line(d, "stopping_time", &self.stopping_time, negative_f64, render_f64)?;
        criterion_line(d, "stage_iteration_limit", &self.stage_iteration_limit, |_| false, render_u64)?;

        if self.stopping_dm_dt.is_none() && self.stopping_time.is_none() && self.stage_iteration_limit.is_none() {
            d.warn(Warning::NoStoppingCriteria {
                driver: d.name().to_string(),
            });
        }
        d.register(Entity::Driver);
        Ok(())
    }
}

/// Drives a minimizing evolver through stages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "DriverData")]
pub struct MinDriver {
    pub settings: DriverSettings,
    pub stopping_mx_hxm: Option<Criterion<f64>>,
    pub stage_iteration_limit: Option<Criterion<u64>>,
}

impl Specify for MinDriver {
    fn class(&self) -> &'static str {
        "Oxs_MinDriver"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.settings.fragment(d, EvolverMode::Minimizing)?;
        criterion_line(d, "stopping_mxHxm", &self.stopping_mx_hxm, negative_f64, render_f64)?;
        criterion_line(d, "stage_iteration_limit", &self.stage_iteration_limit, |_| false, render_u64)?;

        if self.stopping_mx_hxm.is_none() && self.stage_iteration_limit.is_none() {
            d.warn(Warning::NoStoppingCriteria {
                driver: d.name().to_string(),
            });
        }
        d.register(Entity::Driver);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Data file form
// ---------------------------------------------------------------------------

/// Shared driver options and the stopping criteria of both drivers, flat.
///
/// A driver keeps the criteria it understands; the other driver's are
/// ignored like any other unknown option.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DriverData {
    #[serde(rename = "Ms")]
    ms: Option<String>,
    m0: Option<String>,
    evolver: Option<String>,
    mesh: Option<String>,
    checkpoint_file: Option<String>,
    checkpoint_interval: Option<f64>,
    checkpoint_cleanup: Option<CheckpointCleanup>,
    #[serde(rename = "normalize_aveM_output")]
    normalize_ave_m_output: Option<bool>,
    scalar_output_format: Option<String>,
    vector_field_output_format: Option<String>,
    report_max_spin_angle: Option<bool>,
    total_iteration_limit: Option<u64>,
    stage_count: Option<u64>,
    stage_count_check: bool,

    stopping_dm_dt: Option<Criterion<f64>>,
    stopping_time: Option<Criterion<f64>>,
    #[serde(rename = "stopping_mxHxm")]
    stopping_mx_hxm: Option<Criterion<f64>>,
    stage_iteration_limit: Option<Criterion<u64>>,
}

impl DriverData {
    fn settings(&mut self) -> DriverSettings {
        DriverSettings {
            ms: self.ms.take(),
            m0: self.m0.take(),
            evolver: self.evolver.take(),
            mesh: self.mesh.take(),
            checkpoint_file: self.checkpoint_file.take(),
            checkpoint_interval: self.checkpoint_interval,
            checkpoint_cleanup: self.checkpoint_cleanup,
            normalize_ave_m_output: self.normalize_ave_m_output,
            scalar_output_format: self.scalar_output_format.take(),
            vector_field_output_format: self.vector_field_output_format.take(),
            report_max_spin_angle: self.report_max_spin_angle,
            total_iteration_limit: self.total_iteration_limit,
            stage_count: self.stage_count,
            stage_count_check: self.stage_count_check,
        }
    }
}

impl From<DriverData> for TimeDriver {
    fn from(mut data: DriverData) -> Self {
        TimeDriver {
            settings: data.settings(),
            stopping_dm_dt: data.stopping_dm_dt,
            stopping_time: data.stopping_time,
            stage_iteration_limit: data.stage_iteration_limit,
        }
    }
}

impl From<DriverData> for MinDriver {
    fn from(mut data: DriverData) -> Self {
        MinDriver {
            settings: data.settings(),
            stopping_mx_hxm: data.stopping_mx_hxm,
            stage_iteration_limit: data.stage_iteration_limit,
        }
    }
}
