//! Evolvers: time integrators and energy minimizers.
//!
//! The time integrators form a chain. Each one embeds the configuration of
//! the one below it and writes that fragment first, so a Runge-Kutta body
//! starts with exactly what an Euler body would contain. Fragments only write
//! lines; registering the evolver is left to the outermost kind.

use serde::Deserialize;

use super::{FixedSpins, Keyword, ScalarParam, Specify, StageArg, open_unit, optional_number, require, stage_args};
use crate::draft::Draft;
use crate::error::Fault;
use crate::finalize::Warning;
use crate::format::{flag, format_number, triple};
use crate::registry::{Entity, EntityKind, EvolverMode};

fn fixed_spins_lines(d: &mut Draft<'_>, fixed: &Option<FixedSpins>) -> Result<(), Fault> {
    let Some(fixed) = fixed else {
        return Ok(());
    };
    d.atlas("fixed_spins", &fixed.atlas)?;
    for region in &fixed.regions {
        d.region("fixed_spins", &fixed.atlas, region)?;
    }
    d.line(format!("fixed_spins {{ {}", fixed.atlas));
    for region in &fixed.regions {
        d.indented(2, region);
    }
    d.line("}");
    Ok(())
}

/// Registers the outermost evolver, noting any declared before it.
fn register_evolver(d: &mut Draft<'_>, mode: EvolverMode) {
    let existing: Vec<String> = d
        .registry()
        .names(EntityKind::Evolver)
        .map(str::to_string)
        .collect();
    if !existing.is_empty() {
        d.warn(Warning::MultipleEvolvers {
            name: d.name().to_string(),
            existing,
        });
    }
    d.register(Entity::Evolver { mode });
}

/// A script-driven profile with its stage arguments.
fn profile_lines(
    d: &mut Draft<'_>,
    parameter: &str,
    script: &Option<String>,
    args_parameter: &str,
    args: &Option<Vec<StageArg>>,
) -> Result<(), Fault> {
    match script {
        Some(script) => {
            d.script(parameter, script)?;
            d.line(format!("{parameter} {script}"));
            Ok(())
        }
        None if args.is_some() => Err(Fault::configuration(
            parameter,
            format!("{args_parameter} given without {parameter}"),
        )),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Euler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EulerEvolve {
    pub alpha: Option<f64>,
    #[serde(rename = "gamma_LL")]
    pub gamma_ll: Option<f64>,
    #[serde(rename = "gamma_G")]
    pub gamma_g: Option<f64>,
    pub do_precess: Option<bool>,
    pub min_timestep: Option<f64>,
    pub max_timestep: Option<f64>,
    pub fixed_spins: Option<FixedSpins>,
    pub start_dm: Option<f64>,
    pub error_rate: Option<f64>,
    pub absolute_step_error: Option<f64>,
    pub relative_step_error: Option<f64>,
    pub step_headroom: Option<f64>,
}

impl EulerEvolve {
    pub(crate) fn fragment(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        if self.gamma_ll.is_some() && self.gamma_g.is_some() {
            return Err(Fault::validation(
                "gamma_LL, gamma_G",
                "specify only one of gamma_LL and gamma_G",
            ));
        }
        if self.min_timestep.is_some() != self.max_timestep.is_some() {
            return Err(Fault::configuration(
                "min_timestep, max_timestep",
                "specify both or neither of min_timestep and max_timestep",
            ));
        }
        open_unit("step_headroom", self.step_headroom)?;

        d.line(format!("alpha {}", format_number(self.alpha.unwrap_or(0.5))));
        optional_number(d, "gamma_G", self.gamma_g);
        optional_number(d, "gamma_LL", self.gamma_ll);
        d.line(format!("do_precess {}", flag(self.do_precess.unwrap_or(true))));
        optional_number(d, "min_timestep", self.min_timestep);
        optional_number(d, "max_timestep", self.max_timestep);
        fixed_spins_lines(d, &self.fixed_spins)?;
        optional_number(d, "start_dm", self.start_dm);
        optional_number(d, "error_rate", self.error_rate);
        optional_number(d, "absolute_step_error", self.absolute_step_error);
        optional_number(d, "relative_step_error", self.relative_step_error);
        optional_number(d, "step_headroom", self.step_headroom);
        Ok(())
    }
}

impl Specify for EulerEvolve {
    fn class(&self) -> &'static str {
        "Oxs_EulerEvolve"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.fragment(d)?;
        register_evolver(d, EvolverMode::Time);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runge-Kutta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RkMethod {
    Rk2,
    Rk4,
    #[default]
    Rkf54,
    Rkf54m,
    Rkf54s,
}

impl Keyword for RkMethod {
    fn as_str(&self) -> &'static str {
        match self {
            RkMethod::Rk2 => "rk2",
            RkMethod::Rk4 => "rk4",
            RkMethod::Rkf54 => "rkf54",
            RkMethod::Rkf54m => "rkf54m",
            RkMethod::Rkf54s => "rkf54s",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "TimeEvolverData")]
pub struct RungeKuttaEvolve {
    pub base: EulerEvolve,
    pub allow_signed_gamma: Option<bool>,
    pub min_step_headroom: Option<f64>,
    pub max_step_headroom: Option<f64>,
    pub reject_goal: Option<f64>,
    pub method: Option<RkMethod>,
}

impl RungeKuttaEvolve {
    pub(crate) fn fragment(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.base.fragment(d)?;
        open_unit("min_step_headroom", self.min_step_headroom)?;
        open_unit("max_step_headroom", self.max_step_headroom)?;
        d.line(format!(
            "allow_signed_gamma {}",
            flag(self.allow_signed_gamma.unwrap_or(false))
        ));
        optional_number(d, "min_step_headroom", self.min_step_headroom);
        optional_number(d, "max_step_headroom", self.max_step_headroom);
        optional_number(d, "reject_goal", self.reject_goal);
        d.line(format!("method {}", self.method.unwrap_or_default().as_str()));
        Ok(())
    }
}

impl Specify for RungeKuttaEvolve {
    fn class(&self) -> &'static str {
        "Oxs_RungeKuttaEvolve"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.fragment(d)?;
        register_evolver(d, EvolverMode::Time);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Spin-transfer torque
// ---------------------------------------------------------------------------

/// Runge-Kutta integration with a spin-polarized current.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "TimeEvolverData")]
pub struct SpinXferEvolve {
    pub base: RungeKuttaEvolve,
    pub lambda: Option<f64>,
    pub lambda_fixed: Option<f64>,
    pub lambda_free: Option<f64>,
    pub p: Option<f64>,
    pub p_fixed: Option<f64>,
    pub p_free: Option<f64>,
    /// Current density.
    pub j: Option<f64>,
    /// Polarization direction of the fixed layer.
    pub mp: Option<(f64, f64, f64)>,
    pub j_profile: Option<String>,
    pub j_profile_args: Option<Vec<StageArg>>,
    pub eps_prime: Option<f64>,
    pub energy_slack: Option<f64>,
}

/// Writes `name` alone, or its fixed/free split, but never both.
fn split_parameter(
    d: &mut Draft<'_>,
    name: &str,
    whole: Option<f64>,
    fixed: Option<f64>,
    free: Option<f64>,
) -> Result<(), Fault> {
    if whole.is_some() && (fixed.is_some() || free.is_some()) {
        return Err(Fault::validation(
            name,
            format!("specify either {name} or {name}_fixed/{name}_free"),
        ));
    }
    optional_number(d, name, whole);
    optional_number(d, &format!("{name}_fixed"), fixed);
    optional_number(d, &format!("{name}_free"), free);
    Ok(())
}

impl Specify for SpinXferEvolve {
    fn class(&self) -> &'static str {
        "Oxs_SpinXferEvolve"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let j = *require("J", &self.j)?;
        let mp = *require("mp", &self.mp)?;

        self.base.fragment(d)?;
        split_parameter(d, "Lambda", self.lambda, self.lambda_fixed, self.lambda_free)?;
        split_parameter(d, "P", self.p, self.p_fixed, self.p_free)?;
        d.line(format!("J {}", format_number(j)));
        d.line(format!("mp {}", triple(mp)));
        profile_lines(d, "J_profile", &self.j_profile, "J_profile_args", &self.j_profile_args)?;
        optional_number(d, "eps_prime", self.eps_prime);
        optional_number(d, "energy_slack", self.energy_slack);
        if self.j_profile.is_some() {
            stage_args(d, "J_profile_args", &self.j_profile_args)?;
        }

        register_evolver(d, EvolverMode::Time);
        Ok(())
    }
}

/// Runge-Kutta integration with a spin-transfer term in the
/// Zhang-Li form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "TimeEvolverData")]
pub struct SpinTEvolve {
    pub base: RungeKuttaEvolve,
    pub u: Option<ScalarParam>,
    pub beta: Option<f64>,
    pub u_profile: Option<String>,
    pub u_profile_args: Option<Vec<StageArg>>,
    pub eps_prime: Option<f64>,
    pub energy_slack: Option<f64>,
}

impl Specify for SpinTEvolve {
    fn class(&self) -> &'static str {
        "Anv_SpinTEvolve"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let u = require("u", &self.u)?;
        let beta = *require("beta", &self.beta)?;

        self.base.fragment(d)?;
        let u = u.render(d, "u")?;
        d.line(format!("u {u}"));
        d.line(format!("beta {}", format_number(beta)));
        profile_lines(d, "u_profile", &self.u_profile, "u_profile_args", &self.u_profile_args)?;
        optional_number(d, "eps_prime", self.eps_prime);
        optional_number(d, "energy_slack", self.energy_slack);
        if self.u_profile.is_some() {
            stage_args(d, "u_profile_args", &self.u_profile_args)?;
        }

        register_evolver(d, EvolverMode::Time);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Data file form
// ---------------------------------------------------------------------------

/// Options of every Runge-Kutta based evolver, side by side.
///
/// Data files list a composed evolver's options flat; each kind takes what it
/// knows and nests the rest into its fragments. Options of a sibling kind are
/// ignored like any other unknown option.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimeEvolverData {
    alpha: Option<f64>,
    #[serde(rename = "gamma_LL")]
    gamma_ll: Option<f64>,
    #[serde(rename = "gamma_G")]
    gamma_g: Option<f64>,
    do_precess: Option<bool>,
    min_timestep: Option<f64>,
    max_timestep: Option<f64>,
    fixed_spins: Option<FixedSpins>,
    start_dm: Option<f64>,
    error_rate: Option<f64>,
    absolute_step_error: Option<f64>,
    relative_step_error: Option<f64>,
    step_headroom: Option<f64>,

    allow_signed_gamma: Option<bool>,
    min_step_headroom: Option<f64>,
    max_step_headroom: Option<f64>,
    reject_goal: Option<f64>,
    method: Option<RkMethod>,

    #[serde(rename = "Lambda")]
    lambda: Option<f64>,
    #[serde(rename = "Lambda_fixed")]
    lambda_fixed: Option<f64>,
    #[serde(rename = "Lambda_free")]
    lambda_free: Option<f64>,
    #[serde(rename = "P")]
    p: Option<f64>,
    #[serde(rename = "P_fixed")]
    p_fixed: Option<f64>,
    #[serde(rename = "P_free")]
    p_free: Option<f64>,
    #[serde(rename = "J")]
    j: Option<f64>,
    mp: Option<(f64, f64, f64)>,
    #[serde(rename = "J_profile")]
    j_profile: Option<String>,
    #[serde(rename = "J_profile_args")]
    j_profile_args: Option<Vec<StageArg>>,

    u: Option<ScalarParam>,
    beta: Option<f64>,
    u_profile: Option<String>,
    u_profile_args: Option<Vec<StageArg>>,

    eps_prime: Option<f64>,
    energy_slack: Option<f64>,
}

impl TimeEvolverData {
    fn runge_kutta(&mut self) -> RungeKuttaEvolve {
        RungeKuttaEvolve {
            base: EulerEvolve {
                alpha: self.alpha,
                gamma_ll: self.gamma_ll,
                gamma_g: self.gamma_g,
                do_precess: self.do_precess,
                min_timestep: self.min_timestep,
                max_timestep: self.max_timestep,
                fixed_spins: self.fixed_spins.take(),
                start_dm: self.start_dm,
                error_rate: self.error_rate,
                absolute_step_error: self.absolute_step_error,
                relative_step_error: self.relative_step_error,
                step_headroom: self.step_headroom,
            },
            allow_signed_gamma: self.allow_signed_gamma,
            min_step_headroom: self.min_step_headroom,
            max_step_headroom: self.max_step_headroom,
            reject_goal: self.reject_goal,
            method: self.method,
        }
    }
}

impl From<TimeEvolverData> for RungeKuttaEvolve {
    fn from(mut data: TimeEvolverData) -> Self {
        data.runge_kutta()
    }
}

impl From<TimeEvolverData> for SpinXferEvolve {
    fn from(mut data: TimeEvolverData) -> Self {
        SpinXferEvolve {
            base: data.runge_kutta(),
            lambda: data.lambda,
            lambda_fixed: data.lambda_fixed,
            lambda_free: data.lambda_free,
            p: data.p,
            p_fixed: data.p_fixed,
            p_free: data.p_free,
            j: data.j,
            mp: data.mp,
            j_profile: data.j_profile,
            j_profile_args: data.j_profile_args,
            eps_prime: data.eps_prime,
            energy_slack: data.energy_slack,
        }
    }
}

impl From<TimeEvolverData> for SpinTEvolve {
    fn from(mut data: TimeEvolverData) -> Self {
        SpinTEvolve {
            base: data.runge_kutta(),
            u: data.u,
            beta: data.beta,
            u_profile: data.u_profile,
            u_profile_args: data.u_profile_args,
            eps_prime: data.eps_prime,
            energy_slack: data.energy_slack,
        }
    }
}

// ---------------------------------------------------------------------------
// Conjugate gradient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CgMethod {
    #[default]
    #[serde(rename = "Fletcher-Reeves")]
    FletcherReeves,
    #[serde(rename = "Polak-Ribiere")]
    PolakRibiere,
}

impl Keyword for CgMethod {
    fn as_str(&self) -> &'static str {
        match self {
            CgMethod::FletcherReeves => "Fletcher-Reeves",
            CgMethod::PolakRibiere => "Polak-Ribiere",
        }
    }
}

/// Energy minimization by conjugate gradients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CGEvolve {
    pub gradient_reset_angle: Option<f64>,
    pub gradient_reset_count: Option<u64>,
    pub minimum_bracket_step: Option<f64>,
    pub maximum_bracket_step: Option<f64>,
    pub line_minimum_angle_precision: Option<f64>,
    pub line_minimum_relwidth: Option<f64>,
    pub energy_precision: Option<f64>,
    pub method: Option<CgMethod>,
    pub fixed_spins: Option<FixedSpins>,
}

impl Specify for CGEvolve {
    fn class(&self) -> &'static str {
        "Oxs_CGEvolve"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        optional_number(d, "gradient_reset_angle", self.gradient_reset_angle);
        if let Some(count) = self.gradient_reset_count {
            d.line(format!("gradient_reset_count {count}"));
        }
        optional_number(d, "minimum_bracket_step", self.minimum_bracket_step);
        optional_number(d, "maximum_bracket_step", self.maximum_bracket_step);
        optional_number(
            d,
            "line_minimum_angle_precision",
            self.line_minimum_angle_precision,
        );
        optional_number(d, "line_minimum_relwidth", self.line_minimum_relwidth);
        optional_number(d, "energy_precision", self.energy_precision);
        d.line(format!("method {}", self.method.unwrap_or_default().as_str()));
        fixed_spins_lines(d, &self.fixed_spins)?;

        register_evolver(d, EvolverMode::Minimizing);
        Ok(())
    }
}
