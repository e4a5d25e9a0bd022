//! Scalar fields.

use serde::Deserialize;

use super::{Exterior, Keyword, PointArg, Specify, Viewplane, placement, point_args, require, require_list};
use crate::draft::Draft;
use crate::error::Fault;
use crate::format::{column_width, flag, format_number, triple};
use crate::registry::Entity;

/// Number of entries an affine orientation matrix may have: scalar, diagonal,
/// symmetric or full.
const AFFINE_MATRIX_SIZES: [usize; 4] = [1, 3, 6, 9];

const DEFAULT_INVERSE_SLACK: u64 = 128;

pub(crate) fn multiplier_line(d: &mut Draft<'_>, multiplier: Option<f64>) {
    d.line(format!("multiplier {}", format_number(multiplier.unwrap_or(1.0))));
}

/// Writes an affine orientation body shared by the scalar and vector kinds.
pub(crate) fn affine_orient_lines(
    d: &mut Draft<'_>,
    matrix: &[f64],
    offset: Option<(f64, f64, f64)>,
    inverse: Option<bool>,
    inverse_slack: Option<u64>,
) -> Result<(), Fault> {
    if !AFFINE_MATRIX_SIZES.contains(&matrix.len()) {
        return Err(Fault::validation(
            "M",
            format!("gave {} elements; must be 1, 3, 6 or 9", matrix.len()),
        ));
    }
    let entries: Vec<String> = matrix.iter().map(|v| format_number(*v)).collect();
    d.line(format!("M {{ {} }}", entries.join(" ")));
    d.line(format!("offset {}", triple(offset.unwrap_or((0.0, 0.0, 0.0)))));
    d.line(format!("inverse {}", flag(inverse.unwrap_or(false))));
    d.line(format!(
        "inverse_slack {}",
        inverse_slack.unwrap_or(DEFAULT_INVERSE_SLACK)
    ));
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UniformScalarField {
    pub value: Option<f64>,
}

impl Specify for UniformScalarField {
    fn class(&self) -> &'static str {
        "Oxs_UniformScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let value = *require("value", &self.value)?;
        d.line(format!("value {}", format_number(value)));
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// One value per atlas region.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AtlasScalarField {
    pub atlas: Option<String>,
    /// `(region, value)` pairs.
    pub values: Vec<(String, f64)>,
    pub default_value: Option<f64>,
    pub multiplier: Option<f64>,
}

impl Specify for AtlasScalarField {
    fn class(&self) -> &'static str {
        "Oxs_AtlasScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let atlas = require("atlas", &self.atlas)?;
        let values = require_list("values", &self.values)?;
        d.atlas("atlas", atlas)?;
        for (region, _) in values {
            d.region("values", atlas, region)?;
        }

        d.line(format!("atlas {atlas}"));
        if let Some(default) = self.default_value {
            d.line(format!("default_value {}", format_number(default)));
        }
        multiplier_line(d, self.multiplier);
        d.line("values {");
        let width = column_width(values.iter().map(|(region, _)| region.as_str()));
        for (region, value) in values {
            d.indented(2, format!("{region:<width$} {}", format_number(*value)));
        }
        d.line("}");
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// A field varying linearly with position.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinearScalarField {
    pub vector: Option<(f64, f64, f64)>,
    pub norm: Option<f64>,
    pub offset: Option<f64>,
}

impl Specify for LinearScalarField {
    fn class(&self) -> &'static str {
        "Oxs_LinearScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let vector = *require("vector", &self.vector)?;
        d.line(format!("vector {}", triple(vector)));
        super::optional_number(d, "norm", self.norm);
        super::optional_number(d, "offset", self.offset);
        d.register(Entity::ScalarField);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RandomScalarField {
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    /// Mesh to cache the random values on.
    pub cache_grid: Option<String>,
}

impl Specify for RandomScalarField {
    fn class(&self) -> &'static str {
        "Oxs_RandomScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let min = *require("range_min", &self.range_min)?;
        let max = *require("range_max", &self.range_max)?;
        if min > max {
            return Err(Fault::validation(
                "range_min, range_max",
                format!(
                    "minimum {} is larger than maximum {}",
                    format_number(min),
                    format_number(max)
                ),
            ));
        }
        d.line(format!("range_min {}", format_number(min)));
        d.line(format!("range_max {}", format_number(max)));
        if let Some(grid) = &self.cache_grid {
            d.mesh("cache_grid", grid)?;
            d.line(format!("cache_grid {grid}"));
        }
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// A field computed point by point by a script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptScalarField {
    pub script: Option<String>,
    pub script_args: Option<Vec<PointArg>>,
    /// Fields handed to the script when `script_args` asks for them.
    pub scalar_fields: Vec<String>,
    pub vector_fields: Vec<String>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub multiplier: Option<f64>,
}

impl Specify for ScriptScalarField {
    fn class(&self) -> &'static str {
        "Oxs_ScriptScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let script = require("script", &self.script)?;
        d.script("script", script)?;
        d.line(format!("script {script}"));
        multiplier_line(d, self.multiplier);
        point_args(
            d,
            &self.script_args,
            Some((&self.scalar_fields, &self.vector_fields)),
        )?;
        placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?;
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// Magnitude of a vector field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VecMagScalarField {
    pub field: Option<String>,
    pub multiplier: Option<f64>,
    pub offset: Option<f64>,
}

impl Specify for VecMagScalarField {
    fn class(&self) -> &'static str {
        "Oxs_VecMagScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        d.vector_field("field", field)?;
        d.line(format!("field {field}"));
        multiplier_line(d, self.multiplier);
        d.line(format!("offset {}", format_number(self.offset.unwrap_or(0.0))));
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// Another scalar field sampled at script-transformed coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptOrientScalarField {
    pub field: Option<String>,
    pub script: Option<String>,
    pub script_args: Option<Vec<PointArg>>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
}

impl Specify for ScriptOrientScalarField {
    fn class(&self) -> &'static str {
        "Oxs_ScriptOrientScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let script = require("script", &self.script)?;
        d.scalar_field("field", field)?;
        d.script("script", script)?;
        d.line(format!("field {field}"));
        d.line(format!("script {script}"));
        point_args(d, &self.script_args, None)?;
        placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?;
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// Another scalar field sampled at affinely transformed coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AffineOrientScalarField {
    pub field: Option<String>,
    #[serde(rename = "M")]
    pub m: Vec<f64>,
    pub offset: Option<(f64, f64, f64)>,
    pub inverse: Option<bool>,
    pub inverse_slack: Option<u64>,
}

impl Specify for AffineOrientScalarField {
    fn class(&self) -> &'static str {
        "Oxs_AffineOrientScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let m = require_list("M", &self.m)?;
        d.scalar_field("field", field)?;
        d.line(format!("field {field}"));
        affine_orient_lines(d, m, self.offset, self.inverse, self.inverse_slack)?;
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// `multiplier * field + offset`, or its inverse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AffineTransformScalarField {
    pub field: Option<String>,
    pub multiplier: Option<f64>,
    pub offset: Option<f64>,
    pub inverse: Option<bool>,
}

impl Specify for AffineTransformScalarField {
    fn class(&self) -> &'static str {
        "Oxs_AffineTransformScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let multiplier = self.multiplier.unwrap_or(1.0);
        let inverse = self.inverse.unwrap_or(false);
        if inverse && multiplier == 0.0 {
            return Err(Fault::validation(
                "inverse, multiplier",
                "inverting with multiplier 0 divides by zero",
            ));
        }
        d.scalar_field("field", field)?;
        d.line(format!("field {field}"));
        d.line(format!("multiplier {}", format_number(multiplier)));
        d.line(format!("offset {}", format_number(self.offset.unwrap_or(0.0))));
        d.line(format!("inverse {}", flag(inverse)));
        d.register(Entity::ScalarField);
        Ok(())
    }
}

/// A field taken from the brightness of an image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageScalarField {
    pub image: Option<String>,
    pub viewplane: Option<Viewplane>,
    pub invert: Option<bool>,
    pub multiplier: Option<f64>,
    pub offset: Option<f64>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub exterior: Option<Exterior>,
}

impl Specify for ImageScalarField {
    fn class(&self) -> &'static str {
        "Oxs_ImageScalarField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let image = require("image", &self.image)?.replace('\\', "/");
        let viewplane = require("viewplane", &self.viewplane)?;

        d.line(format!("image {image}"));
        d.line(format!("invert {}", flag(self.invert.unwrap_or(false))));
        multiplier_line(d, self.multiplier);
        d.line(format!("offset {}", format_number(self.offset.unwrap_or(0.0))));
        d.line(format!("viewplane {}", viewplane.as_str()));
        placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?;
        d.line(format!(
            "exterior {}",
            self.exterior.clone().unwrap_or_default().render()
        ));

        d.reference_file(&image);
        d.register(Entity::ScalarField);
        Ok(())
    }
}
