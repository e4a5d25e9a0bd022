//! Vector fields.

use serde::Deserialize;

use super::scalar_field::{affine_orient_lines, multiplier_line};
use super::{
    Exterior, Keyword, PointArg, Specify, VectorParam, Viewplane, optional_number, placement, point_args, require,
    require_list,
};
use crate::draft::Draft;
use crate::error::Fault;
use crate::format::{flag, format_number, scientific, significant_digits, triple};
use crate::registry::Entity;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UniformVectorField {
    pub vector: Option<(f64, f64, f64)>,
    pub norm: Option<f64>,
}

impl Specify for UniformVectorField {
    fn class(&self) -> &'static str {
        "Oxs_UniformVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let vector = *require("vector", &self.vector)?;
        d.line(format!("vector {}", triple(vector)));
        optional_number(d, "norm", self.norm);
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// One vector per atlas region.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AtlasVectorField {
    pub atlas: Option<String>,
    /// `(region, vector)` pairs.
    pub values: Vec<(String, (f64, f64, f64))>,
    pub default_value: Option<VectorParam>,
    pub multiplier: Option<f64>,
    pub norm: Option<f64>,
}

impl Specify for AtlasVectorField {
    fn class(&self) -> &'static str {
        "Oxs_AtlasVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let atlas = require("atlas", &self.atlas)?;
        let values = require_list("values", &self.values)?;
        d.atlas("atlas", atlas)?;
        for (region, _) in values {
            d.region("values", atlas, region)?;
        }

        d.line(format!("atlas {atlas}"));
        multiplier_line(d, self.multiplier);
        optional_number(d, "norm", self.norm);
        if let Some(default) = &self.default_value {
            let rendered = default.render(d, "default_value")?;
            d.line(format!("default_value {rendered}"));
        }

        let components: Vec<f64> = values
            .iter()
            .flat_map(|(_, (x, y, z))| [*x, *y, *z])
            .collect();
        let digits = significant_digits(&components);
        d.line("values {");
        for (region, (x, y, z)) in values {
            d.indented(
                2,
                format!(
                    "{region} {{ {} {} {} }}",
                    scientific(*x, digits),
                    scientific(*y, digits),
                    scientific(*z, digits)
                ),
            );
        }
        d.line("}");
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// A field computed point by point by a script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptVectorField {
    pub script: Option<String>,
    pub script_args: Option<Vec<PointArg>>,
    pub scalar_fields: Vec<String>,
    pub vector_fields: Vec<String>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub norm: Option<f64>,
    pub multiplier: Option<f64>,
}

impl Specify for ScriptVectorField {
    fn class(&self) -> &'static str {
        "Oxs_ScriptVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let script = require("script", &self.script)?;
        d.script("script", script)?;
        d.line(format!("script {script}"));
        optional_number(d, "norm", self.norm);
        optional_number(d, "multiplier", self.multiplier);
        point_args(
            d,
            &self.script_args,
            Some((&self.scalar_fields, &self.vector_fields)),
        )?;
        placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?;
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// Vectors read from a data file, placed either on an atlas or box, or by
/// an explicit offset and scaling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileVectorField {
    pub file: Option<String>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub spatial_offset: Option<(f64, f64, f64)>,
    pub spatial_scaling: Option<(f64, f64, f64)>,
    pub norm: Option<f64>,
    pub multiplier: Option<f64>,
    pub exterior: Option<Exterior>,
}

impl FileVectorField {
    fn bounded(&self) -> bool {
        self.atlas.is_some() || self.xrange.is_some() || self.yrange.is_some() || self.zrange.is_some()
    }
}

impl Specify for FileVectorField {
    fn class(&self) -> &'static str {
        "Oxs_FileVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let file = require("file", &self.file)?;
        let spatial = self.spatial_offset.is_some() || self.spatial_scaling.is_some();
        if spatial && self.bounded() {
            return Err(Fault::validation(
                "spatial_offset, spatial_scaling",
                "cannot be combined with atlas or xrange/yrange/zrange",
            ));
        }

        d.line(format!("file {file}"));
        multiplier_line(d, self.multiplier);
        optional_number(d, "norm", self.norm);
        match (self.spatial_offset, self.spatial_scaling) {
            (Some(offset), Some(scaling)) => {
                d.line(format!("spatial_offset {}", triple(offset)));
                d.line(format!("spatial_scaling {}", triple(scaling)));
            }
            _ if spatial => {
                return Err(Fault::configuration(
                    "spatial_offset, spatial_scaling",
                    "both must be given together",
                ));
            }
            _ => placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?,
        }
        d.line(format!(
            "exterior {}",
            self.exterior.clone().unwrap_or_default().render()
        ));

        d.reference_file(file);
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// Vectors of random direction with norms drawn from a range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RandomVectorField {
    pub min_norm: Option<f64>,
    pub max_norm: Option<f64>,
    pub cache_grid: Option<String>,
}

impl RandomVectorField {
    pub(crate) fn fragment(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let min = *require("min_norm", &self.min_norm)?;
        let max = *require("max_norm", &self.max_norm)?;
        if min > max {
            return Err(Fault::validation(
                "min_norm, max_norm",
                format!(
                    "minimum {} is larger than maximum {}",
                    format_number(min),
                    format_number(max)
                ),
            ));
        }
        d.line(format!("min_norm {}", format_number(min)));
        d.line(format!("max_norm {}", format_number(max)));
        if let Some(grid) = &self.cache_grid {
            d.mesh("cache_grid", grid)?;
            d.line(format!("cache_grid {grid}"));
        }
        Ok(())
    }
}

impl Specify for RandomVectorField {
    fn class(&self) -> &'static str {
        "Oxs_RandomVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        self.fragment(d)?;
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// Random vectors confined to the plane normal to `plane_normal`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "PlaneRandomData")]
pub struct PlaneRandomVectorField {
    pub plane_normal: Option<VectorParam>,
    pub base: RandomVectorField,
}

/// Data file form: the plane normal beside the random-field options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlaneRandomData {
    plane_normal: Option<VectorParam>,
    min_norm: Option<f64>,
    max_norm: Option<f64>,
    cache_grid: Option<String>,
}

impl From<PlaneRandomData> for PlaneRandomVectorField {
    fn from(data: PlaneRandomData) -> Self {
        PlaneRandomVectorField {
            plane_normal: data.plane_normal,
            base: RandomVectorField {
                min_norm: data.min_norm,
                max_norm: data.max_norm,
                cache_grid: data.cache_grid,
            },
        }
    }
}

impl Specify for PlaneRandomVectorField {
    fn class(&self) -> &'static str {
        "Oxs_PlaneRandomVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let normal = require("plane_normal", &self.plane_normal)?;
        let rendered = normal.render(d, "plane_normal")?;
        d.line(format!("plane_normal {rendered}"));
        self.base.fragment(d)?;
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// Another vector field sampled at script-transformed coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptOrientVectorField {
    pub field: Option<String>,
    pub script: Option<String>,
    pub script_args: Option<Vec<PointArg>>,
    pub atlas: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
}

impl Specify for ScriptOrientVectorField {
    fn class(&self) -> &'static str {
        "Oxs_ScriptOrientVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let script = require("script", &self.script)?;
        d.vector_field("field", field)?;
        d.script("script", script)?;
        d.line(format!("field {field}"));
        d.line(format!("script {script}"));
        point_args(d, &self.script_args, None)?;
        placement(d, &self.atlas, &self.xrange, &self.yrange, &self.zrange)?;
        d.register(Entity::VectorField);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AffineOrientVectorField {
    pub field: Option<String>,
    #[serde(rename = "M")]
    pub m: Vec<f64>,
    pub offset: Option<(f64, f64, f64)>,
    pub inverse: Option<bool>,
    pub inverse_slack: Option<u64>,
}

impl Specify for AffineOrientVectorField {
    fn class(&self) -> &'static str {
        "Oxs_AffineOrientVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let field = require("field", &self.field)?;
        let m = require_list("M", &self.m)?;
        d.vector_field("field", field)?;
        d.line(format!("field {field}"));
        affine_orient_lines(d, m, self.offset, self.inverse, self.inverse_slack)?;
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// A vector field scaled point-wise by a scalar mask.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MaskVectorField {
    pub mask: Option<String>,
    pub field: Option<String>,
}

impl Specify for MaskVectorField {
    fn class(&self) -> &'static str {
        "Oxs_MaskVectorField"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let mask = require("mask", &self.mask)?;
        let field = require("field", &self.field)?;
        d.scalar_field("mask", mask)?;
        d.vector_field("field", field)?;
        d.line(format!("mask {mask}"));
        d.line(format!("field {field}"));
        d.register(Entity::VectorField);
        Ok(())
    }
}

/// Vectors taken from the colors of an image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageVectorField {
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

impl Specify for ImageVectorField {
    fn class(&self) -> &'static str {
        "Oxs_ImageVectorField"
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
        d.register(Entity::VectorField);
        Ok(())
    }
}
